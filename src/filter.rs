use chrono::NaiveDate;

use crate::task::Task;

/// Status half of the filter bar. `Overdue` uses date-only comparison: a
/// task counts once its due date is strictly before today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
    Overdue,
}

impl StatusFilter {
    /// Next filter in the cycle the `s` key walks through.
    pub fn next(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::Pending,
            StatusFilter::Pending => StatusFilter::Overdue,
            StatusFilter::Overdue => StatusFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Completed => "completed",
            StatusFilter::Pending => "pending",
            StatusFilter::Overdue => "overdue",
        }
    }

    fn matches(self, task: &Task, today: NaiveDate) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Completed => task.completed,
            StatusFilter::Pending => !task.completed,
            StatusFilter::Overdue => {
                !task.completed && task.due_date.is_some_and(|due| due < today)
            }
        }
    }
}

/// Pure view over the store: search, status and category predicates ANDed,
/// store order preserved among matches.
pub fn filter_tasks<'a>(
    tasks: &'a [Task],
    search: &str,
    status: StatusFilter,
    category: Option<&str>,
    today: NaiveDate,
) -> Vec<&'a Task> {
    let needle = search.trim().to_lowercase();
    tasks
        .iter()
        .filter(|task| {
            let matches_search = needle.is_empty()
                || task.title.to_lowercase().contains(&needle)
                || task.description.to_lowercase().contains(&needle);
            let matches_category =
                category.is_none_or(|c| task.category.as_deref() == Some(c));
            matches_search && status.matches(task, today) && matches_category
        })
        .collect()
}
