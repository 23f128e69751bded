use chrono::{Datelike, Days, NaiveDate};

use crate::task::Task;

/// Aggregate counters shown in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

pub fn stats(tasks: &[Task]) -> Stats {
    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.completed).count();
    Stats {
        total,
        completed,
        pending: total - completed,
    }
}

/// Human label for a due date, using whole-day arithmetic only. Years are
/// spelled out only when the due date falls outside the current year.
pub fn due_date_label(due: NaiveDate, today: NaiveDate) -> String {
    if due == today {
        return "Due today".to_string();
    }
    if Some(due) == today.checked_add_days(Days::new(1)) {
        return "Due tomorrow".to_string();
    }
    if due < today {
        let days = (today - due).num_days();
        return format!("{} day{} overdue", days, if days == 1 { "" } else { "s" });
    }
    if due.year() == today.year() {
        format!("Due {}", due.format("%b %-d"))
    } else {
        format!("Due {}, {}", due.format("%b %-d"), due.year())
    }
}

/// Due within a day and not done yet; drawn with the warning color.
pub fn is_due_soon(due: NaiveDate, today: NaiveDate) -> bool {
    due >= today && Some(due) <= today.checked_add_days(Days::new(1))
}

/// Category badges render capitalized, as in "Shopping".
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
