use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::filter::{filter_tasks, StatusFilter};
use crate::storage::{self, KeyValue};
use crate::store::TaskStore;
use crate::task::{Task, TaskPatch};
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

/// One-line status message shown until the next action replaces it.
#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
}

/// All application state: the store plus the filter inputs, theme and list
/// selection the UI draws from. Constructed once in `main` and handed to
/// the event loop; there is no global instance.
pub struct App {
    pub store: TaskStore,
    backend: Box<dyn KeyValue>,
    pub search: String,
    pub status_filter: StatusFilter,
    pub category_filter: Option<String>,
    pub theme: Theme,
    pub selected: usize,
    pub notice: Option<Notice>,
}

impl App {
    pub fn new(store: TaskStore, backend: Box<dyn KeyValue>) -> Self {
        let theme = storage::load_theme(backend.as_ref());
        Self {
            store,
            backend,
            search: String::new(),
            status_filter: StatusFilter::default(),
            category_filter: None,
            theme,
            selected: 0,
            notice: None,
        }
    }

    /// The filtered view, recomputed from the store on every draw.
    pub fn visible(&self, today: NaiveDate) -> Vec<&Task> {
        filter_tasks(
            self.store.snapshot(),
            &self.search,
            self.status_filter,
            self.category_filter.as_deref(),
            today,
        )
    }

    pub fn notify(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.notice = Some(Notice {
            message: message.into(),
            kind,
        });
    }

    pub fn add_task(
        &mut self,
        title: &str,
        description: &str,
        due_date: Option<NaiveDate>,
        category: Option<String>,
    ) {
        match self.store.add(title, description, due_date, category) {
            Ok(_) => {
                self.selected = 0;
                self.notify(NoticeKind::Success, "Task added successfully!");
            }
            Err(err) => self.notify(NoticeKind::Error, err.to_string()),
        }
    }

    pub fn edit_task(&mut self, id: &str, patch: TaskPatch) {
        match self.store.edit(id, patch) {
            Ok(_) => self.notify(NoticeKind::Success, "Task updated successfully!"),
            Err(err) => self.notify(NoticeKind::Error, err.to_string()),
        }
    }

    /// Delete behind a caller-supplied confirmation. The store itself never
    /// prompts; the UI decides how to ask.
    pub fn delete_task(&mut self, id: &str, confirm: impl FnOnce() -> bool) {
        if !confirm() {
            return;
        }
        self.store.remove(id);
        self.notify(NoticeKind::Success, "Task deleted successfully!");
    }

    /// Unknown ids are ignored; the row the user toggled is already gone.
    pub fn toggle_task(&mut self, id: &str) {
        let _ = self.store.toggle_complete(id);
    }

    pub fn clear_all(&mut self, confirm: impl FnOnce() -> bool) {
        if !confirm() {
            return;
        }
        self.store.clear();
        self.selected = 0;
        self.notify(NoticeKind::Success, "All tasks cleared!");
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        storage::save_theme(self.backend.as_mut(), self.theme);
    }

    /// Write the full list, pretty-printed, to `tasks_<YYYY-MM-DD>.json`
    /// under `dir`. Same shape as the persisted encoding.
    pub fn export_tasks(&mut self, dir: &Path, today: NaiveDate) {
        match write_export(self.store.snapshot(), dir, today) {
            Ok(path) => self.notify(
                NoticeKind::Success,
                format!("Tasks exported to {}", path.display()),
            ),
            Err(err) => self.notify(NoticeKind::Error, format!("Export failed: {}", err)),
        }
    }

    /// Read a JSON export and append its records to the store.
    pub fn import_tasks(&mut self, path: &Path) {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                self.notify(NoticeKind::Error, format!("Import failed: {}", err));
                return;
            }
        };
        match self.store.import_append(&text) {
            Ok(count) => self.notify(NoticeKind::Success, format!("Imported {} tasks!", count)),
            Err(err) => self.notify(NoticeKind::Error, err.to_string()),
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self, visible_len: usize) {
        if self.selected + 1 < visible_len {
            self.selected += 1;
        }
    }

    /// Keep the selection on a real row after deletes or filter changes.
    pub fn clamp_selection(&mut self, visible_len: usize) {
        if self.selected >= visible_len {
            self.selected = visible_len.saturating_sub(1);
        }
    }
}

fn write_export(tasks: &[Task], dir: &Path, today: NaiveDate) -> io::Result<PathBuf> {
    let path = dir.join(format!("tasks_{}.json", today.format("%Y-%m-%d")));
    let json = serde_json::to_string_pretty(tasks)?;
    fs::write(&path, json)?;
    Ok(path)
}
