use chrono::{Local, NaiveDate};
use thiserror::Error;

use crate::storage::{self, KeyValue};
use crate::task::{Task, TaskPatch};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task title cannot be empty")]
    Validation,
    #[error("no task with id {0}")]
    NotFound(String),
    #[error("import payload is not a list of tasks: {0}")]
    Format(String),
}

/// Ordered collection of tasks, newest first. The store is the single owner
/// of all task records and writes them through its backend after every
/// successful mutation; readers get borrowed snapshots only.
pub struct TaskStore {
    tasks: Vec<Task>,
    backend: Box<dyn KeyValue>,
}

impl TaskStore {
    /// Load the persisted list, falling back to an empty store when nothing
    /// is saved yet or the saved payload does not parse.
    pub fn load(backend: Box<dyn KeyValue>) -> Self {
        let tasks = storage::load_tasks(backend.as_ref());
        Self { tasks, backend }
    }

    pub fn snapshot(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Create a task at the front of the list. The title must be non-empty
    /// after trimming; an empty category collapses to uncategorized.
    pub fn add(
        &mut self,
        title: &str,
        description: &str,
        due_date: Option<NaiveDate>,
        category: Option<String>,
    ) -> Result<&Task, StoreError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StoreError::Validation);
        }
        let task = Task::new(
            title.to_string(),
            description.trim().to_string(),
            due_date,
            category.filter(|c| !c.trim().is_empty()),
        );
        self.tasks.insert(0, task);
        self.persist();
        Ok(&self.tasks[0])
    }

    /// Merge `patch` into an existing task and stamp `updated_at`. The id,
    /// creation time and completion state never change here; a patched
    /// title that trims to empty leaves the task untouched.
    pub fn edit(&mut self, id: &str, patch: TaskPatch) -> Result<&Task, StoreError> {
        let pos = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(StoreError::Validation);
            }
        }

        let task = &mut self.tasks[pos];
        if let Some(title) = patch.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            task.description = description.trim().to_string();
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(category) = patch.category {
            task.category = category.filter(|c| !c.trim().is_empty());
        }
        task.updated_at = Some(Local::now());

        self.persist();
        Ok(&self.tasks[pos])
    }

    /// Remove a task if present. Removing an unknown id is a no-op.
    pub fn remove(&mut self, id: &str) {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() != before {
            self.persist();
        }
    }

    /// Flip completion, stamping `completed_at` on the way in and clearing
    /// it on the way out.
    pub fn toggle_complete(&mut self, id: &str) -> Result<&Task, StoreError> {
        let pos = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let task = &mut self.tasks[pos];
        task.completed = !task.completed;
        task.completed_at = task.completed.then(Local::now);
        self.persist();
        Ok(&self.tasks[pos])
    }

    /// Append every record from a JSON export. The payload must be an array
    /// of task-shaped records; on any bad record the store is left exactly
    /// as it was. Imported ids are trusted as-is.
    pub fn import_append(&mut self, json: &str) -> Result<usize, StoreError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| StoreError::Format(e.to_string()))?;
        if !value.is_array() {
            return Err(StoreError::Format("expected a JSON array".to_string()));
        }
        let records: Vec<Task> =
            serde_json::from_value(value).map_err(|e| StoreError::Format(e.to_string()))?;
        let count = records.len();
        self.tasks.extend(records);
        self.persist();
        Ok(count)
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
        self.persist();
    }

    fn persist(&mut self) {
        storage::save_tasks(self.backend.as_mut(), &self.tasks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn store() -> TaskStore {
        TaskStore::load(Box::new(MemoryStore::default()))
    }

    #[test]
    fn add_prepends_the_new_task() {
        let mut store = store();
        store.add("first", "", None, None).unwrap();
        store.add("second", "", None, None).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.snapshot()[0].title, "second");
        assert_eq!(store.snapshot()[1].title, "first");
    }

    #[test]
    fn add_rejects_blank_titles() {
        let mut store = store();
        assert!(matches!(
            store.add("", "", None, None),
            Err(StoreError::Validation)
        ));
        assert!(matches!(
            store.add("   ", "", None, None),
            Err(StoreError::Validation)
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn add_collapses_blank_category_to_none() {
        let mut store = store();
        let task = store.add("task", "", None, Some("  ".to_string())).unwrap();
        assert_eq!(task.category, None);
    }

    #[test]
    fn edit_merges_fields_and_stamps_updated_at() {
        let mut store = store();
        let id = store
            .add("draft", "old text", None, Some("work".to_string()))
            .unwrap()
            .id
            .clone();
        let created_at = store.get(&id).unwrap().created_at;

        let task = store
            .edit(
                &id,
                TaskPatch {
                    title: Some("final".to_string()),
                    due_date: Some(NaiveDate::from_ymd_opt(2025, 9, 1)),
                    ..TaskPatch::default()
                },
            )
            .unwrap();

        assert_eq!(task.title, "final");
        assert_eq!(task.description, "old text");
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2025, 9, 1));
        assert_eq!(task.category.as_deref(), Some("work"));
        assert_eq!(task.created_at, created_at);
        assert_eq!(task.id, id);
        assert!(task.updated_at.is_some());
    }

    #[test]
    fn edit_with_blank_title_leaves_the_task_unchanged() {
        let mut store = store();
        let id = store.add("keep me", "", None, None).unwrap().id.clone();
        let err = store.edit(
            &id,
            TaskPatch {
                title: Some("   ".to_string()),
                description: Some("should not land".to_string()),
                ..TaskPatch::default()
            },
        );
        assert!(matches!(err, Err(StoreError::Validation)));
        let task = store.get(&id).unwrap();
        assert_eq!(task.title, "keep me");
        assert_eq!(task.description, "");
        assert_eq!(task.updated_at, None);
    }

    #[test]
    fn edit_unknown_id_is_not_found() {
        let mut store = store();
        assert!(matches!(
            store.edit("nope", TaskPatch::default()),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn remove_is_idempotent() {
        let mut store = store();
        let id = store.add("gone soon", "", None, None).unwrap().id.clone();
        store.remove(&id);
        assert!(store.is_empty());
        store.remove(&id);
        assert!(store.is_empty());
    }

    #[test]
    fn toggle_complete_is_its_own_inverse() {
        let mut store = store();
        let id = store.add("flip me", "", None, None).unwrap().id.clone();

        let task = store.toggle_complete(&id).unwrap();
        assert!(task.completed);
        assert!(task.completed_at.is_some());

        let task = store.toggle_complete(&id).unwrap();
        assert!(!task.completed);
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn toggle_complete_unknown_id_is_not_found() {
        let mut store = store();
        assert!(matches!(
            store.toggle_complete("nope"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn import_appends_after_existing_tasks() {
        let mut store = store();
        store.add("existing", "", None, None).unwrap();

        let payload = serde_json::to_string(&vec![
            Task::new("imported one".to_string(), String::new(), None, None),
            Task::new("imported two".to_string(), String::new(), None, None),
        ])
        .unwrap();

        let count = store.import_append(&payload).unwrap();
        assert_eq!(count, 2);
        assert_eq!(store.len(), 3);
        assert_eq!(store.snapshot()[0].title, "existing");
        assert_eq!(store.snapshot()[2].title, "imported two");
    }

    #[test]
    fn import_rejects_non_array_payloads() {
        let mut store = store();
        store.add("existing", "", None, None).unwrap();

        let single_object = r#"{"id":"x","title":"t","createdAt":"2025-01-01T00:00:00Z"}"#;
        assert!(matches!(
            store.import_append(single_object),
            Err(StoreError::Format(_))
        ));
        assert!(matches!(
            store.import_append("not json"),
            Err(StoreError::Format(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn import_rejects_arrays_of_non_tasks() {
        let mut store = store();
        assert!(matches!(
            store.import_append(r#"[{"note":"missing required fields"}]"#),
            Err(StoreError::Format(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn clear_empties_the_store() {
        let mut store = store();
        store.add("one", "", None, None).unwrap();
        store.add("two", "", None, None).unwrap();
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn mutations_persist_and_reload() {
        let backend = MemoryStore::default();
        let mut store = TaskStore::load(Box::new(backend.clone()));
        store.add("survives restart", "", None, None).unwrap();
        drop(store);

        let reloaded = TaskStore::load(Box::new(backend));
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.snapshot()[0].title, "survives restart");
    }
}
