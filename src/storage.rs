use std::fs;
use std::io;
use std::path::PathBuf;

use crate::task::Task;
use crate::theme::Theme;

pub const TASKS_KEY: &str = "taskManager_tasks";
pub const THEME_KEY: &str = "taskManager_theme";

/// Minimal key-value backend the store persists through. Writes that fail
/// are reported but never abort the application.
pub trait KeyValue {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// One file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }
}

impl KeyValue for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.dir.join(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Err(err) = fs::write(self.dir.join(key), value) {
            eprintln!("Failed to save {}: {}", key, err);
        }
    }
}

/// Decode the persisted task list. A missing key or corrupt payload loads
/// as an empty list rather than an error.
pub fn load_tasks(backend: &dyn KeyValue) -> Vec<Task> {
    backend
        .get(TASKS_KEY)
        .map(|data| serde_json::from_str(&data).unwrap_or_else(|_| Vec::new()))
        .unwrap_or_default()
}

pub fn save_tasks(backend: &mut dyn KeyValue, tasks: &[Task]) {
    match serde_json::to_string_pretty(tasks) {
        Ok(json) => backend.set(TASKS_KEY, &json),
        Err(err) => eprintln!("Failed to encode tasks: {}", err),
    }
}

pub fn load_theme(backend: &dyn KeyValue) -> Theme {
    backend
        .get(THEME_KEY)
        .and_then(|s| Theme::parse(s.trim()))
        .unwrap_or_default()
}

pub fn save_theme(backend: &mut dyn KeyValue, theme: Theme) {
    backend.set(THEME_KEY, theme.as_str());
}

/// In-memory backend for tests. Clones share the same map so a store and
/// the test can observe each other's writes.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore(
    std::rc::Rc<std::cell::RefCell<std::collections::HashMap<String, String>>>,
);

#[cfg(test)]
impl KeyValue for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.borrow().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.0.borrow_mut().insert(key.to_string(), value.to_string());
    }
}
