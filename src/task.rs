use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A single task record. Field names in the persisted JSON are camelCase
/// (`dueDate`, `createdAt`, ...) so saved lists and exports share one shape.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "de_opt_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "de_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Local>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Local>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Local>>,
}

impl Task {
    pub fn new(
        title: String,
        description: String,
        due_date: Option<NaiveDate>,
        category: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            due_date,
            category,
            completed: false,
            created_at: Local::now(),
            updated_at: None,
            completed_at: None,
        }
    }
}

/// Partial update for `TaskStore::edit`. `None` leaves a field unchanged;
/// the nested options clear the field when set to `Some(None)`.
#[derive(Debug, Default, Clone)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<Option<NaiveDate>>,
    pub category: Option<Option<String>>,
}

// Imported files may carry "" for a missing due date or category.
fn de_opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

fn de_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_field_names() {
        let mut task = Task::new("Buy milk".to_string(), String::new(), None, None);
        task.due_date = Some(NaiveDate::from_ymd_opt(2025, 6, 10).unwrap());
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"dueDate\":\"2025-06-10\""));
        assert!(json.contains("\"createdAt\""));
        assert!(!json.contains("\"completedAt\""));
    }

    #[test]
    fn empty_due_date_and_category_deserialize_as_absent() {
        let json = r#"{
            "id": "demo1",
            "title": "Read a book",
            "description": "",
            "dueDate": "",
            "category": "",
            "completed": false,
            "createdAt": "2025-01-01T08:00:00Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.due_date, None);
        assert_eq!(task.category, None);
    }

    #[test]
    fn round_trips_through_json() {
        let mut task = Task::new(
            "Plan trip".to_string(),
            "Book accommodation".to_string(),
            Some(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()),
            Some("personal".to_string()),
        );
        task.completed = true;
        task.completed_at = Some(Local::now());
        let json = serde_json::to_string_pretty(&task).unwrap();
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
    }
}
