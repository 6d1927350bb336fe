use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::db_utils::{Assignment, SqlValue};
use crate::utils::serde_utils::double_option;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    /// Owning project, the foreign key lives in the database only.
    pub project_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub const TABLE: &'static str = "tasks";
    pub const COLUMNS: &'static str = "id, title, description, status, project_id, created_at";
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
    pub project_id: i64,
}

impl NewTask {
    pub fn into_record(self, id: i64, created_at: DateTime<Utc>) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            status: self.status,
            project_id: self.project_id,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub status: Option<String>,
    pub project_id: Option<i64>,
}

impl TaskPatch {
    pub fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(status) = &self.status {
            task.status = status.clone();
        }
        if let Some(project_id) = self.project_id {
            task.project_id = project_id;
        }
    }

    pub fn assignments(&self) -> Vec<Assignment> {
        let mut out = Vec::new();
        if let Some(title) = &self.title {
            out.push(("title", SqlValue::String(Some(title.clone()))));
        }
        if let Some(description) = &self.description {
            out.push(("description", SqlValue::String(description.clone())));
        }
        if let Some(status) = &self.status {
            out.push(("status", SqlValue::String(Some(status.clone()))));
        }
        if let Some(project_id) = self.project_id {
            out.push(("project_id", SqlValue::I64(project_id)));
        }
        out
    }
}
