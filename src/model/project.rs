use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::db_utils::{Assignment, SqlValue};
use crate::utils::serde_utils::double_option;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub owner: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub const TABLE: &'static str = "projects";
    pub const COLUMNS: &'static str = "id, name, description, status, owner, created_at";
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
    #[serde(default)]
    pub owner: Option<String>,
}

impl NewProject {
    pub fn into_record(self, id: i64, created_at: DateTime<Utc>) -> Project {
        Project {
            id,
            name: self.name,
            description: self.description,
            status: self.status,
            owner: self.owner,
            created_at,
        }
    }
}

/// Partial update, `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub owner: Option<Option<String>>,
}

impl ProjectPatch {
    pub fn apply(&self, project: &mut Project) {
        if let Some(name) = &self.name {
            project.name = name.clone();
        }
        if let Some(description) = &self.description {
            project.description = description.clone();
        }
        if let Some(status) = &self.status {
            project.status = status.clone();
        }
        if let Some(owner) = &self.owner {
            project.owner = owner.clone();
        }
    }

    pub fn assignments(&self) -> Vec<Assignment> {
        let mut out = Vec::new();
        if let Some(name) = &self.name {
            out.push(("name", SqlValue::String(Some(name.clone()))));
        }
        if let Some(description) = &self.description {
            out.push(("description", SqlValue::String(description.clone())));
        }
        if let Some(status) = &self.status {
            out.push(("status", SqlValue::String(Some(status.clone()))));
        }
        if let Some(owner) = &self.owner {
            out.push(("owner", SqlValue::String(owner.clone())));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Project {
        NewProject {
            name: "Warehouse revamp".into(),
            description: Some("Shelving and scanners".into()),
            status: "active".into(),
            owner: Some("ops".into()),
        }
        .into_record(1, Utc::now())
    }

    #[test]
    fn patch_only_touches_supplied_fields() {
        let mut project = sample();
        let before = project.clone();

        let patch = ProjectPatch {
            status: Some("completed".into()),
            ..Default::default()
        };
        patch.apply(&mut project);

        assert_eq!(project.status, "completed");
        assert_eq!(project.name, before.name);
        assert_eq!(project.description, before.description);
        assert_eq!(project.owner, before.owner);
        assert_eq!(project.created_at, before.created_at);
    }

    #[test]
    fn explicit_null_clears_optional_column() {
        let mut project = sample();
        let patch: ProjectPatch = serde_json::from_str(r#"{"owner":null}"#).unwrap();

        assert_eq!(patch.assignments(), vec![("owner", SqlValue::String(None))]);
        patch.apply(&mut project);
        assert_eq!(project.owner, None);
        assert_eq!(project.description.as_deref(), Some("Shelving and scanners"));
    }
}
