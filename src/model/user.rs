use serde::{Deserialize, Serialize};

use crate::utils::db_utils::{Assignment, SqlValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Stored as handed over, hashing belongs to the auth layer.
    pub password: String,
}

impl User {
    pub const TABLE: &'static str = "users";
    pub const COLUMNS: &'static str = "id, username, password";
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

impl NewUser {
    pub fn into_record(self, id: i64) -> User {
        User {
            id,
            username: self.username,
            password: self.password,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl UserPatch {
    pub fn apply(&self, user: &mut User) {
        if let Some(username) = &self.username {
            user.username = username.clone();
        }
        if let Some(password) = &self.password {
            user.password = password.clone();
        }
    }

    pub fn assignments(&self) -> Vec<Assignment> {
        let mut out = Vec::new();
        if let Some(username) = &self.username {
            out.push(("username", SqlValue::String(Some(username.clone()))));
        }
        if let Some(password) = &self.password {
            out.push(("password", SqlValue::String(Some(password.clone()))));
        }
        out
    }
}
