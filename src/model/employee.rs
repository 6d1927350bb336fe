use serde::{Deserialize, Serialize};

use crate::utils::db_utils::{Assignment, SqlValue};
use crate::utils::serde_utils::double_option;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub position: String,
    pub department: Option<String>,
    pub email: String,
    pub phone: Option<String>,
}

impl Employee {
    pub const TABLE: &'static str = "employees";
    pub const COLUMNS: &'static str = "id, name, position, department, email, phone";
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub name: String,
    pub position: String,
    #[serde(default)]
    pub department: Option<String>,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl NewEmployee {
    pub fn into_record(self, id: i64) -> Employee {
        Employee {
            id,
            name: self.name,
            position: self.position,
            department: self.department,
            email: self.email,
            phone: self.phone,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePatch {
    pub name: Option<String>,
    pub position: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub department: Option<Option<String>>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
}

impl EmployeePatch {
    pub fn apply(&self, employee: &mut Employee) {
        if let Some(name) = &self.name {
            employee.name = name.clone();
        }
        if let Some(position) = &self.position {
            employee.position = position.clone();
        }
        if let Some(department) = &self.department {
            employee.department = department.clone();
        }
        if let Some(email) = &self.email {
            employee.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            employee.phone = phone.clone();
        }
    }

    pub fn assignments(&self) -> Vec<Assignment> {
        let mut out = Vec::new();
        if let Some(name) = &self.name {
            out.push(("name", SqlValue::String(Some(name.clone()))));
        }
        if let Some(position) = &self.position {
            out.push(("position", SqlValue::String(Some(position.clone()))));
        }
        if let Some(department) = &self.department {
            out.push(("department", SqlValue::String(department.clone())));
        }
        if let Some(email) = &self.email {
            out.push(("email", SqlValue::String(Some(email.clone()))));
        }
        if let Some(phone) = &self.phone {
            out.push(("phone", SqlValue::String(phone.clone())));
        }
        out
    }
}
