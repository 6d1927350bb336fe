use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::db_utils::{Assignment, SqlValue};
use crate::utils::serde_utils::double_option;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: i64,
    pub employee_id: i64,
    pub date: DateTime<Utc>,
    pub status: String,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub created_at: DateTime<Utc>,
}

impl Attendance {
    pub const TABLE: &'static str = "attendance";
    pub const COLUMNS: &'static str =
        "id, employee_id, date, status, check_in, check_out, created_at";
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAttendance {
    pub employee_id: i64,
    pub date: DateTime<Utc>,
    pub status: String,
    #[serde(default)]
    pub check_in: Option<NaiveTime>,
    #[serde(default)]
    pub check_out: Option<NaiveTime>,
}

impl NewAttendance {
    pub fn into_record(self, id: i64, created_at: DateTime<Utc>) -> Attendance {
        Attendance {
            id,
            employee_id: self.employee_id,
            date: self.date,
            status: self.status,
            check_in: self.check_in,
            check_out: self.check_out,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendancePatch {
    pub employee_id: Option<i64>,
    pub date: Option<DateTime<Utc>>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub check_in: Option<Option<NaiveTime>>,
    #[serde(default, deserialize_with = "double_option")]
    pub check_out: Option<Option<NaiveTime>>,
}

impl AttendancePatch {
    pub fn apply(&self, attendance: &mut Attendance) {
        if let Some(employee_id) = self.employee_id {
            attendance.employee_id = employee_id;
        }
        if let Some(date) = self.date {
            attendance.date = date;
        }
        if let Some(status) = &self.status {
            attendance.status = status.clone();
        }
        if let Some(check_in) = self.check_in {
            attendance.check_in = check_in;
        }
        if let Some(check_out) = self.check_out {
            attendance.check_out = check_out;
        }
    }

    pub fn assignments(&self) -> Vec<Assignment> {
        let mut out = Vec::new();
        if let Some(employee_id) = self.employee_id {
            out.push(("employee_id", SqlValue::I64(employee_id)));
        }
        if let Some(date) = self.date {
            out.push(("date", SqlValue::DateTime(date)));
        }
        if let Some(status) = &self.status {
            out.push(("status", SqlValue::String(Some(status.clone()))));
        }
        if let Some(check_in) = self.check_in {
            out.push(("check_in", SqlValue::Time(check_in)));
        }
        if let Some(check_out) = self.check_out {
            out.push(("check_out", SqlValue::Time(check_out)));
        }
        out
    }
}
