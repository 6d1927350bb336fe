//! Storage capability shared by the dashboard handlers.
//!
//! Two backends implement [`Storage`]:
//!
//! - `postgres`: one statement per call against PostgreSQL
//! - `memory`: volatile maps, picked when no `DATABASE_URL` is configured
//!
//! The backend is chosen once at startup by [`init_storage`] and handed out as a
//! [`StorageHandle`]; nothing switches it afterwards.

mod error;
pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use tracing::info;

use crate::config::Config;
use crate::model::{
    Attendance, AttendancePatch, Employee, EmployeePatch, Finance, FinancePatch, NewAttendance,
    NewEmployee, NewFinance, NewProject, NewTask, NewUser, Project, ProjectPatch, Task, TaskPatch,
    User, UserPatch,
};

pub use error::{StorageError, StorageResult};
pub use memory::MemStorage;
pub use postgres::PgStorage;

/// Shared handle given to every caller for the lifetime of the process.
pub type StorageHandle = Arc<dyn Storage>;

/// CRUD plus filtered reads for the six dashboard entities.
///
/// `get_*` and `update_*` return `None` for an unknown id. Updates overlay only
/// the fields present in the patch. `delete_*` reports whether a row went away.
/// List reads come back ordered by id.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Short label for logs.
    fn backend_name(&self) -> &'static str;

    // Users
    async fn get_all_users(&self) -> StorageResult<Vec<User>>;
    async fn get_user(&self, id: i64) -> StorageResult<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>>;
    async fn create_user(&self, user: NewUser) -> StorageResult<User>;
    async fn update_user(&self, id: i64, patch: UserPatch) -> StorageResult<Option<User>>;
    async fn delete_user(&self, id: i64) -> StorageResult<bool>;

    // Projects
    async fn get_all_projects(&self) -> StorageResult<Vec<Project>>;
    async fn get_project(&self, id: i64) -> StorageResult<Option<Project>>;
    async fn create_project(&self, project: NewProject) -> StorageResult<Project>;
    async fn update_project(&self, id: i64, patch: ProjectPatch)
    -> StorageResult<Option<Project>>;
    async fn delete_project(&self, id: i64) -> StorageResult<bool>;

    // Tasks
    async fn get_all_tasks(&self) -> StorageResult<Vec<Task>>;
    async fn get_task(&self, id: i64) -> StorageResult<Option<Task>>;
    async fn get_tasks_by_project(&self, project_id: i64) -> StorageResult<Vec<Task>>;
    async fn create_task(&self, task: NewTask) -> StorageResult<Task>;
    async fn update_task(&self, id: i64, patch: TaskPatch) -> StorageResult<Option<Task>>;
    async fn delete_task(&self, id: i64) -> StorageResult<bool>;

    // Employees
    async fn get_all_employees(&self) -> StorageResult<Vec<Employee>>;
    async fn get_employee(&self, id: i64) -> StorageResult<Option<Employee>>;
    async fn create_employee(&self, employee: NewEmployee) -> StorageResult<Employee>;
    async fn update_employee(
        &self,
        id: i64,
        patch: EmployeePatch,
    ) -> StorageResult<Option<Employee>>;
    async fn delete_employee(&self, id: i64) -> StorageResult<bool>;

    // Finances
    async fn get_all_finances(&self) -> StorageResult<Vec<Finance>>;
    async fn get_finance(&self, id: i64) -> StorageResult<Option<Finance>>;
    async fn create_finance(&self, finance: NewFinance) -> StorageResult<Finance>;
    async fn update_finance(&self, id: i64, patch: FinancePatch)
    -> StorageResult<Option<Finance>>;
    async fn delete_finance(&self, id: i64) -> StorageResult<bool>;

    // Attendance
    async fn get_all_attendance(&self) -> StorageResult<Vec<Attendance>>;
    async fn get_attendance_by_id(&self, id: i64) -> StorageResult<Option<Attendance>>;
    async fn get_attendance_by_employee(&self, employee_id: i64)
    -> StorageResult<Vec<Attendance>>;
    /// Records whose `date` falls on the given UTC calendar day.
    async fn get_attendance_by_date(&self, date: NaiveDate) -> StorageResult<Vec<Attendance>> {
        let (start, end) = day_bounds(date);
        self.get_attendance_by_date_range(start, end).await
    }
    /// Inclusive on both ends.
    async fn get_attendance_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StorageResult<Vec<Attendance>>;
    async fn create_attendance(&self, attendance: NewAttendance) -> StorageResult<Attendance>;
    async fn update_attendance(
        &self,
        id: i64,
        patch: AttendancePatch,
    ) -> StorageResult<Option<Attendance>>;
    async fn delete_attendance(&self, id: i64) -> StorageResult<bool>;
}

/// First and last instant of a UTC calendar day.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    let end = start + Duration::days(1) - Duration::nanoseconds(1);
    (start, end)
}

/// Picks the backend for this process.
///
/// A configured `DATABASE_URL` means Postgres and any failure to reach it is
/// returned to the caller, there is no fallback to memory.
pub async fn init_storage(config: &Config) -> StorageResult<StorageHandle> {
    let storage: StorageHandle = match config.database_url.as_deref() {
        Some(_) => Arc::new(PgStorage::from_config(config).await?),
        None => Arc::new(MemStorage::new()),
    };

    info!(backend = storage.backend_name(), "Storage initialized");
    Ok(storage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn day_bounds_cover_whole_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let (start, end) = day_bounds(date);

        assert_eq!(start.to_rfc3339(), "2024-03-15T00:00:00+00:00");
        assert_eq!(end.date_naive(), date);
        assert_eq!((end.hour(), end.minute(), end.second()), (23, 59, 59));
        assert_eq!(end + Duration::nanoseconds(1), start + Duration::days(1));
    }

    #[tokio::test]
    async fn no_database_url_selects_memory() {
        let config = Config::from_lookup(|_| None).unwrap();
        let storage = init_storage(&config).await.unwrap();
        assert_eq!(storage.backend_name(), "memory");
    }
}
