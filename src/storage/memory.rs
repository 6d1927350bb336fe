//! Volatile backend used when no database is configured.
//!
//! Each entity lives in its own id-ordered map with a counter that starts at 1
//! and only moves forward, so ids are never handed out twice even after a delete.
//! Everything sits behind one `RwLock` because handlers run on a multi-threaded
//! runtime. Nothing is written to disk.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::{Storage, StorageError, StorageResult};
use crate::model::{
    Attendance, AttendancePatch, Employee, EmployeePatch, Finance, FinancePatch, NewAttendance,
    NewEmployee, NewFinance, NewProject, NewTask, NewUser, Project, ProjectPatch, Task, TaskPatch,
    User, UserPatch,
};

struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn all(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    fn get(&self, id: i64) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn find<P>(&self, predicate: P) -> Vec<T>
    where
        P: Fn(&T) -> bool,
    {
        self.rows.values().filter(|row| predicate(row)).cloned().collect()
    }

    fn insert_with<F>(&mut self, build: F) -> T
    where
        F: FnOnce(i64) -> T,
    {
        let id = self.next_id;
        self.next_id += 1;

        let record = build(id);
        self.rows.insert(id, record.clone());
        record
    }

    /// Overlays the patch on the stored row in place, `None` when the id is unknown.
    fn merge<F>(&mut self, id: i64, overlay: F) -> Option<T>
    where
        F: FnOnce(&mut T),
    {
        let row = self.rows.get_mut(&id)?;
        overlay(row);
        Some(row.clone())
    }

    fn remove(&mut self, id: i64) -> bool {
        self.rows.remove(&id).is_some()
    }
}

/// True when another user than `except` already holds `username`.
fn username_taken(users: &Table<User>, username: &str, except: Option<i64>) -> bool {
    users
        .rows
        .values()
        .any(|user| user.username == username && Some(user.id) != except)
}

struct Tables {
    users: Table<User>,
    projects: Table<Project>,
    tasks: Table<Task>,
    employees: Table<Employee>,
    finances: Table<Finance>,
    attendance: Table<Attendance>,
}

pub struct MemStorage {
    tables: RwLock<Tables>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                users: Table::new(),
                projects: Table::new(),
                tasks: Table::new(),
                employees: Table::new(),
                finances: Table::new(),
                attendance: Table::new(),
            }),
        }
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemStorage {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    // Users
    async fn get_all_users(&self) -> StorageResult<Vec<User>> {
        Ok(self.tables.read().await.users.all())
    }

    async fn get_user(&self, id: i64) -> StorageResult<Option<User>> {
        Ok(self.tables.read().await.users.get(id))
    }

    async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .find(|user| user.username == username)
            .into_iter()
            .next())
    }

    async fn create_user(&self, user: NewUser) -> StorageResult<User> {
        let mut tables = self.tables.write().await;
        if username_taken(&tables.users, &user.username, None) {
            return Err(StorageError::UsernameTaken(user.username));
        }

        let created = tables.users.insert_with(|id| user.into_record(id));
        debug!(user_id = created.id, "User created");
        Ok(created)
    }

    async fn update_user(&self, id: i64, patch: UserPatch) -> StorageResult<Option<User>> {
        let mut tables = self.tables.write().await;
        if !tables.users.rows.contains_key(&id) {
            return Ok(None);
        }
        if let Some(username) = &patch.username {
            if username_taken(&tables.users, username, Some(id)) {
                return Err(StorageError::UsernameTaken(username.clone()));
            }
        }

        Ok(tables.users.merge(id, |user| patch.apply(user)))
    }

    async fn delete_user(&self, id: i64) -> StorageResult<bool> {
        Ok(self.tables.write().await.users.remove(id))
    }

    // Projects
    async fn get_all_projects(&self) -> StorageResult<Vec<Project>> {
        Ok(self.tables.read().await.projects.all())
    }

    async fn get_project(&self, id: i64) -> StorageResult<Option<Project>> {
        Ok(self.tables.read().await.projects.get(id))
    }

    async fn create_project(&self, project: NewProject) -> StorageResult<Project> {
        let created_at = Utc::now();
        let created = self
            .tables
            .write()
            .await
            .projects
            .insert_with(|id| project.into_record(id, created_at));
        debug!(project_id = created.id, "Project created");
        Ok(created)
    }

    async fn update_project(
        &self,
        id: i64,
        patch: ProjectPatch,
    ) -> StorageResult<Option<Project>> {
        Ok(self
            .tables
            .write()
            .await
            .projects
            .merge(id, |project| patch.apply(project)))
    }

    async fn delete_project(&self, id: i64) -> StorageResult<bool> {
        Ok(self.tables.write().await.projects.remove(id))
    }

    // Tasks
    async fn get_all_tasks(&self) -> StorageResult<Vec<Task>> {
        Ok(self.tables.read().await.tasks.all())
    }

    async fn get_task(&self, id: i64) -> StorageResult<Option<Task>> {
        Ok(self.tables.read().await.tasks.get(id))
    }

    async fn get_tasks_by_project(&self, project_id: i64) -> StorageResult<Vec<Task>> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.find(|task| task.project_id == project_id))
    }

    async fn create_task(&self, task: NewTask) -> StorageResult<Task> {
        let created_at = Utc::now();
        let created = self
            .tables
            .write()
            .await
            .tasks
            .insert_with(|id| task.into_record(id, created_at));
        debug!(task_id = created.id, project_id = created.project_id, "Task created");
        Ok(created)
    }

    async fn update_task(&self, id: i64, patch: TaskPatch) -> StorageResult<Option<Task>> {
        Ok(self
            .tables
            .write()
            .await
            .tasks
            .merge(id, |task| patch.apply(task)))
    }

    async fn delete_task(&self, id: i64) -> StorageResult<bool> {
        Ok(self.tables.write().await.tasks.remove(id))
    }

    // Employees
    async fn get_all_employees(&self) -> StorageResult<Vec<Employee>> {
        Ok(self.tables.read().await.employees.all())
    }

    async fn get_employee(&self, id: i64) -> StorageResult<Option<Employee>> {
        Ok(self.tables.read().await.employees.get(id))
    }

    async fn create_employee(&self, employee: NewEmployee) -> StorageResult<Employee> {
        let created = self
            .tables
            .write()
            .await
            .employees
            .insert_with(|id| employee.into_record(id));
        debug!(employee_id = created.id, "Employee created");
        Ok(created)
    }

    async fn update_employee(
        &self,
        id: i64,
        patch: EmployeePatch,
    ) -> StorageResult<Option<Employee>> {
        Ok(self
            .tables
            .write()
            .await
            .employees
            .merge(id, |employee| patch.apply(employee)))
    }

    async fn delete_employee(&self, id: i64) -> StorageResult<bool> {
        Ok(self.tables.write().await.employees.remove(id))
    }

    // Finances
    async fn get_all_finances(&self) -> StorageResult<Vec<Finance>> {
        Ok(self.tables.read().await.finances.all())
    }

    async fn get_finance(&self, id: i64) -> StorageResult<Option<Finance>> {
        Ok(self.tables.read().await.finances.get(id))
    }

    async fn create_finance(&self, finance: NewFinance) -> StorageResult<Finance> {
        let created_at = Utc::now();
        let created = self
            .tables
            .write()
            .await
            .finances
            .insert_with(|id| finance.into_record(id, created_at));
        debug!(finance_id = created.id, "Finance record created");
        Ok(created)
    }

    async fn update_finance(
        &self,
        id: i64,
        patch: FinancePatch,
    ) -> StorageResult<Option<Finance>> {
        Ok(self
            .tables
            .write()
            .await
            .finances
            .merge(id, |finance| patch.apply(finance)))
    }

    async fn delete_finance(&self, id: i64) -> StorageResult<bool> {
        Ok(self.tables.write().await.finances.remove(id))
    }

    // Attendance
    async fn get_all_attendance(&self) -> StorageResult<Vec<Attendance>> {
        Ok(self.tables.read().await.attendance.all())
    }

    async fn get_attendance_by_id(&self, id: i64) -> StorageResult<Option<Attendance>> {
        Ok(self.tables.read().await.attendance.get(id))
    }

    async fn get_attendance_by_employee(
        &self,
        employee_id: i64,
    ) -> StorageResult<Vec<Attendance>> {
        let tables = self.tables.read().await;
        Ok(tables
            .attendance
            .find(|record| record.employee_id == employee_id))
    }

    async fn get_attendance_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StorageResult<Vec<Attendance>> {
        let tables = self.tables.read().await;
        Ok(tables
            .attendance
            .find(|record| record.date >= start && record.date <= end))
    }

    async fn create_attendance(&self, attendance: NewAttendance) -> StorageResult<Attendance> {
        let created_at = Utc::now();
        let created = self
            .tables
            .write()
            .await
            .attendance
            .insert_with(|id| attendance.into_record(id, created_at));
        debug!(
            attendance_id = created.id,
            employee_id = created.employee_id,
            "Attendance created"
        );
        Ok(created)
    }

    async fn update_attendance(
        &self,
        id: i64,
        patch: AttendancePatch,
    ) -> StorageResult<Option<Attendance>> {
        Ok(self
            .tables
            .write()
            .await
            .attendance
            .merge(id, |record| patch.apply(record)))
    }

    async fn delete_attendance(&self, id: i64) -> StorageResult<bool> {
        Ok(self.tables.write().await.attendance.remove(id))
    }
}
