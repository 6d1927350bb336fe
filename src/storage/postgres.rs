//! PostgreSQL backend.
//!
//! Every call is a single statement. Updates go through
//! `UPDATE .. RETURNING` so the row handed back is the one that was written.
//! Driver errors are passed up as they are.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, error};

use super::{Storage, StorageError, StorageResult};
use crate::config::Config;
use crate::db::init_db;
use crate::model::{
    Attendance, AttendancePatch, Employee, EmployeePatch, Finance, FinancePatch, NewAttendance,
    NewEmployee, NewFinance, NewProject, NewTask, NewUser, Project, ProjectPatch, Task, TaskPatch,
    User, UserPatch,
};
use crate::utils::db_utils::{Assignment, build_update_sql, execute_update};

#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Connects using `DATABASE_URL` from the config, its absence is a configuration error.
    pub async fn from_config(config: &Config) -> StorageResult<Self> {
        let url = config.database_url.as_deref().ok_or_else(|| {
            StorageError::Config("DATABASE_URL is required for the postgres backend".into())
        })?;
        Self::connect(url).await
    }

    pub async fn connect(database_url: &str) -> StorageResult<Self> {
        let pool = init_db(database_url).await?;
        Ok(Self { pool })
    }

    async fn merge<T>(
        &self,
        table: &str,
        columns: &str,
        id: i64,
        assignments: Vec<Assignment>,
    ) -> StorageResult<Option<T>>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let update = build_update_sql(table, assignments, "id", id, columns);
        debug!(sql = %update.sql, id, "Merging update");

        execute_update(&self.pool, update).await.map_err(|e| {
            error!(error = %e, table, id, "Update failed");
            StorageError::Database(e)
        })
    }

    async fn delete_by_id(&self, table: &str, id: i64) -> StorageResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", table);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

// 23505 is Postgres' unique_violation; users.username is the only UNIQUE column
fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}

#[async_trait]
impl Storage for PgStorage {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    // Users
    async fn get_all_users(&self) -> StorageResult<Vec<User>> {
        let users =
            sqlx::query_as::<_, User>("SELECT id, username, password FROM users ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(users)
    }

    async fn get_user(&self, id: i64) -> StorageResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, username, password FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> StorageResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> StorageResult<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password)
            VALUES ($1, $2)
            RETURNING id, username, password
            "#,
        )
        .bind(&user.username)
        .bind(&user.password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return StorageError::UsernameTaken(user.username.clone());
            }
            error!(error = %e, username = %user.username, "Failed to create user");
            StorageError::Database(e)
        })?;
        Ok(created)
    }

    async fn update_user(&self, id: i64, patch: UserPatch) -> StorageResult<Option<User>> {
        match self
            .merge(User::TABLE, User::COLUMNS, id, patch.assignments())
            .await
        {
            Err(StorageError::Database(e)) if is_unique_violation(&e) => Err(
                StorageError::UsernameTaken(patch.username.unwrap_or_default()),
            ),
            other => other,
        }
    }

    async fn delete_user(&self, id: i64) -> StorageResult<bool> {
        self.delete_by_id(User::TABLE, id).await
    }

    // Projects
    async fn get_all_projects(&self) -> StorageResult<Vec<Project>> {
        let projects = sqlx::query_as::<_, Project>(
            "SELECT id, name, description, status, owner, created_at FROM projects ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(projects)
    }

    async fn get_project(&self, id: i64) -> StorageResult<Option<Project>> {
        let project = sqlx::query_as::<_, Project>(
            "SELECT id, name, description, status, owner, created_at FROM projects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(project)
    }

    async fn create_project(&self, project: NewProject) -> StorageResult<Project> {
        let created = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, status, owner)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, status, owner, created_at
            "#,
        )
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.status)
        .bind(&project.owner)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create project");
            StorageError::Database(e)
        })?;
        Ok(created)
    }

    async fn update_project(
        &self,
        id: i64,
        patch: ProjectPatch,
    ) -> StorageResult<Option<Project>> {
        self.merge(Project::TABLE, Project::COLUMNS, id, patch.assignments())
            .await
    }

    async fn delete_project(&self, id: i64) -> StorageResult<bool> {
        self.delete_by_id(Project::TABLE, id).await
    }

    // Tasks
    async fn get_all_tasks(&self) -> StorageResult<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT id, title, description, status, project_id, created_at FROM tasks ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn get_task(&self, id: i64) -> StorageResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            "SELECT id, title, description, status, project_id, created_at FROM tasks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn get_tasks_by_project(&self, project_id: i64) -> StorageResult<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, project_id, created_at
            FROM tasks
            WHERE project_id = $1
            ORDER BY id
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn create_task(&self, task: NewTask) -> StorageResult<Task> {
        // project_id is checked by the foreign key, a dangling one surfaces as a database error
        let created = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, status, project_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, status, project_id, created_at
            "#,
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.status)
        .bind(task.project_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, project_id = task.project_id, "Failed to create task");
            StorageError::Database(e)
        })?;
        Ok(created)
    }

    async fn update_task(&self, id: i64, patch: TaskPatch) -> StorageResult<Option<Task>> {
        self.merge(Task::TABLE, Task::COLUMNS, id, patch.assignments())
            .await
    }

    async fn delete_task(&self, id: i64) -> StorageResult<bool> {
        self.delete_by_id(Task::TABLE, id).await
    }

    // Employees
    async fn get_all_employees(&self) -> StorageResult<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>(
            "SELECT id, name, position, department, email, phone FROM employees ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(employees)
    }

    async fn get_employee(&self, id: i64) -> StorageResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT id, name, position, department, email, phone FROM employees WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(employee)
    }

    async fn create_employee(&self, employee: NewEmployee) -> StorageResult<Employee> {
        let created = sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (name, position, department, email, phone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, position, department, email, phone
            "#,
        )
        .bind(&employee.name)
        .bind(&employee.position)
        .bind(&employee.department)
        .bind(&employee.email)
        .bind(&employee.phone)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create employee");
            StorageError::Database(e)
        })?;
        Ok(created)
    }

    async fn update_employee(
        &self,
        id: i64,
        patch: EmployeePatch,
    ) -> StorageResult<Option<Employee>> {
        self.merge(Employee::TABLE, Employee::COLUMNS, id, patch.assignments())
            .await
    }

    async fn delete_employee(&self, id: i64) -> StorageResult<bool> {
        self.delete_by_id(Employee::TABLE, id).await
    }

    // Finances
    async fn get_all_finances(&self) -> StorageResult<Vec<Finance>> {
        let finances = sqlx::query_as::<_, Finance>(
            r#"
            SELECT id, "type", category, description, amount, status, date, created_at
            FROM finances
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(finances)
    }

    async fn get_finance(&self, id: i64) -> StorageResult<Option<Finance>> {
        let finance = sqlx::query_as::<_, Finance>(
            r#"
            SELECT id, "type", category, description, amount, status, date, created_at
            FROM finances
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(finance)
    }

    async fn create_finance(&self, finance: NewFinance) -> StorageResult<Finance> {
        let created = sqlx::query_as::<_, Finance>(
            r#"
            INSERT INTO finances ("type", category, description, amount, status, date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, "type", category, description, amount, status, date, created_at
            "#,
        )
        .bind(finance.kind.as_ref())
        .bind(&finance.category)
        .bind(&finance.description)
        .bind(&finance.amount)
        .bind(finance.status.as_ref())
        .bind(finance.date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, category = %finance.category, "Failed to create finance record");
            StorageError::Database(e)
        })?;
        Ok(created)
    }

    async fn update_finance(
        &self,
        id: i64,
        patch: FinancePatch,
    ) -> StorageResult<Option<Finance>> {
        self.merge(Finance::TABLE, Finance::COLUMNS, id, patch.assignments())
            .await
    }

    async fn delete_finance(&self, id: i64) -> StorageResult<bool> {
        self.delete_by_id(Finance::TABLE, id).await
    }

    // Attendance
    async fn get_all_attendance(&self) -> StorageResult<Vec<Attendance>> {
        let records = sqlx::query_as::<_, Attendance>(
            r#"
            SELECT id, employee_id, date, status, check_in, check_out, created_at
            FROM attendance
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn get_attendance_by_id(&self, id: i64) -> StorageResult<Option<Attendance>> {
        let record = sqlx::query_as::<_, Attendance>(
            r#"
            SELECT id, employee_id, date, status, check_in, check_out, created_at
            FROM attendance
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn get_attendance_by_employee(
        &self,
        employee_id: i64,
    ) -> StorageResult<Vec<Attendance>> {
        let records = sqlx::query_as::<_, Attendance>(
            r#"
            SELECT id, employee_id, date, status, check_in, check_out, created_at
            FROM attendance
            WHERE employee_id = $1
            ORDER BY id
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn get_attendance_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StorageResult<Vec<Attendance>> {
        let records = sqlx::query_as::<_, Attendance>(
            r#"
            SELECT id, employee_id, date, status, check_in, check_out, created_at
            FROM attendance
            WHERE date >= $1 AND date <= $2
            ORDER BY id
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn create_attendance(&self, attendance: NewAttendance) -> StorageResult<Attendance> {
        let created = sqlx::query_as::<_, Attendance>(
            r#"
            INSERT INTO attendance (employee_id, date, status, check_in, check_out)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, employee_id, date, status, check_in, check_out, created_at
            "#,
        )
        .bind(attendance.employee_id)
        .bind(attendance.date)
        .bind(&attendance.status)
        .bind(attendance.check_in)
        .bind(attendance.check_out)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, employee_id = attendance.employee_id, "Failed to create attendance");
            StorageError::Database(e)
        })?;
        Ok(created)
    }

    async fn update_attendance(
        &self,
        id: i64,
        patch: AttendancePatch,
    ) -> StorageResult<Option<Attendance>> {
        self.merge(Attendance::TABLE, Attendance::COLUMNS, id, patch.assignments())
            .await
    }

    async fn delete_attendance(&self, id: i64) -> StorageResult<bool> {
        self.delete_by_id(Attendance::TABLE, id).await
    }
}
