pub mod attendance;
pub mod employee;
pub mod finance;
pub mod project;
pub mod task;
pub mod user;

pub use attendance::{Attendance, AttendancePatch, NewAttendance};
pub use employee::{Employee, EmployeePatch, NewEmployee};
pub use finance::{Finance, FinancePatch, FinanceStatus, FinanceType, NewFinance};
pub use project::{NewProject, Project, ProjectPatch};
pub use task::{NewTask, Task, TaskPatch};
pub use user::{NewUser, User, UserPatch};
