//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod attendance;
pub mod audit;
pub mod leave;
pub mod payroll;
pub mod profile;
pub mod user;

pub use attendance::AttendanceRepository;
pub use audit::{DbAuditSink, TracingAuditSink};
pub use leave::{ApplyLeaveInput, LeaveFilter, LeaveRepository};
pub use payroll::{EmployeePayslip, PayrollRepository, PayrunDetail, PayrunRecord, PayslipRecord};
pub use profile::ProfileRepository;
pub use user::UserRepository;
