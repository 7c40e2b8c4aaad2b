//! `SeaORM` entity definitions.

pub mod attendance;
pub mod audit_logs;
pub mod employee_profiles;
pub mod leave_balances;
pub mod leave_requests;
pub mod payruns;
pub mod payslips;
pub mod sea_orm_active_enums;
pub mod users;
