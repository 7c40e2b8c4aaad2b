//! PostgreSQL enum types and their conversions to domain enums.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use payline_core::Role;
use payline_core::leave::{LeaveStatus as CoreLeaveStatus, LeaveType as CoreLeaveType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
pub enum UserRole {
    #[sea_orm(string_value = "employee")]
    Employee,
    #[sea_orm(string_value = "hr")]
    Hr,
    #[sea_orm(string_value = "payroll")]
    Payroll,
    #[sea_orm(string_value = "admin")]
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "leave_type")]
pub enum LeaveType {
    #[sea_orm(string_value = "SICK")]
    Sick,
    #[sea_orm(string_value = "CASUAL")]
    Casual,
    #[sea_orm(string_value = "EARNED")]
    Earned,
    #[sea_orm(string_value = "UNPAID")]
    Unpaid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "leave_status")]
pub enum LeaveStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl From<UserRole> for Role {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Employee => Self::Employee,
            UserRole::Hr => Self::Hr,
            UserRole::Payroll => Self::Payroll,
            UserRole::Admin => Self::Admin,
        }
    }
}

impl From<Role> for UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Employee => Self::Employee,
            Role::Hr => Self::Hr,
            Role::Payroll => Self::Payroll,
            Role::Admin => Self::Admin,
        }
    }
}

impl From<LeaveType> for CoreLeaveType {
    fn from(value: LeaveType) -> Self {
        match value {
            LeaveType::Sick => Self::Sick,
            LeaveType::Casual => Self::Casual,
            LeaveType::Earned => Self::Earned,
            LeaveType::Unpaid => Self::Unpaid,
        }
    }
}

impl From<CoreLeaveType> for LeaveType {
    fn from(value: CoreLeaveType) -> Self {
        match value {
            CoreLeaveType::Sick => Self::Sick,
            CoreLeaveType::Casual => Self::Casual,
            CoreLeaveType::Earned => Self::Earned,
            CoreLeaveType::Unpaid => Self::Unpaid,
        }
    }
}

impl From<LeaveStatus> for CoreLeaveStatus {
    fn from(value: LeaveStatus) -> Self {
        match value {
            LeaveStatus::Pending => Self::Pending,
            LeaveStatus::Approved => Self::Approved,
            LeaveStatus::Rejected => Self::Rejected,
            LeaveStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<CoreLeaveStatus> for LeaveStatus {
    fn from(value: CoreLeaveStatus) -> Self {
        match value {
            CoreLeaveStatus::Pending => Self::Pending,
            CoreLeaveStatus::Approved => Self::Approved,
            CoreLeaveStatus::Rejected => Self::Rejected,
            CoreLeaveStatus::Cancelled => Self::Cancelled,
        }
    }
}
