//! Actor identity and role-based permissions.
//!
//! The identity itself comes from an external auth layer; this module only
//! decides what a given `(id, role)` pair may do.

use serde::{Deserialize, Serialize};
use std::fmt;
use payline_shared::types::UserId;

/// Role of the calling user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular staff member.
    Employee,
    /// Human resources.
    Hr,
    /// Payroll operator.
    Payroll,
    /// Administrator.
    Admin,
}

impl Role {
    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "employee" => Some(Self::Employee),
            "hr" => Some(Self::Hr),
            "payroll" => Some(Self::Payroll),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Hr => "hr",
            Self::Payroll => "payroll",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    /// Caller's user id.
    pub id: UserId,
    /// Caller's role.
    pub role: Role,
}

impl ActorContext {
    /// Creates a new actor context.
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Roles allowed to approve, reject and list everyone's leave requests.
    #[must_use]
    pub fn is_leave_approver(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Hr | Role::Payroll)
    }

    /// Roles allowed to run payroll and inspect payruns.
    #[must_use]
    pub fn is_payroll_operator(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Payroll)
    }

    /// Payslips are visible to their owner and to payroll operators.
    #[must_use]
    pub fn can_view_payslips_of(&self, user_id: UserId) -> bool {
        self.id == user_id || self.is_payroll_operator()
    }

    /// Leave data is visible to its owner and to leave approvers.
    #[must_use]
    pub fn can_view_leaves_of(&self, user_id: UserId) -> bool {
        self.id == user_id || self.is_leave_approver()
    }
}
