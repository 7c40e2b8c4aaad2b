//! Leave balance ledger rules.
//!
//! This module implements the leave request state machine and the
//! balance/overlap invariants. Persistence lives in the database crate,
//! which calls into these rules before every mutation.
//!
//! # Modules
//!
//! - `types` - Leave domain types (LeaveType, LeaveStatus, DateRange, LeaveRequest)
//! - `error` - Leave-specific error types
//! - `balance` - Per-type balances and default allowances
//! - `service` - Apply/approve/reject/cancel validation and transitions

pub mod balance;
pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use balance::{Allowance, LeaveBalances};
pub use error::LeaveError;
pub use service::{LeaveAction, LeaveService};
pub use types::{DateRange, LeaveRequest, LeaveStatus, LeaveType};
