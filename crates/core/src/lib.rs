//! Core business logic for Payline.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `access` - Actor identity and role checks
//! - `leave` - Leave request state machine and balance rules
//! - `payroll` - Salary calculator, pay periods and payrun planning
//! - `audit` - Audit events and the fire-and-forget sink interface
//! - `cache` - Injectable TTL key/value store

pub mod access;
pub mod audit;
pub mod cache;
pub mod leave;
pub mod payroll;

pub use access::{ActorContext, Role};
