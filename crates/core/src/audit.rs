//! Audit events.
//!
//! Every leave transition and payroll run emits one [`AuditEvent`]. Sinks are
//! fire-and-forget: recording never blocks the caller and never fails the
//! operation that produced the event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use payline_shared::types::{AuditEventId, UserId};

/// Audited operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// A leave request was submitted.
    LeaveApply,
    /// A leave request was approved.
    LeaveApprove,
    /// A leave request was rejected.
    LeaveReject,
    /// A leave request was cancelled.
    LeaveCancel,
    /// A payrun was created.
    PayrollRun,
}

impl AuditAction {
    /// Stored action name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LeaveApply => "LEAVE_APPLY",
            Self::LeaveApprove => "LEAVE_APPROVE",
            Self::LeaveReject => "LEAVE_REJECT",
            Self::LeaveCancel => "LEAVE_CANCEL",
            Self::PayrollRun => "PAYROLL_RUN",
        }
    }

    /// Entity type the action applies to.
    #[must_use]
    pub const fn entity(self) -> &'static str {
        match self {
            Self::PayrollRun => "Payrun",
            _ => "LeaveRequest",
        }
    }
}

/// One audit log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    /// Event id.
    pub id: AuditEventId,
    /// Who performed the action.
    pub actor_id: UserId,
    /// What was done.
    pub action: AuditAction,
    /// Entity type.
    pub entity: String,
    /// Entity id.
    pub entity_id: Uuid,
    /// Free-form details.
    pub meta: Value,
    /// When it happened.
    pub occurred_at: DateTime<Utc>,
}

impl AuditEvent {
    /// Creates an event for `entity_id`.
    #[must_use]
    pub fn new(actor_id: UserId, action: AuditAction, entity_id: impl Into<Uuid>, meta: Value) -> Self {
        Self {
            id: AuditEventId::new(),
            actor_id,
            action,
            entity: action.entity().to_string(),
            entity_id: entity_id.into(),
            meta,
            occurred_at: Utc::now(),
        }
    }
}

/// Destination for audit events.
pub trait AuditSink: Send + Sync {
    /// Records an event without blocking.
    fn record(&self, event: AuditEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: AuditEvent) {}
}
