//! Audit sinks.

use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

use payline_core::audit::{AuditEvent, AuditSink};

use crate::entities::audit_logs;

/// Writes audit events to the `audit_logs` table in the background.
///
/// The insert is spawned on the current tokio runtime; failures are logged
/// and never reach the caller.
#[derive(Debug, Clone)]
pub struct DbAuditSink {
    db: DatabaseConnection,
}

impl DbAuditSink {
    /// Creates a new database audit sink.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts one event, waiting for the write.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn write(db: &DatabaseConnection, event: AuditEvent) -> Result<(), sea_orm::DbErr> {
        audit_logs::ActiveModel {
            id: Set(event.id.into_inner()),
            actor_id: Set(event.actor_id.into_inner()),
            action: Set(event.action.as_str().to_string()),
            entity: Set(event.entity),
            entity_id: Set(event.entity_id),
            meta: Set(event.meta),
            created_at: Set(event.occurred_at.into()),
        }
        .insert(db)
        .await?;
        Ok(())
    }
}

impl AuditSink for DbAuditSink {
    fn record(&self, event: AuditEvent) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(action = event.action.as_str(), "No runtime for audit write, event dropped");
            return;
        };
        let db = self.db.clone();
        handle.spawn(async move {
            let action = event.action.as_str();
            let entity_id = event.entity_id;
            if let Err(e) = Self::write(&db, event).await {
                tracing::warn!(action, entity_id = %entity_id, error = %e, "Failed to write audit log");
            }
        });
    }
}

/// Emits audit events as structured log lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        tracing::info!(
            target: "payline::audit",
            actor_id = %event.actor_id,
            action = event.action.as_str(),
            entity = %event.entity,
            entity_id = %event.entity_id,
            meta = %event.meta,
            "Audit event"
        );
    }
}
