//! Shared helpers for database integration tests.
//!
//! Tests run against a live PostgreSQL named by `DATABASE_URL` or
//! `PAYLINE__DATABASE__URL` and return early when neither is set.

#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tokio::sync::OnceCell;
use uuid::Uuid;

use payline_core::audit::NoopAuditSink;
use payline_core::{ActorContext, Role};
use payline_db::migration::Migrator;
use payline_db::{LeaveRepository, PayrollRepository, UserRepository};
use payline_shared::types::UserId;

static MIGRATED: OnceCell<()> = OnceCell::const_new();

pub fn database_url() -> Option<String> {
    env::var("DATABASE_URL")
        .or_else(|_| env::var("PAYLINE__DATABASE__URL"))
        .ok()
}

/// Connects and migrates, or returns `None` when no database is configured.
pub async fn connect_or_skip() -> Option<DatabaseConnection> {
    let Some(url) = database_url() else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };
    let db = Database::connect(&url)
        .await
        .expect("Failed to connect to database");
    MIGRATED
        .get_or_init(|| async {
            Migrator::up(&db, None).await.expect("Failed to migrate");
        })
        .await;
    Some(db)
}

pub fn leave_repo(db: &DatabaseConnection) -> LeaveRepository {
    LeaveRepository::new(db.clone(), Arc::new(NoopAuditSink))
}

pub fn payroll_repo(db: &DatabaseConnection) -> PayrollRepository {
    PayrollRepository::new(db.clone(), Arc::new(NoopAuditSink))
}

/// Creates a user with a unique email and returns their actor context.
pub async fn create_actor(db: &DatabaseConnection, role: Role) -> ActorContext {
    let users = UserRepository::new(db.clone());
    let tag = Uuid::new_v4().simple().to_string();
    let user = users
        .create(&format!("{role}-{tag}@test.local"), &format!("Test {role}"), role)
        .await
        .expect("Failed to create user");
    ActorContext::new(UserId::from_uuid(user.id), role)
}

/// A year no other test run is likely to use, so payruns never collide.
pub fn unique_year() -> i32 {
    let bytes = Uuid::new_v4().into_bytes();
    3000 + i32::from(u16::from_le_bytes([bytes[0], bytes[1]]) % 5000)
}
