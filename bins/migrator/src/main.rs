//! Database migration runner for Payline.
//!
//! Usage:
//!   migrator up      - Run all pending migrations
//!   migrator down    - Rollback last migration
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop everything and re-run migrations
//!
//! The target database comes from `DATABASE_URL`.

use payline_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // run_cli installs its own tracing subscriber
    cli::run_cli(Migrator).await;
}
