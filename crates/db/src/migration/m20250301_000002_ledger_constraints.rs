//! Exclusion constraint for approved leave.
//!
//! No two APPROVED requests of the same user may share a day. The check is
//! enforced by PostgreSQL so racing approvals cannot both commit.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(NO_OVERLAP_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "ALTER TABLE leave_requests DROP CONSTRAINT IF EXISTS excl_leave_requests_approved_overlap;",
        )
        .await?;
        Ok(())
    }
}

const NO_OVERLAP_SQL: &str = r"
-- btree_gist lets the uuid equality share a GiST index with the range
CREATE EXTENSION IF NOT EXISTS btree_gist;

ALTER TABLE leave_requests
    ADD CONSTRAINT excl_leave_requests_approved_overlap
    EXCLUDE USING gist (
        user_id WITH =,
        daterange(start_date, end_date, '[]') WITH &&
    ) WHERE (status = 'APPROVED');
";
