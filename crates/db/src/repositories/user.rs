//! Accounts. Identity lives elsewhere; this table only carries what payroll
//! needs to know: role and whether the person is still on the books.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

use payline_core::Role;
use payline_shared::types::UserId;

use crate::entities::{sea_orm_active_enums::UserRole, users};

/// Reads and writes `users`.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a repository on `db`.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Looks an account up by email.
    ///
    /// # Errors
    ///
    /// Fails only on database errors; an unknown email is `Ok(None)`.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    /// Inserts an active account with a fresh id.
    ///
    /// # Errors
    ///
    /// Fails if the email is already taken or the insert fails.
    pub async fn create(&self, email: &str, full_name: &str, role: Role) -> Result<users::Model, DbErr> {
        let now = chrono::Utc::now().into();
        users::ActiveModel {
            id: Set(UserId::new().into_inner()),
            email: Set(email.to_owned()),
            full_name: Set(full_name.to_owned()),
            role: Set(role.into()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
    }

    /// Marks an account as joined or left. Inactive employees are skipped by
    /// payroll runs.
    ///
    /// # Errors
    ///
    /// `DbErr::RecordNotFound` for an unknown id, otherwise database errors.
    pub async fn set_active(&self, id: UserId, is_active: bool) -> Result<users::Model, DbErr> {
        let Some(user) = users::Entity::find_by_id(id.into_inner()).one(&self.db).await? else {
            return Err(DbErr::RecordNotFound(format!("user {id}")));
        };

        let mut user: users::ActiveModel = user.into();
        user.is_active = Set(is_active);
        user.updated_at = Set(chrono::Utc::now().into());
        user.update(&self.db).await
    }

    /// Active accounts with the `employee` role, in id order. Generic over the
    /// connection so a payroll run can read the roster inside its transaction.
    ///
    /// # Errors
    ///
    /// Database errors only.
    pub async fn list_active_employees<C>(conn: &C) -> Result<Vec<users::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        users::Entity::find()
            .filter(users::Column::Role.eq(UserRole::Employee))
            .filter(users::Column::IsActive.eq(true))
            .order_by_asc(users::Column::Id)
            .all(conn)
            .await
    }
}
