//! `SeaORM` Entity for users table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::UserRole;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::employee_profiles::Entity")]
    EmployeeProfiles,
    #[sea_orm(has_many = "super::leave_requests::Entity")]
    LeaveRequests,
    #[sea_orm(has_many = "super::payslips::Entity")]
    Payslips,
}

impl Related<super::employee_profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeProfiles.def()
    }
}

impl Related<super::leave_requests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeaveRequests.def()
    }
}

impl Related<super::payslips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payslips.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
