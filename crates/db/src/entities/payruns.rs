//! `SeaORM` Entity for payruns table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payruns")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub year: i32,
    pub month: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: Json,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payslips::Entity")]
    Payslips,
}

impl Related<super::payslips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payslips.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
