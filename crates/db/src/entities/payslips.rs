//! `SeaORM` Entity for payslips table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payslips")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub payrun_id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub gross: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub net: Decimal,
    #[sea_orm(column_type = "JsonBinary")]
    pub components: Json,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payruns::Entity",
        from = "Column::PayrunId",
        to = "super::payruns::Column::Id",
        on_delete = "Cascade"
    )]
    Payruns,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::payruns::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payruns.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
