//! `SeaORM` Entity for initial_revenues table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "initial_revenues")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    #[sea_orm(unique)]
    pub project_id: Uuid,
    pub value_cents: i64,
    pub revenue_date: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project_revenues::Entity",
        from = "Column::ProjectId",
        to = "super::project_revenues::Column::Id",
        on_delete = "Cascade"
    )]
    ProjectRevenues,
}

impl Related<super::project_revenues::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectRevenues.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
