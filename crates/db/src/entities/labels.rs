//! `SeaORM` Entity for labels table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "labels")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub text: String,
    pub color: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::revenue_labels::Entity")]
    RevenueLabels,
}

impl Related<super::revenue_labels::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RevenueLabels.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
