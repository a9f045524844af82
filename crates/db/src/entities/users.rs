//! `SeaORM` Entity for users table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub surname: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub token: String,
    pub currency: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::general_revenues::Entity")]
    GeneralRevenues,
    #[sea_orm(has_many = "super::project_revenues::Entity")]
    ProjectRevenues,
}

impl Related<super::general_revenues::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GeneralRevenues.def()
    }
}

impl Related<super::project_revenues::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectRevenues.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
