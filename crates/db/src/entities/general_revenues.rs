//! `SeaORM` Entity for general_revenues table.
//!
//! Holds both standalone revenues and project tickets, told apart by
//! `revenue_type`. Only tickets have a `project_id`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::RevenueType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "general_revenues")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub project_id: Option<Uuid>,
    pub revenue_type: RevenueType,
    pub title: String,
    pub value_cents: i64,
    pub revenue_date: i64,
    pub description: Option<String>,
    pub closing_date: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::project_revenues::Entity",
        from = "Column::ProjectId",
        to = "super::project_revenues::Column::Id",
        on_delete = "Cascade"
    )]
    ProjectRevenues,
    #[sea_orm(has_many = "super::revenue_labels::Entity")]
    RevenueLabels,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::project_revenues::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectRevenues.def()
    }
}

impl Related<super::revenue_labels::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RevenueLabels.def()
    }
}

impl Related<super::labels::Entity> for Entity {
    fn to() -> RelationDef {
        super::revenue_labels::Relation::Labels.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::revenue_labels::Relation::GeneralRevenues.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
