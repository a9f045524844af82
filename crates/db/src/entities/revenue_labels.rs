//! `SeaORM` Entity for revenue_labels association table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "revenue_labels")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub revenue_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub label_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::general_revenues::Entity",
        from = "Column::RevenueId",
        to = "super::general_revenues::Column::Id",
        on_delete = "Cascade"
    )]
    GeneralRevenues,
    #[sea_orm(
        belongs_to = "super::labels::Entity",
        from = "Column::LabelId",
        to = "super::labels::Column::Id",
        on_delete = "Restrict"
    )]
    Labels,
}

impl Related<super::general_revenues::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GeneralRevenues.def()
    }
}

impl Related<super::labels::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Labels.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
