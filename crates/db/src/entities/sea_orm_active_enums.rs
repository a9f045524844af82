//! Database-backed enums.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Discriminant of a `general_revenues` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum RevenueType {
    /// Standalone revenue.
    #[sea_orm(string_value = "general")]
    General,
    /// Ticket of a project.
    #[sea_orm(string_value = "ticket")]
    Ticket,
}
