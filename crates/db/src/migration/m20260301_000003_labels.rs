//! Shared labels and their association with revenues.
//!
//! `(text, color)` is unique so concurrent inserts of the same label collapse
//! into one row.

use sea_orm_migration::prelude::*;

use super::m20260301_000002_revenues::GeneralRevenues;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Labels::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Labels::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Labels::Text).string_len(30).not_null())
                    .col(ColumnDef::new(Labels::Color).string_len(7).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_labels_text_color")
                    .table(Labels::Table)
                    .col(Labels::Text)
                    .col(Labels::Color)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RevenueLabels::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RevenueLabels::RevenueId).uuid().not_null())
                    .col(ColumnDef::new(RevenueLabels::LabelId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(RevenueLabels::RevenueId)
                            .col(RevenueLabels::LabelId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_revenue_labels_revenue")
                            .from(RevenueLabels::Table, RevenueLabels::RevenueId)
                            .to(GeneralRevenues::Table, GeneralRevenues::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_revenue_labels_label")
                            .from(RevenueLabels::Table, RevenueLabels::LabelId)
                            .to(Labels::Table, Labels::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Reference counting looks associations up by label
        manager
            .create_index(
                Index::create()
                    .name("idx_revenue_labels_label")
                    .table(RevenueLabels::Table)
                    .col(RevenueLabels::LabelId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(RevenueLabels::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Labels::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Labels {
    Table,
    Id,
    Text,
    Color,
}

#[derive(DeriveIden)]
enum RevenueLabels {
    Table,
    RevenueId,
    LabelId,
}
