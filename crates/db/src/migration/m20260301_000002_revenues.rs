//! Revenue tables.
//!
//! `general_revenues` stores standalone revenues and project tickets side by
//! side, discriminated by `revenue_type`. Deleting a user removes everything
//! they own; deleting a project removes its initial revenue and tickets.

use sea_orm_migration::prelude::*;

use super::m20260301_000001_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProjectRevenues::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProjectRevenues::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProjectRevenues::OwnerId).uuid().not_null())
                    .col(
                        ColumnDef::new(ProjectRevenues::Title)
                            .string_len(30)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProjectRevenues::RevenueDate)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_revenues_owner")
                            .from(ProjectRevenues::Table, ProjectRevenues::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InitialRevenues::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InitialRevenues::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InitialRevenues::OwnerId).uuid().not_null())
                    .col(
                        ColumnDef::new(InitialRevenues::ProjectId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(InitialRevenues::ValueCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InitialRevenues::RevenueDate)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_initial_revenues_owner")
                            .from(InitialRevenues::Table, InitialRevenues::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_initial_revenues_project")
                            .from(InitialRevenues::Table, InitialRevenues::ProjectId)
                            .to(ProjectRevenues::Table, ProjectRevenues::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GeneralRevenues::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GeneralRevenues::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GeneralRevenues::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(GeneralRevenues::ProjectId).uuid().null())
                    .col(
                        ColumnDef::new(GeneralRevenues::RevenueType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GeneralRevenues::Title)
                            .string_len(30)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GeneralRevenues::ValueCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GeneralRevenues::RevenueDate)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GeneralRevenues::Description)
                            .string_len(250)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GeneralRevenues::ClosingDate)
                            .big_integer()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_general_revenues_owner")
                            .from(GeneralRevenues::Table, GeneralRevenues::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_general_revenues_project")
                            .from(GeneralRevenues::Table, GeneralRevenues::ProjectId)
                            .to(ProjectRevenues::Table, ProjectRevenues::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing and period filters
        manager
            .create_index(
                Index::create()
                    .name("idx_general_revenues_owner_date")
                    .table(GeneralRevenues::Table)
                    .col(GeneralRevenues::OwnerId)
                    .col(GeneralRevenues::RevenueType)
                    .col(GeneralRevenues::RevenueDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_general_revenues_project")
                    .table(GeneralRevenues::Table)
                    .col(GeneralRevenues::ProjectId)
                    .to_owned(),
            )
            .await?;

        // Project titles are unique per owner
        manager
            .create_index(
                Index::create()
                    .name("idx_project_revenues_owner_title")
                    .table(ProjectRevenues::Table)
                    .col(ProjectRevenues::OwnerId)
                    .col(ProjectRevenues::Title)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(GeneralRevenues::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(InitialRevenues::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(ProjectRevenues::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
pub(super) enum ProjectRevenues {
    Table,
    Id,
    OwnerId,
    Title,
    RevenueDate,
}

#[derive(DeriveIden)]
enum InitialRevenues {
    Table,
    Id,
    OwnerId,
    ProjectId,
    ValueCents,
    RevenueDate,
}

#[derive(DeriveIden)]
pub(super) enum GeneralRevenues {
    Table,
    Id,
    OwnerId,
    ProjectId,
    RevenueType,
    Title,
    ValueCents,
    RevenueDate,
    Description,
    ClosingDate,
}
