//! Create neighborhood table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Neighborhood::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Neighborhood::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Neighborhood::Name).string_len(100).not_null())
                    .to_owned(),
            )
            .await?;

        // Unique index: name. Get-or-create relies on it (ON CONFLICT target).
        manager
            .create_index(
                Index::create()
                    .name("idx_neighborhood_name")
                    .table(Neighborhood::Table)
                    .col(Neighborhood::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Neighborhood::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Neighborhood {
    Table,
    Id,
    Name,
}
