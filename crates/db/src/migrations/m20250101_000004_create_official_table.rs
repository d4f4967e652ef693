//! Create official table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Official::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Official::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Official::UserId).integer())
                    .col(ColumnDef::new(Official::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Official::Party).string_len(20).not_null())
                    .col(ColumnDef::new(Official::PhotoUrl).string_len(255))
                    .col(
                        ColumnDef::new(Official::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: user_id (one profile per account)
        manager
            .create_index(
                Index::create()
                    .name("idx_official_user_id")
                    .table(Official::Table)
                    .col(Official::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_official_user_id")
                    .from(Official::Table, Official::UserId)
                    .to(User::Table, User::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Official::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Official {
    Table,
    Id,
    UserId,
    Name,
    Party,
    PhotoUrl,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
