//! Create request table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Request::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Request::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Request::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Request::CategoryId).integer().not_null())
                    .col(ColumnDef::new(Request::Description).text().not_null())
                    .col(ColumnDef::new(Request::Address).string_len(255))
                    .col(ColumnDef::new(Request::NeighborhoodId).integer())
                    .col(ColumnDef::new(Request::PostalCode).string_len(20))
                    .col(ColumnDef::new(Request::Latitude).double())
                    .col(ColumnDef::new(Request::Longitude).double())
                    .col(ColumnDef::new(Request::Photos).text())
                    .col(
                        ColumnDef::new(Request::Status)
                            .string_len(16)
                            .not_null()
                            .default("open"),
                    )
                    .col(
                        ColumnDef::new(Request::Anonymous)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Request::UserId).integer().not_null())
                    .col(ColumnDef::new(Request::OfficialId).integer())
                    .col(
                        ColumnDef::new(Request::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Request::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Request::ResolutionTimeDays).integer())
                    .to_owned(),
            )
            .await?;

        // Index: created_at (every listing sorts by it)
        manager
            .create_index(
                Index::create()
                    .name("idx_request_created_at")
                    .table(Request::Table)
                    .col(Request::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: official_id + status (statistics and official listings)
        manager
            .create_index(
                Index::create()
                    .name("idx_request_official_id_status")
                    .table(Request::Table)
                    .col(Request::OfficialId)
                    .col(Request::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_request_category_id")
                    .table(Request::Table)
                    .col(Request::CategoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_request_neighborhood_id")
                    .table(Request::Table)
                    .col(Request::NeighborhoodId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_request_user_id")
                    .from(Request::Table, Request::UserId)
                    .to(User::Table, User::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_request_category_id")
                    .from(Request::Table, Request::CategoryId)
                    .to(Category::Table, Category::Id)
                    .on_delete(ForeignKeyAction::Restrict)
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_request_neighborhood_id")
                    .from(Request::Table, Request::NeighborhoodId)
                    .to(Neighborhood::Table, Neighborhood::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_request_official_id")
                    .from(Request::Table, Request::OfficialId)
                    .to(Official::Table, Official::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Request::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Request {
    Table,
    Id,
    Title,
    CategoryId,
    Description,
    Address,
    NeighborhoodId,
    PostalCode,
    Latitude,
    Longitude,
    Photos,
    Status,
    Anonymous,
    UserId,
    OfficialId,
    CreatedAt,
    UpdatedAt,
    ResolutionTimeDays,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Category {
    Table,
    Id,
}

#[derive(Iden)]
enum Neighborhood {
    Table,
    Id,
}

#[derive(Iden)]
enum Official {
    Table,
    Id,
}
