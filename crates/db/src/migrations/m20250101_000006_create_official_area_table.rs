//! Create official area table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OfficialArea::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OfficialArea::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OfficialArea::OfficialId).integer().not_null())
                    .col(ColumnDef::new(OfficialArea::CategoryId).integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_official_area_official_category")
                    .table(OfficialArea::Table)
                    .col(OfficialArea::OfficialId)
                    .col(OfficialArea::CategoryId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_official_area_official_id")
                    .from(OfficialArea::Table, OfficialArea::OfficialId)
                    .to(Official::Table, Official::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        manager
            .create_foreign_key(
                ForeignKey::create()
                    .name("fk_official_area_category_id")
                    .from(OfficialArea::Table, OfficialArea::CategoryId)
                    .to(Category::Table, Category::Id)
                    .on_delete(ForeignKeyAction::Cascade)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OfficialArea::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum OfficialArea {
    Table,
    Id,
    OfficialId,
    CategoryId,
}

#[derive(Iden)]
enum Official {
    Table,
    Id,
}

#[derive(Iden)]
enum Category {
    Table,
    Id,
}
