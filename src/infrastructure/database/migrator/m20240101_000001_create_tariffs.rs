//! Create tariffs table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tariffs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tariffs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tariffs::CountryCode).string_len(2).not_null())
                    .col(ColumnDef::new(Tariffs::PartyId).string_len(3).not_null())
                    .col(ColumnDef::new(Tariffs::TariffId).string_len(36).not_null())
                    .col(ColumnDef::new(Tariffs::Currency).string_len(3).not_null())
                    .col(ColumnDef::new(Tariffs::Document).text().not_null())
                    .col(
                        ColumnDef::new(Tariffs::LastUpdated)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tariffs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tariffs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Upserts conflict on this index
        manager
            .create_index(
                Index::create()
                    .name("idx_tariffs_key")
                    .table(Tariffs::Table)
                    .col(Tariffs::CountryCode)
                    .col(Tariffs::PartyId)
                    .col(Tariffs::TariffId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tariffs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Tariffs {
    Table,
    Id,
    CountryCode,
    PartyId,
    TariffId,
    Currency,
    Document,
    LastUpdated,
    CreatedAt,
    UpdatedAt,
}
