use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(AdWatches::Table)
                .if_not_exists()
                .col(ColumnDef::new(AdWatches::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(AdWatches::UserId).string().not_null())
                .col(ColumnDef::new(AdWatches::Timestamp).timestamp_with_time_zone().not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_ad_watches_user")
                        .from(AdWatches::Table, AdWatches::UserId)
                        .to(Users::Table, Users::UserId)
                )
                .to_owned()
        ).await?;

        // Window counts filter on (user_id, timestamp)
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_ad_watches_user_timestamp")
                .table(AdWatches::Table)
                .col(AdWatches::UserId)
                .col(AdWatches::Timestamp)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AdWatches::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum AdWatches {
    Table,
    Id,
    UserId,
    Timestamp,
}
