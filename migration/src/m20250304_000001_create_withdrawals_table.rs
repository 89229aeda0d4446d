use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Withdrawals::Table)
                .if_not_exists()
                .col(ColumnDef::new(Withdrawals::ReqId).string().not_null().primary_key())
                .col(ColumnDef::new(Withdrawals::UserId).string().not_null())
                .col(ColumnDef::new(Withdrawals::Amount).decimal_len(16, 8).not_null())
                .col(ColumnDef::new(Withdrawals::Wallet).string().not_null())
                .col(ColumnDef::new(Withdrawals::Status).string_len(20).not_null())
                .col(
                    ColumnDef::new(Withdrawals::RequestedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                )
                .col(ColumnDef::new(Withdrawals::ProcessedAt).timestamp_with_time_zone().null())
                .col(ColumnDef::new(Withdrawals::ProcessedBy).string().null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_withdrawals_user")
                        .from(Withdrawals::Table, Withdrawals::UserId)
                        .to(Users::Table, Users::UserId)
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_withdrawals_user_requested")
                .table(Withdrawals::Table)
                .col(Withdrawals::UserId)
                .col(Withdrawals::RequestedAt)
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_withdrawals_status")
                .table(Withdrawals::Table)
                .col(Withdrawals::Status)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Withdrawals::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Withdrawals {
    Table,
    ReqId,
    UserId,
    Amount,
    Wallet,
    Status,
    RequestedAt,
    ProcessedAt,
    ProcessedBy,
}
