use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Singleton row, always id = 1
        manager.create_table(
            Table::create()
                .table(RewardConfig::Table)
                .if_not_exists()
                .col(ColumnDef::new(RewardConfig::Id).integer().not_null().primary_key())
                .col(ColumnDef::new(RewardConfig::AdReward).decimal_len(16, 8).not_null())
                .col(ColumnDef::new(RewardConfig::DailyLoginReward).decimal_len(16, 8).not_null())
                .col(ColumnDef::new(RewardConfig::ReferralBonus).decimal_len(16, 8).not_null())
                .col(ColumnDef::new(RewardConfig::NewUserBonus).decimal_len(16, 8).not_null())
                .col(ColumnDef::new(RewardConfig::MinWithdraw).decimal_len(16, 8).not_null())
                .col(ColumnDef::new(RewardConfig::UpdatedAt).timestamp_with_time_zone().not_null())
                .to_owned()
        ).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(RewardConfig::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum RewardConfig {
    Table,
    Id,
    AdReward,
    DailyLoginReward,
    ReferralBonus,
    NewUserBonus,
    MinWithdraw,
    UpdatedAt,
}
