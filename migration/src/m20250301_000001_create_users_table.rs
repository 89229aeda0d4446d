use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Users::Table)
                .if_not_exists()
                .col(ColumnDef::new(Users::UserId).string().not_null().primary_key())
                .col(ColumnDef::new(Users::FirstName).string().not_null().default(""))
                .col(ColumnDef::new(Users::Username).string().not_null().default(""))
                .col(ColumnDef::new(Users::Balance).decimal_len(16, 8).not_null())
                .col(ColumnDef::new(Users::TotalEarned).decimal_len(16, 8).not_null())
                .col(ColumnDef::new(Users::Streak).integer().not_null().default(0))
                .col(ColumnDef::new(Users::LastLogin).timestamp_with_time_zone().null())
                .col(ColumnDef::new(Users::Referrals).integer().not_null().default(0))
                .col(ColumnDef::new(Users::ReferrerId).string().null())
                .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                .check(Expr::col(Users::Balance).gte(0))
                .to_owned()
        ).await?;

        // Referral listing looks users up by referrer
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_users_referrer_id")
                .table(Users::Table)
                .col(Users::ReferrerId)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub enum Users {
    Table,
    UserId,
    FirstName,
    Username,
    Balance,
    TotalEarned,
    Streak,
    LastLogin,
    Referrals,
    ReferrerId,
    CreatedAt,
}
