use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Tasks::Table)
                .if_not_exists()
                .col(ColumnDef::new(Tasks::TaskId).string().not_null().primary_key())
                .col(ColumnDef::new(Tasks::Title).string().not_null())
                .col(ColumnDef::new(Tasks::Reward).decimal_len(16, 8).not_null())
                .col(ColumnDef::new(Tasks::Link).string().not_null().default(""))
                .col(ColumnDef::new(Tasks::TaskType).string_len(50).not_null().default(""))
                .col(ColumnDef::new(Tasks::CreatedAt).timestamp_with_time_zone().not_null())
                .to_owned()
        ).await?;

        // Completed task set per user; the composite key makes completion idempotent
        manager.create_table(
            Table::create()
                .table(CompletedTasks::Table)
                .if_not_exists()
                .col(ColumnDef::new(CompletedTasks::UserId).string().not_null())
                .col(ColumnDef::new(CompletedTasks::TaskId).string().not_null())
                .col(
                    ColumnDef::new(CompletedTasks::CompletedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                )
                .primary_key(
                    Index::create().col(CompletedTasks::UserId).col(CompletedTasks::TaskId)
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_completed_tasks_user")
                        .from(CompletedTasks::Table, CompletedTasks::UserId)
                        .to(Users::Table, Users::UserId)
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_completed_tasks_task")
                        .from(CompletedTasks::Table, CompletedTasks::TaskId)
                        .to(Tasks::Table, Tasks::TaskId)
                )
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(CompletedTasks::Table).to_owned()).await?;

        manager.drop_table(Table::drop().table(Tasks::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Tasks {
    Table,
    TaskId,
    Title,
    Reward,
    Link,
    TaskType,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CompletedTasks {
    Table,
    UserId,
    TaskId,
    CompletedAt,
}
