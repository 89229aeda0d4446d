pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users_table;
mod m20250301_000002_create_reward_config_table;
mod m20250302_000001_create_tasks_table;
mod m20250303_000001_create_ad_watches_table;
mod m20250304_000001_create_withdrawals_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users_table::Migration),
            Box::new(m20250301_000002_create_reward_config_table::Migration),
            Box::new(m20250302_000001_create_tasks_table::Migration),
            Box::new(m20250303_000001_create_ad_watches_table::Migration),
            Box::new(m20250304_000001_create_withdrawals_table::Migration)
        ]
    }
}
