use sea_orm::{ ConnectOptions, Database, DatabaseConnection };
use sea_orm_migration::MigratorTrait;

use crate::error::Result;

pub mod entity;
pub use entity::*;

mod user_repository;
pub use user_repository::{ NewUser, TaskMark, UserRepository };

mod config_repository;
pub use config_repository::{ RewardConfigRepository, RewardSettings };

mod task_repository;
pub use task_repository::TaskRepository;

mod ad_watch_repository;
pub use ad_watch_repository::AdWatchRepository;

mod withdrawal_repository;
pub use withdrawal_repository::WithdrawalRepository;

/// Connect and bring the schema up to date.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_string());
    options.sqlx_logging(false);

    // SQLite allows a single writer
    if database_url.starts_with("sqlite:") {
        options.max_connections(1);
    }

    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;

    Ok(db)
}

#[cfg(test)]
pub(crate) async fn test_db() -> DatabaseConnection {
    connect("sqlite::memory:").await.expect("in-memory database")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_sqlite_schema_holds_money_columns() {
        let db = test_db().await;
        let users = UserRepository::new(&db);

        let created = users
            .insert_if_absent(
                NewUser {
                    user_id: "1".to_string(),
                    first_name: String::new(),
                    username: String::new(),
                    opening_balance: dec!(12345678.5),
                    referrer_id: None,
                },
                chrono::Utc::now()
            ).await
            .unwrap();

        assert!(created);
        assert_eq!(users.get("1").await.unwrap().balance.round_dp(6), dec!(12345678.5));
        assert_eq!(RewardConfigRepository::new(&db).find().await.unwrap(), None);
    }
}
