use chrono::{ DateTime, Utc };
use sea_orm::{ ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set };
use uuid::Uuid;

use crate::db::entity::{ ad_watch, AdWatch };
use crate::error::Result;

/// Append-only log of ad watches, read only for window counts.
pub struct AdWatchRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> AdWatchRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Watches strictly after `since`.
    pub async fn count_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<u64> {
        let count = AdWatch::find()
            .filter(ad_watch::Column::UserId.eq(user_id))
            .filter(ad_watch::Column::Timestamp.gt(since))
            .count(self.conn).await?;

        Ok(count)
    }

    pub async fn record(&self, user_id: &str, at: DateTime<Utc>) -> Result<()> {
        let watch = ad_watch::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id.to_string()),
            timestamp: Set(at),
        };

        AdWatch::insert(watch).exec_without_returning(self.conn).await?;
        Ok(())
    }
}
