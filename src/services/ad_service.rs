use chrono::{ DateTime, Utc };
use sea_orm::{ prelude::Decimal, DatabaseConnection, TransactionTrait };

use crate::db::{ RewardConfigRepository, RewardSettings, UserRepository };
use crate::error::{ AppError, Result };

use super::ledger_service::{ load_profile, require_user_id, UserProfile };
use super::rate_limiter::{ AdCounts, AdRateLimiter };
use super::UserLocks;

#[derive(Debug, Clone)]
pub struct AdReward {
    pub reward: Decimal,
    pub user: UserProfile,
}

/// Rewarded ad watches, capped per rolling hour and day.
pub struct AdService {
    db: DatabaseConnection,
    locks: UserLocks,
}

impl AdService {
    pub fn new(db: DatabaseConnection, locks: UserLocks) -> Self {
        Self { db, locks }
    }

    pub async fn counts(&self, user_id: &str) -> Result<AdCounts> {
        self.counts_at(user_id, Utc::now()).await
    }

    pub async fn counts_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<AdCounts> {
        require_user_id(user_id)?;
        AdRateLimiter::new(&self.db).counts(user_id, now).await
    }

    pub async fn complete(&self, user_id: &str) -> Result<AdReward> {
        self.complete_at(user_id, Utc::now()).await
    }

    /// Check the limits, record the watch and credit the ad reward as one unit.
    pub async fn complete_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<AdReward> {
        require_user_id(user_id)?;
        let _guard = self.locks.acquire(user_id).await;

        let txn = self.db.begin().await?;
        let users = UserRepository::new(&txn);
        users.get(user_id).await?;

        let limiter = AdRateLimiter::new(&txn);
        let counts = limiter.counts(user_id, now).await?;
        if counts.is_exhausted() {
            tracing::debug!("Ad limit reached for {}: {:?}", user_id, counts);
            return Err(AppError::LimitReached);
        }

        let settings = RewardConfigRepository::new(&txn)
            .find().await?
            .unwrap_or_else(RewardSettings::defaults);
        let reward = settings.ad_reward;

        limiter.record_watch(user_id, now).await?;
        users.credit(user_id, reward).await?;

        let user = load_profile(&txn, user_id).await?;
        txn.commit().await?;

        tracing::info!("Ad reward {} credited to {}", reward, user_id);
        Ok(AdReward { reward, user })
    }
}
