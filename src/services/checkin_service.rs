use chrono::{ DateTime, FixedOffset, NaiveDate, Utc };
use sea_orm::{ prelude::Decimal, DatabaseConnection, TransactionTrait };

use crate::db::{ RewardConfigRepository, RewardSettings, UserRepository };
use crate::error::{ AppError, Result };

use super::ledger_service::{ load_profile, require_user_id, UserProfile };
use super::UserLocks;

#[derive(Debug, Clone)]
pub struct CheckinReward {
    pub reward: Decimal,
    pub streak: i32,
    pub user: UserProfile,
}

fn calendar_day(at: DateTime<Utc>, offset: &FixedOffset) -> NaiveDate {
    at.with_timezone(offset).date_naive()
}

/// Streak after a check-in at `now`, or `None` when the user already checked
/// in on the same calendar day.
pub fn next_streak(
    last_login: Option<DateTime<Utc>>,
    streak: i32,
    now: DateTime<Utc>,
    offset: &FixedOffset
) -> Option<i32> {
    let today = calendar_day(now, offset);

    let Some(last_login) = last_login else {
        return Some(1);
    };
    let last_day = calendar_day(last_login, offset);

    if last_day == today {
        return None;
    }

    if today.pred_opt() == Some(last_day) { Some(streak.saturating_add(1)) } else { Some(1) }
}

/// Daily login reward with consecutive-day streaks.
pub struct CheckinService {
    db: DatabaseConnection,
    locks: UserLocks,
    day_offset: FixedOffset,
}

impl CheckinService {
    pub fn new(db: DatabaseConnection, locks: UserLocks, day_offset: FixedOffset) -> Self {
        Self { db, locks, day_offset }
    }

    pub async fn checkin(&self, user_id: &str) -> Result<CheckinReward> {
        self.checkin_at(user_id, Utc::now()).await
    }

    pub async fn checkin_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<CheckinReward> {
        require_user_id(user_id)?;
        let _guard = self.locks.acquire(user_id).await;

        let txn = self.db.begin().await?;
        let users = UserRepository::new(&txn);
        let user = users.get(user_id).await?;

        let Some(streak) = next_streak(user.last_login, user.streak, now, &self.day_offset) else {
            return Err(AppError::AlreadyClaimed("Already claimed today".to_string()));
        };

        let reward = RewardConfigRepository::new(&txn)
            .find().await?
            .unwrap_or_else(RewardSettings::defaults).daily_login_reward;

        users.credit(user_id, reward).await?;
        users.record_checkin(user_id, streak, now).await?;

        let user = load_profile(&txn, user_id).await?;
        txn.commit().await?;

        tracing::info!("Daily reward {} credited to {} (streak {})", reward, user_id, streak);
        Ok(CheckinReward { reward, streak, user })
    }
}
