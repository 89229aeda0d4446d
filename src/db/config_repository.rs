use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ prelude::Decimal, ConnectionTrait, EntityTrait, Set };
use serde::{ Deserialize, Serialize };

use crate::db::entity::{ reward_config, RewardConfig };
use crate::error::Result;

/// Tunable reward amounts, stored as the singleton `reward_config` row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardSettings {
    #[serde(with = "rust_decimal::serde::float")]
    pub ad_reward: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub daily_login_reward: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub referral_bonus: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub new_user_bonus: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub min_withdraw: Decimal,
}

impl RewardSettings {
    /// Values served when no row exists, also used to seed it.
    pub fn defaults() -> Self {
        Self {
            ad_reward: Decimal::new(10, 2),
            daily_login_reward: Decimal::new(50, 2),
            referral_bonus: Decimal::new(100, 2),
            new_user_bonus: Decimal::new(50, 2),
            min_withdraw: Decimal::new(500, 2),
        }
    }

    /// Bonuses paid at account creation. Nothing is paid out without a
    /// configured row.
    pub fn onboarding_bonuses(row: Option<&Self>) -> (Decimal, Decimal) {
        row.map(|s| (s.new_user_bonus, s.referral_bonus)).unwrap_or((Decimal::ZERO, Decimal::ZERO))
    }
}

pub struct RewardConfigRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> RewardConfigRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn find(&self) -> Result<Option<RewardSettings>> {
        let row = RewardConfig::find_by_id(reward_config::SINGLETON_ID).one(self.conn).await?;
        Ok(row.map(RewardSettings::from))
    }

    fn active_model(settings: RewardSettings) -> reward_config::ActiveModel {
        reward_config::ActiveModel {
            id: Set(reward_config::SINGLETON_ID),
            ad_reward: Set(settings.ad_reward),
            daily_login_reward: Set(settings.daily_login_reward),
            referral_bonus: Set(settings.referral_bonus),
            new_user_bonus: Set(settings.new_user_bonus),
            min_withdraw: Set(settings.min_withdraw),
            updated_at: Set(Utc::now()),
        }
    }

    /// Seed the row if it is missing. Existing values are left alone.
    pub async fn insert_if_absent(&self, settings: RewardSettings) -> Result<bool> {
        let inserted = RewardConfig::insert(Self::active_model(settings))
            .on_conflict(OnConflict::column(reward_config::Column::Id).do_nothing().to_owned())
            .exec_without_returning(self.conn).await?;

        Ok(inserted > 0)
    }

    /// Replace every value, creating the row if needed.
    pub async fn upsert(&self, settings: RewardSettings) -> Result<()> {
        RewardConfig::insert(Self::active_model(settings))
            .on_conflict(
                OnConflict::column(reward_config::Column::Id)
                    .update_columns([
                        reward_config::Column::AdReward,
                        reward_config::Column::DailyLoginReward,
                        reward_config::Column::ReferralBonus,
                        reward_config::Column::NewUserBonus,
                        reward_config::Column::MinWithdraw,
                        reward_config::Column::UpdatedAt,
                    ])
                    .to_owned()
            )
            .exec_without_returning(self.conn).await?;

        Ok(())
    }
}

impl From<reward_config::Model> for RewardSettings {
    fn from(row: reward_config::Model) -> Self {
        Self {
            ad_reward: row.ad_reward,
            daily_login_reward: row.daily_login_reward,
            referral_bonus: row.referral_bonus,
            new_user_bonus: row.new_user_bonus,
            min_withdraw: row.min_withdraw,
        }
    }
}
