use std::sync::Arc;

use sea_orm::{ prelude::Decimal, DatabaseConnection };

use crate::auth::AdminIds;
use crate::db::{ RewardConfigRepository, RewardSettings };
use crate::error::{ AppError, Result };

/// Config Store: the singleton reward configuration.
pub struct ConfigService {
    db: DatabaseConnection,
    admins: Arc<AdminIds>,
}

impl ConfigService {
    pub fn new(db: DatabaseConnection, admins: Arc<AdminIds>) -> Self {
        Self { db, admins }
    }

    /// Stored settings, or the defaults when the row is absent.
    pub async fn get(&self) -> Result<RewardSettings> {
        let stored = RewardConfigRepository::new(&self.db).find().await?;
        Ok(stored.unwrap_or_else(RewardSettings::defaults))
    }

    /// Create the row with defaults if it does not exist yet.
    pub async fn seed_defaults(&self) -> Result<()> {
        if RewardConfigRepository::new(&self.db).insert_if_absent(RewardSettings::defaults()).await? {
            tracing::info!("Seeded reward config with defaults");
        }
        Ok(())
    }

    pub async fn update(&self, admin_id: &str, settings: RewardSettings) -> Result<()> {
        self.admins.ensure_admin(admin_id)?;
        validate(&settings)?;

        RewardConfigRepository::new(&self.db).upsert(settings).await?;

        tracing::info!("Reward config updated by {}: {:?}", admin_id, settings);
        Ok(())
    }
}

fn validate(settings: &RewardSettings) -> Result<()> {
    let fields = [
        ("adReward", settings.ad_reward),
        ("dailyLoginReward", settings.daily_login_reward),
        ("referralBonus", settings.referral_bonus),
        ("newUserBonus", settings.new_user_bonus),
        ("minWithdraw", settings.min_withdraw),
    ];

    for (name, value) in fields {
        if value < Decimal::ZERO {
            return Err(AppError::InvalidInput(format!("{} must not be negative", name)));
        }
    }

    Ok(())
}
