use chrono::{ DateTime, Utc };
use sea_orm::{ prelude::Decimal, ConnectionTrait, DatabaseConnection, TransactionTrait };
use serde::Serialize;

use crate::db::entity::user;
use crate::db::{ NewUser, RewardConfigRepository, RewardSettings, UserRepository };
use crate::error::{ AppError, Result };

use super::UserLocks;

/// Snapshot of a user's ledger, echoed back by every reward operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub first_name: String,
    pub username: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_earned: Decimal,
    pub streak: i32,
    pub last_login: Option<DateTime<Utc>>,
    pub referrals: i32,
    pub referrer_id: Option<String>,
    pub completed_tasks: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    fn from_parts(user: user::Model, completed_tasks: Vec<String>) -> Self {
        Self {
            user_id: user.user_id,
            first_name: user.first_name,
            username: user.username,
            balance: user.balance,
            total_earned: user.total_earned,
            streak: user.streak,
            last_login: user.last_login,
            referrals: user.referrals,
            referrer_id: user.referrer_id,
            completed_tasks,
            created_at: user.created_at,
        }
    }
}

/// Public view of a referred user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralSummary {
    pub first_name: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct GetOrCreateUser {
    pub user_id: String,
    pub first_name: Option<String>,
    pub username: Option<String>,
    pub referrer_id: Option<String>,
}

pub(crate) async fn load_profile<C: ConnectionTrait>(conn: &C, user_id: &str) -> Result<UserProfile> {
    let users = UserRepository::new(conn);
    let user = users.get(user_id).await?;
    let completed_tasks = users.completed_task_ids(user_id).await?;

    Ok(UserProfile::from_parts(user, completed_tasks))
}

pub(crate) fn require_user_id(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(AppError::InvalidInput("userId is required".to_string()));
    }
    Ok(())
}

/// User Ledger entry point: account creation and referral bookkeeping.
pub struct LedgerService {
    db: DatabaseConnection,
    locks: UserLocks,
}

impl LedgerService {
    pub fn new(db: DatabaseConnection, locks: UserLocks) -> Self {
        Self { db, locks }
    }

    pub async fn get_user(&self, user_id: &str) -> Result<UserProfile> {
        load_profile(&self.db, user_id).await
    }

    /// Return the user, creating it on first contact. Creation pays the
    /// new-user bonus and, for a valid existing referrer, the referral bonus.
    pub async fn get_or_create(&self, request: GetOrCreateUser) -> Result<UserProfile> {
        require_user_id(&request.user_id)?;
        let _guard = self.locks.acquire(&request.user_id).await;

        if UserRepository::new(&self.db).find(&request.user_id).await?.is_some() {
            return load_profile(&self.db, &request.user_id).await;
        }

        let txn = self.db.begin().await?;
        let users = UserRepository::new(&txn);

        let settings = RewardConfigRepository::new(&txn).find().await?;
        let (new_user_bonus, referral_bonus) = RewardSettings::onboarding_bonuses(settings.as_ref());

        let referrer_id = match
            request.referrer_id.filter(|r| !r.trim().is_empty() && *r != request.user_id)
        {
            Some(referrer_id) => {
                if users.credit_referrer(&referrer_id, referral_bonus).await? {
                    tracing::info!(
                        "Referral bonus {} credited to {} for {}",
                        referral_bonus,
                        referrer_id,
                        request.user_id
                    );
                    Some(referrer_id)
                } else {
                    tracing::debug!("Ignoring unknown referrer {}", referrer_id);
                    None
                }
            }
            None => None,
        };

        let created = users.insert_if_absent(
            NewUser {
                user_id: request.user_id.clone(),
                first_name: request.first_name.unwrap_or_default(),
                username: request.username.unwrap_or_default(),
                opening_balance: new_user_bonus,
                referrer_id,
            },
            Utc::now()
        ).await?;

        if !created {
            // Another writer created the user first; drop our referral credit
            txn.rollback().await?;
            return load_profile(&self.db, &request.user_id).await;
        }

        let profile = load_profile(&txn, &request.user_id).await?;
        txn.commit().await?;

        tracing::info!("Created user {} with balance {}", profile.user_id, profile.balance);
        Ok(profile)
    }

    pub async fn list_referrals(&self, user_id: &str) -> Result<Vec<ReferralSummary>> {
        require_user_id(user_id)?;

        let referred = UserRepository::new(&self.db).find_referred_by(user_id).await?;

        Ok(
            referred
                .into_iter()
                .map(|u| ReferralSummary {
                    first_name: u.first_name,
                    username: u.username,
                    created_at: u.created_at,
                })
                .collect()
        )
    }
}
