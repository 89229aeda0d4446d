use std::sync::Arc;

use chrono::{ DateTime, Utc };
use sea_orm::{ prelude::Decimal, DatabaseConnection, TransactionTrait };
use serde::Serialize;

use crate::auth::AdminIds;
use crate::db::entity::withdrawal;
use crate::db::{ RewardConfigRepository, RewardSettings, UserRepository, WithdrawalRepository };
use crate::enums::WithdrawalStatus;
use crate::error::{ AppError, Result };

use super::ledger_service::{ load_profile, require_user_id, UserProfile };
use super::UserLocks;

#[derive(Debug, Clone)]
pub struct WithdrawalReceipt {
    pub req_id: String,
    pub user: UserProfile,
}

/// Full history entry, including processing details.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRecord {
    pub req_id: String,
    pub user_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub wallet: String,
    pub status: WithdrawalStatus,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<String>,
}

impl TryFrom<withdrawal::Model> for WithdrawalRecord {
    type Error = AppError;

    fn try_from(w: withdrawal::Model) -> Result<Self> {
        Ok(Self {
            req_id: w.req_id,
            user_id: w.user_id,
            amount: w.amount,
            wallet: w.wallet,
            status: w.status.parse()?,
            requested_at: w.requested_at,
            processed_at: w.processed_at,
            processed_by: w.processed_by,
        })
    }
}

/// Entry in the admin queue of requests awaiting payout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingWithdrawal {
    pub req_id: String,
    pub user_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub wallet: String,
    pub status: WithdrawalStatus,
    pub requested_at: DateTime<Utc>,
}

impl TryFrom<withdrawal::Model> for PendingWithdrawal {
    type Error = AppError;

    fn try_from(w: withdrawal::Model) -> Result<Self> {
        Ok(Self {
            req_id: w.req_id,
            user_id: w.user_id,
            amount: w.amount,
            wallet: w.wallet,
            status: w.status.parse()?,
            requested_at: w.requested_at,
        })
    }
}

/// Withdrawal Workflow: `pending -> approved`. Funds leave the balance when
/// the request is made; approval only records the payout.
pub struct WithdrawalService {
    db: DatabaseConnection,
    locks: UserLocks,
    admins: Arc<AdminIds>,
}

impl WithdrawalService {
    pub fn new(db: DatabaseConnection, locks: UserLocks, admins: Arc<AdminIds>) -> Self {
        Self { db, locks, admins }
    }

    pub async fn request(
        &self,
        user_id: &str,
        amount: Decimal,
        wallet: &str
    ) -> Result<WithdrawalReceipt> {
        require_user_id(user_id)?;
        if amount <= Decimal::ZERO {
            return Err(AppError::InvalidInput("amount must be positive".to_string()));
        }
        if wallet.trim().is_empty() {
            return Err(AppError::InvalidInput("wallet is required".to_string()));
        }

        let _guard = self.locks.acquire(user_id).await;
        let txn = self.db.begin().await?;

        let users = UserRepository::new(&txn);
        let user = users.get(user_id).await?;

        let minimum = RewardConfigRepository::new(&txn)
            .find().await?
            .unwrap_or_else(RewardSettings::defaults).min_withdraw;

        if amount < minimum {
            return Err(AppError::BelowMinimumWithdrawal { minimum });
        }
        if amount > user.balance {
            return Err(AppError::InsufficientFunds);
        }

        users.debit(user_id, amount).await?;
        let request = WithdrawalRepository::new(&txn).create_pending(
            user_id,
            amount,
            wallet.trim().to_string(),
            Utc::now()
        ).await?;

        let user = load_profile(&txn, user_id).await?;
        txn.commit().await?;

        tracing::info!("Withdrawal {} of {} requested by {}", request.req_id, amount, user_id);
        Ok(WithdrawalReceipt { req_id: request.req_id, user })
    }

    /// Mark a request approved. Re-approving leaves the first approval intact.
    pub async fn approve(&self, admin_id: &str, req_id: &str) -> Result<()> {
        self.admins.ensure_admin(admin_id)?;

        let requests = WithdrawalRepository::new(&self.db);
        if requests.approve_pending(req_id, admin_id, Utc::now()).await? {
            tracing::info!("Withdrawal {} approved by {}", req_id, admin_id);
            return Ok(());
        }

        match requests.find(req_id).await? {
            Some(_) => {
                tracing::debug!("Withdrawal {} was already approved", req_id);
                Ok(())
            }
            None => Err(AppError::NotFound("Withdrawal request not found".to_string())),
        }
    }

    pub async fn history(&self, user_id: &str) -> Result<Vec<WithdrawalRecord>> {
        require_user_id(user_id)?;

        let requests = WithdrawalRepository::new(&self.db).list_by_user(user_id).await?;
        requests.into_iter().map(WithdrawalRecord::try_from).collect()
    }

    pub async fn pending(&self) -> Result<Vec<PendingWithdrawal>> {
        let requests = WithdrawalRepository::new(&self.db).list_by_status(
            WithdrawalStatus::Pending
        ).await?;
        requests.into_iter().map(PendingWithdrawal::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{ GetOrCreateUser, LedgerService, TaskService };
    use crate::db::test_db;
    use rust_decimal_macros::dec;

    struct Fixture {
        withdrawals: Arc<WithdrawalService>,
        tasks: TaskService,
    }

    async fn setup(starting_balance: Decimal) -> Fixture {
        let db = test_db().await;
        let locks = UserLocks::new();
        let admins = Arc::new(AdminIds::parse("1"));

        LedgerService::new(db.clone(), locks.clone())
            .get_or_create(GetOrCreateUser {
                user_id: "3".to_string(),
                first_name: None,
                username: None,
                referrer_id: None,
            }).await
            .unwrap();

        let tasks = TaskService::new(db.clone(), locks.clone(), admins.clone());
        if starting_balance > Decimal::ZERO {
            tasks.complete_ad_task("3", "seed", Some(starting_balance)).await.unwrap();
        }

        Fixture {
            withdrawals: Arc::new(WithdrawalService::new(db, locks, admins)),
            tasks,
        }
    }

    async fn balance(fixture: &Fixture) -> Decimal {
        load_profile(&fixture.withdrawals.db, "3").await.unwrap().balance.round_dp(6)
    }

    #[tokio::test]
    async fn test_below_minimum_is_rejected_without_mutation() {
        let fixture = setup(Decimal::ZERO).await;

        let result = fixture.withdrawals.request("3", dec!(3.00), "wallet-1").await;

        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Minimum withdrawal is 5");
        assert!(err.is_rejection());
        assert_eq!(balance(&fixture).await, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_over_balance_is_rejected_without_mutation() {
        let fixture = setup(dec!(6)).await;

        let result = fixture.withdrawals.request("3", dec!(7), "wallet-1").await;

        assert!(matches!(result, Err(AppError::InsufficientFunds)));
        assert_eq!(balance(&fixture).await, dec!(6));
        assert!(fixture.withdrawals.history("3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_request_reserves_funds_and_approval_keeps_balance() {
        let fixture = setup(dec!(12)).await;

        let receipt = fixture.withdrawals.request("3", dec!(5), "wallet-1").await.unwrap();

        assert_eq!(receipt.user.balance.round_dp(6), dec!(7));
        assert_eq!(receipt.user.total_earned.round_dp(6), dec!(12));
        assert!(receipt.req_id.starts_with("req_"));

        let pending = fixture.withdrawals.pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].status, WithdrawalStatus::Pending);

        fixture.withdrawals.approve("1", &receipt.req_id).await.unwrap();

        assert!(fixture.withdrawals.pending().await.unwrap().is_empty());
        let history = fixture.withdrawals.history("3").await.unwrap();
        assert_eq!(history[0].status, WithdrawalStatus::Approved);
        assert_eq!(history[0].processed_by.as_deref(), Some("1"));
        assert!(history[0].processed_at.is_some());
        assert_eq!(balance(&fixture).await, dec!(7));
    }

    #[tokio::test]
    async fn test_second_approval_keeps_first_stamp() {
        let fixture = setup(dec!(10)).await;
        let admins = Arc::new(AdminIds::parse("1,2"));
        let withdrawals = WithdrawalService::new(
            fixture.withdrawals.db.clone(),
            UserLocks::new(),
            admins
        );
        let receipt = withdrawals.request("3", dec!(5), "wallet-1").await.unwrap();

        withdrawals.approve("1", &receipt.req_id).await.unwrap();
        withdrawals.approve("2", &receipt.req_id).await.unwrap();

        let history = withdrawals.history("3").await.unwrap();
        assert_eq!(history[0].processed_by.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_approval_requires_admin_and_known_request() {
        let fixture = setup(dec!(10)).await;
        let receipt = fixture.withdrawals.request("3", dec!(5), "wallet-1").await.unwrap();

        assert!(
            matches!(
                fixture.withdrawals.approve("3", &receipt.req_id).await,
                Err(AppError::Unauthorized)
            )
        );
        assert!(
            matches!(
                fixture.withdrawals.approve("1", "req_missing").await,
                Err(AppError::NotFound(_))
            )
        );
        assert_eq!(fixture.withdrawals.pending().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_request_fields() {
        let fixture = setup(dec!(10)).await;

        assert!(
            matches!(
                fixture.withdrawals.request("3", dec!(0), "wallet-1").await,
                Err(AppError::InvalidInput(_))
            )
        );
        assert!(
            matches!(
                fixture.withdrawals.request("3", dec!(5), " ").await,
                Err(AppError::InvalidInput(_))
            )
        );
        assert!(
            matches!(
                fixture.withdrawals.request("404", dec!(5), "w").await,
                Err(AppError::NotFound(_))
            )
        );
    }

    #[tokio::test]
    async fn test_concurrent_requests_never_overdraw() {
        let fixture = setup(dec!(12)).await;

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let withdrawals = fixture.withdrawals.clone();
                tokio::spawn(async move { withdrawals.request("3", dec!(5), "wallet-1").await })
            })
            .collect();

        let mut approved = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => {
                    approved += 1;
                }
                Err(AppError::InsufficientFunds) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(approved, 2);
        assert_eq!(balance(&fixture).await, dec!(2));
    }

    #[tokio::test]
    async fn test_credit_racing_withdrawal_is_not_lost() {
        let fixture = setup(dec!(10)).await;
        let withdrawals = fixture.withdrawals.clone();

        let (withdrawn, credited) = tokio::join!(
            withdrawals.request("3", dec!(5), "wallet-1"),
            fixture.tasks.complete_ad_task("3", "race", Some(dec!(1)))
        );

        withdrawn.unwrap();
        credited.unwrap();
        assert_eq!(balance(&fixture).await, dec!(6));
    }
}
