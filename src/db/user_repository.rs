use chrono::{ DateTime, Utc };
use sea_orm::sea_query::{ Expr, OnConflict };
use sea_orm::{
    prelude::Decimal,
    ColumnTrait,
    ConnectionTrait,
    EntityTrait,
    QueryFilter,
    QueryOrder,
    Set,
};

use crate::db::entity::{ completed_task, user, CompletedTask, User };
use crate::error::{ AppError, Result };

/// Fields of a user row at creation time.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_id: String,
    pub first_name: String,
    pub username: String,
    pub opening_balance: Decimal,
    pub referrer_id: Option<String>,
}

/// Result of adding a task to a user's completed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskMark {
    Applied,
    AlreadyCompleted,
}

/// Ledger primitives over the `users` table. Every balance change is a single
/// relative UPDATE so concurrent writers cannot lose each other's updates.
pub struct UserRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> UserRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn find(&self, user_id: &str) -> Result<Option<user::Model>> {
        let user = User::find_by_id(user_id.to_string()).one(self.conn).await?;
        Ok(user)
    }

    pub async fn get(&self, user_id: &str) -> Result<user::Model> {
        self.find(user_id).await?.ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Insert the user unless a row with the same id exists. Returns whether
    /// this call created it.
    pub async fn insert_if_absent(&self, new_user: NewUser, now: DateTime<Utc>) -> Result<bool> {
        let model = user::ActiveModel {
            user_id: Set(new_user.user_id),
            first_name: Set(new_user.first_name),
            username: Set(new_user.username),
            balance: Set(new_user.opening_balance),
            total_earned: Set(new_user.opening_balance),
            streak: Set(0),
            last_login: Set(Some(now)),
            referrals: Set(0),
            referrer_id: Set(new_user.referrer_id),
            created_at: Set(now),
        };

        let inserted = User::insert(model)
            .on_conflict(OnConflict::column(user::Column::UserId).do_nothing().to_owned())
            .exec_without_returning(self.conn).await?;

        Ok(inserted > 0)
    }

    /// Add `amount` to both balance and lifetime earnings.
    pub async fn credit(&self, user_id: &str, amount: Decimal) -> Result<()> {
        let result = User::update_many()
            .col_expr(user::Column::Balance, Expr::col(user::Column::Balance).add(amount))
            .col_expr(user::Column::TotalEarned, Expr::col(user::Column::TotalEarned).add(amount))
            .filter(user::Column::UserId.eq(user_id))
            .exec(self.conn).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        Ok(())
    }

    /// Subtract `amount` from balance only. The guard lives in the UPDATE
    /// itself, so balance can never go negative.
    pub async fn debit(&self, user_id: &str, amount: Decimal) -> Result<()> {
        let result = User::update_many()
            .col_expr(user::Column::Balance, Expr::col(user::Column::Balance).sub(amount))
            .filter(user::Column::UserId.eq(user_id))
            .filter(user::Column::Balance.gte(amount))
            .exec(self.conn).await?;

        if result.rows_affected == 0 {
            // Distinguish a missing user from a short balance
            self.get(user_id).await?;
            return Err(AppError::InsufficientFunds);
        }

        Ok(())
    }

    /// Credit a referrer and bump their referral count. Returns false when the
    /// referrer does not exist.
    pub async fn credit_referrer(&self, referrer_id: &str, bonus: Decimal) -> Result<bool> {
        let result = User::update_many()
            .col_expr(user::Column::Referrals, Expr::col(user::Column::Referrals).add(1))
            .col_expr(user::Column::Balance, Expr::col(user::Column::Balance).add(bonus))
            .col_expr(user::Column::TotalEarned, Expr::col(user::Column::TotalEarned).add(bonus))
            .filter(user::Column::UserId.eq(referrer_id))
            .exec(self.conn).await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn record_checkin(&self, user_id: &str, streak: i32, at: DateTime<Utc>) -> Result<()> {
        let result = User::update_many()
            .col_expr(user::Column::Streak, Expr::value(streak))
            .col_expr(user::Column::LastLogin, Expr::value(Some(at)))
            .filter(user::Column::UserId.eq(user_id))
            .exec(self.conn).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        Ok(())
    }

    pub async fn mark_task_completed(
        &self,
        user_id: &str,
        task_id: &str,
        at: DateTime<Utc>
    ) -> Result<TaskMark> {
        let model = completed_task::ActiveModel {
            user_id: Set(user_id.to_string()),
            task_id: Set(task_id.to_string()),
            completed_at: Set(at),
        };

        let inserted = CompletedTask::insert(model)
            .on_conflict(
                OnConflict::columns([completed_task::Column::UserId, completed_task::Column::TaskId])
                    .do_nothing()
                    .to_owned()
            )
            .exec_without_returning(self.conn).await?;

        Ok(if inserted > 0 { TaskMark::Applied } else { TaskMark::AlreadyCompleted })
    }

    /// Completed task ids in completion order.
    pub async fn completed_task_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let rows = CompletedTask::find()
            .filter(completed_task::Column::UserId.eq(user_id))
            .order_by_asc(completed_task::Column::CompletedAt)
            .all(self.conn).await?;

        Ok(
            rows
                .into_iter()
                .map(|row| row.task_id)
                .collect()
        )
    }

    /// Users who named `referrer_id` at creation, newest first.
    pub async fn find_referred_by(&self, referrer_id: &str) -> Result<Vec<user::Model>> {
        let users = User::find()
            .filter(user::Column::ReferrerId.eq(referrer_id))
            .order_by_desc(user::Column::CreatedAt)
            .all(self.conn).await?;

        Ok(users)
    }
}
