use std::sync::Arc;

use chrono::{ DateTime, Utc };
use sea_orm::{ prelude::Decimal, DatabaseConnection, TransactionTrait };
use serde::Serialize;

use crate::auth::AdminIds;
use crate::db::entity::task;
use crate::db::{ TaskMark, TaskRepository, UserRepository };
use crate::error::{ AppError, Result };

use super::ledger_service::{ load_profile, require_user_id, UserProfile };
use super::UserLocks;

/// Reward credited by the ad network callback when it does not name one.
pub const DEFAULT_AD_TASK_REWARD: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub reward: Decimal,
    pub link: String,
    pub task_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub task_id: String,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub reward: Decimal,
    pub link: String,
    #[serde(rename = "type")]
    pub task_type: String,
    pub created_at: DateTime<Utc>,
}

impl From<task::Model> for TaskSummary {
    fn from(task: task::Model) -> Self {
        Self {
            task_id: task.task_id,
            title: task.title,
            reward: task.reward,
            link: task.link,
            task_type: task.task_type,
            created_at: task.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskReward {
    pub reward: Decimal,
    pub user: UserProfile,
}

pub struct TaskService {
    db: DatabaseConnection,
    locks: UserLocks,
    admins: Arc<AdminIds>,
}

impl TaskService {
    pub fn new(db: DatabaseConnection, locks: UserLocks, admins: Arc<AdminIds>) -> Self {
        Self { db, locks, admins }
    }

    pub async fn create(&self, admin_id: &str, new_task: NewTask) -> Result<TaskSummary> {
        self.admins.ensure_admin(admin_id)?;

        if new_task.title.trim().is_empty() {
            return Err(AppError::InvalidInput("Task title is required".to_string()));
        }
        if new_task.reward < Decimal::ZERO {
            return Err(AppError::InvalidInput("Task reward must not be negative".to_string()));
        }

        let task = TaskRepository::new(&self.db).create(
            new_task.title,
            new_task.reward,
            new_task.link,
            new_task.task_type,
            Utc::now()
        ).await?;

        tracing::info!("Task {} created by {}", task.task_id, admin_id);
        Ok(task.into())
    }

    pub async fn list(&self) -> Result<Vec<TaskSummary>> {
        let tasks = TaskRepository::new(&self.db).list().await?;
        Ok(tasks.into_iter().map(TaskSummary::from).collect())
    }

    /// Credit a catalog task once per user.
    pub async fn complete(&self, user_id: &str, task_id: &str) -> Result<TaskReward> {
        require_user_id(user_id)?;
        let _guard = self.locks.acquire(user_id).await;

        let txn = self.db.begin().await?;
        let task = TaskRepository::new(&txn)
            .find(task_id).await?
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

        let users = UserRepository::new(&txn);
        users.get(user_id).await?;

        if users.mark_task_completed(user_id, task_id, Utc::now()).await? == TaskMark::AlreadyCompleted {
            return Err(AppError::AlreadyClaimed("Task already completed".to_string()));
        }
        users.credit(user_id, task.reward).await?;

        let user = load_profile(&txn, user_id).await?;
        txn.commit().await?;

        tracing::info!("Task {} reward {} credited to {}", task_id, task.reward, user_id);
        Ok(TaskReward { reward: task.reward, user })
    }

    /// Ad-network task callback. The caller is trusted: no rate limit and no
    /// idempotency key. A missing or zero reward pays the default.
    pub async fn complete_ad_task(
        &self,
        user_id: &str,
        block_id: &str,
        reward: Option<Decimal>
    ) -> Result<TaskReward> {
        require_user_id(user_id)?;
        if block_id.trim().is_empty() {
            return Err(AppError::InvalidInput("blockId is required".to_string()));
        }

        let reward = reward.filter(|r| !r.is_zero()).unwrap_or(DEFAULT_AD_TASK_REWARD);
        if reward < Decimal::ZERO {
            return Err(AppError::InvalidInput("reward must not be negative".to_string()));
        }

        let _guard = self.locks.acquire(user_id).await;
        let txn = self.db.begin().await?;

        UserRepository::new(&txn).credit(user_id, reward).await?;
        let user = load_profile(&txn, user_id).await?;
        txn.commit().await?;

        tracing::info!("Ad task {} reward {} credited to {}", block_id, reward, user_id);
        Ok(TaskReward { reward, user })
    }
}
