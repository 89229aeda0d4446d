use chrono::{ DateTime, Utc };
use sea_orm::{ prelude::Decimal, ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set };
use uuid::Uuid;

use crate::db::entity::{ task, Task };
use crate::error::Result;

pub struct TaskRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> TaskRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        title: String,
        reward: Decimal,
        link: String,
        task_type: String,
        now: DateTime<Utc>
    ) -> Result<task::Model> {
        let task = task::ActiveModel {
            task_id: Set(format!("task_{}", Uuid::new_v4().simple())),
            title: Set(title),
            reward: Set(reward),
            link: Set(link),
            task_type: Set(task_type),
            created_at: Set(now),
        };

        let task = task.insert(self.conn).await?;
        Ok(task)
    }

    pub async fn find(&self, task_id: &str) -> Result<Option<task::Model>> {
        let task = Task::find_by_id(task_id.to_string()).one(self.conn).await?;
        Ok(task)
    }

    /// Catalog, newest first.
    pub async fn list(&self) -> Result<Vec<task::Model>> {
        let tasks = Task::find().order_by_desc(task::Column::CreatedAt).all(self.conn).await?;
        Ok(tasks)
    }
}
