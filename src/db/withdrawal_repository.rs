use chrono::{ DateTime, Utc };
use sea_orm::sea_query::Expr;
use sea_orm::{
    prelude::Decimal,
    ActiveModelTrait,
    ColumnTrait,
    ConnectionTrait,
    EntityTrait,
    QueryFilter,
    QueryOrder,
    Set,
};
use uuid::Uuid;

use crate::db::entity::{ withdrawal, Withdrawal };
use crate::enums::WithdrawalStatus;
use crate::error::Result;

pub struct WithdrawalRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> WithdrawalRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn create_pending(
        &self,
        user_id: &str,
        amount: Decimal,
        wallet: String,
        now: DateTime<Utc>
    ) -> Result<withdrawal::Model> {
        let request = withdrawal::ActiveModel {
            req_id: Set(format!("req_{}", Uuid::new_v4().simple())),
            user_id: Set(user_id.to_string()),
            amount: Set(amount),
            wallet: Set(wallet),
            status: Set(WithdrawalStatus::Pending.to_string()),
            requested_at: Set(now),
            processed_at: Set(None),
            processed_by: Set(None),
        };

        let request = request.insert(self.conn).await?;
        Ok(request)
    }

    pub async fn find(&self, req_id: &str) -> Result<Option<withdrawal::Model>> {
        let request = Withdrawal::find_by_id(req_id.to_string()).one(self.conn).await?;
        Ok(request)
    }

    /// Move a pending request to approved. Returns false when the request was
    /// not pending (already approved or missing).
    pub async fn approve_pending(
        &self,
        req_id: &str,
        admin_id: &str,
        now: DateTime<Utc>
    ) -> Result<bool> {
        let result = Withdrawal::update_many()
            .col_expr(withdrawal::Column::Status, Expr::value(WithdrawalStatus::Approved.as_str()))
            .col_expr(withdrawal::Column::ProcessedAt, Expr::value(Some(now)))
            .col_expr(withdrawal::Column::ProcessedBy, Expr::value(Some(admin_id.to_string())))
            .filter(withdrawal::Column::ReqId.eq(req_id))
            .filter(withdrawal::Column::Status.eq(WithdrawalStatus::Pending.as_str()))
            .exec(self.conn).await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<withdrawal::Model>> {
        let requests = Withdrawal::find()
            .filter(withdrawal::Column::UserId.eq(user_id))
            .order_by_desc(withdrawal::Column::RequestedAt)
            .all(self.conn).await?;

        Ok(requests)
    }

    pub async fn list_by_status(&self, status: WithdrawalStatus) -> Result<Vec<withdrawal::Model>> {
        let requests = Withdrawal::find()
            .filter(withdrawal::Column::Status.eq(status.as_str()))
            .order_by_desc(withdrawal::Column::RequestedAt)
            .all(self.conn).await?;

        Ok(requests)
    }
}
