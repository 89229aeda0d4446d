use std::sync::Arc;

use axum::http::HeaderMap;
use axum::routing::{ get, post };
use axum::Router;
use rust_decimal::Decimal;

use crate::auth::{ AdminIds, IdentityVerifier };
use crate::error::{ AppError, Result };
use crate::services::{
    UserProfile,
    AdService,
    CheckinService,
    ConfigService,
    LedgerService,
    TaskService,
    WithdrawalService,
};

pub mod extract;
pub mod ads;
pub mod auth;
pub mod config;
pub mod daily;
pub mod referrals;
pub mod tasks;
pub mod user;
pub mod withdraw;

pub use extract::{ AppJson, AppQuery };

/// Header carrying the raw Telegram init data.
pub const INIT_DATA_HEADER: &str = "x-telegram-init-data";

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<LedgerService>,
    pub config: Arc<ConfigService>,
    pub ads: Arc<AdService>,
    pub checkin: Arc<CheckinService>,
    pub tasks: Arc<TaskService>,
    pub withdrawals: Arc<WithdrawalService>,
    /// `None` when no bot token is configured.
    pub verifier: Option<Arc<dyn IdentityVerifier>>,
    pub admins: Arc<AdminIds>,
    pub require_init_data: bool,
}

impl AppState {
    pub fn verifier(&self) -> Result<&dyn IdentityVerifier> {
        self.verifier
            .as_deref()
            .ok_or_else(|| AppError::Config("TELEGRAM_BOT_TOKEN is not set".to_string()))
    }

    /// When init data is required, the signed header must name the same user
    /// as the request body.
    pub fn authorize(&self, headers: &HeaderMap, user_id: &str) -> Result<()> {
        if !self.require_init_data {
            return Ok(());
        }
        self.verify_caller(headers, user_id)
    }

    /// Admin operations always need a signed identity, whatever
    /// `require_init_data` says.
    pub fn authorize_admin(&self, headers: &HeaderMap, user_id: &str) -> Result<()> {
        self.verify_caller(headers, user_id)
    }

    fn verify_caller(&self, headers: &HeaderMap, user_id: &str) -> Result<()> {
        let init_data = headers
            .get(INIT_DATA_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .ok_or(AppError::MissingInitData)?;

        let identity = self.verifier()?.verify(init_data)?;
        if identity.user_id != user_id {
            tracing::warn!("Init data for {} used to act as {}", identity.user_id, user_id);
            return Err(AppError::Unauthorized);
        }

        Ok(())
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/ads/complete", post(ads::complete))
        .route("/ads/counts", get(ads::counts))
        .route("/auth/verify", post(auth::verify))
        .route("/config/get", get(config::get_config))
        .route("/config/update", post(config::update_config))
        .route("/daily/checkin", post(daily::checkin))
        .route("/referrals/list", get(referrals::list))
        .route("/tasks/create", post(tasks::create))
        .route("/tasks/list", get(tasks::list))
        .route("/tasks/complete/{task_id}", post(tasks::complete))
        .route("/tasks/complete-ad-task", post(tasks::complete_ad_task))
        .route("/user/get-or-create", post(user::get_or_create))
        .route("/withdraw/request", post(withdraw::request))
        .route("/withdraw/approve", post(withdraw::approve))
        .route("/withdraw/history", get(withdraw::history))
        .route("/withdraw/pending", get(withdraw::pending));

    Router::new().route("/health", get(health_check)).nest("/api", api).with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    #[serde(default)]
    pub user_id: String,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    #[serde(default)]
    pub user_id: String,
}

/// Successful reward operation, echoing the updated ledger.
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardResponse {
    pub success: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub reward: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak: Option<i32>,
    pub user_data: UserProfile,
}

impl RewardResponse {
    pub fn new(reward: Decimal, user_data: UserProfile) -> Self {
        Self { success: true, reward, streak: None, user_data }
    }
}

#[derive(serde::Serialize)]
pub struct Acknowledged {
    pub success: bool,
}

impl Acknowledged {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
