use std::sync::Arc;

use anyhow::Context;
use reward_ledger::api::{ self, AppState };
use reward_ledger::auth::{ IdentityVerifier, TelegramInitDataVerifier };
use reward_ledger::services::{
    AdService,
    CheckinService,
    ConfigService,
    LedgerService,
    TaskService,
    UserLocks,
    WithdrawalService,
};
use reward_ledger::{ db, Config };
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "reward_ledger=debug,tower_http=debug".into())
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| reward_ledger::AppError::Config(e.to_string()))?;

    tracing::info!("Starting reward-ledger (day offset {})", config.day_boundary_offset);

    let db = db::connect(&config.database_url).await.context("Failed to open database")?;
    tracing::info!("Database connected and migrated");

    let admins = Arc::new(config.admin_ids.clone());
    let locks = UserLocks::new();

    let config_service = Arc::new(ConfigService::new(db.clone(), admins.clone()));
    config_service.seed_defaults().await.context("Failed to seed reward config")?;

    let verifier: Option<Arc<dyn IdentityVerifier>> = match &config.telegram_bot_token {
        Some(token) => Some(Arc::new(TelegramInitDataVerifier::new(token)?)),
        None => {
            tracing::warn!("TELEGRAM_BOT_TOKEN is not set, init data cannot be verified and admin routes are disabled");
            None
        }
    };
    if config.require_init_data && verifier.is_none() {
        anyhow::bail!("REQUIRE_INIT_DATA is set but TELEGRAM_BOT_TOKEN is missing");
    }

    let state = AppState {
        ledger: Arc::new(LedgerService::new(db.clone(), locks.clone())),
        config: config_service,
        ads: Arc::new(AdService::new(db.clone(), locks.clone())),
        checkin: Arc::new(CheckinService::new(db.clone(), locks.clone(), config.day_boundary_offset)),
        tasks: Arc::new(TaskService::new(db.clone(), locks.clone(), admins.clone())),
        withdrawals: Arc::new(WithdrawalService::new(db, locks, admins.clone())),
        verifier,
        admins,
        require_init_data: config.require_init_data,
    };

    let app = api::router(state).layer(CorsLayer::permissive()).layer(TraceLayer::new_for_http());

    let addr = config.server_addr();
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
