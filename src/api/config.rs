use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use crate::db::RewardSettings;
use crate::error::Result;

use super::{ Acknowledged, AppJson, AppState };

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfigRequest {
    #[serde(default)]
    pub user_id: String,
    pub config: RewardSettings,
}

pub async fn get_config(State(state): State<AppState>) -> Result<Json<RewardSettings>> {
    Ok(Json(state.config.get().await?))
}

pub async fn update_config(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(request): AppJson<UpdateConfigRequest>
) -> Result<Json<Acknowledged>> {
    state.authorize_admin(&headers, &request.user_id)?;
    state.config.update(&request.user_id, request.config).await?;

    Ok(Json(Acknowledged::ok()))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::router;
    use crate::api::test_support::*;

    fn settings() -> serde_json::Value {
        json!({
            "adReward": 0.25,
            "dailyLoginReward": 1,
            "referralBonus": 2,
            "newUserBonus": 0,
            "minWithdraw": 10
        })
    }

    #[tokio::test]
    async fn test_get_returns_seeded_defaults() {
        let app = router(test_state(false).await);

        let (status, body) = send(&app, get("/api/config/get")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "adReward": 0.1,
                "dailyLoginReward": 0.5,
                "referralBonus": 1.0,
                "newUserBonus": 0.5,
                "minWithdraw": 5.0
            })
        );
    }

    #[tokio::test]
    async fn test_admin_update_is_visible() {
        let app = router(test_state(false).await);

        let (status, body) = send(
            &app,
            signed_as(post_json("/api/config/update", json!({ "userId": "1", "config": settings() })), "1")
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));

        let (_, config) = send(&app, get("/api/config/get")).await;
        assert_eq!(config["adReward"], json!(0.25));
        assert_eq!(config["newUserBonus"], json!(0.0));
    }

    #[tokio::test]
    async fn test_non_admin_update_is_forbidden() {
        let app = router(test_state(false).await);

        let (status, _) = send(
            &app,
            signed_as(post_json("/api/config/update", json!({ "userId": "2", "config": settings() })), "2")
        ).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        let (_, config) = send(&app, get("/api/config/get")).await;
        assert_eq!(config["adReward"], json!(0.1));
    }
}
