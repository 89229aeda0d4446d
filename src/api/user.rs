use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use crate::error::Result;
use crate::services::{ GetOrCreateUser, UserProfile };

use super::{ AppJson, AppState };

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetOrCreateRequest {
    #[serde(default)]
    pub user_id: String,
    pub first_name: Option<String>,
    pub username: Option<String>,
    pub referrer_id: Option<String>,
}

pub async fn get_or_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(request): AppJson<GetOrCreateRequest>
) -> Result<Json<UserProfile>> {
    state.authorize(&headers, &request.user_id)?;

    let user = state.ledger.get_or_create(GetOrCreateUser {
        user_id: request.user_id,
        first_name: request.first_name,
        username: request.username,
        referrer_id: request.referrer_id,
    }).await?;

    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::router;
    use crate::api::test_support::*;

    #[tokio::test]
    async fn test_user_projection() {
        let app = router(test_state(false).await);

        let body = create_user(&app, "30").await;

        assert_eq!(body["userId"], "30");
        assert_eq!(body["balance"], json!(0.5));
        assert_eq!(body["totalEarned"], json!(0.5));
        assert_eq!(body["streak"], 0);
        assert_eq!(body["lastLogin"], json!(null));
        assert_eq!(body["referrerId"], json!(null));
        assert_eq!(body["completedTasks"], json!([]));
    }

    #[tokio::test]
    async fn test_referral_pays_referrer_once() {
        let app = router(test_state(false).await);
        create_user(&app, "30").await;
        let request = json!({ "userId": "31", "referrerId": "30" });

        let (_, referred) = send(&app, post_json("/api/user/get-or-create", request.clone())).await;
        send(&app, post_json("/api/user/get-or-create", request)).await;
        let referrer = create_user(&app, "30").await;

        assert_eq!(referred["referrerId"], "30");
        assert_eq!(referrer["referrals"], 1);
        assert_eq!(referrer["balance"], json!(1.5));
    }

    #[tokio::test]
    async fn test_missing_user_id() {
        let app = router(test_state(false).await);

        let (status, body) = send(&app, post_json("/api/user/get-or-create", json!({}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_INPUT");
    }
}
