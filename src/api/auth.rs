use axum::extract::State;
use axum::Json;
use serde::{ Deserialize, Serialize };

use crate::error::Result;

use super::{ AppJson, AppState };

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    #[serde(default)]
    pub init_data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub user_id: String,
    pub first_name: String,
    pub username: String,
    pub is_admin: bool,
}

pub async fn verify(
    State(state): State<AppState>,
    AppJson(request): AppJson<VerifyRequest>
) -> Result<Json<VerifyResponse>> {
    let identity = state.verifier()?.verify(&request.init_data)?;
    let is_admin = state.admins.contains(&identity.user_id);

    tracing::debug!("Verified init data for {} (admin: {})", identity.user_id, is_admin);

    Ok(
        Json(VerifyResponse {
            user_id: identity.user_id,
            first_name: identity.first_name,
            username: identity.username,
            is_admin,
        })
    )
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::router;
    use crate::api::test_support::*;
    use crate::auth::telegram::signed_init_data;

    #[tokio::test]
    async fn test_verify_signed_init_data() {
        let app = router(test_state(false).await);
        let init_data = signed_init_data(BOT_TOKEN, &[
            ("auth_date", "1700000000"),
            ("user", r#"{"id":1,"first_name":"Root","username":"root"}"#),
        ]);

        let (status, body) = send(
            &app,
            post_json("/api/auth/verify", json!({ "initData": init_data }))
        ).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "userId": "1", "firstName": "Root", "username": "root", "isAdmin": true })
        );
    }

    #[tokio::test]
    async fn test_verify_failures() {
        let app = router(test_state(false).await);

        let (status, _) = send(&app, post_json("/api/auth/verify", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let forged = signed_init_data("999:OTHER", &[("user", r#"{"id":1}"#)]);
        let (status, body) = send(
            &app,
            post_json("/api/auth/verify", json!({ "initData": forged }))
        ).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["message"], "Invalid signature");
    }

    #[tokio::test]
    async fn test_verify_without_bot_token() {
        let mut state = test_state(false).await;
        state.verifier = None;
        let app = router(state);

        let (status, body) = send(
            &app,
            post_json("/api/auth/verify", json!({ "initData": "user=x&hash=00" }))
        ).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "Server configuration error");
    }
}
