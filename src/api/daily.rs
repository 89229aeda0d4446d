use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::error::Result;

use super::{ AppJson, AppState, RewardResponse, UserBody };

pub async fn checkin(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(body): AppJson<UserBody>
) -> Result<Json<RewardResponse>> {
    state.authorize(&headers, &body.user_id)?;

    let outcome = state.checkin.checkin(&body.user_id).await?;

    Ok(
        Json(RewardResponse {
            streak: Some(outcome.streak),
            ..RewardResponse::new(outcome.reward, outcome.user)
        })
    )
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::router;
    use crate::api::test_support::*;

    #[tokio::test]
    async fn test_signup_day_is_already_claimed() {
        let app = router(test_state(false).await);
        create_user(&app, "8").await;

        let (status, body) = send(&app, post_json("/api/daily/checkin", json!({ "userId": "8" }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": false, "message": "Already claimed today" }));
        let profile = create_user(&app, "8").await;
        assert_eq!(profile["balance"], json!(0.5));
        assert_eq!(profile["streak"], 0);
    }
}
