use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use rust_decimal::Decimal;
use serde::{ Deserialize, Serialize };

use crate::error::Result;
use crate::services::{ PendingWithdrawal, UserProfile, WithdrawalRecord };

use super::{ Acknowledged, AppJson, AppQuery, AppState, UserQuery };

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default)]
    pub wallet: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawResponse {
    pub success: bool,
    pub req_id: String,
    pub user_data: UserProfile,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub req_id: String,
}

pub async fn request(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(request): AppJson<WithdrawRequest>
) -> Result<Json<WithdrawResponse>> {
    state.authorize(&headers, &request.user_id)?;

    let receipt = state.withdrawals.request(
        &request.user_id,
        request.amount,
        &request.wallet
    ).await?;

    Ok(
        Json(WithdrawResponse {
            success: true,
            req_id: receipt.req_id,
            user_data: receipt.user,
        })
    )
}

pub async fn approve(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(request): AppJson<ApproveRequest>
) -> Result<Json<Acknowledged>> {
    state.authorize_admin(&headers, &request.user_id)?;
    state.withdrawals.approve(&request.user_id, &request.req_id).await?;

    Ok(Json(Acknowledged::ok()))
}

pub async fn history(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UserQuery>
) -> Result<Json<Vec<WithdrawalRecord>>> {
    Ok(Json(state.withdrawals.history(&query.user_id).await?))
}

pub async fn pending(State(state): State<AppState>) -> Result<Json<Vec<PendingWithdrawal>>> {
    Ok(Json(state.withdrawals.pending().await?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::router;
    use crate::api::test_support::*;

    async fn fund(app: &axum::Router, user_id: &str, reward: f64) {
        let (status, _) = send(
            app,
            post_json(
                "/api/tasks/complete-ad-task",
                json!({ "userId": user_id, "blockId": "seed", "reward": reward })
            )
        ).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_below_minimum_is_soft_rejection() {
        let app = router(test_state(false).await);
        create_user(&app, "40").await;

        let (status, body) = send(
            &app,
            post_json("/api/withdraw/request", json!({ "userId": "40", "amount": 3, "wallet": "w" }))
        ).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": false, "message": "Minimum withdrawal is 5" }));
    }

    #[tokio::test]
    async fn test_request_then_approve() {
        let app = router(test_state(false).await);
        create_user(&app, "40").await;
        fund(&app, "40", 9.5).await;

        let (status, body) = send(
            &app,
            post_json("/api/withdraw/request", json!({ "userId": "40", "amount": 6, "wallet": "UQ-wallet" }))
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userData"]["balance"], json!(4.0));
        let req_id = body["reqId"].as_str().unwrap().to_string();

        let (_, pending) = send(&app, get("/api/withdraw/pending")).await;
        assert_eq!(pending[0]["reqId"], req_id.as_str());
        assert!(pending[0].get("processedBy").is_none());

        let (status, _) = send(
            &app,
            signed_as(post_json("/api/withdraw/approve", json!({ "userId": "40", "reqId": req_id })), "40")
        ).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, ack) = send(
            &app,
            signed_as(post_json("/api/withdraw/approve", json!({ "userId": "1", "reqId": req_id })), "1")
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack, json!({ "success": true }));

        let (_, history) = send(&app, get("/api/withdraw/history?userId=40")).await;
        assert_eq!(history[0]["status"], "approved");
        assert_eq!(history[0]["processedBy"], "1");
        assert_eq!(history[0]["amount"], json!(6.0));

        let (status, _) = send(
            &app,
            signed_as(post_json("/api/withdraw/approve", json!({ "userId": "1", "reqId": "req_unknown" })), "1")
        ).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_insufficient_balance_message() {
        let app = router(test_state(false).await);
        create_user(&app, "41").await;
        fund(&app, "41", 5.5).await;

        let (_, body) = send(
            &app,
            post_json("/api/withdraw/request", json!({ "userId": "41", "amount": 7, "wallet": "w" }))
        ).await;

        assert_eq!(body, json!({ "success": false, "message": "Insufficient balance" }));
    }
}
