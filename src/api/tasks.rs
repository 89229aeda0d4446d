use axum::extract::{ Path, State };
use axum::http::HeaderMap;
use axum::Json;
use rust_decimal::Decimal;
use serde::{ Deserialize, Serialize };

use crate::error::Result;
use crate::services::{ NewTask, TaskSummary, UserProfile };

use super::{ AppJson, AppState, RewardResponse, UserBody };

#[derive(Deserialize)]
pub struct TaskInput {
    #[serde(default)]
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub reward: Decimal,
    #[serde(default)]
    pub link: String,
    #[serde(rename = "type", default)]
    pub task_type: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub user_id: String,
    pub task: TaskInput,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskResponse {
    pub success: bool,
    pub task_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdTaskRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub block_id: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub reward: Option<Decimal>,
}

/// The ad-network callback echoes the ledger under `user`.
#[derive(Serialize)]
pub struct AdTaskResponse {
    pub success: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub reward: Decimal,
    pub user: UserProfile,
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(request): AppJson<CreateTaskRequest>
) -> Result<Json<CreateTaskResponse>> {
    state.authorize_admin(&headers, &request.user_id)?;

    let task = state.tasks.create(&request.user_id, NewTask {
        title: request.task.title,
        reward: request.task.reward,
        link: request.task.link,
        task_type: request.task.task_type,
    }).await?;

    Ok(Json(CreateTaskResponse { success: true, task_id: task.task_id }))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<TaskSummary>>> {
    Ok(Json(state.tasks.list().await?))
}

pub async fn complete(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    headers: HeaderMap,
    AppJson(body): AppJson<UserBody>
) -> Result<Json<RewardResponse>> {
    state.authorize(&headers, &body.user_id)?;

    let outcome = state.tasks.complete(&body.user_id, &task_id).await?;

    Ok(Json(RewardResponse::new(outcome.reward, outcome.user)))
}

// Server-to-server callback; it carries no init data.
pub async fn complete_ad_task(
    State(state): State<AppState>,
    AppJson(request): AppJson<AdTaskRequest>
) -> Result<Json<AdTaskResponse>> {
    let outcome = state.tasks.complete_ad_task(
        &request.user_id,
        &request.block_id,
        request.reward
    ).await?;

    Ok(
        Json(AdTaskResponse {
            success: true,
            reward: outcome.reward,
            user: outcome.user,
        })
    )
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::router;
    use crate::api::test_support::*;

    fn new_task(user_id: &str) -> serde_json::Value {
        json!({
            "userId": user_id,
            "task": { "title": "Join group", "reward": 2, "link": "https://t.me/g", "type": "telegram" }
        })
    }

    #[tokio::test]
    async fn test_create_list_and_complete_task() {
        let app = router(test_state(false).await);
        create_user(&app, "20").await;

        let (status, created) = send(&app, signed_as(post_json("/api/tasks/create", new_task("1")), "1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["success"], true);
        let task_id = created["taskId"].as_str().unwrap().to_string();

        let (_, listed) = send(&app, get("/api/tasks/list")).await;
        assert_eq!(listed[0]["taskId"], task_id.as_str());
        assert_eq!(listed[0]["type"], "telegram");
        assert_eq!(listed[0]["reward"], json!(2.0));

        let uri = format!("/api/tasks/complete/{}", task_id);
        let (status, done) = send(&app, post_json(&uri, json!({ "userId": "20" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(done["reward"], json!(2.0));
        assert_eq!(done["userData"]["completedTasks"], json!([task_id]));

        let (status, again) = send(&app, post_json(&uri, json!({ "userId": "20" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(again, json!({ "success": false, "message": "Task already completed" }));
    }

    #[tokio::test]
    async fn test_task_errors() {
        let app = router(test_state(false).await);
        create_user(&app, "20").await;

        let (status, _) = send(&app, signed_as(post_json("/api/tasks/create", new_task("20")), "20")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            post_json("/api/tasks/complete/task_missing", json!({ "userId": "20" }))
        ).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Task not found");
    }

    #[tokio::test]
    async fn test_ad_task_callback() {
        let app = router(test_state(false).await);
        create_user(&app, "21").await;

        let (status, body) = send(
            &app,
            post_json("/api/tasks/complete-ad-task", json!({ "userId": "21", "blockId": "b1" }))
        ).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reward"], json!(100.0));
        assert_eq!(body["user"]["balance"], json!(100.5));
        assert!(body.get("userData").is_none());

        let (status, _) = send(
            &app,
            post_json("/api/tasks/complete-ad-task", json!({ "userId": "21" }))
        ).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
