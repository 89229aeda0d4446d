use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::error::Result;
use crate::services::AdCounts;

use super::{ AppJson, AppQuery, AppState, RewardResponse, UserBody, UserQuery };

pub async fn complete(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(body): AppJson<UserBody>
) -> Result<Json<RewardResponse>> {
    state.authorize(&headers, &body.user_id)?;

    let outcome = state.ads.complete(&body.user_id).await?;

    Ok(Json(RewardResponse::new(outcome.reward, outcome.user)))
}

pub async fn counts(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UserQuery>
) -> Result<Json<AdCounts>> {
    let counts = state.ads.counts(&query.user_id).await?;

    Ok(Json(counts))
}
