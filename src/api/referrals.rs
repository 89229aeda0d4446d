use axum::extract::State;
use axum::Json;

use crate::error::Result;
use crate::services::ReferralSummary;

use super::{ AppQuery, AppState, UserQuery };

pub async fn list(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UserQuery>
) -> Result<Json<Vec<ReferralSummary>>> {
    let referrals = state.ledger.list_referrals(&query.user_id).await?;

    Ok(Json(referrals))
}
