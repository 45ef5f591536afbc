//! Leaderboard endpoint

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::{LeaderboardEntry, LeaderboardParams};

/// GET /leaderboard?limit=&timeControl= - ranked users for one category
///
/// The category is validated before any database access.
async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let (time_control, limit) = params.validate()?;
    let entries = state
        .users
        .get_leaderboard(time_control, limit.get())
        .await?;
    Ok(Json(entries))
}

/// Leaderboard routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/leaderboard", get(get_leaderboard))
}
