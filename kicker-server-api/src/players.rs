use axum::{
    Json,
    extract::{Path, State},
};

use kicker_server_domain::{app::AppState, rating::LeaderboardEntry};

use crate::{ApiError, JsonActionResponse};

#[derive(serde::Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct JsonLeaderboardEntry {
    code: String,
    name: String,
    team: String,
    rating: i64,
    trend_rating_diff: i64,
}

impl From<LeaderboardEntry> for JsonLeaderboardEntry {
    fn from(entry: LeaderboardEntry) -> Self {
        Self {
            code: entry.code,
            name: entry.name,
            team: entry.team,
            rating: entry.rating,
            trend_rating_diff: entry.trend_rating_diff,
        }
    }
}

pub async fn get_leaderboard(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<JsonLeaderboardEntry>>, ApiError> {
    let entries = app_state.rating_service.leaderboard().await?;
    Ok(Json(
        entries.into_iter().map(JsonLeaderboardEntry::from).collect(),
    ))
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonRegisterRequest {
    code: String,
    name: String,
}

pub async fn add_player(
    State(app_state): State<AppState>,
    Json(request): Json<JsonRegisterRequest>,
) -> Result<Json<JsonActionResponse>, ApiError> {
    let outcome = app_state
        .player_service
        .register(&request.code, &request.name)
        .await?;
    Ok(Json(JsonActionResponse::from_unit_outcome(outcome)))
}

pub async fn remove_player(
    Path(code): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<JsonActionResponse>, ApiError> {
    let outcome = app_state.player_service.remove_player(&code).await?;
    Ok(Json(JsonActionResponse::from_unit_outcome(outcome)))
}
