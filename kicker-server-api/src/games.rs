use axum::{Json, extract::State};

use kicker_server_domain::app::AppState;

use crate::{ApiError, JsonActionResponse};

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReportRequest {
    winner_code: String,
    loser_code: String,
}

pub async fn report_game(
    State(app_state): State<AppState>,
    Json(request): Json<JsonReportRequest>,
) -> Result<Json<JsonActionResponse>, ApiError> {
    let outcome = app_state
        .rating_service
        .report_game(&request.winner_code, &request.loser_code)
        .await?;
    Ok(Json(JsonActionResponse::from_report_outcome(outcome)))
}
