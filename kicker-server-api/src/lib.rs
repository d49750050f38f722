use axum::{
    Router,
    response::IntoResponse,
    routing::{delete, get, post},
};
use log::info;
use tower_http::cors::CorsLayer;

use kicker_server_domain::{Outcome, ServiceError, app::AppState};

mod games;
mod players;

pub async fn run(
    app: AppState,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) {
    let router = Router::new()
        .route(
            "/players",
            get(players::get_leaderboard).post(players::add_player),
        )
        .route("/players/{code}", delete(players::remove_player))
        .route("/games", post(games::report_game))
        .layer(CorsLayer::permissive());

    let port = std::env::var("KICKER_HTTP_PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .expect("KICKER_HTTP_PORT must be a valid u16");

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .unwrap();

    info!("API server listening on port {}", port);
    axum::serve(listener, router.with_state(app))
        .with_graceful_shutdown(shutdown_signal)
        .await
        .unwrap();

    info!("HTTP API shut down gracefully");
}

pub struct ApiError(ServiceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::http::Response<axum::body::Body> {
        let (status, msg) = match self.0 {
            ServiceError::NotFound(msg) => (axum::http::StatusCode::NOT_FOUND, msg),
            ServiceError::BadRequest(msg) => (axum::http::StatusCode::BAD_REQUEST, msg),
            ServiceError::Internal(msg) => (axum::http::StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        let body = serde_json::json!({ "error": msg });
        (status, axum::Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        ApiError(value)
    }
}

/// The two response shapes every mutating route answers with: plain success
/// (optionally carrying the transferred rating diff) or a warning message.
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonActionResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    rating_diff: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning_msg: Option<String>,
}

impl JsonActionResponse {
    fn from_unit_outcome(outcome: Outcome<()>) -> Self {
        match outcome {
            Outcome::Success(()) => Self {
                status: "success",
                rating_diff: None,
                warning_msg: None,
            },
            Outcome::Warning(msg) => Self::warning(msg),
        }
    }

    fn from_report_outcome(outcome: Outcome<i64>) -> Self {
        match outcome {
            Outcome::Success(rating_diff) => Self {
                status: "success",
                rating_diff: Some(rating_diff),
                warning_msg: None,
            },
            Outcome::Warning(msg) => Self::warning(msg),
        }
    }

    fn warning(msg: String) -> Self {
        Self {
            status: "warning",
            rating_diff: None,
            warning_msg: Some(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_response_shapes() {
        let report = JsonActionResponse::from_report_outcome(Outcome::Success(16));
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({ "status": "success", "ratingDiff": 16 })
        );

        let register = JsonActionResponse::from_unit_outcome(Outcome::Success(()));
        assert_eq!(
            serde_json::to_value(&register).unwrap(),
            serde_json::json!({ "status": "success" })
        );
    }

    #[test]
    fn test_warning_response_shape() {
        let outcome: Outcome<i64> = Outcome::warning("Winner does not exist");
        let response = JsonActionResponse::from_report_outcome(outcome);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({ "status": "warning", "warningMsg": "Winner does not exist" })
        );
    }
}
