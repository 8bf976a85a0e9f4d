use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;
use crate::store::LearningStore;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    storage: &'static str,
    uptime_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn router<S: LearningStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/", get(health::<S>))
        .route("/live", get(live))
}

async fn health<S: LearningStore>(State(state): State<AppState<S>>) -> impl IntoResponse {
    let store = state.store();
    let (status, body_status, error) = match store.ping().await {
        Ok(()) => (StatusCode::OK, "ok", None),
        Err(err) => {
            tracing::warn!(error = %err, "storage health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable", Some(err.to_string()))
        }
    };

    (
        status,
        Json(HealthResponse {
            status: body_status,
            storage: store.backend_name(),
            uptime_seconds: state.uptime_seconds(),
            error,
        }),
    )
}

async fn live() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "alive" }))
}
