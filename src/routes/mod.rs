mod health;
mod materials;
mod questions;
mod review;
mod units;

use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Router};

use crate::auth::AuthUser;
use crate::middleware::auth::optional_auth;
use crate::response::json_error;
use crate::state::AppState;
use crate::store::LearningStore;

pub fn router<S: LearningStore>(state: AppState<S>) -> Router {
    Router::new()
        .nest("/health", health::router::<S>())
        .route("/api/dashboard", get(materials::dashboard::<S>))
        .route("/api/materials", get(materials::list_materials::<S>))
        .route(
            "/api/materials/:materialId",
            get(materials::get_material::<S>),
        )
        .route("/api/review", get(review::review_data::<S>))
        .route("/api/review/session", get(review::review_session::<S>))
        .route(
            "/api/questions/:questionId/attempts",
            post(questions::record_attempt::<S>),
        )
        .route("/api/units/:unitId/session", get(units::unit_session::<S>))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth::<S>,
        ))
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "route not found").into_response()
}

/// Account id of the authenticated caller, if any.
fn account_id(user: &Option<Extension<AuthUser>>) -> Option<&str> {
    user.as_ref().map(|Extension(user)| user.id.as_str())
}
