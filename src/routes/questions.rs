use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::response::{ok, AppError};
use crate::routes::account_id;
use crate::services::statistics;
use crate::state::AppState;
use crate::store::LearningStore;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRequest {
    pub is_correct: bool,
}

pub async fn record_attempt<S: LearningStore>(
    State(state): State<AppState<S>>,
    Path(question_id): Path<String>,
    user: Option<Extension<AuthUser>>,
    Json(payload): Json<AttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = statistics::record_attempt(
        state.store(),
        account_id(&user),
        &question_id,
        payload.is_correct,
    )
    .await?;
    Ok(ok(snapshot))
}
