use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Extension;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::response::{ok, AppError};
use crate::routes::account_id;
use crate::services::review::{self, ReviewGroup};
use crate::services::review_session;
use crate::state::AppState;
use crate::store::LearningStore;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQuery {
    pub material_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSessionQuery {
    pub material_id: Option<String>,
    pub group: Option<String>,
}

pub async fn review_data<S: LearningStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<ReviewQuery>,
    user: Option<Extension<AuthUser>>,
) -> Result<impl IntoResponse, AppError> {
    let data = review::review_data(
        state.store(),
        account_id(&user),
        query.material_id.as_deref(),
        state.review_thresholds(),
    )
    .await?;
    Ok(ok(data))
}

pub async fn review_session<S: LearningStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<ReviewSessionQuery>,
    user: Option<Extension<AuthUser>>,
) -> Result<impl IntoResponse, AppError> {
    let material_id = query
        .material_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::validation("materialId is required"))?;
    let group: ReviewGroup = query
        .group
        .as_deref()
        .ok_or_else(|| AppError::validation("group is required"))?
        .parse()?;

    let session = review_session::assemble_review_session(
        state.store(),
        account_id(&user),
        material_id,
        group,
        state.review_thresholds(),
    )
    .await?;
    Ok(ok(session))
}
