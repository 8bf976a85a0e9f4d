use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Extension;

use crate::auth::AuthUser;
use crate::response::{ok, AppError};
use crate::routes::account_id;
use crate::services::{dashboard as dashboard_service, progress};
use crate::state::AppState;
use crate::store::LearningStore;

pub async fn list_materials<S: LearningStore>(
    State(state): State<AppState<S>>,
    user: Option<Extension<AuthUser>>,
) -> Result<impl IntoResponse, AppError> {
    let materials =
        progress::list_materials_with_progress(state.store(), account_id(&user)).await?;
    Ok(ok(materials))
}

pub async fn get_material<S: LearningStore>(
    State(state): State<AppState<S>>,
    Path(material_id): Path<String>,
    user: Option<Extension<AuthUser>>,
) -> Result<impl IntoResponse, AppError> {
    let detail = progress::material_detail(state.store(), &material_id, account_id(&user)).await?;
    Ok(ok(detail))
}

pub async fn dashboard<S: LearningStore>(
    State(state): State<AppState<S>>,
    user: Option<Extension<AuthUser>>,
) -> impl IntoResponse {
    ok(dashboard_service::dashboard(state.store(), account_id(&user)).await)
}
