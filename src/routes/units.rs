use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Extension;

use crate::auth::AuthUser;
use crate::response::{ok, AppError};
use crate::routes::account_id;
use crate::services::study;
use crate::state::AppState;
use crate::store::LearningStore;

pub async fn unit_session<S: LearningStore>(
    State(state): State<AppState<S>>,
    Path(unit_id): Path<String>,
    user: Option<Extension<AuthUser>>,
) -> Result<impl IntoResponse, AppError> {
    let session = study::unit_session(state.store(), account_id(&user), &unit_id).await?;
    Ok(ok(session))
}
