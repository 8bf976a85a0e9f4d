use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::{extract_token, verify_token};
use crate::state::AppState;
use crate::store::LearningStore;

/// Resolves the bearer token into an `AuthUser` extension when it verifies.
/// Requests without a valid token continue anonymously; handlers that need an
/// account reject them.
pub async fn optional_auth<S: LearningStore>(
    State(state): State<AppState<S>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_token(req.headers()) else {
        return next.run(req).await;
    };

    match verify_token(&token, state.config().jwt_secret.as_deref()) {
        Ok(user) => {
            req.extensions_mut().insert(user);
        }
        Err(err) => {
            tracing::debug!(error = %err, "ignoring unverifiable token");
        }
    }

    next.run(req).await
}
