pub mod dashboard;
pub mod progress;
pub mod review;
pub mod review_session;
pub mod statistics;
pub mod study;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolves the account for operations that cannot run anonymously.
pub(crate) fn require_account(account_id: Option<&str>) -> Result<&str, ServiceError> {
    match account_id {
        Some(id) if !id.trim().is_empty() => Ok(id),
        _ => Err(ServiceError::Unauthorized(
            "an authenticated account is required".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_is_passed_through_unmodified() {
        assert_eq!(require_account(Some(" a ")).unwrap(), " a ");
        assert_eq!(require_account(Some("learner-1")).unwrap(), "learner-1");
    }

    #[test]
    fn blank_or_missing_account_is_unauthorized() {
        assert!(matches!(require_account(None), Err(ServiceError::Unauthorized(_))));
        assert!(matches!(require_account(Some("   ")), Err(ServiceError::Unauthorized(_))));
    }
}
