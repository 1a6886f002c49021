//! Authentication error types.

use folio_core::error::{AuthFailure, FolioError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("account is inactive")]
    AccountInactive,

    #[error("user not found")]
    UserNotFound,

    #[error("no bearer token provided")]
    MissingToken,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl AuthError {
    /// The 401 subtype this error surfaces as, if any.
    pub fn failure(&self) -> Option<AuthFailure> {
        match self {
            AuthError::InvalidCredentials => Some(AuthFailure::InvalidCredentials),
            AuthError::AccountInactive => Some(AuthFailure::UserInactive),
            AuthError::UserNotFound => Some(AuthFailure::UserNotFound),
            AuthError::MissingToken => Some(AuthFailure::MissingToken),
            AuthError::TokenExpired => Some(AuthFailure::TokenExpired),
            AuthError::TokenInvalid(_) => Some(AuthFailure::TokenInvalid),
            AuthError::WeakPassword { .. } | AuthError::Crypto(_) => None,
        }
    }
}

impl From<AuthError> for FolioError {
    fn from(err: AuthError) -> Self {
        if let Some(failure) = err.failure() {
            return FolioError::Authentication(failure);
        }
        match err {
            AuthError::WeakPassword { .. } => FolioError::validation(err.to_string()),
            AuthError::Crypto(msg) => FolioError::Crypto(msg),
            _ => FolioError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_errors_become_authentication_failures() {
        let err: FolioError = AuthError::TokenInvalid("bad signature".into()).into();
        assert!(matches!(
            err,
            FolioError::Authentication(AuthFailure::TokenInvalid)
        ));
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn weak_password_is_a_validation_error() {
        let err: FolioError = AuthError::WeakPassword { min: 8 }.into();
        assert_eq!(err.status_code(), 400);
    }
}
