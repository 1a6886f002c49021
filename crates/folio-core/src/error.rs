//! Error types for the Folio system.

use thiserror::Error;
use uuid::Uuid;

/// Reasons an authentication attempt is rejected.
///
/// Every variant maps to the same 401 status but carries its own
/// user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("not authorized, no token provided")]
    MissingToken,

    #[error("token expired, please login again")]
    TokenExpired,

    #[error("invalid token, please login again")]
    TokenInvalid,

    #[error("user not found")]
    UserNotFound,

    #[error("account is inactive")]
    UserInactive,

    #[error("invalid credentials")]
    InvalidCredentials,
}

#[derive(Debug, Error)]
pub enum FolioError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Moving {id} under {parent_id} would create a cycle")]
    Cycle { id: Uuid, parent_id: Uuid },

    #[error("Authentication failed: {0}")]
    Authentication(AuthFailure),

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FolioError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    /// `true` for plain conflicts and for cycle rejections.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::Cycle { .. })
    }

    /// HTTP status a transport boundary should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::Authentication(_) => 401,
            Self::Forbidden { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } | Self::Cycle { .. } => 409,
            Self::Database(_) | Self::Crypto(_) | Self::Internal(_) => 500,
        }
    }
}

impl From<AuthFailure> for FolioError {
    fn from(failure: AuthFailure) -> Self {
        Self::Authentication(failure)
    }
}

pub type FolioResult<T> = Result<T, FolioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_share_one_status() {
        let failures = [
            AuthFailure::MissingToken,
            AuthFailure::TokenExpired,
            AuthFailure::TokenInvalid,
            AuthFailure::UserNotFound,
            AuthFailure::UserInactive,
            AuthFailure::InvalidCredentials,
        ];
        let messages: std::collections::HashSet<String> =
            failures.iter().map(|f| f.to_string()).collect();
        assert_eq!(messages.len(), failures.len());
        for failure in failures {
            assert_eq!(FolioError::from(failure).status_code(), 401);
        }
    }

    #[test]
    fn cycle_is_a_conflict() {
        let err = FolioError::Cycle {
            id: Uuid::new_v4(),
            parent_id: Uuid::new_v4(),
        };
        assert!(err.is_conflict());
        assert_eq!(err.status_code(), 409);
        assert!(!FolioError::validation("x").is_conflict());
    }

    #[test]
    fn boundary_statuses_are_distinct() {
        assert_eq!(FolioError::validation("bad").status_code(), 400);
        assert_eq!(FolioError::forbidden("no").status_code(), 403);
        assert_eq!(FolioError::not_found("category", "x").status_code(), 404);
        assert_eq!(FolioError::conflict("dup").status_code(), 409);
    }
}
