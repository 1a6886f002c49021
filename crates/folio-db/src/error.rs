//! Database-specific error types and conversions.

use folio_core::error::FolioError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Invalid store configuration: {0}")]
    Config(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed record: {0}")]
    InvalidRecord(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Concurrent modification of {entity} {id}")]
    StaleWrite { entity: String, id: String },
}

impl DbError {
    /// Whether the store refused a write because a unique index already
    /// holds the value ("Database index `idx_*` already contains ...").
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DbError::Surreal(e) => mentions_index_clash(&e.to_string()),
            DbError::Query(message) => mentions_index_clash(message),
            _ => false,
        }
    }

    /// Whether an optimistic transaction lost a race with another writer
    /// and may be retried.
    pub fn is_write_conflict(&self) -> bool {
        let message = match self {
            DbError::Surreal(e) => e.to_string(),
            DbError::Query(message) => message.clone(),
            _ => return false,
        };
        let lower = message.to_lowercase();
        lower.contains("read or write conflict") || lower.contains("transaction conflict")
    }
}

fn mentions_index_clash(message: &str) -> bool {
    message.contains("idx_") && message.contains("already contains")
}

impl From<DbError> for FolioError {
    fn from(err: DbError) -> Self {
        if err.is_unique_violation() {
            return FolioError::Conflict {
                message: format!("duplicate value: {err}"),
            };
        }
        if err.is_write_conflict() {
            return FolioError::Conflict {
                message: format!("concurrent write, retry: {err}"),
            };
        }
        match err {
            DbError::NotFound { entity, id } => FolioError::NotFound { entity, id },
            DbError::StaleWrite { entity, id } => FolioError::Conflict {
                message: format!("{entity} {id} was modified concurrently, retry"),
            },
            other => FolioError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_clash_becomes_a_conflict() {
        let err = DbError::Query(
            "Database index `idx_category_slug` already contains 'news', \
             with record `category:abc`"
                .into(),
        );
        assert!(err.is_unique_violation());
        assert!(FolioError::from(err).is_conflict());
    }

    #[test]
    fn other_query_failures_stay_database_errors() {
        let err = DbError::Query("Found NONE for field `name`".into());
        assert!(!err.is_unique_violation());
        assert!(matches!(FolioError::from(err), FolioError::Database(_)));
    }

    #[test]
    fn lost_transaction_race_is_a_conflict() {
        let err = DbError::Query(
            "Failed to commit transaction due to a read or write conflict. \
             This transaction can be retried"
                .into(),
        );
        assert!(err.is_write_conflict());
        assert!(FolioError::from(err).is_conflict());
    }

    #[test]
    fn stale_write_is_a_conflict() {
        let err = DbError::StaleWrite {
            entity: "category".into(),
            id: "abc".into(),
        };
        assert!(FolioError::from(err).is_conflict());
    }
}
