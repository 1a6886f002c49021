//! SurrealDB repository implementations.

mod article;
mod category;
mod product;
mod role;
mod user;

pub use article::SurrealArticleRepository;
pub use category::SurrealCategoryRepository;
pub use product::SurrealProductRepository;
pub use role::SurrealRoleRepository;
pub use user::SurrealUserRepository;

/// Parse a UUID stored as a string column.
pub(crate) fn parse_uuid(raw: &str, what: &str) -> Result<uuid::Uuid, crate::DbError> {
    uuid::Uuid::parse_str(raw)
        .map_err(|e| crate::DbError::InvalidRecord(format!("invalid {what} UUID: {e}")))
}
