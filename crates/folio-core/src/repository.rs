//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async and return [`FolioResult`].
//! Implementations live in `folio-db`; services depend only on these
//! traits.

use uuid::Uuid;

use crate::error::FolioResult;
use crate::models::{
    article::{Article, CreateArticle, UpdateArticle},
    category::{Category, CreateCategory, ParentLink, UpdateCategory},
    product::{CreateProduct, Product, UpdateProduct},
    role::{CreateRole, Role, UpdateRole},
    user::{CreateUser, UpdateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

impl<T> PaginatedResult<T> {
    /// Number of pages at the current page size (at least one).
    pub fn page_count(&self) -> u64 {
        if self.limit == 0 {
            return 1;
        }
        self.total.div_ceil(self.limit).max(1)
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

pub trait CategoryRepository: Send + Sync {
    fn create(&self, input: CreateCategory) -> impl Future<Output = FolioResult<Category>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = FolioResult<Category>> + Send;
    fn get_by_slug(&self, slug: &str) -> impl Future<Output = FolioResult<Category>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateCategory,
    ) -> impl Future<Output = FolioResult<Category>> + Send;

    /// Move `id` under `new_parent` in one atomic step.
    ///
    /// The write only happens if `id` still hangs off `expected_parent`
    /// and every link in `ancestry` (the chain from `new_parent` up to
    /// the top level, as the caller observed it) is unchanged. Any
    /// difference is a conflict, so a cycle check made against that
    /// chain still holds when the write lands.
    fn set_parent(
        &self,
        id: Uuid,
        expected_parent: Option<Uuid>,
        new_parent: Option<Uuid>,
        ancestry: Vec<ParentLink>,
    ) -> impl Future<Output = FolioResult<Category>> + Send;

    fn delete(&self, id: Uuid) -> impl Future<Output = FolioResult<()>> + Send;

    /// Every category, ordered by `sort_order` then id.
    fn list_all(&self) -> impl Future<Output = FolioResult<Vec<Category>>> + Send;

    /// Number of direct children of `id`.
    fn count_children(&self, id: Uuid) -> impl Future<Output = FolioResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Roles & users
// ---------------------------------------------------------------------------

pub trait RoleRepository: Send + Sync {
    fn create(&self, input: CreateRole) -> impl Future<Output = FolioResult<Role>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = FolioResult<Role>> + Send;
    fn get_by_name(&self, name: &str) -> impl Future<Output = FolioResult<Role>> + Send;
    fn update(&self, id: Uuid, input: UpdateRole)
    -> impl Future<Output = FolioResult<Role>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = FolioResult<()>> + Send;
    fn list(&self) -> impl Future<Output = FolioResult<Vec<Role>>> + Send;
}

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = FolioResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = FolioResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = FolioResult<User>> + Send;
    fn update(&self, id: Uuid, input: UpdateUser)
    -> impl Future<Output = FolioResult<User>> + Send;
    /// Soft-delete: clears the active flag.
    fn delete(&self, id: Uuid) -> impl Future<Output = FolioResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = FolioResult<PaginatedResult<User>>> + Send;
    /// Number of users referencing `role_id`.
    fn count_by_role(&self, role_id: Uuid) -> impl Future<Output = FolioResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

pub trait ArticleRepository: Send + Sync {
    fn create(&self, input: CreateArticle) -> impl Future<Output = FolioResult<Article>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = FolioResult<Article>> + Send;
    fn get_by_slug(&self, slug: &str) -> impl Future<Output = FolioResult<Article>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateArticle,
    ) -> impl Future<Output = FolioResult<Article>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = FolioResult<()>> + Send;
    fn list_by_category(
        &self,
        category_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = FolioResult<PaginatedResult<Article>>> + Send;
    /// Number of articles referencing `category_id`.
    fn count_by_category(&self, category_id: Uuid)
    -> impl Future<Output = FolioResult<u64>> + Send;
}

pub trait ProductRepository: Send + Sync {
    fn create(&self, input: CreateProduct) -> impl Future<Output = FolioResult<Product>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = FolioResult<Product>> + Send;
    fn get_by_slug(&self, slug: &str) -> impl Future<Output = FolioResult<Product>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateProduct,
    ) -> impl Future<Output = FolioResult<Product>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = FolioResult<()>> + Send;
    fn list_by_category(
        &self,
        category_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = FolioResult<PaginatedResult<Product>>> + Send;
    /// Number of products referencing `category_id`.
    fn count_by_category(&self, category_id: Uuid)
    -> impl Future<Output = FolioResult<u64>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        let page = PaginatedResult::<()> {
            items: vec![],
            total: 11,
            offset: 0,
            limit: 5,
        };
        assert_eq!(page.page_count(), 3);
    }

    #[test]
    fn empty_result_has_one_page() {
        let page = PaginatedResult::<()> {
            items: vec![],
            total: 0,
            offset: 0,
            limit: 50,
        };
        assert_eq!(page.page_count(), 1);
    }
}
