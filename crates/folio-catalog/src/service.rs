//! Category hierarchy manager.
//!
//! Within one service, structural mutations and slug-changing updates
//! run one at a time behind an async mutex. Across services sharing a
//! store, the reparent write is a single transaction that re-checks the
//! moved node and every parent link of the new parent's ancestry; a move
//! validated against links that changed since fails as a conflict.
//! Slug uniqueness is backed by the store's unique index.

use folio_core::error::{FolioError, FolioResult};
use folio_core::models::category::{
    Category, CategoryNode, CategoryStatus, CreateCategory, UpdateCategory,
};
use folio_core::repository::{ArticleRepository, CategoryRepository, ProductRepository};
use folio_core::slug::slugify;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::tree::{CategoryTree, TreeDepth};

/// Caller input for [`CategoryService::create`]. The slug is derived
/// from `name`.
#[derive(Debug, Clone, Default)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub sort_order: i64,
    pub is_featured: bool,
    pub status: CategoryStatus,
    pub image: Option<String>,
    pub created_by: Option<Uuid>,
}

/// Owns the category hierarchy. Articles and products are consulted
/// only to refuse deleting a category they still reference.
pub struct CategoryService<C, A, P>
where
    C: CategoryRepository,
    A: ArticleRepository,
    P: ProductRepository,
{
    categories: C,
    articles: A,
    products: P,
    structure: Mutex<()>,
}

impl<C, A, P> CategoryService<C, A, P>
where
    C: CategoryRepository,
    A: ArticleRepository,
    P: ProductRepository,
{
    pub fn new(categories: C, articles: A, products: P) -> Self {
        Self {
            categories,
            articles,
            products,
            structure: Mutex::new(()),
        }
    }

    pub async fn get(&self, id: Uuid) -> FolioResult<Category> {
        self.categories.get_by_id(id).await
    }

    pub async fn get_by_slug(&self, slug: &str) -> FolioResult<Category> {
        self.categories.get_by_slug(slug).await
    }

    pub async fn create(&self, input: NewCategory) -> FolioResult<Category> {
        let name = input.name.trim().to_string();
        let slug = derive_slug(&name)?;

        let _guard = self.structure.lock().await;

        if let Some(parent_id) = input.parent_id {
            self.categories.get_by_id(parent_id).await?;
        }
        self.ensure_slug_free(&slug, None).await?;

        let category = self
            .categories
            .create(CreateCategory {
                name,
                slug,
                description: input.description,
                parent_id: input.parent_id,
                sort_order: input.sort_order,
                is_featured: input.is_featured,
                status: input.status,
                image: input.image,
                created_by: input.created_by,
            })
            .await?;

        info!(
            category_id = %category.id,
            slug = %category.slug,
            parent_id = ?category.parent_id,
            "Category created"
        );
        Ok(category)
    }

    /// Apply non-structural changes. A new name re-derives the slug;
    /// any slug supplied directly is ignored.
    pub async fn update(&self, id: Uuid, mut input: UpdateCategory) -> FolioResult<Category> {
        input.slug = None;

        let _guard = self.structure.lock().await;
        if let Some(name) = input.name.take() {
            let name = name.trim().to_string();
            let slug = derive_slug(&name)?;
            self.ensure_slug_free(&slug, Some(id)).await?;
            input.name = Some(name);
            input.slug = Some(slug);
        }

        let category = self.categories.update(id, input).await?;
        info!(category_id = %id, slug = %category.slug, "Category updated");
        Ok(category)
    }

    /// Move `id` under `new_parent` (`None` makes it top level).
    ///
    /// Rejected with [`FolioError::Cycle`] when `new_parent` is `id`
    /// itself or anywhere in its subtree.
    pub async fn reparent(&self, id: Uuid, new_parent: Option<Uuid>) -> FolioResult<Category> {
        let _guard = self.structure.lock().await;

        let current = self.categories.get_by_id(id).await?;
        let tree = self.snapshot().await?;

        if let Some(parent_id) = new_parent {
            if tree.would_create_cycle(id, new_parent) {
                debug!(category_id = %id, %parent_id, "Reparent rejected: cycle");
                return Err(FolioError::Cycle { id, parent_id });
            }
            self.categories.get_by_id(parent_id).await?;
            // Created after the snapshot: its ancestry is unknown here.
            if !tree.contains(parent_id) {
                return Err(FolioError::conflict(format!(
                    "category {parent_id} appeared during the move, retry"
                )));
            }
        }

        if current.parent_id == new_parent {
            return Ok(current);
        }

        let moved = self
            .categories
            .set_parent(id, current.parent_id, new_parent, tree.ancestry(new_parent))
            .await?;

        info!(
            category_id = %id,
            from = ?current.parent_id,
            to = ?new_parent,
            "Category reparented"
        );
        Ok(moved)
    }

    /// Ids of every category below `id`, at any depth.
    pub async fn list_descendant_ids(&self, id: Uuid) -> FolioResult<Vec<Uuid>> {
        self.categories.get_by_id(id).await?;
        Ok(self.snapshot().await?.descendants(id))
    }

    /// Remove a leaf category that no article or product references.
    ///
    /// Returns the removed record so the caller can release its image.
    pub async fn delete(&self, id: Uuid) -> FolioResult<Category> {
        let _guard = self.structure.lock().await;

        let category = self.categories.get_by_id(id).await?;

        let children = self.categories.count_children(id).await?;
        if children > 0 {
            return Err(FolioError::conflict(format!(
                "category {} has {children} subcategories",
                category.slug
            )));
        }

        let articles = self.articles.count_by_category(id).await?;
        if articles > 0 {
            return Err(FolioError::conflict(format!(
                "category {} is used by {articles} article(s)",
                category.slug
            )));
        }

        let products = self.products.count_by_category(id).await?;
        if products > 0 {
            return Err(FolioError::conflict(format!(
                "category {} is used by {products} product(s)",
                category.slug
            )));
        }

        self.categories.delete(id).await?;
        info!(
            category_id = %id,
            slug = %category.slug,
            image = ?category.image,
            "Category deleted"
        );
        Ok(category)
    }

    /// Nested view of the hierarchy: the whole forest for `None`, or the
    /// subtree under `Some(root)`.
    pub async fn get_tree(
        &self,
        root: Option<Uuid>,
        depth: TreeDepth,
    ) -> FolioResult<Vec<CategoryNode>> {
        if let Some(root_id) = root {
            self.categories.get_by_id(root_id).await?;
        }
        Ok(self.snapshot().await?.build(root, depth))
    }

    async fn snapshot(&self) -> FolioResult<CategoryTree> {
        Ok(CategoryTree::new(self.categories.list_all().await?))
    }

    async fn ensure_slug_free(&self, slug: &str, except: Option<Uuid>) -> FolioResult<()> {
        match self.categories.get_by_slug(slug).await {
            Ok(existing) if Some(existing.id) != except => Err(FolioError::conflict(format!(
                "category slug {slug} is already in use"
            ))),
            Ok(_) | Err(FolioError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

fn derive_slug(name: &str) -> FolioResult<String> {
    if name.is_empty() {
        return Err(FolioError::validation("category name is required"));
    }
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(FolioError::validation(format!(
            "category name {name:?} has no letters or digits"
        )));
    }
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_are_rejected() {
        assert!(matches!(
            derive_slug(""),
            Err(FolioError::Validation { .. })
        ));
        assert!(matches!(
            derive_slug("!!!"),
            Err(FolioError::Validation { .. })
        ));
    }

    #[test]
    fn slug_follows_the_name() {
        assert_eq!(derive_slug("Tech & Science").unwrap(), "tech-and-science");
        assert_eq!(derive_slug("Thời sự").unwrap(), "thoi-su");
    }
}
