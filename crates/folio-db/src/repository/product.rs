//! SurrealDB implementation of [`ProductRepository`].

use chrono::{DateTime, Utc};
use folio_core::error::FolioResult;
use folio_core::models::product::{CreateProduct, Product, UpdateProduct};
use folio_core::repository::{PaginatedResult, Pagination, ProductRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ProductRow {
    name: String,
    slug: String,
    description: String,
    short_description: Option<String>,
    price: i64,
    sale_price: Option<i64>,
    sku: String,
    quantity: i64,
    is_available: bool,
    is_featured: bool,
    category_id: String,
    featured_image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ProductRowWithId {
    record_id: String,
    name: String,
    slug: String,
    description: String,
    short_description: Option<String>,
    price: i64,
    sale_price: Option<i64>,
    sku: String,
    quantity: i64,
    is_available: bool,
    is_featured: bool,
    category_id: String,
    featured_image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

impl ProductRow {
    fn into_product(self, id: Uuid) -> Result<Product, DbError> {
        Ok(Product {
            id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            short_description: self.short_description,
            price: self.price,
            sale_price: self.sale_price,
            sku: self.sku,
            quantity: self.quantity,
            is_available: self.is_available,
            is_featured: self.is_featured,
            category_id: parse_uuid(&self.category_id, "category")?,
            featured_image: self.featured_image,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ProductRowWithId {
    fn try_into_product(self) -> Result<Product, DbError> {
        let id = parse_uuid(&self.record_id, "product")?;
        ProductRow {
            name: self.name,
            slug: self.slug,
            description: self.description,
            short_description: self.short_description,
            price: self.price,
            sale_price: self.sale_price,
            sku: self.sku,
            quantity: self.quantity,
            is_available: self.is_available,
            is_featured: self.is_featured,
            category_id: self.category_id,
            featured_image: self.featured_image,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_product(id)
    }
}

/// SurrealDB implementation of the Product repository.
#[derive(Clone)]
pub struct SurrealProductRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProductRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ProductRepository for SurrealProductRepository<C> {
    async fn create(&self, input: CreateProduct) -> FolioResult<Product> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('product', $id) SET \
                 name = $name, slug = $slug, description = $description, \
                 short_description = $short_description, \
                 price = $price, sale_price = $sale_price, \
                 sku = $sku, quantity = $quantity, \
                 category_id = $category_id, featured_image = $featured_image",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("slug", input.slug))
            .bind(("description", input.description))
            .bind(("short_description", input.short_description))
            .bind(("price", input.price))
            .bind(("sale_price", input.sale_price))
            .bind(("sku", input.sku))
            .bind(("quantity", input.quantity))
            .bind(("category_id", input.category_id.to_string()))
            .bind(("featured_image", input.featured_image))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ProductRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "product".into(),
            id: id_str,
        })?;

        Ok(row.into_product(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> FolioResult<Product> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('product', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProductRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "product".into(),
            id: id_str,
        })?;

        Ok(row.into_product(id)?)
    }

    async fn get_by_slug(&self, slug: &str) -> FolioResult<Product> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM product WHERE slug = $slug")
            .bind(("slug", slug.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProductRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "product".into(),
            id: format!("slug={slug}"),
        })?;

        Ok(row.try_into_product()?)
    }

    async fn update(&self, id: Uuid, input: UpdateProduct) -> FolioResult<Product> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.slug.is_some() {
            sets.push("slug = $slug");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.price.is_some() {
            sets.push("price = $price");
        }
        if input.sale_price.is_some() {
            sets.push("sale_price = $sale_price");
        }
        if input.quantity.is_some() {
            sets.push("quantity = $quantity");
        }
        if input.is_available.is_some() {
            sets.push("is_available = $is_available");
        }
        if input.is_featured.is_some() {
            sets.push("is_featured = $is_featured");
        }
        if input.category_id.is_some() {
            sets.push("category_id = $category_id");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('product', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(slug) = input.slug {
            builder = builder.bind(("slug", slug));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(price) = input.price {
            builder = builder.bind(("price", price));
        }
        if let Some(sale_price) = input.sale_price {
            builder = builder.bind(("sale_price", sale_price));
        }
        if let Some(quantity) = input.quantity {
            builder = builder.bind(("quantity", quantity));
        }
        if let Some(is_available) = input.is_available {
            builder = builder.bind(("is_available", is_available));
        }
        if let Some(is_featured) = input.is_featured {
            builder = builder.bind(("is_featured", is_featured));
        }
        if let Some(category_id) = input.category_id {
            builder = builder.bind(("category_id", category_id.to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ProductRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "product".into(),
            id: id_str,
        })?;

        Ok(row.into_product(id)?)
    }

    async fn delete(&self, id: Uuid) -> FolioResult<()> {
        self.db
            .query("DELETE type::record('product', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_by_category(
        &self,
        category_id: Uuid,
        pagination: Pagination,
    ) -> FolioResult<PaginatedResult<Product>> {
        let total = self.count_by_category(category_id).await?;

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM product \
                 WHERE category_id = $category_id \
                 ORDER BY is_featured DESC, name ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("category_id", category_id.to_string()))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProductRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_product())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn count_by_category(&self, category_id: Uuid) -> FolioResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM product \
                 WHERE category_id = $category_id GROUP ALL",
            )
            .bind(("category_id", category_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;

        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
