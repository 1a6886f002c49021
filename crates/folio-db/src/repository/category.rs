//! SurrealDB implementation of [`CategoryRepository`].

use chrono::{DateTime, Utc};
use folio_core::error::FolioResult;
use folio_core::models::category::{
    Category, CategoryStatus, CreateCategory, ParentLink, UpdateCategory,
};
use folio_core::repository::CategoryRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct CategoryRow {
    name: String,
    slug: String,
    description: Option<String>,
    parent_id: Option<String>,
    sort_order: i64,
    is_featured: bool,
    status: String,
    image: Option<String>,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CategoryRowWithId {
    record_id: String,
    name: String,
    slug: String,
    description: Option<String>,
    parent_id: Option<String>,
    sort_order: i64,
    is_featured: bool,
    status: String,
    image: Option<String>,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_status(s: &str) -> Result<CategoryStatus, DbError> {
    match s {
        "Active" => Ok(CategoryStatus::Active),
        "Hidden" => Ok(CategoryStatus::Hidden),
        other => Err(DbError::InvalidRecord(format!(
            "unknown category status: {other}"
        ))),
    }
}

fn status_to_string(s: CategoryStatus) -> &'static str {
    match s {
        CategoryStatus::Active => "Active",
        CategoryStatus::Hidden => "Hidden",
    }
}

const STALE_LINK: &str = "category parent link changed";

/// One transaction that bumps the hierarchy revision row, re-reads every
/// observed parent link, aborts on any difference and otherwise rewrites
/// the parent of `$id`. Link `i` binds `$c{i}` (child) and, when not top
/// level, `$p{i}` (expected parent).
///
/// Every structural writer touches `category_tree:hierarchy`, so two
/// overlapping transactions always collide on it even when they move
/// different records.
fn reparent_transaction(links: &[ParentLink]) -> String {
    let mut sql = String::from(
        "BEGIN TRANSACTION;\n\
         UPSERT category_tree:hierarchy SET revision = (revision ?? 0) + 1;\n",
    );
    for (i, link) in links.iter().enumerate() {
        let expected = match link.parent_id {
            Some(_) => format!("$p{i}"),
            None => "NONE".to_string(),
        };
        sql.push_str(&format!(
            "LET $l{i} = (SELECT VALUE parent_id FROM type::record('category', $c{i}));\n\
             IF array::len($l{i}) = 0 OR $l{i}[0] != {expected} {{ THROW \"{STALE_LINK}\"; }};\n"
        ));
    }
    sql.push_str(
        "UPDATE type::record('category', $id) SET \
         parent_id = $new_parent, updated_at = time::now();\n\
         COMMIT TRANSACTION;",
    );
    sql
}

fn is_aborted_transaction(message: &str) -> bool {
    let lower = message.to_lowercase();
    message.contains(STALE_LINK)
        || lower.contains("failed transaction")
        || lower.contains("conflict")
}

fn parse_optional(raw: Option<String>, what: &str) -> Result<Option<Uuid>, DbError> {
    raw.as_deref().map(|r| parse_uuid(r, what)).transpose()
}

impl CategoryRow {
    fn into_category(self, id: Uuid) -> Result<Category, DbError> {
        Ok(Category {
            id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            parent_id: parse_optional(self.parent_id, "parent")?,
            sort_order: self.sort_order,
            is_featured: self.is_featured,
            status: parse_status(&self.status)?,
            image: self.image,
            created_by: parse_optional(self.created_by, "creator")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl CategoryRowWithId {
    fn try_into_category(self) -> Result<Category, DbError> {
        let id = parse_uuid(&self.record_id, "category")?;
        CategoryRow {
            name: self.name,
            slug: self.slug,
            description: self.description,
            parent_id: self.parent_id,
            sort_order: self.sort_order,
            is_featured: self.is_featured,
            status: self.status,
            image: self.image,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_category(id)
    }
}

/// SurrealDB implementation of the Category repository.
#[derive(Clone)]
pub struct SurrealCategoryRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCategoryRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn first_row(
        &self,
        query: &'static str,
        id: Uuid,
        binds: Vec<(&'static str, Option<String>)>,
    ) -> Result<Option<Category>, DbError> {
        let mut builder = self.db.query(query).bind(("id", id.to_string()));
        for bind in binds {
            builder = builder.bind(bind);
        }
        let mut result = builder
            .await?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;
        let rows: Vec<CategoryRow> = result.take(0)?;
        rows.into_iter()
            .next()
            .map(|row| row.into_category(id))
            .transpose()
    }
}

impl<C: Connection> CategoryRepository for SurrealCategoryRepository<C> {
    async fn create(&self, input: CreateCategory) -> FolioResult<Category> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('category', $id) SET \
                 name = $name, slug = $slug, \
                 description = $description, \
                 parent_id = $parent_id, \
                 sort_order = $sort_order, \
                 is_featured = $is_featured, \
                 status = $status, \
                 image = $image, \
                 created_by = $created_by",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("slug", input.slug))
            .bind(("description", input.description))
            .bind(("parent_id", input.parent_id.map(|p| p.to_string())))
            .bind(("sort_order", input.sort_order))
            .bind(("is_featured", input.is_featured))
            .bind(("status", status_to_string(input.status).to_string()))
            .bind(("image", input.image))
            .bind(("created_by", input.created_by.map(|u| u.to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<CategoryRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "category".into(),
            id: id_str,
        })?;

        Ok(row.into_category(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> FolioResult<Category> {
        self.first_row("SELECT * FROM type::record('category', $id)", id, vec![])
            .await?
            .ok_or_else(|| {
                DbError::NotFound {
                    entity: "category".into(),
                    id: id.to_string(),
                }
                .into()
            })
    }

    async fn get_by_slug(&self, slug: &str) -> FolioResult<Category> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM category WHERE slug = $slug")
            .bind(("slug", slug.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CategoryRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "category".into(),
            id: format!("slug={slug}"),
        })?;

        Ok(row.try_into_category()?)
    }

    async fn update(&self, id: Uuid, input: UpdateCategory) -> FolioResult<Category> {
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
        if input.sort_order.is_some() {
            sets.push("sort_order = $sort_order");
        }
        if input.is_featured.is_some() {
            sets.push("is_featured = $is_featured");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.image.is_some() {
            sets.push("image = $image");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('category', $id) SET {}",
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
        if let Some(sort_order) = input.sort_order {
            builder = builder.bind(("sort_order", sort_order));
        }
        if let Some(is_featured) = input.is_featured {
            builder = builder.bind(("is_featured", is_featured));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status_to_string(status).to_string()));
        }
        if let Some(image) = input.image {
            builder = builder.bind(("image", image));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<CategoryRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "category".into(),
            id: id_str,
        })?;

        Ok(row.into_category(id)?)
    }

    async fn set_parent(
        &self,
        id: Uuid,
        expected_parent: Option<Uuid>,
        new_parent: Option<Uuid>,
        ancestry: Vec<ParentLink>,
    ) -> FolioResult<Category> {
        let mut links = Vec::with_capacity(ancestry.len() + 1);
        links.push(ParentLink {
            id,
            parent_id: expected_parent,
        });
        links.extend(ancestry);

        let mut builder = self
            .db
            .query(reparent_transaction(&links))
            .bind(("id", id.to_string()))
            .bind(("new_parent", new_parent.map(|p| p.to_string())));
        for (i, link) in links.iter().enumerate() {
            builder = builder.bind((format!("c{i}"), link.id.to_string()));
            if let Some(parent) = link.parent_id {
                builder = builder.bind((format!("p{i}"), parent.to_string()));
            }
        }

        let outcome = match builder.await {
            Ok(response) => response.check().map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = outcome {
            let message = e.to_string();
            if !is_aborted_transaction(&message) {
                return Err(DbError::Query(message).into());
            }
            // Either the record is gone or a link it was checked against moved.
            self.get_by_id(id).await?;
            return Err(DbError::StaleWrite {
                entity: "category".into(),
                id: id.to_string(),
            }
            .into());
        }

        self.get_by_id(id).await
    }

    async fn delete(&self, id: Uuid) -> FolioResult<()> {
        self.db
            .query("DELETE type::record('category', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn list_all(&self) -> FolioResult<Vec<Category>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM category ORDER BY sort_order ASC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CategoryRowWithId> = result.take(0).map_err(DbError::from)?;

        let mut categories = rows
            .into_iter()
            .map(|row| row.try_into_category())
            .collect::<Result<Vec<_>, DbError>>()?;
        categories.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id)));

        Ok(categories)
    }

    async fn count_children(&self, id: Uuid) -> FolioResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM category \
                 WHERE parent_id = $parent_id GROUP ALL",
            )
            .bind(("parent_id", id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;

        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
