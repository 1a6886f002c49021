//! SurrealDB implementation of [`ArticleRepository`].

use chrono::{DateTime, Utc};
use folio_core::error::FolioResult;
use folio_core::models::article::{Article, ArticleStatus, CreateArticle, UpdateArticle};
use folio_core::repository::{ArticleRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ArticleRow {
    title: String,
    slug: String,
    body: String,
    excerpt: Option<String>,
    category_id: String,
    author_id: String,
    status: String,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ArticleRowWithId {
    record_id: String,
    title: String,
    slug: String,
    body: String,
    excerpt: Option<String>,
    category_id: String,
    author_id: String,
    status: String,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_status(s: &str) -> Result<ArticleStatus, DbError> {
    match s {
        "Draft" => Ok(ArticleStatus::Draft),
        "Published" => Ok(ArticleStatus::Published),
        "Archived" => Ok(ArticleStatus::Archived),
        other => Err(DbError::InvalidRecord(format!(
            "unknown article status: {other}"
        ))),
    }
}

fn status_to_string(s: ArticleStatus) -> &'static str {
    match s {
        ArticleStatus::Draft => "Draft",
        ArticleStatus::Published => "Published",
        ArticleStatus::Archived => "Archived",
    }
}

impl ArticleRow {
    fn into_article(self, id: Uuid) -> Result<Article, DbError> {
        Ok(Article {
            id,
            title: self.title,
            slug: self.slug,
            body: self.body,
            excerpt: self.excerpt,
            category_id: parse_uuid(&self.category_id, "category")?,
            author_id: parse_uuid(&self.author_id, "author")?,
            status: parse_status(&self.status)?,
            published_at: self.published_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ArticleRowWithId {
    fn try_into_article(self) -> Result<Article, DbError> {
        let id = parse_uuid(&self.record_id, "article")?;
        ArticleRow {
            title: self.title,
            slug: self.slug,
            body: self.body,
            excerpt: self.excerpt,
            category_id: self.category_id,
            author_id: self.author_id,
            status: self.status,
            published_at: self.published_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_article(id)
    }
}

/// SurrealDB implementation of the Article repository.
#[derive(Clone)]
pub struct SurrealArticleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealArticleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ArticleRepository for SurrealArticleRepository<C> {
    async fn create(&self, input: CreateArticle) -> FolioResult<Article> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('article', $id) SET \
                 title = $title, slug = $slug, body = $body, \
                 excerpt = $excerpt, \
                 category_id = $category_id, author_id = $author_id, \
                 status = 'Draft', published_at = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("title", input.title))
            .bind(("slug", input.slug))
            .bind(("body", input.body))
            .bind(("excerpt", input.excerpt))
            .bind(("category_id", input.category_id.to_string()))
            .bind(("author_id", input.author_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ArticleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "article".into(),
            id: id_str,
        })?;

        Ok(row.into_article(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> FolioResult<Article> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('article', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ArticleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "article".into(),
            id: id_str,
        })?;

        Ok(row.into_article(id)?)
    }

    async fn get_by_slug(&self, slug: &str) -> FolioResult<Article> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM article WHERE slug = $slug")
            .bind(("slug", slug.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ArticleRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "article".into(),
            id: format!("slug={slug}"),
        })?;

        Ok(row.try_into_article()?)
    }

    async fn update(&self, id: Uuid, input: UpdateArticle) -> FolioResult<Article> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.slug.is_some() {
            sets.push("slug = $slug");
        }
        if input.body.is_some() {
            sets.push("body = $body");
        }
        if input.category_id.is_some() {
            sets.push("category_id = $category_id");
        }
        if let Some(status) = input.status {
            sets.push("status = $status");
            // First publication stamps the date; later edits keep it.
            if status == ArticleStatus::Published {
                sets.push("published_at = published_at ?? time::now()");
            }
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('article', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(slug) = input.slug {
            builder = builder.bind(("slug", slug));
        }
        if let Some(body) = input.body {
            builder = builder.bind(("body", body));
        }
        if let Some(category_id) = input.category_id {
            builder = builder.bind(("category_id", category_id.to_string()));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status_to_string(status).to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ArticleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "article".into(),
            id: id_str,
        })?;

        Ok(row.into_article(id)?)
    }

    async fn delete(&self, id: Uuid) -> FolioResult<()> {
        self.db
            .query("DELETE type::record('article', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_by_category(
        &self,
        category_id: Uuid,
        pagination: Pagination,
    ) -> FolioResult<PaginatedResult<Article>> {
        let category_id_str = category_id.to_string();
        let total = self.count_by_category(category_id).await?;

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM article \
                 WHERE category_id = $category_id \
                 ORDER BY created_at DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("category_id", category_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ArticleRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_article())
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
                "SELECT count() AS total FROM article \
                 WHERE category_id = $category_id GROUP ALL",
            )
            .bind(("category_id", category_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;

        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
