//! Integration tests for the SurrealDB article repository.

use folio_core::models::article::{ArticleStatus, CreateArticle, UpdateArticle};
use folio_core::repository::{ArticleRepository, Pagination};
use folio_db::repository::SurrealArticleRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> SurrealArticleRepository<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    folio_db::run_migrations(&db).await.unwrap();
    SurrealArticleRepository::new(db)
}

fn draft(title: &str, category_id: Uuid) -> CreateArticle {
    CreateArticle {
        title: title.into(),
        slug: folio_core::slug::slugify(title),
        body: "Lorem ipsum".into(),
        excerpt: None,
        category_id,
        author_id: Uuid::new_v4(),
    }
}

#[tokio::test]
async fn new_articles_start_as_drafts() {
    let repo = setup().await;

    let article = repo.create(draft("Hello World", Uuid::new_v4())).await.unwrap();
    assert_eq!(article.status, ArticleStatus::Draft);
    assert_eq!(article.published_at, None);

    let by_slug = repo.get_by_slug("hello-world").await.unwrap();
    assert_eq!(by_slug.id, article.id);
}

#[tokio::test]
async fn publishing_stamps_the_date_once() {
    let repo = setup().await;
    let article = repo.create(draft("Launch", Uuid::new_v4())).await.unwrap();

    let publish = UpdateArticle {
        status: Some(ArticleStatus::Published),
        ..Default::default()
    };
    let first = repo.update(article.id, publish.clone()).await.unwrap();
    let stamped = first.published_at.expect("published_at should be set");

    let again = repo.update(article.id, publish).await.unwrap();
    assert_eq!(again.published_at, Some(stamped));
}

#[tokio::test]
async fn category_counts_follow_moves() {
    let repo = setup().await;
    let news = Uuid::new_v4();
    let sports = Uuid::new_v4();

    let moved = repo.create(draft("One", news)).await.unwrap();
    repo.create(draft("Two", news)).await.unwrap();
    repo.create(draft("Three", sports)).await.unwrap();

    assert_eq!(repo.count_by_category(news).await.unwrap(), 2);

    repo.update(
        moved.id,
        UpdateArticle {
            category_id: Some(sports),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(repo.count_by_category(news).await.unwrap(), 1);
    let page = repo
        .list_by_category(sports, Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items.len(), 2);
    assert_eq!(repo.count_by_category(Uuid::new_v4()).await.unwrap(), 0);
}
