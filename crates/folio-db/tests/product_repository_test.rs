//! Integration tests for the SurrealDB product repository.

use folio_core::error::FolioError;
use folio_core::models::product::{CreateProduct, UpdateProduct};
use folio_core::repository::{Pagination, ProductRepository};
use folio_db::repository::SurrealProductRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> SurrealProductRepository<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    folio_db::run_migrations(&db).await.unwrap();
    SurrealProductRepository::new(db)
}

fn item(name: &str, sku: &str, category_id: Uuid) -> CreateProduct {
    CreateProduct {
        name: name.into(),
        slug: folio_core::slug::slugify(name),
        description: "Hand made".into(),
        short_description: None,
        price: 12_500,
        sale_price: None,
        sku: sku.into(),
        quantity: 4,
        category_id,
        featured_image: None,
    }
}

#[tokio::test]
async fn create_applies_defaults_and_fetches_by_slug() {
    let repo = setup().await;
    let category = Uuid::new_v4();

    let created = repo
        .create(item("Oak Desk", "DESK-1", category))
        .await
        .unwrap();
    assert!(created.is_available);
    assert!(!created.is_featured);
    assert_eq!(created.category_id, category);
    assert_eq!(created.effective_price(), 12_500);

    let by_slug = repo.get_by_slug("oak-desk").await.unwrap();
    assert_eq!(by_slug.id, created.id);
    assert_eq!(by_slug.sku, "DESK-1");
}

#[tokio::test]
async fn sale_price_can_be_set_and_cleared() {
    let repo = setup().await;
    let product = repo
        .create(item("Lamp", "LAMP-1", Uuid::new_v4()))
        .await
        .unwrap();

    let on_sale = repo
        .update(
            product.id,
            UpdateProduct {
                sale_price: Some(Some(9_900)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(on_sale.effective_price(), 9_900);

    let cleared = repo
        .update(
            product.id,
            UpdateProduct {
                sale_price: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.sale_price, None);
    assert_eq!(cleared.price, 12_500);
}

#[tokio::test]
async fn duplicate_sku_is_a_conflict() {
    let repo = setup().await;
    let category = Uuid::new_v4();
    repo.create(item("Chair", "SKU-7", category)).await.unwrap();

    let err = repo
        .create(item("Other Chair", "SKU-7", category))
        .await
        .unwrap_err();
    assert!(matches!(err, FolioError::Conflict { .. }), "got {err:?}");
}

#[tokio::test]
async fn negative_price_is_rejected() {
    let repo = setup().await;
    let mut input = item("Broken", "BRK-1", Uuid::new_v4());
    input.price = -1;

    assert!(repo.create(input).await.is_err());
}

#[tokio::test]
async fn category_counts_and_pages() {
    let repo = setup().await;
    let shelves = Uuid::new_v4();
    let tables = Uuid::new_v4();
    for (i, name) in ["Shelf A", "Shelf B", "Shelf C"].into_iter().enumerate() {
        repo.create(item(name, &format!("SH-{i}"), shelves))
            .await
            .unwrap();
    }
    let table = repo
        .create(item("Table", "TB-1", tables))
        .await
        .unwrap();

    assert_eq!(repo.count_by_category(shelves).await.unwrap(), 3);
    assert_eq!(repo.count_by_category(Uuid::new_v4()).await.unwrap(), 0);

    let page = repo
        .list_by_category(
            shelves,
            Pagination {
                offset: 0,
                limit: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);

    repo.update(
        table.id,
        UpdateProduct {
            category_id: Some(shelves),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(repo.count_by_category(shelves).await.unwrap(), 4);
    assert_eq!(repo.count_by_category(tables).await.unwrap(), 0);

    repo.delete(table.id).await.unwrap();
    let err = repo.get_by_id(table.id).await.unwrap_err();
    assert!(matches!(err, FolioError::NotFound { .. }));
}
