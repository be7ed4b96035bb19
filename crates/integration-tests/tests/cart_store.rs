//! End-to-end cart store tests: HTTP catalog plus file storage.

#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rocketshoes_cart::error::{ADD_FAILED, OUT_OF_STOCK, REMOVE_FAILED};
use rocketshoes_cart::{
    Cart, CartStore, CatalogConfig, DEFAULT_CART_KEY, FileStorage, HttpCatalogClient,
    KeyValueStorage, RecordingSink, report,
};
use rocketshoes_core::{Price, ProductId, UpdateProductAmount};
use rocketshoes_integration_tests::TestCatalog;

type Store = CartStore<HttpCatalogClient, FileStorage>;

async fn catalog() -> TestCatalog {
    let catalog = TestCatalog::spawn().await.unwrap();
    catalog.add_product(1, "Tênis de Caminhada Leve Confortável", 179.9, 3);
    catalog.add_product(2, "Tênis VR Caminhada Confortável Detalhes Couro Masculino", 139.9, 5);
    catalog.add_product(42, "Shoe", 100.0, 10);
    catalog
}

fn open_store(catalog: &TestCatalog, storage_path: &Path) -> Store {
    let mut config = CatalogConfig::new(&catalog.base_url()).unwrap();
    config.product_cache_ttl = Duration::ZERO;
    let client = HttpCatalogClient::new(&config).unwrap();
    CartStore::open(client, FileStorage::new(storage_path), DEFAULT_CART_KEY).unwrap()
}

fn persisted(storage_path: &Path) -> Option<Cart> {
    FileStorage::new(storage_path)
        .get(DEFAULT_CART_KEY)
        .unwrap()
        .map(|raw| serde_json::from_str(&raw).unwrap())
}

#[tokio::test]
async fn test_fresh_add_is_persisted_and_restored() {
    let catalog = catalog().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let store = open_store(&catalog, &path);
    let cart = store.add_product(ProductId::new(42)).await.unwrap();

    let item = cart.get(ProductId::new(42)).unwrap();
    assert_eq!(item.product.title, "Shoe");
    assert_eq!(item.product.price, Price::from_cents(10000));
    assert_eq!(item.amount, 1);
    assert_eq!(persisted(&path), Some(cart.clone()));

    let reopened = open_store(&catalog, &path);
    assert_eq!(reopened.cart(), cart);
}

#[tokio::test]
async fn test_add_increments_until_stock_runs_out() {
    let catalog = catalog().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let store = open_store(&catalog, &path);
    let sink = RecordingSink::new();

    for _ in 0..4 {
        report(&sink, store.add_product(ProductId::new(1)).await);
    }

    let cart = store.cart();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart.get(ProductId::new(1)).unwrap().amount, 3);
    assert_eq!(sink.messages(), vec![OUT_OF_STOCK.to_string()]);
    assert_eq!(persisted(&path), Some(cart));
}

#[tokio::test]
async fn test_stock_is_checked_fresh_on_every_update() {
    let catalog = catalog().await;
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&catalog, &dir.path().join("storage.json"));

    store.add_product(ProductId::new(2)).await.unwrap();
    let request = UpdateProductAmount {
        product_id: ProductId::new(2),
        amount: 4,
    };
    store.update_product_amount(request).await.unwrap();

    catalog.set_stock(2, 3);
    let err = store.update_product_amount(request).await.unwrap_err();
    assert_eq!(err.user_message(), OUT_OF_STOCK);

    let err = store
        .update_product_amount(UpdateProductAmount {
            product_id: ProductId::new(2),
            amount: 5,
        })
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), OUT_OF_STOCK);
    assert_eq!(store.cart().get(ProductId::new(2)).unwrap().amount, 4);
}

#[tokio::test]
async fn test_catalog_outage_leaves_cart_and_file_untouched() {
    let catalog = catalog().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let store = open_store(&catalog, &path);
    store.add_product(ProductId::new(1)).await.unwrap();
    let before = store.cart();
    let file_before = std::fs::read_to_string(&path).unwrap();

    catalog.set_failing(true);
    let sink = RecordingSink::new();
    report(&sink, store.add_product(ProductId::new(42)).await);

    assert_eq!(sink.messages(), vec![ADD_FAILED.to_string()]);
    assert_eq!(store.cart(), before);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), file_before);
}

#[tokio::test]
async fn test_remove_is_persisted() {
    let catalog = catalog().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let store = open_store(&catalog, &path);

    store.add_product(ProductId::new(1)).await.unwrap();
    store.add_product(ProductId::new(2)).await.unwrap();
    store.remove_product(ProductId::new(1)).await.unwrap();

    let ids: Vec<i32> = persisted(&path)
        .unwrap()
        .iter()
        .map(|item| item.id().as_i32())
        .collect();
    assert_eq!(ids, vec![2]);

    let sink = RecordingSink::new();
    report(&sink, store.remove_product(ProductId::new(1)).await);
    assert_eq!(sink.messages(), vec![REMOVE_FAILED.to_string()]);
}

#[tokio::test]
async fn test_unreadable_saved_cart_opens_empty() {
    let catalog = catalog().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    FileStorage::new(&path)
        .set(DEFAULT_CART_KEY, "[{\"id\": \"oops\"}]")
        .unwrap();

    let store = open_store(&catalog, &path);
    assert!(store.cart().is_empty());

    store.add_product(ProductId::new(42)).await.unwrap();
    assert_eq!(persisted(&path).unwrap().len(), 1);
}

#[tokio::test]
async fn test_clear_then_reopen_is_empty() {
    let catalog = catalog().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let store = open_store(&catalog, &path);

    store.add_product(ProductId::new(1)).await.unwrap();
    store.clear().await.unwrap();

    assert_eq!(persisted(&path), None);
    assert!(open_store(&catalog, &path).cart().is_empty());
}

#[tokio::test]
async fn test_concurrent_adds_over_http_are_serialized() {
    let catalog = catalog().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let store = Arc::new(open_store(&catalog, &path));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.add_product(ProductId::new(42)).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let cart = store.cart();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart.get(ProductId::new(42)).unwrap().amount, 8);
    assert_eq!(persisted(&path), Some(cart));
}
