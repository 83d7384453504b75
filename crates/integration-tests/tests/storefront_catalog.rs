//! Catalog reads against the fake Storefront API.

#![allow(clippy::unwrap_used)]

use raiz_integration_tests::{FakeProduct, FakeShopify};
use raiz_storefront::catalog::{CatalogFilter, CatalogView, PinRule, PriceBounds, SortKey};
use raiz_storefront::shopify::{ShopifyError, StorefrontClient};
use rust_decimal::Decimal;

fn client(fake: &FakeShopify) -> StorefrontClient {
    let dir = std::env::temp_dir();
    StorefrontClient::new(&fake.config(&dir)).unwrap()
}

#[tokio::test]
async fn test_products_are_converted_and_cached() {
    let fake = FakeShopify::start().await;
    let client = client(&fake);

    let first = client.get_products(50, None).await.unwrap();
    assert_eq!(first.products.len(), 4);
    assert!(!first.page_info.has_next_page);

    let camiseta = first.products.first().unwrap();
    assert_eq!(camiseta.handle, "camiseta-raiz");
    assert_eq!(camiseta.min_price().format(), "R$ 89,90");
    assert_eq!(camiseta.size_values().collect::<Vec<_>>(), ["P", "M", "G"]);
    assert_eq!(camiseta.variants.len(), 3);

    let second = client.get_products(50, None).await.unwrap();
    assert_eq!(second, first);
    assert_eq!(fake.operation_count("GetProducts"), 1);
}

#[tokio::test]
async fn test_search_query_bypasses_cache() {
    let fake = FakeShopify::start().await;
    let client = client(&fake);

    let found = client.get_products(50, Some("copa")).await.unwrap();
    assert_eq!(found.products.len(), 1);
    client.get_products(50, Some("copa")).await.unwrap();

    assert_eq!(fake.operation_count("GetProducts"), 2);
}

#[tokio::test]
async fn test_product_by_handle_and_not_found() {
    let fake = FakeShopify::start().await;
    let client = client(&fake);

    let product = client.get_product_by_handle("bone-raiz").await.unwrap();
    assert_eq!(product.title, "Boné Raiz");
    assert_eq!(product.size_values().count(), 0);
    assert!(product.default_variant().is_some());

    let missing = client.get_product_by_handle("nao-existe").await;
    assert!(matches!(missing, Err(ShopifyError::NotFound(_))));
}

#[tokio::test]
async fn test_invalidate_product_refetches() {
    let fake = FakeShopify::start().await;
    let client = client(&fake);

    client.get_product_by_handle("camiseta-raiz").await.unwrap();
    fake.set_products(vec![FakeProduct::new(
        "camiseta-raiz",
        "Camiseta Raiz Nova",
        "99.90",
        &["M"],
    )]);

    let cached = client.get_product_by_handle("camiseta-raiz").await.unwrap();
    assert_eq!(cached.title, "Camiseta Raiz");

    client.invalidate_product("camiseta-raiz").await;
    let fresh = client.get_product_by_handle("camiseta-raiz").await.unwrap();
    assert_eq!(fresh.title, "Camiseta Raiz Nova");
    assert_eq!(fake.operation_count("GetProductByHandle"), 2);
}

#[tokio::test]
async fn test_invalidate_all_refetches_lists() {
    let fake = FakeShopify::start().await;
    let client = client(&fake);

    client.get_products(50, None).await.unwrap();
    fake.set_products(vec![FakeProduct::new("regata-raiz", "Regata Raiz", "69.90", &["G"])]);
    assert_eq!(client.get_products(50, None).await.unwrap().products.len(), 4);

    client.invalidate_all().await;
    let fresh = client.get_products(50, None).await.unwrap();
    assert_eq!(fresh.products.len(), 1);
    assert_eq!(fake.operation_count("GetProducts"), 2);
}

#[tokio::test]
async fn test_collection_by_handle() {
    let fake = FakeShopify::start().await;
    let client = client(&fake);

    let collection = client.get_collection_by_handle("camisetas", 20).await.unwrap();
    assert_eq!(collection.title, "Camisetas");
    let handles: Vec<_> = collection
        .products
        .products
        .iter()
        .map(|p| p.handle.as_str())
        .collect();
    assert_eq!(handles, ["camiseta-raiz", "camisa-copa-raiz"]);

    let missing = client.get_collection_by_handle("nada", 20).await;
    assert!(matches!(missing, Err(ShopifyError::NotFound(_))));
}

#[tokio::test]
async fn test_rate_limit_is_reported() {
    let fake = FakeShopify::start().await;
    let client = client(&fake);
    fake.set_rate_limited(true);

    let err = client.get_products(10, None).await.unwrap_err();
    assert!(matches!(err, ShopifyError::RateLimited(7)));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_catalog_view_over_fetched_products() {
    let fake = FakeShopify::start().await;
    let client = client(&fake);

    let mut view = CatalogView::new(CatalogFilter {
        sort: SortKey::PriceAsc,
        excluded_tags: vec!["infantil".to_string()],
        ..CatalogFilter::default()
    });
    let ticket = view.begin_load();
    let products = client.get_products(50, None).await.unwrap().products;
    assert!(view.finish_load(ticket, products));

    assert_eq!(view.available_sizes(), ["P", "M", "G", "GG"]);
    let bounds = view.price_bounds();
    assert_eq!(bounds.min, Decimal::from(49));
    assert_eq!(bounds.max, Decimal::from(150));

    let handles: Vec<_> = view.visible().into_iter().map(|p| p.handle).collect();
    assert_eq!(handles, ["bone-raiz", "camiseta-raiz", "camisa-copa-raiz"]);

    view.filter_mut().pin = Some(PinRule::title_contains("copa", "copa"));
    view.filter_mut().toggle_size("M");
    let handles: Vec<_> = view.visible().into_iter().map(|p| p.handle).collect();
    assert_eq!(handles, ["camisa-copa-raiz", "camiseta-raiz"]);

    view.filter_mut().price = Some(PriceBounds::new(Decimal::from(200), Decimal::from(300)));
    assert!(view.visible().is_empty());
    assert_eq!(view.active_filter_count(), 2);
}
