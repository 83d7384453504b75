//! Integration tests for the Raiz storefront.
//!
//! [`FakeShopify`] runs an `axum` server on an ephemeral port that speaks
//! just enough of the Storefront GraphQL API (products, product by handle,
//! collection by handle, `cartCreate`) and the ViaCEP lookup API for the
//! storefront crate to be driven end to end without network access.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p raiz-integration-tests
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::{Path as UrlPath, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use raiz_storefront::config::{ShopifyStorefrontConfig, StorefrontConfig};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};

/// Storefront token the fake server accepts.
pub const ACCESS_TOKEN: &str = "8f2c1d9e7a6b5c4d3e2f1a0b9c8d7e6f";

/// GraphQL path served by the fake server.
const GRAPHQL_PATH: &str = "/api/2025-07/graphql.json";

/// Catalog entry served by the fake server.
#[derive(Debug, Clone)]
pub struct FakeProduct {
    pub handle: String,
    pub title: String,
    /// Decimal string (e.g., "89.90").
    pub price: String,
    pub sizes: Vec<String>,
    pub tags: Vec<String>,
    pub available: bool,
}

impl FakeProduct {
    #[must_use]
    pub fn new(handle: &str, title: &str, price: &str, sizes: &[&str]) -> Self {
        Self {
            handle: handle.to_string(),
            title: title.to_string(),
            price: price.to_string(),
            sizes: sizes.iter().map(|s| (*s).to_string()).collect(),
            tags: Vec::new(),
            available: true,
        }
    }

    #[must_use]
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| (*t).to_string()).collect();
        self
    }

    #[must_use]
    pub fn sold_out(mut self) -> Self {
        self.available = false;
        self
    }

    /// Variant id for `size` (or the single default variant when unsized).
    #[must_use]
    pub fn variant_id(&self, size: Option<&str>) -> String {
        format!(
            "gid://shopify/ProductVariant/{}-{}",
            self.handle,
            size.unwrap_or("default")
        )
    }

    fn variant_ids(&self) -> Vec<String> {
        if self.sizes.is_empty() {
            vec![self.variant_id(None)]
        } else {
            self.sizes.iter().map(|s| self.variant_id(Some(s))).collect()
        }
    }

    fn to_json(&self) -> Value {
        let money = json!({ "amount": self.price, "currencyCode": "BRL" });
        let variants: Vec<Value> = if self.sizes.is_empty() {
            vec![json!({
                "node": {
                    "id": self.variant_id(None),
                    "title": "Default Title",
                    "availableForSale": self.available,
                    "selectedOptions": [{ "name": "Title", "value": "Default Title" }],
                    "price": money,
                    "compareAtPrice": null,
                    "image": null
                }
            })]
        } else {
            self.sizes
                .iter()
                .map(|size| {
                    json!({
                        "node": {
                            "id": self.variant_id(Some(size)),
                            "title": size,
                            "availableForSale": self.available,
                            "selectedOptions": [{ "name": "Tamanho", "value": size }],
                            "price": money,
                            "compareAtPrice": null,
                            "image": null
                        }
                    })
                })
                .collect()
        };
        let options = if self.sizes.is_empty() {
            json!([])
        } else {
            json!([{ "name": "Tamanho", "values": self.sizes }])
        };

        json!({
            "id": format!("gid://shopify/Product/{}", self.handle),
            "handle": self.handle,
            "title": self.title,
            "description": "",
            "tags": self.tags,
            "vendor": "Nação Raiz",
            "productType": "Camiseta",
            "availableForSale": self.available,
            "options": options,
            "priceRange": { "minVariantPrice": money, "maxVariantPrice": money },
            "images": { "edges": [{ "node": {
                "url": format!("https://cdn.shopify.com/{}.jpg", self.handle),
                "altText": self.title,
                "width": 800,
                "height": 800
            } }] },
            "variants": { "edges": variants }
        })
    }
}

/// Default catalog: four products across the size ladder and a baby body.
#[must_use]
pub fn sample_catalog() -> Vec<FakeProduct> {
    vec![
        FakeProduct::new("camiseta-raiz", "Camiseta Raiz", "89.90", &["P", "M", "G"]),
        FakeProduct::new("camisa-copa-raiz", "Camisa Copa Raiz", "149.90", &["M", "GG"])
            .with_tags(&["copa"]),
        FakeProduct::new("bone-raiz", "Boné Raiz", "59.90", &[]),
        FakeProduct::new("body-bebe", "Body Bebê Raiz", "49.90", &["0-3M", "6 MESES"])
            .with_tags(&["INFANTIL"]),
    ]
}

#[derive(Default)]
struct FakeState {
    products: Mutex<Vec<FakeProduct>>,
    collections: Mutex<HashMap<String, Vec<String>>>,
    localities: Mutex<HashMap<String, Value>>,
    operations: Mutex<Vec<String>>,
    postal_requests: AtomicUsize,
    checkouts_created: AtomicU64,
    checkout_failures: AtomicUsize,
    checkout_delay_ms: AtomicU64,
    rate_limited: AtomicBool,
}

impl FakeState {
    fn products(&self) -> Vec<FakeProduct> {
        self.products
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Running fake Shopify + ViaCEP server.
pub struct FakeShopify {
    addr: SocketAddr,
    state: Arc<FakeState>,
    server: tokio::task::JoinHandle<()>,
}

impl FakeShopify {
    /// Start a server with [`sample_catalog`], a `camisetas` collection and
    /// the CEP `01001-000`.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        let server = Self::spawn(Arc::clone(&state)).await;

        let fake = Self {
            addr: server.0,
            state,
            server: server.1,
        };
        fake.set_products(sample_catalog());
        fake.add_collection("camisetas", &["camiseta-raiz", "camisa-copa-raiz"]);
        fake.add_locality(
            "01001000",
            json!({
                "cep": "01001-000",
                "logradouro": "Praça da Sé",
                "complemento": "lado ímpar",
                "bairro": "Sé",
                "localidade": "São Paulo",
                "uf": "SP"
            }),
        );
        fake
    }

    async fn spawn(state: Arc<FakeState>) -> (SocketAddr, tokio::task::JoinHandle<()>) {
        let app = Router::new()
            .route(GRAPHQL_PATH, post(graphql))
            .route("/ws/{cep}/json/", get(viacep))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake server");
        let addr = listener.local_addr().expect("Fake server has no address");

        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log_server_exit(&e);
            }
        });
        (addr, server)
    }

    /// Base URL of the server.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Storefront configuration pointing at this server, storing data in `data_dir`.
    #[must_use]
    pub fn config(&self, data_dir: &Path) -> StorefrontConfig {
        let mut config = StorefrontConfig::new(
            ShopifyStorefrontConfig {
                store: "nacao-raiz.myshopify.com".to_string(),
                api_version: "2025-07".to_string(),
                storefront_token: SecretString::from(ACCESS_TOKEN),
                endpoint: Some(format!("{}{GRAPHQL_PATH}", self.base_url())),
            },
            data_dir,
        );
        config.postal_lookup_url = self.base_url();
        config.http_timeout = Duration::from_secs(5);
        config
    }

    /// Replace the catalog.
    pub fn set_products(&self, products: Vec<FakeProduct>) {
        *self
            .state
            .products
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = products;
    }

    /// Serve a collection holding the given product handles.
    pub fn add_collection(&self, handle: &str, products: &[&str]) {
        self.state
            .collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                handle.to_string(),
                products.iter().map(|p| (*p).to_string()).collect(),
            );
    }

    /// Serve a ViaCEP body for the 8-digit `cep`.
    pub fn add_locality(&self, cep: &str, body: Value) {
        self.state
            .localities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(cep.to_string(), body);
    }

    /// Fail the next `count` checkout requests with HTTP 500.
    pub fn fail_next_checkouts(&self, count: usize) {
        self.state.checkout_failures.store(count, Ordering::SeqCst);
    }

    /// Delay every checkout response.
    pub fn set_checkout_delay(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.state.checkout_delay_ms.store(millis, Ordering::SeqCst);
    }

    /// Answer every GraphQL request with HTTP 429.
    pub fn set_rate_limited(&self, limited: bool) {
        self.state.rate_limited.store(limited, Ordering::SeqCst);
    }

    /// How many requests for `operation` reached the server.
    #[must_use]
    pub fn operation_count(&self, operation: &str) -> usize {
        self.state
            .operations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|op| *op == operation)
            .count()
    }

    /// Checkout sessions created so far.
    #[must_use]
    pub fn checkouts_created(&self) -> u64 {
        self.state.checkouts_created.load(Ordering::SeqCst)
    }

    /// Postal lookups received so far.
    #[must_use]
    pub fn postal_requests(&self) -> usize {
        self.state.postal_requests.load(Ordering::SeqCst)
    }
}

impl Drop for FakeShopify {
    fn drop(&mut self) {
        self.server.abort();
    }
}

#[allow(clippy::print_stderr)]
fn log_server_exit(error: &std::io::Error) {
    eprintln!("fake server stopped: {error}");
}

// =============================================================================
// GraphQL
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQLRequest {
    operation_name: String,
    #[serde(default)]
    variables: Value,
}

async fn graphql(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(request): Json<GraphQLRequest>,
) -> Response {
    state
        .operations
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(request.operation_name.clone());

    let token = headers
        .get("X-Shopify-Storefront-Access-Token")
        .and_then(|v| v.to_str().ok());
    if token != Some(ACCESS_TOKEN) {
        return (StatusCode::UNAUTHORIZED, "Invalid storefront token").into_response();
    }

    if state.rate_limited.load(Ordering::SeqCst) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [("Retry-After", "7")],
            "Throttled",
        )
            .into_response();
    }

    let vars = &request.variables;
    match request.operation_name.as_str() {
        "GetProducts" => Json(json!({ "data": { "products": get_products(&state, vars) } }))
            .into_response(),
        "GetProductByHandle" => {
            let handle = vars.get("handle").and_then(Value::as_str).unwrap_or_default();
            let product = state
                .products()
                .into_iter()
                .find(|p| p.handle == handle)
                .map(|p| p.to_json());
            Json(json!({ "data": { "product": product } })).into_response()
        }
        "GetCollectionByHandle" => {
            Json(json!({ "data": { "collection": get_collection(&state, vars) } }))
                .into_response()
        }
        "CreateCheckout" => create_checkout(&state, vars).await,
        other => Json(json!({
            "errors": [{
                "message": format!("Unknown operation {other}"),
                "locations": [{ "line": 1, "column": 1 }]
            }]
        }))
        .into_response(),
    }
}

fn page_size(vars: &Value) -> usize {
    vars.get("first")
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(20)
}

fn connection(products: &[FakeProduct], first: usize) -> Value {
    let edges: Vec<Value> = products
        .iter()
        .take(first)
        .map(|p| json!({ "node": p.to_json() }))
        .collect();
    json!({
        "edges": edges,
        "pageInfo": {
            "hasNextPage": products.len() > first,
            "hasPreviousPage": false,
            "startCursor": null,
            "endCursor": null
        }
    })
}

fn get_products(state: &FakeState, vars: &Value) -> Value {
    let mut products = state.products();
    if let Some(query) = vars.get("query").and_then(Value::as_str) {
        let query = query.to_lowercase();
        products.retain(|p| p.title.to_lowercase().contains(&query));
    }
    connection(&products, page_size(vars))
}

fn get_collection(state: &FakeState, vars: &Value) -> Value {
    let handle = vars.get("handle").and_then(Value::as_str).unwrap_or_default();
    let collections = state
        .collections
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    let Some(handles) = collections.get(handle) else {
        return Value::Null;
    };

    let products: Vec<FakeProduct> = state
        .products()
        .into_iter()
        .filter(|p| handles.contains(&p.handle))
        .collect();

    json!({
        "id": format!("gid://shopify/Collection/{handle}"),
        "handle": handle,
        "title": "Camisetas",
        "description": "Camisetas da Nação Raiz",
        "image": null,
        "products": connection(&products, page_size(vars))
    })
}

async fn create_checkout(state: &FakeState, vars: &Value) -> Response {
    let delay = state.checkout_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let failures = state.checkout_failures.load(Ordering::SeqCst);
    if failures > 0 {
        state.checkout_failures.store(failures - 1, Ordering::SeqCst);
        return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
    }

    let known: Vec<String> = state
        .products()
        .iter()
        .filter(|p| p.available)
        .flat_map(FakeProduct::variant_ids)
        .collect();

    let lines = vars
        .pointer("/input/lines")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let mut total_quantity = 0;
    for line in &lines {
        let merchandise = line.get("merchandiseId").and_then(Value::as_str).unwrap_or_default();
        if !known.iter().any(|id| id == merchandise) {
            return Json(json!({
                "data": { "cartCreate": {
                    "cart": null,
                    "userErrors": [{
                        "code": "INVALID",
                        "field": ["input", "lines", "0", "merchandiseId"],
                        "message": format!("The merchandise with id {merchandise} does not exist.")
                    }]
                } }
            }))
            .into_response();
        }
        total_quantity += line.get("quantity").and_then(Value::as_i64).unwrap_or(0);
    }

    let n = state.checkouts_created.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({
        "data": { "cartCreate": {
            "cart": {
                "id": format!("gid://shopify/Cart/c{n}"),
                "checkoutUrl": format!("https://nacaoraiz.com.br/cart/c/c{n}?key=k{n}"),
                "totalQuantity": total_quantity
            },
            "userErrors": []
        } }
    }))
    .into_response()
}

// =============================================================================
// ViaCEP
// =============================================================================

async fn viacep(State(state): State<Arc<FakeState>>, UrlPath(cep): UrlPath<String>) -> Response {
    state.postal_requests.fetch_add(1, Ordering::SeqCst);

    if cep.len() != 8 || !cep.chars().all(|c| c.is_ascii_digit()) {
        return (StatusCode::BAD_REQUEST, "Bad Request").into_response();
    }

    let body = state
        .localities
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&cep)
        .cloned()
        .unwrap_or_else(|| json!({ "erro": "true" }));
    Json(body).into_response()
}
