//! GraphQL documents, variables and raw response shapes for the Storefront API.
//!
//! Response structs mirror the selection sets below field for field; the
//! `conversions` module turns them into domain types.

use serde::{Deserialize, Serialize};

/// Product selection shared by every catalog query.
macro_rules! product_fragment {
    () => {
        r"
fragment ProductFields on Product {
  id
  handle
  title
  description
  tags
  vendor
  productType
  availableForSale
  options { name values }
  priceRange {
    minVariantPrice { amount currencyCode }
    maxVariantPrice { amount currencyCode }
  }
  images(first: 10) {
    edges { node { url altText width height } }
  }
  variants(first: 100) {
    edges {
      node {
        id
        title
        availableForSale
        selectedOptions { name value }
        price { amount currencyCode }
        compareAtPrice { amount currencyCode }
        image { url altText width height }
      }
    }
  }
}
"
    };
}

pub const GET_PRODUCTS: &str = concat!(
    r"
query GetProducts($first: Int!, $query: String) {
  products(first: $first, query: $query) {
    edges { node { ...ProductFields } }
    pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
  }
}
",
    product_fragment!()
);

pub const GET_PRODUCT_BY_HANDLE: &str = concat!(
    r"
query GetProductByHandle($handle: String!) {
  product(handle: $handle) { ...ProductFields }
}
",
    product_fragment!()
);

pub const GET_COLLECTION_BY_HANDLE: &str = concat!(
    r"
query GetCollectionByHandle($handle: String!, $first: Int!) {
  collection(handle: $handle) {
    id
    handle
    title
    description
    image { url altText width height }
    products(first: $first) {
      edges { node { ...ProductFields } }
      pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
    }
  }
}
",
    product_fragment!()
);

pub const CREATE_CHECKOUT: &str = r"
mutation CreateCheckout($input: CartInput!) {
  cartCreate(input: $input) {
    cart { id checkoutUrl totalQuantity }
    userErrors { code field message }
  }
}
";

// =============================================================================
// Variables
// =============================================================================

#[derive(Debug, Serialize)]
pub struct GetProductsVariables {
    pub first: i64,
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GetProductByHandleVariables {
    pub handle: String,
}

#[derive(Debug, Serialize)]
pub struct GetCollectionByHandleVariables {
    pub handle: String,
    pub first: i64,
}

#[derive(Debug, Serialize)]
pub struct CreateCheckoutVariables {
    pub input: CartInput,
}

#[derive(Debug, Serialize)]
pub struct CartInput {
    pub lines: Vec<CartLineInput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    pub merchandise_id: String,
    pub quantity: i64,
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct GetProductsData {
    pub products: ProductConnectionData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetProductByHandleData {
    pub product: Option<ProductData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetCollectionByHandleData {
    pub collection: Option<CollectionData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutData {
    pub cart_create: Option<CartCreatePayload>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartCreatePayload {
    pub cart: Option<CheckoutCartData>,
    #[serde(default)]
    pub user_errors: Vec<UserErrorData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutCartData {
    pub id: String,
    pub checkout_url: String,
    pub total_quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserErrorData {
    pub code: Option<String>,
    pub field: Option<Vec<String>>,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edges<T> {
    pub edges: Vec<Edge<T>>,
}

impl<T> Edges<T> {
    pub fn into_nodes(self) -> impl Iterator<Item = T> {
        self.edges.into_iter().map(|e| e.node)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductConnectionData {
    pub edges: Vec<Edge<ProductData>>,
    pub page_info: PageInfoData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfoData {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionData {
    pub id: String,
    pub handle: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub image: Option<ImageData>,
    pub products: ProductConnectionData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductData {
    pub id: String,
    pub handle: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub product_type: String,
    pub available_for_sale: bool,
    #[serde(default)]
    pub options: Vec<ProductOptionData>,
    pub price_range: PriceRangeData,
    pub images: Edges<ImageData>,
    pub variants: Edges<VariantData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductOptionData {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRangeData {
    pub min_variant_price: MoneyData,
    pub max_variant_price: MoneyData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyData {
    pub amount: String,
    pub currency_code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageData {
    pub url: String,
    pub alt_text: Option<String>,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantData {
    pub id: String,
    pub title: String,
    pub available_for_sale: bool,
    #[serde(default)]
    pub selected_options: Vec<SelectedOptionData>,
    pub price: MoneyData,
    pub compare_at_price: Option<MoneyData>,
    pub image: Option<ImageData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectedOptionData {
    pub name: String,
    pub value: String,
}
