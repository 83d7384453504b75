//! Domain types for the Shopify Storefront API.
//!
//! These types provide a clean, ergonomic API separate from the raw GraphQL
//! response shapes in `storefront::queries`. Money is carried as
//! [`raiz_core::Price`] and ids as typed newtypes.

use raiz_core::{CheckoutId, CollectionId, Price, ProductId, VariantId};
use serde::{Deserialize, Serialize};

/// Option names that carry apparel sizes, compared case-insensitively.
pub const SIZE_OPTION_NAMES: &[&str] = &["tamanho", "size"];

/// Whether an option name denotes the size option.
#[must_use]
pub fn is_size_option(name: &str) -> bool {
    SIZE_OPTION_NAMES
        .iter()
        .any(|candidate| name.trim().eq_ignore_ascii_case(candidate))
}

// =============================================================================
// Money Types
// =============================================================================

/// Price range for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Minimum price among all variants.
    pub min_variant_price: Price,
    /// Maximum price among all variants.
    pub max_variant_price: Price,
}

// =============================================================================
// Image Types
// =============================================================================

/// Product or collection image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image URL.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
    /// Image width in pixels.
    pub width: Option<i64>,
    /// Image height in pixels.
    pub height: Option<i64>,
}

// =============================================================================
// Product Types
// =============================================================================

/// Selected option on a product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    /// Option name (e.g., "Tamanho", "Cor").
    pub name: String,
    /// Selected value (e.g., "M", "Preta").
    pub value: String,
}

/// Product option definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    /// Option name (e.g., "Tamanho").
    pub name: String,
    /// Available values in declared order (e.g., `["P", "M", "G"]`).
    pub values: Vec<String>,
}

/// A purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Variant ID (Shopify GID).
    pub id: VariantId,
    /// Variant title (e.g., "M / Preta").
    pub title: String,
    /// Whether the variant can currently be bought.
    pub available_for_sale: bool,
    /// One selected option per product option.
    pub selected_options: Vec<SelectedOption>,
    /// Unit price.
    pub price: Price,
    /// Original price when the variant is on sale.
    pub compare_at_price: Option<Price>,
    /// Variant-specific image.
    pub image: Option<Image>,
}

impl ProductVariant {
    /// Whether this variant has the given option value.
    #[must_use]
    pub fn has_option(&self, name: &str, value: &str) -> bool {
        self.selected_options
            .iter()
            .any(|o| o.name.eq_ignore_ascii_case(name) && o.value == value)
    }

    /// Whole-percent discount against the compare-at price, if on sale.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        self.compare_at_price
            .as_ref()
            .map(|compare_at| self.price.discount_percent(compare_at))
            .filter(|percent| *percent > 0)
    }
}

/// A product from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID (Shopify GID).
    pub id: ProductId,
    /// URL handle.
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Plain-text description.
    pub description: String,
    /// Merchandising tags.
    pub tags: Vec<String>,
    /// Vendor name.
    pub vendor: String,
    /// Product type.
    pub product_type: String,
    /// Whether any variant is available.
    pub available_for_sale: bool,
    /// Options in declared order.
    pub options: Vec<ProductOption>,
    /// Variants in catalog order.
    pub variants: Vec<ProductVariant>,
    /// Price range across variants.
    pub price_range: PriceRange,
    /// Images in display order.
    pub images: Vec<Image>,
}

impl Product {
    /// The variant preselected on the product page (the first one).
    #[must_use]
    pub fn default_variant(&self) -> Option<&ProductVariant> {
        self.variants.first()
    }

    /// Look up a variant by id.
    #[must_use]
    pub fn variant(&self, id: &VariantId) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| &v.id == id)
    }

    /// First variant whose selected options contain `name = value`.
    #[must_use]
    pub fn variant_for_option(&self, name: &str, value: &str) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.has_option(name, value))
    }

    /// Values of the size option, in declared order.
    pub fn size_values(&self) -> impl Iterator<Item = &str> {
        self.options
            .iter()
            .filter(|o| is_size_option(&o.name))
            .flat_map(|o| o.values.iter().map(String::as_str))
    }

    /// Lowest variant price, the price shown on listing cards.
    #[must_use]
    pub const fn min_price(&self) -> &Price {
        &self.price_range.min_variant_price
    }

    /// First image, used as the listing thumbnail.
    #[must_use]
    pub fn featured_image(&self) -> Option<&Image> {
        self.images.first()
    }
}

// =============================================================================
// Collection Types
// =============================================================================

/// A product collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection ID (Shopify GID).
    pub id: CollectionId,
    /// URL handle.
    pub handle: String,
    /// Collection title.
    pub title: String,
    /// Plain-text description.
    pub description: String,
    /// Collection image.
    pub image: Option<Image>,
    /// First page of products in the collection.
    pub products: ProductConnection,
}

// =============================================================================
// Pagination Types
// =============================================================================

/// Pagination info for connections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Whether there are more items after this page.
    pub has_next_page: bool,
    /// Whether there are items before this page.
    pub has_previous_page: bool,
    /// Cursor for the first item.
    pub start_cursor: Option<String>,
    /// Cursor for the last item.
    pub end_cursor: Option<String>,
}

/// Paginated list of products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductConnection {
    /// Products in this page.
    pub products: Vec<Product>,
    /// Pagination info.
    pub page_info: PageInfo,
}

// =============================================================================
// Checkout Types
// =============================================================================

/// One line sent to the platform when opening a checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLineInput {
    /// Variant to purchase.
    pub variant_id: VariantId,
    /// Quantity to purchase.
    pub quantity: u32,
}

/// A checkout session created on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkout {
    /// Platform cart ID backing the session.
    pub id: CheckoutId,
    /// Hosted checkout URL to hand the shopper to.
    pub checkout_url: String,
    /// Total quantity the platform accepted.
    pub total_quantity: u32,
}

/// User error from a cart mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartUserError {
    /// Error code.
    pub code: Option<String>,
    /// Field path that caused the error.
    pub field: Vec<String>,
    /// Error message.
    pub message: String,
}
