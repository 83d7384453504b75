//! Catalog filter/sort view-model.
//!
//! Pure functions over a fetched product list: filter by price, size, title
//! search and excluded tags, sort by a [`SortKey`], then optionally move
//! products matching a [`PinRule`] to the front. Nothing here performs I/O
//! or mutates its input.
//!
//! # Example
//!
//! ```rust,ignore
//! use raiz_storefront::catalog::{CatalogFilter, PinRule, SortKey};
//!
//! let filter = CatalogFilter {
//!     sort: SortKey::PriceAsc,
//!     pin: Some(PinRule::title_contains("featured", "uma merda")),
//!     ..CatalogFilter::default()
//! };
//! let visible = filter.apply(&products);
//! ```

mod facets;
mod view;

pub use facets::{DEFAULT_PRICE_BOUNDS, SIZE_LADDER, available_sizes, is_month_size, price_bounds};
pub use view::{CatalogView, LoadTicket, Page, RELATED_PER_PAGE, paginate};

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::shopify::Product;

// =============================================================================
// Price bounds
// =============================================================================

/// Inclusive price interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PriceBounds {
    /// Lowest accepted price.
    pub min: Decimal,
    /// Highest accepted price.
    pub max: Decimal,
}

impl PriceBounds {
    /// Build bounds, swapping the ends if given in the wrong order.
    #[must_use]
    pub fn new(min: Decimal, max: Decimal) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Whether `amount` lies inside the interval (both ends included).
    #[must_use]
    pub fn contains(&self, amount: Decimal) -> bool {
        self.min <= amount && amount <= self.max
    }

    /// Whether these bounds cut anything off `full`.
    #[must_use]
    pub fn narrows(&self, full: &Self) -> bool {
        self.min > full.min || self.max < full.max
    }
}

// =============================================================================
// Sorting
// =============================================================================

/// Error parsing a [`SortKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort option: {0}")]
pub struct UnknownSortKey(pub String);

/// Product list ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Catalog order as returned by the platform.
    #[default]
    SourceOrder,
    /// Lowest minimum price first.
    PriceAsc,
    /// Highest minimum price first.
    PriceDesc,
    /// Title A-Z.
    NameAsc,
    /// Title Z-A.
    NameDesc,
}

impl SortKey {
    /// Every sort key, in menu order.
    pub const ALL: [Self; 5] = [
        Self::SourceOrder,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::NameAsc,
        Self::NameDesc,
    ];

    /// Canonical option value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SourceOrder => "sales",
            Self::PriceAsc => "lowest_price",
            Self::PriceDesc => "biggest_price",
            Self::NameAsc => "name_asc",
            Self::NameDesc => "name_desc",
        }
    }

    /// Menu label shown to shoppers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SourceOrder => "Mais vendidas",
            Self::PriceAsc => "Menor preço",
            Self::PriceDesc => "Maior preço",
            Self::NameAsc => "Nome (A-Z)",
            Self::NameDesc => "Nome (Z-A)",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::SourceOrder => Ordering::Equal,
            Self::PriceAsc => a.min_price().amount.cmp(&b.min_price().amount),
            Self::PriceDesc => b.min_price().amount.cmp(&a.min_price().amount),
            Self::NameAsc => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            Self::NameDesc => b.title.to_lowercase().cmp(&a.title.to_lowercase()),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            // "recent" has no client-side ordering; the platform list is
            // already newest-aware, so it falls back to source order.
            "" | "sales" | "recent" | "source" => Ok(Self::SourceOrder),
            "lowest_price" | "price_asc" => Ok(Self::PriceAsc),
            "biggest_price" | "price_desc" => Ok(Self::PriceDesc),
            "name_asc" => Ok(Self::NameAsc),
            "name_desc" => Ok(Self::NameDesc),
            _ => Err(UnknownSortKey(s.to_string())),
        }
    }
}

/// Stable sort by `key`; ties keep their relative order.
pub fn sort_products(products: &mut [Product], key: SortKey) {
    if key != SortKey::SourceOrder {
        products.sort_by(|a, b| key.compare(a, b));
    }
}

// =============================================================================
// Pinning
// =============================================================================

type PinPredicate = dyn Fn(&Product) -> bool + Send + Sync;

/// Named predicate selecting products that always lead the list.
#[derive(Clone)]
pub struct PinRule {
    name: String,
    predicate: Arc<PinPredicate>,
}

impl PinRule {
    /// Pin products for which `predicate` returns true.
    pub fn new(
        name: impl Into<String>,
        predicate: impl Fn(&Product) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Pin products whose title contains `needle`, ignoring case.
    pub fn title_contains(name: impl Into<String>, needle: &str) -> Self {
        let needle = needle.trim().to_lowercase();
        Self::new(name, move |product: &Product| {
            !needle.is_empty() && product.title.to_lowercase().contains(&needle)
        })
    }

    /// Rule name, for logs and display.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `product` is pinned by this rule.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        (self.predicate)(product)
    }
}

impl fmt::Debug for PinRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinRule").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Move pinned products to the front; both groups keep their order.
#[must_use]
pub fn pin_products(products: Vec<Product>, rule: &PinRule) -> Vec<Product> {
    let (mut pinned, rest): (Vec<_>, Vec<_>) =
        products.into_iter().partition(|p| rule.matches(p));
    pinned.extend(rest);
    pinned
}

// =============================================================================
// Filter
// =============================================================================

/// Every knob of the catalog listing.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    /// Accepted minimum-variant-price interval; `None` accepts any price.
    pub price: Option<PriceBounds>,
    /// Selected sizes; empty accepts any size.
    pub sizes: BTreeSet<String>,
    /// Ordering applied after filtering.
    pub sort: SortKey,
    /// Products to move to the front after sorting.
    pub pin: Option<PinRule>,
    /// Case-insensitive title substring; blank means no search.
    pub search: Option<String>,
    /// Products carrying any of these tags are hidden (case-insensitive).
    pub excluded_tags: Vec<String>,
}

impl CatalogFilter {
    /// Whether `product` passes every filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.matches_price(product)
            && self.matches_sizes(product)
            && self.matches_search(product)
            && !self.is_excluded(product)
    }

    fn matches_price(&self, product: &Product) -> bool {
        self.price
            .is_none_or(|bounds| bounds.contains(product.min_price().amount))
    }

    fn matches_sizes(&self, product: &Product) -> bool {
        self.sizes.is_empty() || product.size_values().any(|size| self.sizes.contains(size))
    }

    fn matches_search(&self, product: &Product) -> bool {
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => product.title.to_lowercase().contains(&term.to_lowercase()),
        }
    }

    fn is_excluded(&self, product: &Product) -> bool {
        product.tags.iter().any(|tag| {
            self.excluded_tags
                .iter()
                .any(|excluded| tag.trim().to_uppercase() == excluded.trim().to_uppercase())
        })
    }

    /// Filter, sort and pin `products` into a new list.
    #[must_use]
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut visible: Vec<Product> = products
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();

        sort_products(&mut visible, self.sort);

        match &self.pin {
            Some(rule) => pin_products(visible, rule),
            None => visible,
        }
    }

    /// Add or remove a size from the selection.
    pub fn toggle_size(&mut self, size: &str) {
        if !self.sizes.remove(size) {
            self.sizes.insert(size.to_string());
        }
    }

    /// Number of narrowing filters in effect: one per selected size plus
    /// one if the price interval is tighter than `full`.
    #[must_use]
    pub fn active_filter_count(&self, full: &PriceBounds) -> usize {
        let price = usize::from(self.price.is_some_and(|bounds| bounds.narrows(full)));
        self.sizes.len() + price
    }

    /// Drop the size selection and widen the price interval to `full`.
    pub fn reset(&mut self, full: PriceBounds) {
        self.price = Some(full);
        self.sizes.clear();
    }
}

/// Filter, sort and pin `products` with `filter`.
#[must_use]
pub fn apply_filters(products: &[Product], filter: &CatalogFilter) -> Vec<Product> {
    filter.apply(products)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use raiz_core::{CurrencyCode, Price, ProductId};

    use super::*;
    use crate::shopify::{PriceRange, ProductOption};

    pub(crate) fn product(handle: &str, title: &str, price: &str, sizes: &[&str]) -> Product {
        let price = Price::new(price.parse().unwrap(), CurrencyCode::BRL);
        Product {
            id: ProductId::new(format!("gid://shopify/Product/{handle}")),
            handle: handle.to_string(),
            title: title.to_string(),
            description: String::new(),
            tags: vec![],
            vendor: "Nação Raiz".to_string(),
            product_type: "Camiseta".to_string(),
            available_for_sale: true,
            options: vec![ProductOption {
                name: "Tamanho".to_string(),
                values: sizes.iter().map(ToString::to_string).collect(),
            }],
            variants: vec![],
            price_range: PriceRange {
                min_variant_price: price,
                max_variant_price: price,
            },
            images: vec![],
        }
    }

    fn handles(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.handle.as_str()).collect()
    }

    fn bounds(min: i64, max: i64) -> PriceBounds {
        PriceBounds::new(Decimal::from(min), Decimal::from(max))
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("a", "Camiseta Liberdade", "50", &["P", "M"]),
            product("b", "Boné Raiz", "10", &["Único"]),
            product("c", "Moletom Pátria", "30", &["G", "GG"]),
        ]
    }

    #[test]
    fn test_sort_by_price() {
        let products = catalog();

        let asc = CatalogFilter {
            sort: SortKey::PriceAsc,
            ..CatalogFilter::default()
        };
        assert_eq!(handles(&asc.apply(&products)), ["b", "c", "a"]);

        let desc = CatalogFilter {
            sort: SortKey::PriceDesc,
            ..CatalogFilter::default()
        };
        assert_eq!(handles(&desc.apply(&products)), ["a", "c", "b"]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let products = vec![
            product("x", "X", "20", &[]),
            product("y", "Y", "10", &[]),
            product("z", "Z", "20", &[]),
        ];
        let filter = CatalogFilter {
            sort: SortKey::PriceAsc,
            ..CatalogFilter::default()
        };
        assert_eq!(handles(&filter.apply(&products)), ["y", "x", "z"]);
    }

    #[test]
    fn test_sort_by_name() {
        let filter = CatalogFilter {
            sort: SortKey::NameAsc,
            ..CatalogFilter::default()
        };
        assert_eq!(handles(&filter.apply(&catalog())), ["b", "a", "c"]);
    }

    #[test]
    fn test_full_bounds_source_order_is_identity() {
        let products = catalog();
        let filter = CatalogFilter {
            price: Some(price_bounds(&products)),
            ..CatalogFilter::default()
        };
        assert_eq!(filter.apply(&products), products);
    }

    #[test]
    fn test_price_range_excluding_everything_is_empty() {
        let filter = CatalogFilter {
            price: Some(bounds(1000, 2000)),
            ..CatalogFilter::default()
        };
        assert!(filter.apply(&catalog()).is_empty());
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let filter = CatalogFilter {
            price: Some(bounds(10, 30)),
            ..CatalogFilter::default()
        };
        assert_eq!(handles(&filter.apply(&catalog())), ["b", "c"]);
    }

    #[test]
    fn test_size_filter_matches_any_selected() {
        let mut filter = CatalogFilter::default();
        filter.toggle_size("M");
        filter.toggle_size("GG");
        assert_eq!(handles(&filter.apply(&catalog())), ["a", "c"]);

        filter.toggle_size("M");
        assert_eq!(handles(&filter.apply(&catalog())), ["c"]);
    }

    #[test]
    fn test_search_is_case_insensitive_and_trimmed() {
        let mut filter = CatalogFilter {
            search: Some("  pátria ".to_string()),
            ..CatalogFilter::default()
        };
        assert_eq!(handles(&filter.apply(&catalog())), ["c"]);

        filter.search = Some("   ".to_string());
        assert_eq!(filter.apply(&catalog()).len(), 3);
    }

    #[test]
    fn test_excluded_tags() {
        let mut products = catalog();
        products[0].tags = vec!["Camiseta Infantil".to_string()];
        products[2].tags = vec!["ADULTO".to_string()];

        let filter = CatalogFilter {
            excluded_tags: vec!["CAMISETA INFANTIL".to_string(), "BODY INFANTIL".to_string()],
            ..CatalogFilter::default()
        };
        assert_eq!(handles(&filter.apply(&products)), ["b", "c"]);
    }

    #[test]
    fn test_pinned_products_lead_in_sort_order() {
        let products = vec![
            product("a", "Camiseta A", "50", &[]),
            product("pin-2", "Camiseta Uma Merda II", "80", &[]),
            product("b", "Camiseta B", "10", &[]),
            product("pin-1", "Uma merda", "20", &[]),
        ];
        let filter = CatalogFilter {
            sort: SortKey::PriceAsc,
            pin: Some(PinRule::title_contains("uma-merda", "uma merda")),
            ..CatalogFilter::default()
        };
        assert_eq!(
            handles(&filter.apply(&products)),
            ["pin-1", "pin-2", "b", "a"]
        );
    }

    #[test]
    fn test_apply_is_idempotent_and_pure() {
        let products = catalog();
        let original = products.clone();
        let filter = CatalogFilter {
            sort: SortKey::PriceDesc,
            price: Some(bounds(20, 60)),
            ..CatalogFilter::default()
        };

        let once = apply_filters(&products, &filter);
        let twice = apply_filters(&once, &filter);
        assert_eq!(once, twice);
        assert_eq!(products, original);
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("lowest_price".parse::<SortKey>().unwrap(), SortKey::PriceAsc);
        assert_eq!("biggest_price".parse::<SortKey>().unwrap(), SortKey::PriceDesc);
        assert_eq!("sales".parse::<SortKey>().unwrap(), SortKey::SourceOrder);
        assert_eq!("recent".parse::<SortKey>().unwrap(), SortKey::SourceOrder);
        assert_eq!("NAME_DESC".parse::<SortKey>().unwrap(), SortKey::NameDesc);
        assert!("cheapest".parse::<SortKey>().is_err());

        for key in SortKey::ALL {
            assert_eq!(key.as_str().parse::<SortKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_active_filter_count_and_reset() {
        let full = bounds(10, 50);
        let mut filter = CatalogFilter::default();
        assert_eq!(filter.active_filter_count(&full), 0);

        filter.price = Some(full);
        assert_eq!(filter.active_filter_count(&full), 0);

        filter.price = Some(bounds(20, 50));
        filter.toggle_size("P");
        filter.toggle_size("M");
        assert_eq!(filter.active_filter_count(&full), 3);

        filter.reset(full);
        assert_eq!(filter.active_filter_count(&full), 0);
        assert!(filter.sizes.is_empty());
    }

    #[test]
    fn test_price_bounds_new_orders_ends() {
        let b = PriceBounds::new(Decimal::from(90), Decimal::from(10));
        assert_eq!(b.min, Decimal::from(10));
        assert!(b.contains(Decimal::from(90)));
    }
}
