//! Facets derived from a product list: the size menu and the price slider
//! bounds.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use super::PriceBounds;
use crate::shopify::Product;

/// Apparel sizes in ladder order.
pub const SIZE_LADDER: &[&str] = &["PP", "P", "M", "G", "GG", "XG", "XXG", "XXXG"];

/// Price slider bounds when there are no products.
pub const DEFAULT_PRICE_BOUNDS: PriceBounds = PriceBounds {
    min: Decimal::ZERO,
    max: Decimal::from_parts(500, 0, 0, false, 0),
};

/// Month-based baby sizes: `0-3M`, `12M`, `6 MESES`.
static MONTH_SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\d+(-\d+)?M$|\d+\s*M(ESES)?").expect("Invalid regex"));

/// Whether a size value is a month-based baby size.
#[must_use]
pub fn is_month_size(value: &str) -> bool {
    MONTH_SIZE_RE.is_match(value.trim())
}

fn ladder_position(size: &str) -> Option<usize> {
    SIZE_LADDER.iter().position(|s| *s == size)
}

fn compare_sizes(a: &str, b: &str) -> Ordering {
    match (ladder_position(a), ladder_position(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)),
    }
}

/// Sizes offered across `products`, without month-based sizes.
///
/// Ladder sizes come first in ladder order; anything else follows
/// alphabetically.
#[must_use]
pub fn available_sizes(products: &[Product]) -> Vec<String> {
    let unique: BTreeSet<&str> = products
        .iter()
        .flat_map(Product::size_values)
        .filter(|size| !is_month_size(size))
        .collect();

    let mut sizes: Vec<String> = unique.into_iter().map(str::to_string).collect();
    sizes.sort_by(|a, b| compare_sizes(a, b));
    sizes
}

/// Slider bounds covering every product's listing price: the floor of the
/// cheapest and the ceiling of the dearest.
#[must_use]
pub fn price_bounds(products: &[Product]) -> PriceBounds {
    let mut prices = products.iter().map(|p| p.min_price().amount);
    let Some(first) = prices.next() else {
        return DEFAULT_PRICE_BOUNDS;
    };

    let (min, max) = prices.fold((first, first), |(lo, hi), price| {
        (lo.min(price), hi.max(price))
    });
    PriceBounds::new(min.floor(), max.ceil())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::product;

    #[test]
    fn test_month_sizes() {
        for value in ["0-3M", "3-6m", "12M", "6 MESES", "9 meses"] {
            assert!(is_month_size(value), "{value}");
        }
        for value in ["M", "GG", "PP", "Único", "XXXG"] {
            assert!(!is_month_size(value), "{value}");
        }
    }

    #[test]
    fn test_available_sizes_order_and_exclusions() {
        let products = vec![
            product("a", "Camiseta", "50", &["GG", "P", "M"]),
            product("b", "Body", "30", &["0-3M", "6 MESES", "P"]),
            product("c", "Boné", "40", &["Único", "PP"]),
            product("d", "Regata", "45", &["XG", "Adulto"]),
        ];

        assert_eq!(
            available_sizes(&products),
            ["PP", "P", "M", "GG", "XG", "Adulto", "Único"]
        );
    }

    #[test]
    fn test_available_sizes_empty() {
        assert!(available_sizes(&[]).is_empty());
    }

    #[test]
    fn test_price_bounds_floor_and_ceil() {
        let products = vec![
            product("a", "A", "89.90", &[]),
            product("b", "B", "49.50", &[]),
            product("c", "C", "129.01", &[]),
        ];
        let bounds = price_bounds(&products);
        assert_eq!(bounds.min, Decimal::from(49));
        assert_eq!(bounds.max, Decimal::from(130));
    }

    #[test]
    fn test_price_bounds_default() {
        let bounds = price_bounds(&[]);
        assert_eq!(bounds.min, Decimal::ZERO);
        assert_eq!(bounds.max, Decimal::from(500));
    }
}
