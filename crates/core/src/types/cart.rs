//! Cart aggregate.
//!
//! [`Cart`] is the pure data structure behind the cart store: an ordered list
//! of [`CartLine`]s keyed by variant. It enforces the cart invariants and
//! derives totals, but knows nothing about persistence or checkout.
//!
//! ## Invariants
//!
//! - A variant appears in at most one line
//! - Every line has a quantity of at least 1
//! - Totals are computed from the lines on every read

use serde::{Deserialize, Serialize};

use super::id::{ProductId, VariantId};
use super::price::{CurrencyCode, Price};

/// A selected option captured on a cart line (e.g., `Tamanho: M`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineOption {
    /// Option name.
    pub name: String,
    /// Selected value.
    pub value: String,
}

/// One row in the cart.
///
/// Title, image, options and price are a snapshot taken when the line was
/// added. Later catalog changes do not alter an existing line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Variant being purchased; the cart key.
    pub variant_id: VariantId,
    /// Product the variant belonged to when added.
    pub product_id: ProductId,
    /// Product URL handle.
    pub product_handle: String,
    /// Product title.
    pub product_title: String,
    /// Variant title (e.g., "M / Preta").
    pub variant_title: String,
    /// First product image URL.
    pub image_url: Option<String>,
    /// Selected options, in product option order.
    pub selected_options: Vec<LineOption>,
    /// Unit price at the time the line was added.
    pub price: Price,
    /// Quantity (at least 1 while the line is in a cart).
    pub quantity: u32,
}

impl CartLine {
    /// Unit price multiplied by quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }

    /// Option values joined for display (e.g., "M / Preta").
    #[must_use]
    pub fn options_label(&self) -> String {
        self.selected_options
            .iter()
            .map(|o| o.value.as_str())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// An ordered set of cart lines keyed by variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart by adding each line in order.
    ///
    /// Duplicate variants are merged and zero-quantity lines dropped, so the
    /// result always satisfies the cart invariants.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines {
            cart.add_line(line);
        }
        cart
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Look up the line for a variant.
    #[must_use]
    pub fn line(&self, variant_id: &VariantId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.variant_id == variant_id)
    }

    /// Add a line.
    ///
    /// If the variant is already in the cart its quantity is increased by the
    /// incoming quantity and the existing snapshot is kept; otherwise the line
    /// is appended. Returns `false` (and changes nothing) for a zero quantity.
    pub fn add_line(&mut self, line: CartLine) -> bool {
        if line.quantity == 0 {
            return false;
        }

        match self
            .lines
            .iter_mut()
            .find(|l| l.variant_id == line.variant_id)
        {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(line.quantity);
            }
            None => self.lines.push(line),
        }
        true
    }

    /// Set the quantity of a line.
    ///
    /// A quantity of zero or less removes the line. Returns `true` if the cart
    /// changed; an absent variant is a no-op.
    pub fn update_quantity(&mut self, variant_id: &VariantId, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_line(variant_id);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self.lines.iter_mut().find(|l| &l.variant_id == variant_id) {
            Some(line) if line.quantity != quantity => {
                line.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    /// Remove the line for a variant. Returns `true` if a line was removed.
    pub fn remove_line(&mut self, variant_id: &VariantId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| &l.variant_id != variant_id);
        self.lines.len() != before
    }

    /// Remove every line. Returns `true` if the cart was not already empty.
    pub fn clear(&mut self) -> bool {
        let changed = !self.lines.is_empty();
        self.lines.clear();
        changed
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Sum of snapshot price times quantity across all lines.
    ///
    /// Uses the currency of the first line; an empty cart totals zero in the
    /// store's default currency.
    #[must_use]
    pub fn total_price(&self) -> Price {
        let currency = self
            .lines
            .first()
            .map_or_else(CurrencyCode::default, |l| l.price.currency_code);

        let amount = self.lines.iter().map(|l| l.line_total().amount).sum();
        Price::new(amount, currency)
    }
}
