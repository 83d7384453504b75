//! Listing state: the loaded product list, the active filter, and a guard
//! against out-of-order loads.

use super::{CatalogFilter, PriceBounds, available_sizes, price_bounds};
use crate::shopify::Product;

/// Products per page in the related-products carousel.
pub const RELATED_PER_PAGE: usize = 4;

/// Identifies one catalog load. Only the newest ticket may apply results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "pass the ticket to `finish_load`"]
pub struct LoadTicket(u64);

/// Catalog listing view-model.
#[derive(Debug, Default)]
pub struct CatalogView {
    products: Vec<Product>,
    filter: CatalogFilter,
    generation: u64,
    loading: bool,
}

impl CatalogView {
    /// Create an empty view with the given filter.
    #[must_use]
    pub fn new(filter: CatalogFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Start a load. Any ticket handed out earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.loading = true;
        LoadTicket(self.generation)
    }

    /// Apply the results of a load.
    ///
    /// Returns `false` and leaves the view untouched when `ticket` is not the
    /// newest one, so a slow earlier request cannot overwrite a newer list.
    pub fn finish_load(&mut self, ticket: LoadTicket, products: Vec<Product>) -> bool {
        if ticket.0 != self.generation {
            tracing::debug!(ticket = ticket.0, current = self.generation, "Dropping stale catalog load");
            return false;
        }
        self.products = products;
        self.loading = false;
        true
    }

    /// Abandon a load that failed. Stale tickets are ignored.
    pub fn fail_load(&mut self, ticket: LoadTicket) {
        if ticket.0 == self.generation {
            self.loading = false;
        }
    }

    /// Whether the newest load is still running.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Products as loaded, in source order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// The active filter.
    #[must_use]
    pub const fn filter(&self) -> &CatalogFilter {
        &self.filter
    }

    /// Mutable access to the active filter.
    pub const fn filter_mut(&mut self) -> &mut CatalogFilter {
        &mut self.filter
    }

    /// Loaded products after filtering, sorting and pinning.
    #[must_use]
    pub fn visible(&self) -> Vec<Product> {
        self.filter.apply(&self.products)
    }

    /// Full price interval of the loaded products.
    #[must_use]
    pub fn price_bounds(&self) -> PriceBounds {
        price_bounds(&self.products)
    }

    /// Size menu for the loaded products.
    #[must_use]
    pub fn available_sizes(&self) -> Vec<String> {
        available_sizes(&self.products)
    }

    /// Narrowing filters in effect against the loaded products.
    #[must_use]
    pub fn active_filter_count(&self) -> usize {
        self.filter.active_filter_count(&self.price_bounds())
    }

    /// Clear sizes and widen the price interval to the loaded products.
    pub fn clear_filters(&mut self) {
        let full = self.price_bounds();
        self.filter.reset(full);
    }
}

/// One page of a product carousel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a> {
    /// Products on this page.
    pub items: Vec<&'a Product>,
    /// Zero-based page index, clamped to the last page.
    pub index: usize,
    /// Number of pages (0 when there are no products).
    pub total_pages: usize,
}

impl Page<'_> {
    /// Whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.index + 1 < self.total_pages
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.index > 0
    }
}

/// Page through `products`, skipping the one with `exclude_handle` (the
/// product currently shown).
///
/// A `per_page` of zero is treated as one; a page past the end yields the
/// last page.
#[must_use]
pub fn paginate<'a>(
    products: &'a [Product],
    exclude_handle: Option<&str>,
    page: usize,
    per_page: usize,
) -> Page<'a> {
    let per_page = per_page.max(1);
    let remaining: Vec<&Product> = products
        .iter()
        .filter(|p| exclude_handle.is_none_or(|handle| p.handle != handle))
        .collect();

    let total_pages = remaining.len().div_ceil(per_page);
    let index = page.min(total_pages.saturating_sub(1));
    let items = remaining
        .into_iter()
        .skip(index * per_page)
        .take(per_page)
        .collect();

    Page {
        items,
        index,
        total_pages,
    }
}
