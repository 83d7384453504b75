//! Catalog commands: listing, facets, product and collection pages.

use clap::Args;
use raiz_storefront::catalog::{
    CatalogFilter, CatalogView, PinRule, PriceBounds, RELATED_PER_PAGE, SortKey, paginate,
};
use raiz_storefront::error::AppError;
use raiz_storefront::shopify::{Product, ShopifyError};
use raiz_storefront::state::AppState;
use rust_decimal::Decimal;

use super::{price_with_installments, say};

/// Products fetched for a listing.
const LISTING_SIZE: u32 = 100;

/// Products fetched for a collection page.
const COLLECTION_SIZE: u32 = 50;

/// Filters and ordering for `raiz products`.
#[derive(Debug, Args)]
pub struct ProductsArgs {
    /// List a collection instead of the whole catalog
    #[arg(short, long)]
    pub collection: Option<String>,

    /// Case-insensitive title search
    #[arg(short = 'q', long)]
    pub search: Option<String>,

    /// Lowest listing price (defaults to the catalog minimum)
    #[arg(long)]
    pub min_price: Option<Decimal>,

    /// Highest listing price (defaults to the catalog maximum)
    #[arg(long)]
    pub max_price: Option<Decimal>,

    /// Size to include; repeat for several
    #[arg(short, long = "size")]
    pub sizes: Vec<String>,

    /// Ordering (`sales`, `recent`, `lowest_price`, `biggest_price`, `name_asc`, `name_desc`)
    #[arg(long, default_value = "sales")]
    pub sort: SortKey,

    /// Move products whose title contains this text to the front
    #[arg(long)]
    pub pin: Option<String>,

    /// Hide products with this tag; repeat for several
    #[arg(long = "exclude-tag")]
    pub excluded_tags: Vec<String>,
}

impl ProductsArgs {
    fn filter(&self) -> CatalogFilter {
        CatalogFilter {
            price: None,
            sizes: self.sizes.iter().cloned().collect(),
            sort: self.sort,
            pin: self
                .pin
                .as_deref()
                .map(|needle| PinRule::title_contains(format!("title:{needle}"), needle)),
            search: self.search.clone(),
            excluded_tags: self.excluded_tags.clone(),
        }
    }

    /// Price interval to apply, with missing ends taken from `full`.
    fn price_bounds(&self, full: &PriceBounds) -> Option<PriceBounds> {
        if self.min_price.is_none() && self.max_price.is_none() {
            return None;
        }
        Some(PriceBounds::new(
            self.min_price.unwrap_or(full.min),
            self.max_price.unwrap_or(full.max),
        ))
    }
}

async fn fetch(state: &AppState, collection: Option<&str>) -> Result<Vec<Product>, ShopifyError> {
    match collection {
        Some(handle) => state
            .storefront()
            .get_collection_by_handle(handle, COLLECTION_SIZE)
            .await
            .map(|c| c.products.products),
        None => state
            .storefront()
            .get_products(LISTING_SIZE, None)
            .await
            .map(|c| c.products),
    }
}

async fn load(state: &AppState, view: &mut CatalogView, collection: Option<&str>) -> Result<(), AppError> {
    let ticket = view.begin_load();
    match fetch(state, collection).await {
        Ok(products) => {
            view.finish_load(ticket, products);
            Ok(())
        }
        Err(e) => {
            view.fail_load(ticket);
            Err(e.into())
        }
    }
}

fn product_row(product: &Product) -> String {
    let sizes: Vec<&str> = product.size_values().collect();
    let mut row = format!(
        "{}  {}  ({})",
        product.title,
        price_with_installments(product.min_price()),
        product.handle
    );
    if !sizes.is_empty() {
        row.push_str(&format!("  [{}]", sizes.join(" ")));
    }
    if !product.available_for_sale {
        row.push_str("  esgotado");
    }
    row
}

/// `raiz products`
pub async fn products(state: &AppState, args: ProductsArgs) -> Result<(), AppError> {
    let mut view = CatalogView::new(args.filter());
    load(state, &mut view, args.collection.as_deref()).await?;

    let full = view.price_bounds();
    view.filter_mut().price = args.price_bounds(&full);

    let visible = view.visible();
    for product in &visible {
        say(product_row(product));
    }

    say(format!(
        "{} de {} produtos ({}; {} filtros ativos)",
        visible.len(),
        view.products().len(),
        view.filter().sort.label(),
        view.active_filter_count()
    ));
    Ok(())
}

/// `raiz sizes`
pub async fn sizes(state: &AppState, collection: Option<&str>) -> Result<(), AppError> {
    let mut view = CatalogView::default();
    load(state, &mut view, collection).await?;

    let bounds = view.price_bounds();
    say(format!("Tamanhos: {}", view.available_sizes().join(" ")));
    say(format!("Preço: R$ {} a R$ {}", bounds.min, bounds.max));
    say("Ordenar por:");
    for key in SortKey::ALL {
        say(format!("  {:<14} {}", key.as_str(), key.label()));
    }
    Ok(())
}

/// `raiz product <handle>`
pub async fn product(state: &AppState, handle: &str, related_page: usize) -> Result<(), AppError> {
    let product = state.storefront().get_product_by_handle(handle).await?;

    say(&product.title);
    say(price_with_installments(product.min_price()));
    if !product.description.is_empty() {
        say(&product.description);
    }

    for variant in &product.variants {
        let mut row = format!("  {}  {}", variant.title, variant.price.format());
        if let (Some(compare_at), Some(percent)) =
            (&variant.compare_at_price, variant.discount_percent())
        {
            row.push_str(&format!("  (de {}, -{percent}%)", compare_at.format()));
        }
        if !variant.available_for_sale {
            row.push_str("  esgotado");
        }
        row.push_str(&format!("  {}", variant.id));
        say(row);
    }

    let catalog = state.storefront().get_products(LISTING_SIZE, None).await?;
    let page = paginate(
        &catalog.products,
        Some(&product.handle),
        related_page,
        RELATED_PER_PAGE,
    );
    if page.total_pages > 0 {
        say(format!(
            "Você também pode gostar ({}/{}):",
            page.index + 1,
            page.total_pages
        ));
        for related in page.items {
            say(format!("  {}", product_row(related)));
        }
    }
    Ok(())
}

/// `raiz collection <handle>`
pub async fn collection(state: &AppState, handle: &str) -> Result<(), AppError> {
    let collection = state
        .storefront()
        .get_collection_by_handle(handle, COLLECTION_SIZE)
        .await?;

    say(&collection.title);
    if !collection.description.is_empty() {
        say(&collection.description);
    }
    for product in &collection.products.products {
        say(format!("  {}", product_row(product)));
    }
    if collection.products.page_info.has_next_page {
        say("  ...");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(min: Option<i64>, max: Option<i64>) -> ProductsArgs {
        ProductsArgs {
            collection: None,
            search: None,
            min_price: min.map(Decimal::from),
            max_price: max.map(Decimal::from),
            sizes: vec!["M".to_string()],
            sort: SortKey::PriceAsc,
            pin: Some("copa".to_string()),
            excluded_tags: Vec::new(),
        }
    }

    #[test]
    fn test_price_bounds_fill_missing_end() {
        let full = PriceBounds::new(Decimal::from(10), Decimal::from(200));

        assert_eq!(args(None, None).price_bounds(&full), None);
        assert_eq!(
            args(Some(50), None).price_bounds(&full),
            Some(PriceBounds::new(Decimal::from(50), Decimal::from(200)))
        );
        assert_eq!(
            args(None, Some(80)).price_bounds(&full),
            Some(PriceBounds::new(Decimal::from(10), Decimal::from(80)))
        );
    }

    #[test]
    fn test_filter_from_args() {
        let filter = args(None, None).filter();
        assert!(filter.sizes.contains("M"));
        assert_eq!(filter.sort, SortKey::PriceAsc);
        assert_eq!(filter.pin.map(|p| p.name().to_string()).as_deref(), Some("title:copa"));
    }
}
