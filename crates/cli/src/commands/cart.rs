//! Cart commands.

use clap::Subcommand;
use raiz_core::VariantId;
use raiz_storefront::cart::{CheckoutOutcome, resolve_line};
use raiz_storefront::error::AppError;
use raiz_storefront::shopify::{Product, ProductVariant, is_size_option};
use raiz_storefront::state::AppState;

use super::{price_with_installments, say};

/// `raiz cart` subcommands.
#[derive(Debug, Subcommand)]
pub enum CartAction {
    /// Show the cart
    Show,
    /// Add a product to the cart
    Add {
        /// Product handle
        handle: String,

        /// Size to buy (e.g., `M`)
        #[arg(short, long, conflicts_with = "variant")]
        size: Option<String>,

        /// Exact variant ID to buy
        #[arg(long)]
        variant: Option<String>,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set the quantity of a line; zero or less removes it
    Update {
        /// Variant ID of the line
        variant_id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        /// Variant ID of the line
        variant_id: String,
    },
    /// Empty the cart
    Clear,
    /// Create a checkout session and print its URL
    Checkout,
}

/// Run a cart subcommand.
pub async fn run(state: &AppState, action: CartAction) -> Result<(), AppError> {
    match action {
        CartAction::Show => {
            show(state);
            Ok(())
        }
        CartAction::Add {
            handle,
            size,
            variant,
            quantity,
        } => add(state, &handle, size.as_deref(), variant.as_deref(), quantity).await,
        CartAction::Update {
            variant_id,
            quantity,
        } => {
            state
                .cart()
                .update_quantity(&VariantId::new(variant_id), quantity);
            show(state);
            Ok(())
        }
        CartAction::Remove { variant_id } => {
            state.cart().remove_item(&VariantId::new(variant_id));
            show(state);
            Ok(())
        }
        CartAction::Clear => {
            state.cart().clear();
            say("Carrinho esvaziado.");
            Ok(())
        }
        CartAction::Checkout => checkout(state).await,
    }
}

fn show(state: &AppState) {
    let snapshot = state.cart().snapshot();
    if snapshot.lines().is_empty() {
        say("Seu carrinho está vazio.");
        return;
    }

    for line in snapshot.lines() {
        say(format!(
            "{} x{}  {}  {}  ({})",
            line.product_title,
            line.quantity,
            line.options_label(),
            line.line_total().format(),
            line.variant_id
        ));
    }
    say(format!(
        "{} itens  {}",
        snapshot.total_items(),
        price_with_installments(&snapshot.total_price())
    ));
    if let Some(url) = &snapshot.checkout_url {
        say(format!("Checkout: {url}"));
    }
    if let Some(location) = state.location().saved() {
        say(format!("Entrega em {}", location.locality.label()));
    }
}

/// Pick the variant the shopper asked for.
fn choose_variant<'a>(
    product: &'a Product,
    size: Option<&str>,
    variant: Option<&str>,
) -> Result<&'a ProductVariant, AppError> {
    if let Some(id) = variant {
        return product
            .variant(&VariantId::new(id))
            .ok_or_else(|| AppError::BadRequest("Variante não encontrada.".to_string()));
    }

    if let Some(size) = size {
        return product
            .options
            .iter()
            .filter(|option| is_size_option(&option.name))
            .find_map(|option| product.variant_for_option(&option.name, size))
            .ok_or_else(|| AppError::BadRequest(format!("Tamanho {size} indisponível.")));
    }

    let has_sizes = product.size_values().next().is_some();
    if has_sizes && product.variants.len() > 1 {
        return Err(AppError::BadRequest("Escolha um tamanho.".to_string()));
    }
    product
        .default_variant()
        .ok_or_else(|| AppError::NotFound(product.handle.clone()))
}

async fn add(
    state: &AppState,
    handle: &str,
    size: Option<&str>,
    variant: Option<&str>,
    quantity: u32,
) -> Result<(), AppError> {
    let product = state.storefront().get_product_by_handle(handle).await?;
    let variant = choose_variant(&product, size, variant)?;
    let line = resolve_line(&product, variant, quantity)?;

    say(format!("Adicionado: {} ({})", line.product_title, line.variant_title));
    state.cart().add_item(line);
    show(state);
    Ok(())
}

async fn checkout(state: &AppState) -> Result<(), AppError> {
    match state.cart().create_checkout().await? {
        CheckoutOutcome::Created(checkout) => {
            say(format!("Finalize sua compra em: {}", checkout.checkout_url));
        }
        CheckoutOutcome::AlreadyInFlight => {
            say("Um checkout já está sendo criado. Aguarde.");
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use raiz_core::{CurrencyCode, Price, ProductId};
    use raiz_storefront::shopify::{PriceRange, ProductOption, SelectedOption};
    use rust_decimal::Decimal;

    use super::*;

    fn variant(id: &str, size: &str) -> ProductVariant {
        ProductVariant {
            id: VariantId::new(id),
            title: size.to_string(),
            available_for_sale: true,
            selected_options: vec![SelectedOption {
                name: "Tamanho".to_string(),
                value: size.to_string(),
            }],
            price: Price::new(Decimal::from(89), CurrencyCode::BRL),
            compare_at_price: None,
            image: None,
        }
    }

    fn product() -> Product {
        let price = Price::new(Decimal::from(89), CurrencyCode::BRL);
        Product {
            id: ProductId::new("p1"),
            handle: "camiseta-raiz".to_string(),
            title: "Camiseta Raiz".to_string(),
            description: String::new(),
            tags: Vec::new(),
            vendor: "Nação Raiz".to_string(),
            product_type: "Camiseta".to_string(),
            available_for_sale: true,
            options: vec![ProductOption {
                name: "Tamanho".to_string(),
                values: vec!["P".to_string(), "M".to_string()],
            }],
            variants: vec![variant("v-p", "P"), variant("v-m", "M")],
            price_range: PriceRange {
                min_variant_price: price,
                max_variant_price: price,
            },
            images: Vec::new(),
        }
    }

    #[test]
    fn test_choose_variant_by_size() {
        let product = product();
        let chosen = choose_variant(&product, Some("M"), None).unwrap();
        assert_eq!(chosen.id, VariantId::new("v-m"));
    }

    #[test]
    fn test_choose_variant_by_id() {
        let product = product();
        let chosen = choose_variant(&product, None, Some("v-p")).unwrap();
        assert_eq!(chosen.title, "P");
    }

    #[test]
    fn test_choose_variant_requires_size() {
        let product = product();
        assert!(matches!(
            choose_variant(&product, None, None),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            choose_variant(&product, Some("GG"), None),
            Err(AppError::BadRequest(_))
        ));
    }
}
