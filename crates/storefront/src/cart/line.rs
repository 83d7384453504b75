//! Turning a product page selection into a cart line.

use raiz_core::{CartLine, LineOption};

use super::CartError;
use crate::shopify::{Product, ProductVariant};

/// Snapshot `variant` of `product` into a cart line of `quantity` units.
///
/// Title, handle, image, options and price are copied so the line stays
/// stable if the catalog changes later. The variant's own image wins over
/// the product's first image.
///
/// # Errors
///
/// - [`CartError::InvalidQuantity`] for a quantity of zero
/// - [`CartError::VariantUnavailable`] if the variant is not for sale
pub fn resolve_line(
    product: &Product,
    variant: &ProductVariant,
    quantity: u32,
) -> Result<CartLine, CartError> {
    if quantity == 0 {
        return Err(CartError::InvalidQuantity);
    }
    if !variant.available_for_sale {
        return Err(CartError::VariantUnavailable(variant.id.clone()));
    }

    let image_url = variant
        .image
        .as_ref()
        .or_else(|| product.featured_image())
        .map(|image| image.url.clone());

    Ok(CartLine {
        variant_id: variant.id.clone(),
        product_id: product.id.clone(),
        product_handle: product.handle.clone(),
        product_title: product.title.clone(),
        variant_title: variant.title.clone(),
        image_url,
        selected_options: variant
            .selected_options
            .iter()
            .map(|o| LineOption {
                name: o.name.clone(),
                value: o.value.clone(),
            })
            .collect(),
        price: variant.price,
        quantity,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use raiz_core::{CurrencyCode, Price, ProductId, VariantId};

    use super::*;
    use crate::shopify::{Image, PriceRange, ProductOption, SelectedOption};

    fn image(url: &str) -> Image {
        Image {
            url: url.to_string(),
            alt_text: None,
            width: None,
            height: None,
        }
    }

    fn product() -> Product {
        let price = Price::new("89.90".parse().unwrap(), CurrencyCode::BRL);
        let variant = |id: &str, size: &str, available: bool| ProductVariant {
            id: VariantId::new(id),
            title: size.to_string(),
            available_for_sale: available,
            selected_options: vec![SelectedOption {
                name: "Tamanho".to_string(),
                value: size.to_string(),
            }],
            price,
            compare_at_price: None,
            image: None,
        };

        Product {
            id: ProductId::new("gid://shopify/Product/1"),
            handle: "camiseta-raiz".to_string(),
            title: "Camiseta Raiz".to_string(),
            description: String::new(),
            tags: vec![],
            vendor: String::new(),
            product_type: String::new(),
            available_for_sale: true,
            options: vec![ProductOption {
                name: "Tamanho".to_string(),
                values: vec!["P".to_string(), "M".to_string()],
            }],
            variants: vec![variant("v-p", "P", true), variant("v-m", "M", false)],
            price_range: PriceRange {
                min_variant_price: price,
                max_variant_price: price,
            },
            images: vec![image("https://cdn.test/front.jpg")],
        }
    }

    #[test]
    fn test_resolve_snapshots_product() {
        let p = product();
        let line = resolve_line(&p, p.default_variant().unwrap(), 2).unwrap();

        assert_eq!(line.variant_id.as_str(), "v-p");
        assert_eq!(line.product_handle, "camiseta-raiz");
        assert_eq!(line.image_url.as_deref(), Some("https://cdn.test/front.jpg"));
        assert_eq!(line.options_label(), "P");
        assert_eq!(line.line_total().format(), "R$ 179,80");
    }

    #[test]
    fn test_resolve_prefers_variant_image() {
        let mut p = product();
        p.variants[0].image = Some(image("https://cdn.test/p.jpg"));
        let line = resolve_line(&p, &p.variants[0], 1).unwrap();
        assert_eq!(line.image_url.as_deref(), Some("https://cdn.test/p.jpg"));
    }

    #[test]
    fn test_resolve_rejects_unavailable_variant() {
        let p = product();
        let sold_out = p.variant_for_option("Tamanho", "M").unwrap();
        assert!(matches!(
            resolve_line(&p, sold_out, 1),
            Err(CartError::VariantUnavailable(id)) if id.as_str() == "v-m"
        ));
    }

    #[test]
    fn test_resolve_rejects_zero_quantity() {
        let p = product();
        assert!(matches!(
            resolve_line(&p, &p.variants[0], 0),
            Err(CartError::InvalidQuantity)
        ));
    }
}
