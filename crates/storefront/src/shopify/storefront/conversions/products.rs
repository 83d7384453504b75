//! Product type conversion functions.

use raiz_core::{CurrencyCode, Price, ProductId, VariantId};
use rust_decimal::Decimal;

use crate::shopify::ShopifyError;
use crate::shopify::types::{
    Image, PageInfo, PriceRange, Product, ProductConnection, ProductOption, ProductVariant,
    SelectedOption,
};

use super::super::queries::{
    ImageData, MoneyData, PageInfoData, ProductConnectionData, ProductData, VariantData,
};

/// Convert a Storefront `MoneyV2` into a [`Price`].
///
/// # Errors
///
/// Returns `ShopifyError::InvalidData` if the amount is not a decimal or the
/// currency is one the store does not sell in.
pub fn convert_money(m: MoneyData) -> Result<Price, ShopifyError> {
    let amount: Decimal = m
        .amount
        .parse()
        .map_err(|e| ShopifyError::InvalidData(format!("amount {:?}: {e}", m.amount)))?;
    let currency: CurrencyCode = m
        .currency_code
        .parse()
        .map_err(|e| ShopifyError::InvalidData(format!("{e}")))?;
    Ok(Price::new(amount, currency))
}

pub fn convert_image(i: ImageData) -> Image {
    Image {
        url: i.url,
        alt_text: i.alt_text,
        width: i.width,
        height: i.height,
    }
}

pub fn convert_page_info(p: PageInfoData) -> PageInfo {
    PageInfo {
        has_next_page: p.has_next_page,
        has_previous_page: p.has_previous_page,
        start_cursor: p.start_cursor,
        end_cursor: p.end_cursor,
    }
}

fn convert_variant(v: VariantData) -> Result<ProductVariant, ShopifyError> {
    Ok(ProductVariant {
        id: VariantId::new(v.id),
        title: v.title,
        available_for_sale: v.available_for_sale,
        selected_options: v
            .selected_options
            .into_iter()
            .map(|o| SelectedOption {
                name: o.name,
                value: o.value,
            })
            .collect(),
        price: convert_money(v.price)?,
        compare_at_price: v.compare_at_price.map(convert_money).transpose()?,
        image: v.image.map(convert_image),
    })
}

/// Convert a raw product selection into a [`Product`].
///
/// # Errors
///
/// Returns `ShopifyError::InvalidData` if any price fails to convert.
pub fn convert_product(p: ProductData) -> Result<Product, ShopifyError> {
    Ok(Product {
        id: ProductId::new(p.id),
        handle: p.handle,
        title: p.title,
        description: p.description,
        tags: p.tags,
        vendor: p.vendor,
        product_type: p.product_type,
        available_for_sale: p.available_for_sale,
        options: p
            .options
            .into_iter()
            .map(|o| ProductOption {
                name: o.name,
                values: o.values,
            })
            .collect(),
        variants: p
            .variants
            .into_nodes()
            .map(convert_variant)
            .collect::<Result<_, _>>()?,
        price_range: PriceRange {
            min_variant_price: convert_money(p.price_range.min_variant_price)?,
            max_variant_price: convert_money(p.price_range.max_variant_price)?,
        },
        images: p.images.into_nodes().map(convert_image).collect(),
    })
}

/// Convert a product connection, preserving catalog order.
///
/// # Errors
///
/// Returns `ShopifyError::InvalidData` if any product fails to convert.
pub fn convert_product_connection(
    conn: ProductConnectionData,
) -> Result<ProductConnection, ShopifyError> {
    Ok(ProductConnection {
        products: conn
            .edges
            .into_iter()
            .map(|e| convert_product(e.node))
            .collect::<Result<_, _>>()?,
        page_info: convert_page_info(conn.page_info),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product_json() -> serde_json::Value {
        serde_json::json!({
            "id": "gid://shopify/Product/1",
            "handle": "camiseta-raiz",
            "title": "Camiseta Raiz",
            "description": "100% algodão",
            "tags": ["CAMISETA"],
            "vendor": "Nação Raiz",
            "productType": "Camiseta",
            "availableForSale": true,
            "options": [{ "name": "Tamanho", "values": ["P", "M"] }],
            "priceRange": {
                "minVariantPrice": { "amount": "89.9", "currencyCode": "BRL" },
                "maxVariantPrice": { "amount": "99.9", "currencyCode": "BRL" }
            },
            "images": { "edges": [{ "node": { "url": "https://cdn/1.jpg", "altText": null, "width": 800, "height": 800 } }] },
            "variants": { "edges": [
                { "node": {
                    "id": "gid://shopify/ProductVariant/11",
                    "title": "P",
                    "availableForSale": true,
                    "selectedOptions": [{ "name": "Tamanho", "value": "P" }],
                    "price": { "amount": "89.9", "currencyCode": "BRL" },
                    "compareAtPrice": { "amount": "119.9", "currencyCode": "BRL" },
                    "image": null
                } },
                { "node": {
                    "id": "gid://shopify/ProductVariant/12",
                    "title": "M",
                    "availableForSale": false,
                    "selectedOptions": [{ "name": "Tamanho", "value": "M" }],
                    "price": { "amount": "99.9", "currencyCode": "BRL" },
                    "compareAtPrice": null,
                    "image": null
                } }
            ] }
        })
    }

    #[test]
    fn test_convert_product() {
        let data: ProductData = serde_json::from_value(product_json()).unwrap();
        let product = convert_product(data).unwrap();

        assert_eq!(product.id.as_str(), "gid://shopify/Product/1");
        assert_eq!(product.product_type, "Camiseta");
        assert_eq!(product.images.len(), 1);
        assert_eq!(product.variants.len(), 2);
        assert_eq!(product.min_price().format(), "R$ 89,90");
        assert_eq!(
            product.variants[0].compare_at_price.unwrap().format(),
            "R$ 119,90"
        );
        assert!(!product.variants[1].available_for_sale);
    }

    #[test]
    fn test_convert_money_rejects_garbage() {
        let err = convert_money(MoneyData {
            amount: "abc".to_string(),
            currency_code: "BRL".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, ShopifyError::InvalidData(_)));

        let err = convert_money(MoneyData {
            amount: "10".to_string(),
            currency_code: "JPY".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, ShopifyError::InvalidData(_)));
    }
}
