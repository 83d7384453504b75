//! Checkout (cart mutation) conversion functions.

use raiz_core::CheckoutId;
use url::Url;

use crate::shopify::ShopifyError;
use crate::shopify::types::{CartUserError, Checkout};

use super::super::queries::{CheckoutCartData, UserErrorData};

/// Query parameter Shopify requires on checkout URLs opened from a headless
/// storefront.
const CHANNEL_PARAM: (&str, &str) = ("channel", "online_store");

pub fn convert_user_errors(errors: Vec<UserErrorData>) -> Vec<CartUserError> {
    errors
        .into_iter()
        .map(|e| CartUserError {
            code: e.code,
            field: e.field.unwrap_or_default(),
            message: e.message,
        })
        .collect()
}

/// Convert the `cartCreate` result into a [`Checkout`].
///
/// # Errors
///
/// Returns `ShopifyError::InvalidData` if the checkout URL does not parse.
pub fn convert_checkout(cart: CheckoutCartData) -> Result<Checkout, ShopifyError> {
    Ok(Checkout {
        id: CheckoutId::new(cart.id),
        checkout_url: with_channel(&cart.checkout_url)?,
        total_quantity: u32::try_from(cart.total_quantity).unwrap_or(0),
    })
}

/// Append `channel=online_store` to a checkout URL unless already present.
fn with_channel(checkout_url: &str) -> Result<String, ShopifyError> {
    let mut url = Url::parse(checkout_url)
        .map_err(|e| ShopifyError::InvalidData(format!("checkout URL {checkout_url:?}: {e}")))?;

    let (key, value) = CHANNEL_PARAM;
    if !url.query_pairs().any(|(k, _)| k == key) {
        url.query_pairs_mut().append_pair(key, value);
    }

    Ok(url.into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_with_channel_appends_param() {
        assert_eq!(
            with_channel("https://nacaoraiz.com.br/cart/c/abc?key=123").unwrap(),
            "https://nacaoraiz.com.br/cart/c/abc?key=123&channel=online_store"
        );
        assert_eq!(
            with_channel("https://nacaoraiz.com.br/cart/c/abc").unwrap(),
            "https://nacaoraiz.com.br/cart/c/abc?channel=online_store"
        );
    }

    #[test]
    fn test_with_channel_keeps_existing_param() {
        assert_eq!(
            with_channel("https://shop.test/c/1?channel=online_store").unwrap(),
            "https://shop.test/c/1?channel=online_store"
        );
    }

    #[test]
    fn test_with_channel_rejects_relative_url() {
        assert!(matches!(
            with_channel("/cart/c/abc"),
            Err(ShopifyError::InvalidData(_))
        ));
    }

    #[test]
    fn test_convert_user_errors() {
        let errors = convert_user_errors(vec![UserErrorData {
            code: Some("INVALID".to_string()),
            field: None,
            message: "Variant is sold out".to_string(),
        }]);
        assert_eq!(errors[0].message, "Variant is sold out");
        assert!(errors[0].field.is_empty());
    }
}
