//! Collection type conversion functions.

use raiz_core::CollectionId;

use crate::shopify::ShopifyError;
use crate::shopify::types::Collection;

use super::super::queries::CollectionData;
use super::products::{convert_image, convert_product_connection};

/// Convert a raw collection selection into a [`Collection`].
///
/// # Errors
///
/// Returns `ShopifyError::InvalidData` if any product price fails to convert.
pub fn convert_collection(c: CollectionData) -> Result<Collection, ShopifyError> {
    Ok(Collection {
        id: CollectionId::new(c.id),
        handle: c.handle,
        title: c.title,
        description: c.description,
        image: c.image.map(convert_image),
        products: convert_product_connection(c.products)?,
    })
}
