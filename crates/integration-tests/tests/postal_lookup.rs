//! Postal-code lookup and the saved delivery location.

#![allow(clippy::unwrap_used)]

use raiz_core::PostalCode;
use raiz_integration_tests::FakeShopify;
use raiz_storefront::services::{LocationError, PostalError, PostalLookupClient};
use raiz_storefront::state::AppState;
use serde_json::json;
use tempfile::TempDir;

#[tokio::test]
async fn test_lookup_known_postal_code() {
    let fake = FakeShopify::start().await;
    let dir = TempDir::new().unwrap();
    let client = PostalLookupClient::new(&fake.config(dir.path())).unwrap();

    let locality = client
        .lookup(&PostalCode::parse("01001-000").unwrap())
        .await
        .unwrap();
    assert_eq!(locality.city, "São Paulo");
    assert_eq!(locality.state, "SP");
    assert_eq!(locality.street.as_deref(), Some("Praça da Sé"));
    assert_eq!(locality.label(), "Sé, São Paulo - SP");
}

#[tokio::test]
async fn test_lookup_unknown_postal_code() {
    let fake = FakeShopify::start().await;
    let dir = TempDir::new().unwrap();
    let client = PostalLookupClient::new(&fake.config(dir.path())).unwrap();

    let err = client
        .lookup(&PostalCode::parse("99999999").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, PostalError::NotFound(_)));
}

#[tokio::test]
async fn test_city_level_postal_code_has_no_district() {
    let fake = FakeShopify::start().await;
    fake.add_locality(
        "78175000",
        json!({ "cep": "78175-000", "logradouro": "", "bairro": "", "localidade": "Poconé", "uf": "MT" }),
    );
    let dir = TempDir::new().unwrap();
    let client = PostalLookupClient::new(&fake.config(dir.path())).unwrap();

    let locality = client
        .lookup(&PostalCode::parse("78175-000").unwrap())
        .await
        .unwrap();
    assert_eq!(locality.district, None);
    assert_eq!(locality.label(), "Poconé - MT");
}

#[tokio::test]
async fn test_location_is_saved_across_reload() {
    let fake = FakeShopify::start().await;
    let dir = TempDir::new().unwrap();

    {
        let state = AppState::new(fake.config(dir.path())).unwrap();
        let location = state.location().locate("01001000").await.unwrap();
        assert_eq!(location.locality.postal_code.to_string(), "01001-000");
    }

    let state = AppState::new(fake.config(dir.path())).unwrap();
    let saved = state.location().saved().unwrap();
    assert_eq!(saved.locality.city, "São Paulo");

    state.location().forget();
    assert!(state.location().saved().is_none());
}

#[tokio::test]
async fn test_invalid_input_never_reaches_the_service() {
    let fake = FakeShopify::start().await;
    let dir = TempDir::new().unwrap();
    let state = AppState::new(fake.config(dir.path())).unwrap();

    let err = state.location().locate("0100-100").await.unwrap_err();
    assert!(matches!(err, LocationError::InvalidPostalCode(_)));
    assert_eq!(fake.postal_requests(), 0);
    assert!(state.location().saved().is_none());
}
