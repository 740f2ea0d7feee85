use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Utc;
use jardim_engine::{
    db_types::{Centavos, Product, ProductVariation},
    traits::data_objects::ProductWithVariations,
    CatalogApi,
    CatalogError,
};
use serde_json::Value;

use super::{
    helpers::{admin_token, get_request, patch_request, post_request, seller_token},
    mocks::MockCatalogManager,
};
use crate::routes::{AddVariationRoute, CreateProductRoute, ProductByIdRoute, ProductsRoute, SetStockRoute};

fn variation(id: i64, product_id: i64, stock: i64) -> ProductVariation {
    ProductVariation {
        id,
        product_id,
        name: format!("Variação {id}"),
        sku: Some(format!("JP-{id:04}")),
        stock,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn product(id: i64, active: bool) -> ProductWithVariations {
    let product = Product {
        id,
        name: format!("Perfume {id}"),
        description: None,
        price: Centavos::from(8_990),
        image_url: None,
        active,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    ProductWithVariations { product, variations: vec![variation(10 * id, id, 5)] }
}

#[actix_web::test]
async fn sellers_only_see_active_products() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&seller_token(7), "/products?include_inactive=true", configure).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json.as_array().map(|a| a.len()), Some(1));

    let (status, body) = get_request(&admin_token(), "/products?include_inactive=true", configure).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json.as_array().map(|a| a.len()), Some(2));
}

#[actix_web::test]
async fn inactive_product_is_hidden_from_sellers() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&seller_token(7), "/products/1", configure).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["name"], "Perfume 1");
    assert_eq!(json["price"], 8_990);
    assert_eq!(json["variations"][0]["sku"], "JP-0010");

    let (status, _) = get_request(&seller_token(7), "/products/2", configure).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get_request(&admin_token(), "/products/2", configure).await.unwrap();
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn create_product() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"name":"Perfume 3","price":8990,"variations":[{"name":"100ml","stock":4}]}"#;
    let (status, _) = post_request(&admin_token(), "/products", body, configure).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);

    let body = r#"{"name":"Perfume 3","price":8990}"#;
    let (status, body) = post_request(&admin_token(), "/products", body, configure).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("A product needs at least one variation"));

    let err = post_request(&seller_token(7), "/products", "{}", configure).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. VENDEDORA may not access this resource");
}

#[actix_web::test]
async fn duplicate_sku() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"name":"200ml","sku":"JP-0010","stock":1}"#;
    let (status, body) = post_request(&admin_token(), "/products/1/variations", body, configure).await.unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("The SKU JP-0010 is already in use"));
}

#[actix_web::test]
async fn set_stock() {
    let _ = env_logger::try_init().ok();
    let (status, body) = patch_request(&admin_token(), "/variations/10/stock", r#"{"stock":12}"#, configure).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["stock"], 12);

    let (status, _) = patch_request(&admin_token(), "/variations/10/stock", r#"{"stock":-1}"#, configure).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = patch_request(&admin_token(), "/variations/99/stock", r#"{"stock":1}"#, configure).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn configure(cfg: &mut ServiceConfig) {
    let mut catalog = MockCatalogManager::new();
    catalog.expect_fetch_products().returning(|include_inactive| match include_inactive {
        true => Ok(vec![product(1, true), product(2, false)]),
        false => Ok(vec![product(1, true)]),
    });
    catalog.expect_fetch_product().returning(|id| match id {
        1 => Ok(Some(product(1, true))),
        2 => Ok(Some(product(2, false))),
        _ => Ok(None),
    });
    catalog.expect_create_product().returning(|_| Ok(product(3, true)));
    catalog.expect_add_variation().returning(|_, v| Err(CatalogError::DuplicateSku(v.sku.unwrap_or_default())));
    catalog.expect_set_variation_stock().returning(|id, stock| match id {
        10 => Ok(variation(10, 1, stock)),
        id => Err(CatalogError::VariationNotFound(id)),
    });
    cfg.service(ProductsRoute::<MockCatalogManager>::new())
        .service(ProductByIdRoute::<MockCatalogManager>::new())
        .service(CreateProductRoute::<MockCatalogManager>::new())
        .service(AddVariationRoute::<MockCatalogManager>::new())
        .service(SetStockRoute::<MockCatalogManager>::new())
        .app_data(web::Data::new(CatalogApi::new(catalog)));
}
