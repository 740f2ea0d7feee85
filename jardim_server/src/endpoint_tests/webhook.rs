use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use chrono::Utc;
use jardim_common::Secret;
use jardim_engine::{
    db_types::{Centavos, Commission, CommissionStatus, Order, OrderStatus, PaymentPlan},
    events::EventProducers,
    traits::data_objects::SettlementResult,
    OrderFlowApi,
    SalesError,
};
use serde_json::Value;

use super::mocks::MockSalesManager;
use crate::{helpers::calculate_hmac, middleware::HmacMiddlewareFactory, routes::PaymentWebhookRoute};

const WEBHOOK_SECRET: &str = "webhook-tests-only";
const HEADER: &str = "X-Signature";

fn settlement(order_id: i64) -> SettlementResult {
    let order = Order {
        id: order_id,
        user_id: 7,
        status: OrderStatus::Confirmado,
        payment_plan: PaymentPlan::AVista,
        subtotal: Centavos::from(20_000),
        shipping_address: None,
        notes: None,
        delivered_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    let commission = Commission {
        id: 1,
        order_id,
        user_id: 7,
        amount: Centavos::from(5_000),
        status: CommissionStatus::Pendente,
        paid_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    SettlementResult { order, settled: vec![], commission, fully_paid: true, bonus_check: None, delinquency: None }
}

fn sales_backend() -> MockSalesManager {
    let mut sales = MockSalesManager::new();
    sales.expect_settle_order().returning(|order_id, gateway_id, _| match (order_id, gateway_id) {
        (42, Some("987654")) => Ok(settlement(42)),
        (43, _) => Err(SalesError::PaymentModificationNoOp),
        (id, _) => Err(SalesError::OrderNotFound(id)),
    });
    sales
}

/// Posts `body` to the webhook. `signature` of `None` leaves the header off.
async fn call_webhook(body: &str, signature: Option<String>, checks: bool) -> Result<(StatusCode, Value), String> {
    let api = OrderFlowApi::new(sales_backend(), EventProducers::default());
    let hmac = HmacMiddlewareFactory::new(HEADER, Secret::new(WEBHOOK_SECRET.to_string()), checks);
    let app = App::new()
        .service(web::scope("/webhook").wrap(hmac).service(PaymentWebhookRoute::<MockSalesManager>::new()))
        .app_data(web::Data::new(api));
    let service = test::init_service(app).await;
    let mut req = TestRequest::post().uri("/webhook/payment").set_payload(body.to_string());
    if let Some(signature) = signature {
        req = req.insert_header((HEADER, signature));
    }
    let res = test::try_call_service(&service, req.to_request()).await.map_err(|e| e.to_string())?;
    let status = res.status();
    let body = test::read_body(res).await;
    Ok((status, serde_json::from_slice(&body).unwrap()))
}

fn sign(body: &str) -> Option<String> {
    Some(calculate_hmac(WEBHOOK_SECRET, body.as_bytes()))
}

#[actix_web::test]
async fn approved_payment() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"action":"payment.updated","data":{"id":987654,"status":"approved","external_reference":"42"}}"#;
    let (status, json) = call_webhook(body, sign(body), true).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Order #42 settled");
}

#[actix_web::test]
async fn repeated_notification_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"data":{"id":"111","status":"approved","external_reference":"43"}}"#;
    let (status, json) = call_webhook(body, sign(body), true).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Notification acknowledged. No changes were made.");
}

#[actix_web::test]
async fn pending_payment_changes_nothing() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"data":{"id":"112","status":"pending","external_reference":"42"}}"#;
    let (status, json) = call_webhook(body, sign(body), true).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
}

#[actix_web::test]
async fn unknown_order_still_answers_ok() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"data":{"id":"113","status":"approved","external_reference":"99"}}"#;
    let (status, json) = call_webhook(body, sign(body), true).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "The requested order #99 does not exist");

    let body = r#"{"data":{"id":"114","status":"approved","external_reference":"pedido-99"}}"#;
    let (status, json) = call_webhook(body, sign(body), true).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Invalid payment gateway notification. 'pedido-99' is not an order id");
}

#[actix_web::test]
async fn malformed_body() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"data":"nada"}"#;
    let (status, json) = call_webhook(body, sign(body), true).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert!(json["message"].as_str().unwrap().starts_with("Invalid notification."));
}

#[actix_web::test]
async fn missing_signature() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"data":{"id":987654,"status":"approved","external_reference":"42"}}"#;
    let err = call_webhook(body, None, true).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. No webhook signature found.");
}

#[actix_web::test]
async fn invalid_signature() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"data":{"id":987654,"status":"approved","external_reference":"42"}}"#;
    let tampered = r#"{"data":{"id":987654,"status":"approved","external_reference":"43"}}"#;
    let err = call_webhook(tampered, sign(body), true).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. Invalid webhook signature.");
}

#[actix_web::test]
async fn signature_from_another_key() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"data":{"id":987654,"status":"approved","external_reference":"42"}}"#;
    let forged = calculate_hmac("not-the-webhook-secret", body.as_bytes());
    assert_eq!(forged.len(), sign(body).map(|s| s.len()).unwrap_or_default());
    let err = call_webhook(body, Some(forged), true).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. Invalid webhook signature.");
}

#[actix_web::test]
async fn signature_that_is_not_base64() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"data":{"id":987654,"status":"approved","external_reference":"42"}}"#;
    let err = call_webhook(body, Some("%%%% not a signature %%%%".into()), true).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. Invalid webhook signature.");
}

#[actix_web::test]
async fn signature_checks_disabled() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"data":{"id":987654,"status":"approved","external_reference":"42"}}"#;
    let (status, json) = call_webhook(body, None, false).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Order #42 settled");
}
