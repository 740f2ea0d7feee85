use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{Duration, Utc};
use jardim_engine::{
    db_types::{Centavos, Order, OrderStatus, Payment, PaymentPlan, PaymentStatus, PaymentType},
    events::EventProducers,
    traits::data_objects::{FullOrder, OrderStatusChange},
    OrderFlowApi,
    SalesError,
};
use serde_json::Value;

use super::{
    helpers::{admin_token, get_request, patch_request, post_request, seller_token},
    mocks::MockSalesManager,
};
use crate::routes::{
    MyOrdersRoute,
    OrderByIdRoute,
    OrderPaymentsRoute,
    PlaceOrderRoute,
    SearchOrdersRoute,
    UpdateOrderStatusRoute,
};

fn order(id: i64, user_id: i64, status: OrderStatus) -> Order {
    Order {
        id,
        user_id,
        status,
        payment_plan: PaymentPlan::Parcelado,
        subtotal: Centavos::from(20_000),
        shipping_address: Some("Rua das Flores, 12".into()),
        notes: None,
        delivered_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn payment(id: i64, order_id: i64, payment_type: PaymentType, days: i64) -> Payment {
    Payment {
        id,
        order_id,
        payment_type,
        amount: Centavos::from(10_000),
        due_date: Utc::now() + Duration::days(days),
        status: PaymentStatus::Pendente,
        paid_at: None,
        gateway_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn full_order(id: i64, user_id: i64) -> FullOrder {
    FullOrder {
        order: order(id, user_id, OrderStatus::Pendente),
        items: vec![],
        payments: vec![payment(2 * id, id, PaymentType::Entrada, 3), payment(2 * id + 1, id, PaymentType::ParcelaFinal, 30)],
    }
}

#[actix_web::test]
async fn my_orders() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&seller_token(7), "/orders", configure).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    let orders = json.as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|o| o["user_id"] == 7));
    assert_eq!(orders[0]["subtotal"], 20_000);
    assert_eq!(orders[0]["payment_plan"], "PARCELADO");
}

#[actix_web::test]
async fn own_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&seller_token(7), "/orders/10", configure).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["order"]["id"], 10);
    assert_eq!(json["payments"][0]["payment_type"], "ENTRADA");
    assert_eq!(json["payments"][1]["payment_type"], "PARCELA_FINAL");
}

#[actix_web::test]
async fn someone_elses_order_is_not_found() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&seller_token(8), "/orders/10", configure).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["details"], "The data was not found. Order #10 does not exist");

    let (status, _) = get_request(&seller_token(8), "/orders/10/payments", configure).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn admins_see_every_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&admin_token(), "/orders/10/payments", configure).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json.as_array().map(|a| a.len()), Some(2));
}

#[actix_web::test]
async fn missing_order() {
    let _ = env_logger::try_init().ok();
    let (status, _) = get_request(&admin_token(), "/orders/99", configure).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn place_order() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"items":[{"variation_id":3,"quantity":2}],"payment_plan":"PARCELADO"}"#;
    let (status, body) = post_request(&seller_token(7), "/orders", body, configure).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["order"]["user_id"], 7);
    assert_eq!(json["order"]["status"], "PENDENTE");
}

#[actix_web::test]
async fn blocked_seller_cannot_order() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"items":[{"variation_id":3,"quantity":2}],"payment_plan":"A_VISTA"}"#;
    let (status, body) = post_request(&seller_token(13), "/orders", body, configure).await.unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("User #13 is blocked and cannot place new orders"));
}

#[actix_web::test]
async fn order_below_minimum_value() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"items":[{"variation_id":4,"quantity":1}],"payment_plan":"A_VISTA"}"#;
    let (status, body) = post_request(&seller_token(7), "/orders", body, configure).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "Bad Request");
    assert_eq!(json["details"], "The minimum order value is R$ 150,00, but the order subtotal is R$ 89,90");
}

#[actix_web::test]
async fn malformed_order() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"items":[{"variation_id":3,"quantity":2}],"payment_plan":"BOLETO"}"#;
    let (status, _) = post_request(&seller_token(7), "/orders", body, configure).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn update_status() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        patch_request(&admin_token(), "/orders/10/status", r#"{"status":"EM_SEPARACAO"}"#, configure).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["old_status"], "CONFIRMADO");
    assert_eq!(json["order"]["status"], "EM_SEPARACAO");
}

#[actix_web::test]
async fn forbidden_status_change() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        patch_request(&admin_token(), "/orders/10/status", r#"{"status":"CANCELADO"}"#, configure).await.unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["details"], "An order cannot move from ENVIADO to CANCELADO.");
}

#[actix_web::test]
async fn sellers_cannot_change_status() {
    let _ = env_logger::try_init().ok();
    let err = patch_request(&seller_token(7), "/orders/10/status", r#"{"status":"ENTREGUE"}"#, configure)
        .await
        .expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. VENDEDORA may not access this resource");
}

#[actix_web::test]
async fn search_orders() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        get_request(&admin_token(), "/admin/orders?status=ENVIADO,ENTREGUE&user_id=7", configure).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json.as_array().map(|a| a.len()), Some(2));

    let (status, body) = get_request(&admin_token(), "/admin/orders?status=PAGO", configure).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("PAGO is not a valid OrderStatus"));
}

fn configure(cfg: &mut ServiceConfig) {
    let mut sales = MockSalesManager::new();
    sales.expect_search_orders().returning(|query| {
        let user_id = query.user_id.unwrap_or(7);
        Ok(vec![order(10, user_id, OrderStatus::Enviado), order(11, user_id, OrderStatus::Pendente)])
    });
    sales.expect_fetch_full_order().returning(|id| match id {
        10 => Ok(Some(full_order(10, 7))),
        _ => Ok(None),
    });
    sales.expect_place_order().returning(|new_order, minimum| match (new_order.user_id, new_order.items[0].variation_id) {
        (13, _) => Err(SalesError::UserBlocked(13)),
        (_, 4) => Err(SalesError::BelowMinimumOrder { minimum, subtotal: Centavos::from(8_990) }),
        (user_id, _) => Ok(full_order(12, user_id)),
    });
    sales.expect_update_order_status().returning(|id, new_status, _| match new_status {
        OrderStatus::Cancelado => {
            Err(SalesError::OrderModificationForbidden { from: OrderStatus::Enviado, to: OrderStatus::Cancelado })
        },
        status => Ok(OrderStatusChange {
            old_status: OrderStatus::Confirmado,
            order: order(id, 7, status),
            bonus_check: None,
        }),
    });
    let api = OrderFlowApi::new(sales, EventProducers::default()).with_min_order_value(Centavos::from(15_000));
    cfg.service(MyOrdersRoute::<MockSalesManager>::new())
        .service(SearchOrdersRoute::<MockSalesManager>::new())
        .service(OrderPaymentsRoute::<MockSalesManager>::new())
        .service(OrderByIdRoute::<MockSalesManager>::new())
        .service(PlaceOrderRoute::<MockSalesManager>::new())
        .service(UpdateOrderStatusRoute::<MockSalesManager>::new())
        .app_data(web::Data::new(api));
}
