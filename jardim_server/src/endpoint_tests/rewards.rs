use actix_web::{
    http::{header, StatusCode},
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::{Duration, NaiveDate, Utc};
use jardim_engine::{
    db_types::{
        BookingStatus,
        Centavos,
        Commission,
        CommissionStatus,
        HotelBooking,
        Notification,
        OrderStatus,
        PaymentPlan,
        Role,
        WithdrawalRequest,
        WithdrawalStatus,
    },
    events::EventProducers,
    traits::data_objects::{OrderReportRow, WithdrawalDecision},
    NotificationError,
    NotificationsApi,
    ReportsApi,
    RewardsApi,
    RewardsError,
};
use serde_json::Value;

use super::{
    helpers::{admin_token, get_request, post_request, seller_token, token_issuer, user},
    mocks::{MockNotificationManager, MockReportsManager, MockRewardsManager},
};
use crate::{
    middleware::JwtMiddlewareFactory,
    routes::{
        ApproveWithdrawalRoute,
        ExportCsvRoute,
        MarkNotificationReadRoute,
        MyCommissionsRoute,
        MyNotificationsRoute,
        RejectWithdrawalRoute,
        RequestHotelBookingRoute,
        RequestWithdrawalRoute,
    },
};

fn commission(id: i64, amount: i64, status: CommissionStatus) -> Commission {
    Commission {
        id,
        order_id: id,
        user_id: 7,
        amount: Centavos::from(amount),
        status,
        paid_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn withdrawal(id: i64, user_id: i64, amount: Centavos, status: WithdrawalStatus) -> WithdrawalRequest {
    WithdrawalRequest {
        id,
        user_id,
        amount,
        pix_key: format!("user{user_id}@pix.test"),
        status,
        admin_note: None,
        paid_out: Centavos::default(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn tomorrow() -> NaiveDate {
    (Utc::now() + Duration::days(1)).date_naive()
}

#[actix_web::test]
async fn my_commissions() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&seller_token(7), "/commissions", configure_rewards).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["commissions"].as_array().map(|a| a.len()), Some(3));
    assert_eq!(json["total_pending"], 7_500);
    assert_eq!(json["total_paid"], 5_000);
}

#[actix_web::test]
async fn request_withdrawal() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request(&seller_token(7), "/withdrawals", r#"{"amount":5000}"#, configure_rewards).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "PENDENTE");
    assert_eq!(json["pix_key"], "user7@pix.test");
}

#[actix_web::test]
async fn withdrawal_above_balance() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request(&seller_token(7), "/withdrawals", r#"{"amount":9000}"#, configure_rewards).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["details"], "Insufficient balance. Requested R$ 90,00, available R$ 75,00");
}

#[actix_web::test]
async fn invalid_withdrawals() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request(&seller_token(7), "/withdrawals", r#"{"amount":0}"#, configure_rewards).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Withdrawal amounts must be positive"));

    let (status, body) =
        post_request(&seller_token(7), "/withdrawals", r#"{"amount":100,"pix_key":"  "}"#, configure_rewards)
            .await
            .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["pix_key"], "user7@pix.test");
}

#[actix_web::test]
async fn blocked_seller_cannot_withdraw() {
    let _ = env_logger::try_init().ok();
    let (status, _) =
        post_request(&seller_token(13), "/withdrawals", r#"{"amount":1000}"#, configure_rewards).await.unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn approve_withdrawal() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request(&admin_token(), "/withdrawals/5/approve", "", configure_rewards).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["withdrawal"]["status"], "APROVADO");
    assert_eq!(json["commissions_paid"], 2);
    assert_eq!(json["bonuses_paid"], 1);

    let (status, body) =
        post_request(&admin_token(), "/withdrawals/6/approve", r#"{"note":"PIX enviado"}"#, configure_rewards)
            .await
            .unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("Withdrawal request #6 has already been APROVADO"));
}

#[actix_web::test]
async fn reject_withdrawal() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request(&admin_token(), "/withdrawals/5/reject", r#"{"note":"Chave PIX inválida"}"#, configure_rewards)
            .await
            .unwrap();
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "RECUSADO");
    assert_eq!(json["admin_note"], "Chave PIX inválida");

    let err = post_request(&seller_token(7), "/withdrawals/5/reject", "", configure_rewards)
        .await
        .expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. VENDEDORA may not access this resource");
}

#[actix_web::test]
async fn hotel_booking() {
    let _ = env_logger::try_init().ok();
    let check_in = tomorrow();
    let check_out = check_in + Duration::days(2);
    let body = format!(r#"{{"check_in":"{check_in}","check_out":"{check_out}","guests":2}}"#);
    let (status, response) = post_request(&seller_token(7), "/hotel-bookings", &body, configure_rewards).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let json: Value = serde_json::from_str(&response).unwrap();
    assert_eq!(json["status"], "PENDENTE");
    assert_eq!(json["bonus_id"], 3);

    let (status, response) = post_request(&seller_token(8), "/hotel-bookings", &body, configure_rewards).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response.contains("User #8 has no unused hotel award"));
}

#[actix_web::test]
async fn invalid_hotel_booking_dates() {
    let _ = env_logger::try_init().ok();
    let check_in = tomorrow();
    let body = format!(r#"{{"check_in":"{check_in}","check_out":"{check_in}","guests":2}}"#);
    let (status, response) = post_request(&seller_token(7), "/hotel-bookings", &body, configure_rewards).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response.contains("The check-out date must be after the check-in date"));

    let body = r#"{"check_in":"2020-01-10","check_out":"2020-01-12","guests":1}"#;
    let (status, response) = post_request(&seller_token(7), "/hotel-bookings", body, configure_rewards).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response.contains("The check-in date is in the past"));
}

#[actix_web::test]
async fn notifications() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        get_request(&seller_token(7), "/notifications?unread_only=true", configure_notifications).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json.as_array().map(|a| a.len()), Some(1));
    assert_eq!(json[0]["read"], false);

    let (status, body) =
        post_request(&seller_token(7), "/notifications/21/read", "", configure_notifications).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["read"], true);

    // Somebody else's notification
    let (status, _) = post_request(&seller_token(8), "/notifications/21/read", "", configure_notifications).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn export_orders_csv() {
    let _ = env_logger::try_init().ok();
    let app = App::new().wrap(JwtMiddlewareFactory::new(token_issuer())).configure(configure_reports);
    let service = test::init_service(app).await;
    let req = TestRequest::get()
        .uri("/admin/export/orders.csv")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", admin_token())))
        .to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let content_type = res.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
    assert_eq!(content_type, "text/csv; charset=utf-8");
    let disposition = res.headers().get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap();
    assert_eq!(disposition, r#"attachment; filename="orders.csv""#);
    let body = String::from_utf8_lossy(&test::read_body(res).await).into_owned();
    let mut lines = body.lines();
    assert_eq!(
        lines.next(),
        Some("order_id,seller_name,seller_email,status,payment_plan,subtotal,amount_paid,created_at,delivered_at")
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with("10,Ana Souza,ana@jardimprive.test,ENVIADO,PARCELADO,200.00,100.00,"), "{row}");
    assert_eq!(lines.next(), None);
}

#[actix_web::test]
async fn unknown_export() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&admin_token(), "/admin/export/sellers", configure_reports).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Unknown report: sellers"));
}

fn configure_rewards(cfg: &mut ServiceConfig) {
    let mut rewards = MockRewardsManager::new();
    rewards.expect_fetch_commissions().returning(|_| {
        Ok(vec![
            commission(1, 5_000, CommissionStatus::Paga),
            commission(2, 5_000, CommissionStatus::Pendente),
            commission(3, 2_500, CommissionStatus::Pendente),
        ])
    });
    rewards.expect_fetch_user().returning(|id| Ok(Some(user(id, Role::Vendedora))));
    rewards.expect_create_withdrawal().returning(|w| {
        let available = Centavos::from(7_500);
        if w.user_id == 13 {
            return Err(RewardsError::UserBlocked(13));
        }
        if w.amount > available {
            return Err(RewardsError::InsufficientBalance { requested: w.amount, available });
        }
        Ok(withdrawal(5, w.user_id, w.amount, WithdrawalStatus::Pendente))
    });
    rewards.expect_approve_withdrawal().returning(|id, _| match id {
        5 => Ok(WithdrawalDecision {
            withdrawal: withdrawal(5, 7, Centavos::from(5_000), WithdrawalStatus::Aprovado),
            commissions_paid: 2,
            bonuses_paid: 1,
        }),
        id => Err(RewardsError::WithdrawalAlreadyDecided(id, WithdrawalStatus::Aprovado)),
    });
    rewards.expect_reject_withdrawal().returning(|id, note| {
        let mut w = withdrawal(id, 7, Centavos::from(5_000), WithdrawalStatus::Recusado);
        w.admin_note = note;
        Ok(w)
    });
    rewards.expect_create_hotel_booking().returning(|b| match b.user_id {
        7 => Ok(HotelBooking {
            id: 1,
            user_id: b.user_id,
            bonus_id: 3,
            check_in: b.check_in,
            check_out: b.check_out,
            guests: b.guests,
            status: BookingStatus::Pendente,
            admin_note: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }),
        id => Err(RewardsError::NoHotelAward(id)),
    });
    let api = RewardsApi::new(rewards, EventProducers::default());
    cfg.service(MyCommissionsRoute::<MockRewardsManager>::new())
        .service(RequestWithdrawalRoute::<MockRewardsManager>::new())
        .service(ApproveWithdrawalRoute::<MockRewardsManager>::new())
        .service(RejectWithdrawalRoute::<MockRewardsManager>::new())
        .service(RequestHotelBookingRoute::<MockRewardsManager>::new())
        .app_data(web::Data::new(api));
}

fn configure_notifications(cfg: &mut ServiceConfig) {
    fn notification(id: i64, read: bool) -> Notification {
        Notification {
            id,
            user_id: 7,
            title: "Pedido entregue".into(),
            message: "O pedido #10 foi entregue.".into(),
            read,
            created_at: Utc::now(),
        }
    }
    let mut notifications = MockNotificationManager::new();
    notifications.expect_fetch_notifications().returning(|_, unread_only| match unread_only {
        true => Ok(vec![notification(21, false)]),
        false => Ok(vec![notification(20, true), notification(21, false)]),
    });
    notifications.expect_mark_notification_read().returning(|user_id, id| match user_id {
        7 => Ok(notification(id, true)),
        _ => Err(NotificationError::NotificationNotFound(id)),
    });
    cfg.service(MyNotificationsRoute::<MockNotificationManager>::new())
        .service(MarkNotificationReadRoute::<MockNotificationManager>::new())
        .app_data(web::Data::new(NotificationsApi::new(notifications)));
}

fn configure_reports(cfg: &mut ServiceConfig) {
    let mut reports = MockReportsManager::new();
    reports.expect_orders_report().returning(|| {
        Ok(vec![OrderReportRow {
            order_id: 10,
            seller_name: "Ana Souza".into(),
            seller_email: "ana@jardimprive.test".into(),
            status: OrderStatus::Enviado,
            payment_plan: PaymentPlan::Parcelado,
            subtotal: Centavos::from(20_000),
            amount_paid: Centavos::from(10_000),
            created_at: Utc::now(),
            delivered_at: None,
        }])
    });
    cfg.service(ExportCsvRoute::<MockReportsManager>::new()).app_data(web::Data::new(ReportsApi::new(reports)));
}
