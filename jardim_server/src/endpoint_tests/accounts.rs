use actix_web::{http::StatusCode, web, web::ServiceConfig};
use jardim_engine::{
    db_types::{Role, UserStatus},
    events::EventProducers,
    traits::data_objects::{BonusCheckResult, DelinquencyResult},
    AccountApi,
    OrderFlowApi,
};
use serde_json::Value;

use super::{
    helpers::{admin_token, get_request, patch_request, post_request, seller_token, user},
    mocks::{MockSalesManager, MockUserManager},
};
use crate::routes::{CheckUserRoute, UpdateMyAccountRoute, UpdateUserStatusRoute, UserByIdRoute};

#[actix_web::test]
async fn update_my_account() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        patch_request(&seller_token(7), "/me", r#"{"pix_key":" 11987654321 "}"#, configure).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["pix_key"], "11987654321");
}

#[actix_web::test]
async fn empty_profile_update() {
    let _ = env_logger::try_init().ok();
    let (status, body) = patch_request(&seller_token(7), "/me", "{}", configure).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("would result in a no-op"));

    let (status, body) = patch_request(&seller_token(7), "/me", r#"{"password":"curta"}"#, configure).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Passwords must have at least 8 characters"));
}

#[actix_web::test]
async fn user_by_id() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&admin_token(), "/users/7", configure).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["email"], "user7@jardimprive.test");

    let (status, _) = get_request(&admin_token(), "/users/404", configure).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);

    let err = get_request(&seller_token(7), "/users/7", configure).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. VENDEDORA may not access this resource");
}

#[actix_web::test]
async fn deactivate_user() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        patch_request(&admin_token(), "/users/7/status", r#"{"status":"INATIVA"}"#, configure).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "INATIVA");
    assert_eq!(json["is_blocked"], false);
}

#[actix_web::test]
async fn delinquency_status_is_not_set_by_hand() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        patch_request(&admin_token(), "/users/7/status", r#"{"status":"INADIMPLENTE"}"#, configure).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("INADIMPLENTE is set by the delinquency check"));
}

#[actix_web::test]
async fn unchanged_status() {
    let _ = env_logger::try_init().ok();
    let (status, _) =
        patch_request(&admin_token(), "/users/7/status", r#"{"status":"ATIVA","is_blocked":false}"#, configure)
            .await
            .unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn check_user() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request(&admin_token(), "/users/7/check", "", configure).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["bonus"]["qualifying_sales"], 9);
    assert_eq!(json["delinquency"]["overdue_payments"], 3);
    assert_eq!(json["delinquency"]["status"], "INADIMPLENTE");
    assert_eq!(json["delinquency"]["changed"], true);
}

fn configure(cfg: &mut ServiceConfig) {
    let mut users = MockUserManager::new();
    users.expect_fetch_user().returning(|id| match id {
        404 => Ok(None),
        id => Ok(Some(user(id, Role::Vendedora))),
    });
    users.expect_update_profile().returning(|id, update| {
        let mut account = user(id, Role::Vendedora);
        account.pix_key = update.pix_key.or(account.pix_key);
        Ok(account)
    });
    users.expect_set_user_status().returning(|id, status, is_blocked| {
        let mut account = user(id, Role::Vendedora);
        account.status = status;
        account.is_blocked = is_blocked;
        Ok(account)
    });
    let mut sales = MockSalesManager::new();
    sales.expect_check_bonus().returning(|user_id, _| {
        Ok(BonusCheckResult { user_id, qualifying_sales: 9, new_bonuses: vec![] })
    });
    sales.expect_check_delinquency().returning(|user_id, _| {
        Ok(DelinquencyResult {
            user_id,
            overdue_payments: 3,
            is_blocked: true,
            status: UserStatus::Inadimplente,
            changed: true,
        })
    });
    cfg.service(UpdateMyAccountRoute::<MockUserManager>::new())
        .service(UserByIdRoute::<MockUserManager>::new())
        .service(UpdateUserStatusRoute::<MockUserManager>::new())
        .service(CheckUserRoute::<MockSalesManager>::new())
        .app_data(web::Data::new(AccountApi::new(users)))
        .app_data(web::Data::new(OrderFlowApi::new(sales, EventProducers::default())));
}
