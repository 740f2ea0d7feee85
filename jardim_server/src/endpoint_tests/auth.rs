use actix_web::{
    http::{header, StatusCode},
    test::TestRequest,
    web,
    web::ServiceConfig,
};
use chrono::{Duration, Utc};
use jardim_engine::{
    db_types::{Role, UserStatus},
    helpers::hash_password,
    AccountApi,
    AuthApi,
    UserApiError,
};
use serde_json::Value;

use super::{
    helpers::{admin_token, get_request, issue_token, public_request, seller_token, token_issuer, user},
    mocks::MockUserManager,
};
use crate::routes::{LoginRoute, MyAccountRoute, RegisterRoute, UsersRoute};

fn login_request(email: &str, password: &str) -> TestRequest {
    TestRequest::post()
        .uri("/auth/login")
        .insert_header(header::ContentType::json())
        .set_payload(serde_json::json!({ "email": email, "password": password }).to_string())
}

#[actix_web::test]
async fn login() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        public_request(login_request("user7@jardimprive.test", "hortensias"), configure_public).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["user"]["id"], 7);
    assert_eq!(json["user"]["role"], "VENDEDORA");
    assert!(json["user"].get("password_hash").is_none());
    let token = json["token"].as_str().unwrap();
    let claims = token_issuer().verify_token(token).unwrap();
    assert_eq!(claims.user_id, 7);
    assert_eq!(claims.role, Role::Vendedora);
}

#[actix_web::test]
async fn login_wrong_password() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        public_request(login_request("user7@jardimprive.test", "girassois"), configure_public).await.unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "Unauthorized");
    assert_eq!(json["details"], "Authentication Error. Invalid e-mail or password.");
}

#[actix_web::test]
async fn login_unknown_email() {
    let _ = env_logger::try_init().ok();
    let (status, _) = public_request(login_request("ninguem@jardimprive.test", "hortensias"), configure_public)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn login_deactivated_account() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        public_request(login_request("user8@jardimprive.test", "hortensias"), configure_public).await.unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("This account has been deactivated."));
}

#[actix_web::test]
async fn register() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"name":"Joana","email":"joana@jardimprive.test","cpf":"529.982.247-25","password":"margaridas"}"#;
    let req = TestRequest::post().uri("/auth/register").insert_header(header::ContentType::json()).set_payload(body);
    let (status, body) = public_request(req, configure_public).await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["email"], "joana@jardimprive.test");
    assert_eq!(json["cpf"], "52998224725");
}

#[actix_web::test]
async fn register_invalid_cpf() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"name":"Joana","email":"joana@jardimprive.test","cpf":"111.111.111-11","password":"margaridas"}"#;
    let req = TestRequest::post().uri("/auth/register").insert_header(header::ContentType::json()).set_payload(body);
    let (status, body) = public_request(req, configure_public).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains(r#""error":"Bad Request""#));
}

#[actix_web::test]
async fn register_duplicate_email() {
    let _ = env_logger::try_init().ok();
    let body = r#"{"name":"Ana","email":"ana@jardimprive.test","cpf":"529.982.247-25","password":"margaridas"}"#;
    let req = TestRequest::post().uri("/auth/register").insert_header(header::ContentType::json()).set_payload(body);
    let (status, body) = public_request(req, configure_public).await.unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("ana@jardimprive.test is already registered"));
}

#[actix_web::test]
async fn no_token() {
    let _ = env_logger::try_init().ok();
    let err = get_request("", "/me", configure_api).await.expect_err("Expected error");
    assert_eq!(err, "Authentication Error. No access token was provided.");
}

#[actix_web::test]
async fn expired_token() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(7, Role::Vendedora, Utc::now() - Duration::minutes(5));
    let err = get_request(&token, "/me", configure_api).await.expect_err("Expected error");
    assert_eq!(err, "Authentication Error. The access token has expired.");
}

#[actix_web::test]
async fn tampered_token() {
    let _ = env_logger::try_init().ok();
    let mut token = seller_token(7);
    token.replace_range(token.len() - 10..token.len() - 5, "00000");
    let err = get_request(&token, "/me", configure_api).await.expect_err("Expected error");
    assert!(err.starts_with("Authentication Error. Access token signature is invalid."), "{err}");
}

#[actix_web::test]
async fn my_account() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request(&seller_token(7), "/me", configure_api).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["name"], "User 7");
    assert_eq!(json["pix_key"], "user7@pix.test");
}

#[actix_web::test]
async fn users_is_admin_only() {
    let _ = env_logger::try_init().ok();
    let err = get_request(&seller_token(7), "/users", configure_api).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. VENDEDORA may not access this resource");
    let (status, body) = get_request(&admin_token(), "/users?role=VENDEDORA", configure_api).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json.as_array().map(|a| a.len()), Some(2));
}

fn configure_public(cfg: &mut ServiceConfig) {
    let hash = hash_password("hortensias").unwrap();
    let mut users = MockUserManager::new();
    users.expect_fetch_user_by_email().returning(move |email| {
        let account = match email {
            "user7@jardimprive.test" => user(7, Role::Vendedora),
            "user8@jardimprive.test" => {
                let mut u = user(8, Role::Vendedora);
                u.status = UserStatus::Inativa;
                u
            },
            _ => return Ok(None),
        };
        Ok(Some(jardim_engine::db_types::User { password_hash: hash.clone(), ..account }))
    });
    users.expect_create_user().returning(|new_user| match new_user.email.as_str() {
        "ana@jardimprive.test" => Err(UserApiError::EmailAlreadyRegistered(new_user.email)),
        _ => Ok(jardim_engine::db_types::User {
            name: new_user.name,
            email: new_user.email,
            cpf: new_user.cpf,
            role: new_user.role,
            ..user(12, Role::Vendedora)
        }),
    });
    cfg.service(LoginRoute::<MockUserManager>::new())
        .service(RegisterRoute::<MockUserManager>::new())
        .app_data(web::Data::new(AuthApi::new(users)));
}

fn configure_api(cfg: &mut ServiceConfig) {
    let mut users = MockUserManager::new();
    users.expect_fetch_user().returning(|id| Ok(Some(user(id, Role::Vendedora))));
    users.expect_search_users().returning(|_| Ok(vec![user(7, Role::Vendedora), user(9, Role::Vendedora)]));
    cfg.service(MyAccountRoute::<MockUserManager>::new())
        .service(UsersRoute::<MockUserManager>::new())
        .app_data(web::Data::new(AccountApi::new(users)));
}
