use actix_web::{
    http::{header::ContentType, StatusCode},
    web,
    web::ServiceConfig,
};
use bonus_market_engine::{
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    AuthApi,
    SqliteDatabase,
};
use serde_json::json;

use super::helpers::{post_json, post_raw, token_issuer};
use crate::routes::{LoginRoute, RegisterRoute};

fn configure(db: SqliteDatabase) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(RegisterRoute::<SqliteDatabase>::new())
            .service(LoginRoute::<SqliteDatabase>::new())
            .app_data(web::Data::new(AuthApi::new(db)));
    }
}

async fn register(db: &SqliteDatabase, login: &str, password: &str) -> super::helpers::TestResponse {
    post_json("", "/register", json!({"login": login, "password": password}), configure(db.clone())).await
}

#[actix_web::test]
async fn register_new_user() {
    let db = prepare_test_env(&random_db_path()).await;
    let res = register(&db, "alice", "correct horse battery staple").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!({"success": true, "message": "Registration successful"}));
    let token = res.auth_cookie.expect("No auth cookie in response");
    let claims = token_issuer().verify_token(&token).expect("Issued token does not verify");
    assert_eq!(claims.login, "alice");
    db.close().await;
}

#[actix_web::test]
async fn register_taken_login() {
    let db = prepare_test_env(&random_db_path()).await;
    assert_eq!(register(&db, "alice", "first").await.status, StatusCode::OK);
    let res = register(&db, "alice", "second").await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.json(), json!({"error": "Login alice is already taken"}));
    assert!(res.auth_cookie.is_none());
    db.close().await;
}

#[actix_web::test]
async fn register_with_blank_password() {
    let db = prepare_test_env(&random_db_path()).await;
    let res = register(&db, "bob", "   ").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    db.close().await;
}

#[actix_web::test]
async fn register_with_malformed_body() {
    let db = prepare_test_env(&random_db_path()).await;
    let res = post_raw("", "/register", ContentType::json(), r#"{"login": "bob""#, configure(db.clone())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let res = post_json("", "/register", json!({"login": "bob"}), configure(db.clone())).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    db.close().await;
}

#[actix_web::test]
async fn login_after_registering() {
    let db = prepare_test_env(&random_db_path()).await;
    let registered = register(&db, "carol", "s3cret").await;
    let user_id = token_issuer().verify_token(&registered.auth_cookie.unwrap()).unwrap().user_id();

    let res = post_json("", "/login", json!({"login": "carol", "password": "s3cret"}), configure(db.clone())).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!({"success": true, "message": "Login successful"}));
    let claims = token_issuer().verify_token(&res.auth_cookie.unwrap()).unwrap();
    assert_eq!(claims.user_id(), user_id);
    db.close().await;
}

#[actix_web::test]
async fn login_with_wrong_credentials() {
    let db = prepare_test_env(&random_db_path()).await;
    register(&db, "dave", "s3cret").await;

    let res = post_json("", "/login", json!({"login": "dave", "password": "S3CRET"}), configure(db.clone())).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert!(res.auth_cookie.is_none());

    let res = post_json("", "/login", json!({"login": "eve", "password": "s3cret"}), configure(db.clone())).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json(), json!({"error": "Authentication Error. Wrong login or password."}));
    db.close().await;
}
