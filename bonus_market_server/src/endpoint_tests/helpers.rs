use actix_web::{
    cookie::Cookie,
    http::{header, header::ContentType, StatusCode},
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::Duration;
use log::debug;
use serde_json::Value;

use crate::{
    auth::{TokenIssuer, AUTH_COOKIE},
    config::AuthConfig,
};

// DO NOT re-use this secret anywhere.
const TEST_JWT_SECRET: &str = "925842e11914fdd0c9a2ab8a38dac9de57b3e392372cde1661b1a84b1d8e430e";

pub fn get_auth_config() -> AuthConfig {
    AuthConfig::new(TEST_JWT_SECRET, Duration::hours(1))
}

pub fn token_issuer() -> TokenIssuer {
    TokenIssuer::new(&get_auth_config())
}

pub fn issue_token(user_id: i64, login: &str) -> String {
    token_issuer().issue_token_with_lifetime(user_id, login, Duration::hours(1)).expect("Failed to sign token")
}

pub fn issue_expired_token(user_id: i64, login: &str) -> String {
    token_issuer().issue_token_with_lifetime(user_id, login, Duration::days(-1)).expect("Failed to sign token")
}

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: String,
    pub auth_cookie: Option<String>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("Response body was not JSON")
    }
}

/// Sends a GET request with the access token in the auth cookie. An empty token sends no cookie at all.
pub async fn get_request<F>(token: &str, path: &str, configure: F) -> TestResponse
where F: FnOnce(&mut ServiceConfig) {
    let req = with_cookie(TestRequest::get().uri(path), token);
    call(req, configure).await
}

/// Same as [`get_request`], but the token is sent as an `Authorization: Bearer` header.
pub async fn get_request_with_bearer<F>(token: &str, path: &str, configure: F) -> TestResponse
where F: FnOnce(&mut ServiceConfig) {
    let req = TestRequest::get().uri(path).insert_header((header::AUTHORIZATION, format!("Bearer {token}")));
    call(req, configure).await
}

pub async fn post_json<F>(token: &str, path: &str, body: Value, configure: F) -> TestResponse
where F: FnOnce(&mut ServiceConfig) {
    let req = with_cookie(TestRequest::post().uri(path).set_json(body), token);
    call(req, configure).await
}

pub async fn post_text<F>(token: &str, path: &str, body: &str, configure: F) -> TestResponse
where F: FnOnce(&mut ServiceConfig) {
    post_raw(token, path, ContentType::plaintext(), body, configure).await
}

pub async fn post_raw<F>(token: &str, path: &str, content_type: ContentType, body: &str, configure: F) -> TestResponse
where F: FnOnce(&mut ServiceConfig) {
    let req = TestRequest::post().uri(path).insert_header(content_type).set_payload(body.to_string());
    call(with_cookie(req, token), configure).await
}

fn with_cookie(req: TestRequest, token: &str) -> TestRequest {
    if token.is_empty() {
        req
    } else {
        req.cookie(Cookie::new(AUTH_COOKIE, token.to_string()))
    }
}

async fn call<F>(req: TestRequest, configure: F) -> TestResponse
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().app_data(web::Data::new(token_issuer())).configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let auth_cookie = res.response().cookies().find(|c| c.name() == AUTH_COOKIE).map(|c| c.value().to_string());
    let body = String::from_utf8_lossy(&test::read_body(res).await).into_owned();
    TestResponse { status, body, auth_cookie }
}
