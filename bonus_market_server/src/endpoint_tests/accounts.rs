use actix_web::{http::StatusCode, web, web::ServiceConfig};
use bm_common::Bonus;
use bonus_market_engine::{
    db_types::{Order, OrderNumber, OrderStatusType, Wallet, Withdrawal},
    AccountApi,
};
use chrono::{TimeZone, Utc};
use mockall::predicate::eq;
use serde_json::json;

use super::{
    helpers::{get_request, get_request_with_bearer, issue_expired_token, issue_token},
    mocks::MockAccountManager,
};
use crate::routes::{BalanceRoute, MyOrdersRoute, WithdrawalsRoute};

const USER_ID: i64 = 7;

fn configure(account_manager: MockAccountManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(MyOrdersRoute::<MockAccountManager>::new())
            .service(BalanceRoute::<MockAccountManager>::new())
            .service(WithdrawalsRoute::<MockAccountManager>::new())
            .app_data(web::Data::new(AccountApi::new(account_manager)));
    }
}

fn order(number: &str, status: OrderStatusType, accrual: i64, day: u32) -> Order {
    let at = Utc.with_ymd_and_hms(2024, 6, day, 9, 0, 0).unwrap();
    Order {
        id: i64::from(day),
        number: OrderNumber::from(number),
        user_id: USER_ID,
        status,
        accrual: Bonus::from(accrual),
        created_at: at,
        updated_at: at,
    }
}

#[actix_web::test]
async fn fetch_my_orders_no_token() {
    let _ = env_logger::try_init().ok();
    let res = get_request("", "/orders", configure(MockAccountManager::new())).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json(), json!({"error": "Authentication Error. No access token was provided."}));
}

#[actix_web::test]
async fn fetch_my_orders_expired_token() {
    let _ = env_logger::try_init().ok();
    let token = issue_expired_token(USER_ID, "alice");
    let res = get_request(&token, "/orders", configure(MockAccountManager::new())).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert!(res.body.contains("Access token is invalid"), "{}", res.body);
}

#[actix_web::test]
async fn fetch_my_orders_tampered_token() {
    let _ = env_logger::try_init().ok();
    let mut token = issue_token(USER_ID, "alice");
    token.push('x');
    let res = get_request(&token, "/orders", configure(MockAccountManager::new())).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn fetch_my_orders() {
    let _ = env_logger::try_init().ok();
    let mut account_manager = MockAccountManager::new();
    account_manager.expect_fetch_orders_for_user().with(eq(USER_ID)).times(1).returning(|_| {
        Ok(vec![
            order("9278923470", OrderStatusType::Processed, 50_000, 3),
            order("12345678903", OrderStatusType::Processing, 0, 2),
            order("346436439", OrderStatusType::Invalid, 0, 1),
        ])
    });
    let token = issue_token(USER_ID, "alice");
    let res = get_request(&token, "/orders", configure(account_manager)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.json(),
        json!([
            {"number": "9278923470", "status": "PROCESSED", "accrual": 500.0, "uploaded_at": "2024-06-03T09:00:00Z"},
            {"number": "12345678903", "status": "PROCESSING", "uploaded_at": "2024-06-02T09:00:00Z"},
            {"number": "346436439", "status": "INVALID", "uploaded_at": "2024-06-01T09:00:00Z"}
        ])
    );
}

#[actix_web::test]
async fn bearer_header_is_accepted() {
    let _ = env_logger::try_init().ok();
    let mut account_manager = MockAccountManager::new();
    account_manager.expect_fetch_orders_for_user().with(eq(USER_ID)).returning(|_| Ok(vec![]));
    let token = issue_token(USER_ID, "alice");
    let res = get_request_with_bearer(&token, "/orders", configure(account_manager)).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert!(res.body.is_empty());
}

#[actix_web::test]
async fn fetch_my_balance() {
    let _ = env_logger::try_init().ok();
    let mut account_manager = MockAccountManager::new();
    account_manager.expect_fetch_wallet_for_user().with(eq(USER_ID)).returning(|user_id| {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        Ok(Some(Wallet {
            id: 1,
            user_id,
            balance: Bonus::from(50_050),
            total_withdrawn: Bonus::from(4_200),
            created_at: at,
            updated_at: at,
        }))
    });
    let token = issue_token(USER_ID, "alice");
    let res = get_request(&token, "/balance", configure(account_manager)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!({"current": 500.5, "withdrawn": 42.0}));
}

#[actix_web::test]
async fn balance_without_a_wallet() {
    let _ = env_logger::try_init().ok();
    let mut account_manager = MockAccountManager::new();
    account_manager.expect_fetch_wallet_for_user().returning(|_| Ok(None));
    let token = issue_token(USER_ID, "alice");
    let res = get_request(&token, "/balance", configure(account_manager)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn fetch_my_withdrawals() {
    let _ = env_logger::try_init().ok();
    let mut account_manager = MockAccountManager::new();
    account_manager.expect_fetch_withdrawals_for_user().with(eq(USER_ID)).times(1).returning(|user_id| {
        Ok(vec![Withdrawal {
            id: 1,
            user_id,
            order_number: OrderNumber::from("2377225624"),
            amount: Bonus::from(50_000),
            processed_at: Utc.with_ymd_and_hms(2024, 6, 5, 16, 9, 57).unwrap(),
        }])
    });
    let token = issue_token(USER_ID, "alice");
    let res = get_request(&token, "/withdrawals", configure(account_manager)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!([{"order": "2377225624", "sum": 500.0, "processed_at": "2024-06-05T16:09:57Z"}]));
}

#[actix_web::test]
async fn no_withdrawals_yet() {
    let _ = env_logger::try_init().ok();
    let mut account_manager = MockAccountManager::new();
    account_manager.expect_fetch_withdrawals_for_user().returning(|_| Ok(vec![]));
    let token = issue_token(USER_ID, "alice");
    let res = get_request(&token, "/withdrawals", configure(account_manager)).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
}
