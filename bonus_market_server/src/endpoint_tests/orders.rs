use actix_web::{
    http::{header::ContentType, StatusCode},
    web,
    web::ServiceConfig,
};
use bm_common::Bonus;
use bonus_market_engine::{
    db_types::{NewUser, OrderNumber, OrderStatusType, UserAccount},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    traits::{OrderLedger, WalletLedger},
    AuthApi,
    JobQueue,
    OrderFlowApi,
    SqliteDatabase,
    WalletApi,
};
use serde_json::json;

use super::helpers::{issue_token, post_json, post_raw, post_text};
use crate::routes::{SubmitOrderRoute, WithdrawRoute};

fn configure(db: SqliteDatabase, queue: JobQueue) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(SubmitOrderRoute::<SqliteDatabase>::new())
            .service(WithdrawRoute::<SqliteDatabase>::new())
            .app_data(web::Data::new(OrderFlowApi::new(db.clone(), queue)))
            .app_data(web::Data::new(WalletApi::new(db)));
    }
}

async fn new_user(db: &SqliteDatabase, login: &str) -> (UserAccount, String) {
    let user = AuthApi::new(db.clone()).register(NewUser::new(login, "password")).await.unwrap();
    let token = issue_token(user.id, &user.login);
    (user, token)
}

#[actix_web::test]
async fn submit_order_without_token() {
    let db = prepare_test_env(&random_db_path()).await;
    let queue = JobQueue::new(10);
    let res = post_text("", "/orders", "9278923470", configure(db.clone(), queue.clone())).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert!(queue.is_empty());
    db.close().await;
}

#[actix_web::test]
async fn submit_order_as_json() {
    let db = prepare_test_env(&random_db_path()).await;
    let (_, token) = new_user(&db, "alice").await;
    let queue = JobQueue::new(10);
    let cfg = configure(db.clone(), queue.clone());
    let res = post_raw(&token, "/orders", ContentType::json(), "9278923470", cfg).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(queue.is_empty());
    db.close().await;
}

#[actix_web::test]
async fn submit_order_with_bad_checksum() {
    let db = prepare_test_env(&random_db_path()).await;
    let (_, token) = new_user(&db, "alice").await;
    let queue = JobQueue::new(10);
    for number in ["12345", "9278923471", "92789a3470", ""] {
        let res = post_text(&token, "/orders", number, configure(db.clone(), queue.clone())).await;
        assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY, "order number '{number}'");
    }
    assert!(queue.is_empty());
    db.close().await;
}

#[actix_web::test]
async fn submit_order_then_resubmit() {
    let db = prepare_test_env(&random_db_path()).await;
    let (user, token) = new_user(&db, "alice").await;
    let queue = JobQueue::new(10);

    let res = post_text(&token, "/orders", "9278923470\n", configure(db.clone(), queue.clone())).await;
    assert_eq!(res.status, StatusCode::ACCEPTED);
    assert_eq!(queue.len(), 1);
    let order = db.fetch_order(&OrderNumber::from("9278923470")).await.unwrap().expect("Order was not stored");
    assert_eq!(order.user_id, user.id);
    assert_eq!(order.status, OrderStatusType::Processing);

    let res = post_text(&token, "/orders", "9278923470", configure(db.clone(), queue.clone())).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(queue.len(), 1);
    db.close().await;
}

#[actix_web::test]
async fn submit_order_owned_by_someone_else() {
    let db = prepare_test_env(&random_db_path()).await;
    let (_, alice) = new_user(&db, "alice").await;
    let (_, bob) = new_user(&db, "bob").await;
    let queue = JobQueue::new(10);

    let res = post_text(&alice, "/orders", "2377225624", configure(db.clone(), queue.clone())).await;
    assert_eq!(res.status, StatusCode::ACCEPTED);
    let res = post_text(&bob, "/orders", "2377225624", configure(db.clone(), queue.clone())).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.json(), json!({"error": "Order 2377225624 has already been uploaded by another user"}));
    assert_eq!(queue.len(), 1);
    db.close().await;
}

#[actix_web::test]
async fn submit_order_while_shutting_down() {
    let db = prepare_test_env(&random_db_path()).await;
    let (_, token) = new_user(&db, "alice").await;
    let queue = JobQueue::new(10);
    queue.shutdown();
    let res = post_text(&token, "/orders", "79927398713", configure(db.clone(), queue.clone())).await;
    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    let order = db.fetch_order(&OrderNumber::from("79927398713")).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatusType::New);
    db.close().await;
}

#[actix_web::test]
async fn withdraw_bonuses() {
    let db = prepare_test_env(&random_db_path()).await;
    let (user, token) = new_user(&db, "alice").await;
    db.credit(user.id, Bonus::from(50_000)).await.unwrap();
    let queue = JobQueue::new(10);

    let body = json!({"order": "2377225624", "sum": 751});
    let res = post_json(&token, "/balance/withdraw", body, configure(db.clone(), queue.clone())).await;
    assert_eq!(res.status, StatusCode::PAYMENT_REQUIRED);

    let body = json!({"order": "2377225625", "sum": 100});
    let res = post_json(&token, "/balance/withdraw", body, configure(db.clone(), queue.clone())).await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);

    let body = json!({"order": "2377225624", "sum": 0});
    let res = post_json(&token, "/balance/withdraw", body, configure(db.clone(), queue.clone())).await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);

    let body = json!({"order": "2377225624", "sum": 120.25});
    let res = post_json(&token, "/balance/withdraw", body, configure(db.clone(), queue.clone())).await;
    assert_eq!(res.status, StatusCode::OK);
    let json = res.json();
    assert_eq!(json["order"], "2377225624");
    assert_eq!(json["sum"], 120.25);

    let wallet = db.get_wallet(user.id).await.unwrap();
    assert_eq!(wallet.balance, Bonus::from(37_975));
    assert_eq!(wallet.total_withdrawn, Bonus::from(12_025));
    assert!(queue.is_empty());
    db.close().await;
}
