#![allow(dead_code)]
use bonus_market_engine::{
    db_types::{NewOrder, Order, OrderNumber},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    OrderLedger,
    SqliteDatabase,
    UserManagement,
};

pub mod oracle;

pub async fn new_database() -> SqliteDatabase {
    prepare_test_env(&random_db_path()).await
}

/// Registers a user with an empty wallet and returns their id.
pub async fn new_user(db: &SqliteDatabase, login: &str) -> i64 {
    let (user, _) = db.create_user_with_wallet(login, "not-a-real-hash").await.expect("Error creating user");
    user.id
}

/// Stores an order and moves it to `Processing`, as the intake API would.
pub async fn processing_order(db: &SqliteDatabase, number: &str, user_id: i64) -> Order {
    let number = OrderNumber::from(number);
    db.create_order(NewOrder::new(number.clone(), user_id)).await.expect("Error creating order");
    db.mark_processing(&number).await.expect("Error marking order as processing");
    db.fetch_order(&number).await.expect("Error fetching order").expect("Order should exist")
}

/// Builds a Luhn-valid order number from `seed` by appending the check digit.
pub fn luhn_number(seed: u64) -> String {
    let payload = format!("{seed:08}");
    let sum: u32 = payload
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 0 {
                let d = d * 2;
                if d > 9 {
                    d - 9
                } else {
                    d
                }
            } else {
                d
            }
        })
        .sum();
    let check = (10 - sum % 10) % 10;
    format!("{payload}{check}")
}
