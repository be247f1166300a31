use bm_common::Bonus;
use chrono::Utc;
use sqlx::SqliteConnection;

use crate::db_types::{AccrualCredit, Order, OrderNumber, OrderStatusType};

/// Records that the accrual for `number` has been credited.
///
/// Returns `false`, and changes nothing, if a credit for this order already exists.
pub async fn insert_accrual_credit(
    number: &OrderNumber,
    user_id: i64,
    amount: Bonus,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            INSERT INTO accruals (order_number, user_id, amount, credited_at) VALUES ($1, $2, $3, $4)
            ON CONFLICT (order_number) DO NOTHING
        "#,
    )
    .bind(number.as_str())
    .bind(user_id)
    .bind(amount)
    .bind(Utc::now())
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn fetch_accrual_credit(
    number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<Option<AccrualCredit>, sqlx::Error> {
    let credit = sqlx::query_as("SELECT * FROM accruals WHERE order_number = $1")
        .bind(number.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(credit)
}

/// Processed orders with a positive accrual and no matching credit, oldest first.
pub async fn fetch_uncredited_orders(conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as(
        r#"
            SELECT orders.* FROM orders
            LEFT JOIN accruals ON accruals.order_number = orders.number
            WHERE orders.status = $1 AND orders.accrual > 0 AND accruals.order_number IS NULL
            ORDER BY orders.created_at ASC, orders.id ASC
        "#,
    )
    .bind(OrderStatusType::Processed)
    .fetch_all(conn)
    .await?;
    Ok(orders)
}
