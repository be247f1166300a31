use bm_common::Bonus;
use chrono::Utc;
use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order, OrderNumber, OrderStatusType},
    traits::LedgerError,
};

/// Inserts the order unless the number has been used before.
///
/// The existing binding decides the error: the same user gets `OrderAlreadyExists`, anyone else gets
/// `OrderOwnedByOtherUser`. This is not atomic on its own; run it inside a transaction.
pub async fn create_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, LedgerError> {
    match fetch_order_by_number(&order.number, conn).await? {
        Some(existing) if existing.user_id == order.user_id => Err(LedgerError::OrderAlreadyExists(order.number)),
        Some(existing) => {
            debug!(
                "📝️ Order [{}] belongs to user #{}, rejecting upload by user #{}",
                order.number, existing.user_id, order.user_id
            );
            Err(LedgerError::OrderOwnedByOtherUser(order.number))
        },
        None => {
            let order = insert_order(order, conn).await?;
            debug!("📝️ Order [{}] inserted with id {}", order.number, order.id);
            Ok(order)
        },
    }
}

async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            INSERT INTO orders (number, user_id, status, accrual, created_at, updated_at)
            VALUES ($1, $2, $3, 0, $4, $4)
            RETURNING *;
        "#,
    )
    .bind(order.number)
    .bind(order.user_id)
    .bind(OrderStatusType::New)
    .bind(order.created_at)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

pub async fn fetch_order_by_number(
    number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE number = $1").bind(number.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_owner(number: &OrderNumber, conn: &mut SqliteConnection) -> Result<Option<i64>, sqlx::Error> {
    let owner: Option<(i64,)> = sqlx::query_as("SELECT user_id FROM orders WHERE number = $1")
        .bind(number.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(owner.map(|(id,)| id))
}

/// Returns all orders for the user, most recent first.
pub async fn fetch_orders_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// Fetches every order whose status is one of `statuses`, oldest first.
pub async fn fetch_orders_with_status(
    statuses: &[OrderStatusType],
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    if statuses.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new("SELECT * FROM orders WHERE status IN (");
    let mut in_clause = builder.separated(", ");
    for status in statuses {
        in_clause.push_bind(*status);
    }
    builder.push(") ORDER BY created_at ASC, id ASC");
    trace!("📝️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    trace!("📝️ {} orders with status in {statuses:?}", orders.len());
    Ok(orders)
}

/// Moves the order to `Processing` if, and only if, it is still `New`.
pub async fn mark_processing(number: &OrderNumber, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE orders SET status = $1, updated_at = $2 WHERE number = $3 AND status = $4")
        .bind(OrderStatusType::Processing)
        .bind(Utc::now())
        .bind(number.as_str())
        .bind(OrderStatusType::New)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Sets the status of the order, and the accrual if it is positive.
pub async fn update_order_status(
    number: &OrderNumber,
    status: OrderStatusType,
    accrual: Bonus,
    conn: &mut SqliteConnection,
) -> Result<Order, LedgerError> {
    let mut builder = QueryBuilder::new("UPDATE orders SET updated_at = ");
    builder.push_bind(Utc::now());
    builder.push(", status = ");
    builder.push_bind(status);
    if accrual.is_positive() {
        builder.push(", accrual = ");
        builder.push_bind(accrual);
    }
    builder.push(" WHERE number = ");
    builder.push_bind(number.as_str());
    builder.push(" RETURNING *");
    trace!("📝️ Executing query: {}", builder.sql());
    let order: Option<Order> = builder.build_query_as().fetch_optional(conn).await?;
    order.ok_or_else(|| LedgerError::OrderNotFound(number.clone()))
}
