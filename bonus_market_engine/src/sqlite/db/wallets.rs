use bm_common::Bonus;
use chrono::Utc;
use log::trace;
use sqlx::SqliteConnection;

use crate::{db_types::Wallet, traits::LedgerError};

pub async fn insert_wallet(user_id: i64, conn: &mut SqliteConnection) -> Result<Wallet, sqlx::Error> {
    let wallet = sqlx::query_as("INSERT INTO wallets (user_id) VALUES ($1) RETURNING *")
        .bind(user_id)
        .fetch_one(conn)
        .await?;
    trace!("👛️ Wallet created for user #{user_id}");
    Ok(wallet)
}

pub async fn fetch_wallet(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<Wallet>, sqlx::Error> {
    let wallet =
        sqlx::query_as("SELECT * FROM wallets WHERE user_id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(wallet)
}

/// Adds `amount` to the user's balance. This is not atomic with respect to other calls; use a transaction.
pub async fn increment_balance(
    user_id: i64,
    amount: Bonus,
    conn: &mut SqliteConnection,
) -> Result<Wallet, LedgerError> {
    let wallet: Option<Wallet> =
        sqlx::query_as("UPDATE wallets SET balance = balance + $1, updated_at = $2 WHERE user_id = $3 RETURNING *")
            .bind(amount)
            .bind(Utc::now())
            .bind(user_id)
            .fetch_optional(conn)
            .await?;
    trace!("👛️ Credited {amount} to user #{user_id}");
    wallet.ok_or(LedgerError::WalletNotFound(user_id))
}

/// Moves `amount` out of the balance and into the total withdrawn.
///
/// The `CHECK` constraint on the table rejects a debit that would take the balance below zero, but callers are
/// expected to have verified the balance before getting here.
pub async fn debit_balance(user_id: i64, amount: Bonus, conn: &mut SqliteConnection) -> Result<Wallet, LedgerError> {
    let wallet: Option<Wallet> = sqlx::query_as(
        r#"
            UPDATE wallets SET
                balance = balance - $1,
                total_withdrawn = total_withdrawn + $1,
                updated_at = $2
            WHERE user_id = $3
            RETURNING *
        "#,
    )
    .bind(amount)
    .bind(Utc::now())
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    trace!("👛️ Debited {amount} from user #{user_id}");
    wallet.ok_or(LedgerError::WalletNotFound(user_id))
}
