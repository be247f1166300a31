use log::debug;
use sqlx::SqliteConnection;

use crate::{db_types::UserAccount, traits::AuthApiError};

/// Inserts a new user. A login that is already taken results in `AuthApiError::UserAlreadyExists`.
pub async fn insert_user(
    login: &str,
    password_hash: &str,
    conn: &mut SqliteConnection,
) -> Result<UserAccount, AuthApiError> {
    let result = sqlx::query_as("INSERT INTO users (login, password_hash) VALUES ($1, $2) RETURNING *")
        .bind(login)
        .bind(password_hash)
        .fetch_one(conn)
        .await;
    match result {
        Ok(user) => Ok(user),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            debug!("🧑️ Login {login} is already registered");
            Err(AuthApiError::UserAlreadyExists(login.to_string()))
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_user_by_login(login: &str, conn: &mut SqliteConnection) -> Result<Option<UserAccount>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE login = $1").bind(login).fetch_optional(conn).await?;
    Ok(user)
}
