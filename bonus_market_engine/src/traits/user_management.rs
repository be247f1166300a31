use thiserror::Error;

use crate::{
    db_types::{UserAccount, Wallet},
    traits::LedgerError,
};

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("Login {0} is already taken")]
    UserAlreadyExists(String),
    #[error("Wrong login or password")]
    WrongCredentials,
    #[error("Invalid credentials. {0}")]
    InvalidCredentials(String),
    #[error("Could not hash password. {0}")]
    PasswordHashError(String),
    #[error("Could not create wallet. {0}")]
    WalletError(#[from] LedgerError),
}

impl From<sqlx::Error> for AuthApiError {
    fn from(e: sqlx::Error) -> Self {
        AuthApiError::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait UserManagement {
    /// Stores a new user and their empty wallet. Either both rows are written or neither is.
    ///
    /// Fails with [`AuthApiError::UserAlreadyExists`] if the login is taken.
    async fn create_user_with_wallet(
        &self,
        login: &str,
        password_hash: &str,
    ) -> Result<(UserAccount, Wallet), AuthApiError>;

    async fn fetch_user_by_login(&self, login: &str) -> Result<Option<UserAccount>, AuthApiError>;
}
