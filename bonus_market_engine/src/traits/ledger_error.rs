use thiserror::Error;

use crate::db_types::OrderNumber;

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} has already been uploaded by this user")]
    OrderAlreadyExists(OrderNumber),
    #[error("Order {0} has already been uploaded by another user")]
    OrderOwnedByOtherUser(OrderNumber),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderNumber),
    #[error("No wallet exists for user #{0}")]
    WalletNotFound(i64),
    #[error("Not enough bonuses in the wallet")]
    NotEnoughBonuses,
    #[error("No data was found")]
    NoData,
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::DatabaseError(e.to_string())
    }
}
