use thiserror::Error;

use crate::{reconciliation::QueueClosed, traits::LedgerError};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Order number {0} is not valid")]
    InvalidOrderNumber(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("The reconciliation queue is closed")]
    QueueClosed,
}

impl From<QueueClosed> for OrderFlowError {
    fn from(_: QueueClosed) -> Self {
        OrderFlowError::QueueClosed
    }
}

#[derive(Debug, Clone, Error)]
pub enum WalletApiError {
    #[error("Order number {0} is not valid")]
    InvalidOrderNumber(String),
    #[error("Withdrawal amount must be positive, got {0}")]
    InvalidAmount(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
