use thiserror::Error;

use crate::{accrual::AccrualError, traits::LedgerError};

#[derive(Debug, Clone, Error)]
pub enum ReconciliationError {
    #[error("Could not get a final accrual response after {0} attempts")]
    CannotGetAccrualResponse(u32),
    #[error("Accrual service error. {0}")]
    Accrual(#[from] AccrualError),
    #[error("Ledger error. {0}")]
    Ledger(#[from] LedgerError),
    #[error("{0}")]
    QueueClosed(#[from] QueueClosed),
}

#[derive(Debug, Clone, Copy, Error)]
#[error("The job queue has been shut down")]
pub struct QueueClosed;
