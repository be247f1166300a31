use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AccrualError {
    #[error("The order is not registered with the accrual service")]
    NotRegistered,
    #[error("The accrual service is rate limiting requests")]
    TooManyRequests,
    #[error("The accrual service reported an internal error")]
    InternalServerError,
    #[error("Unexpected status code {0} from the accrual service")]
    UnexpectedStatus(u16),
    #[error("Could not reach the accrual service: {0}")]
    Transport(String),
    #[error("Invalid response from the accrual service: {0}")]
    InvalidResponse(String),
    #[error("Could not initialize the accrual client: {0}")]
    Initialization(String),
}
