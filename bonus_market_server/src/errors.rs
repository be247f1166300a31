use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use bonus_market_engine::{AuthApiError, LedgerError, OrderFlowError, WalletApiError};
use log::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Unsupported content type. Expected {0}")]
    UnsupportedContentType(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("Login {0} is already taken")]
    LoginTaken(String),
    #[error("Order {0} has already been uploaded by another user")]
    OrderOwnedByOtherUser(String),
    #[error("Invalid order number. {0}")]
    InvalidOrderNumber(String),
    #[error("Invalid amount. {0}")]
    InvalidAmount(String),
    #[error("Not enough bonuses in the wallet")]
    NotEnoughBonuses,
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The service is shutting down. Try again later.")]
    ServiceUnavailable,
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedContentType(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::WrongCredentials => StatusCode::UNAUTHORIZED,
                AuthError::CouldNotIssueToken(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::LoginTaken(_) => StatusCode::CONFLICT,
            Self::OrderOwnedByOtherUser(_) => StatusCode::CONFLICT,
            Self::InvalidOrderNumber(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidAmount(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotEnoughBonuses => StatusCode::PAYMENT_REQUIRED,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("💻️ {self}");
        }
        HttpResponse::build(status)
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No access token was provided.")]
    MissingToken,
    #[error("Access token is invalid. {0}")]
    ValidationError(String),
    #[error("Wrong login or password.")]
    WrongCredentials,
    #[error("Could not issue an access token. {0}")]
    CouldNotIssueToken(String),
}

impl From<AuthApiError> for ServerError {
    fn from(e: AuthApiError) -> Self {
        match e {
            AuthApiError::UserAlreadyExists(login) => Self::LoginTaken(login),
            AuthApiError::WrongCredentials => Self::AuthenticationError(AuthError::WrongCredentials),
            AuthApiError::InvalidCredentials(msg) => Self::InvalidRequestBody(msg),
            AuthApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            AuthApiError::PasswordHashError(e) => Self::BackendError(format!("Password hashing failed: {e}")),
            AuthApiError::WalletError(e) => e.into(),
        }
    }
}

impl From<LedgerError> for ServerError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::OrderOwnedByOtherUser(number) => Self::OrderOwnedByOtherUser(number.to_string()),
            LedgerError::NotEnoughBonuses => Self::NotEnoughBonuses,
            LedgerError::WalletNotFound(_) | LedgerError::OrderNotFound(_) | LedgerError::NoData => {
                Self::NoRecordFound(e.to_string())
            },
            LedgerError::OrderAlreadyExists(_) | LedgerError::DatabaseError(_) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::InvalidOrderNumber(number) => Self::InvalidOrderNumber(number),
            OrderFlowError::Ledger(e) => e.into(),
            OrderFlowError::QueueClosed => Self::ServiceUnavailable,
        }
    }
}

impl From<WalletApiError> for ServerError {
    fn from(e: WalletApiError) -> Self {
        match e {
            WalletApiError::InvalidOrderNumber(number) => Self::InvalidOrderNumber(number),
            WalletApiError::InvalidAmount(amount) => Self::InvalidAmount(amount),
            WalletApiError::Ledger(e) => e.into(),
        }
    }
}
