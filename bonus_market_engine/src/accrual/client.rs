use std::{sync::Arc, time::Duration};

use log::*;
use reqwest::{header::RETRY_AFTER, Client, StatusCode};

use super::{AccrualError, AccrualOracle, AccrualResponse};
use crate::db_types::OrderNumber;

pub const DEFAULT_ACCRUAL_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the accrual service. Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct AccrualClient {
    base_url: String,
    client: Arc<Client>,
}

impl std::fmt::Debug for AccrualClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccrualClient ({})", self.base_url)
    }
}

impl AccrualClient {
    /// Creates a new client for the service at `address`. A bare `host:port` is treated as `http://host:port`.
    pub fn new(address: &str, timeout: Duration) -> Result<Self, AccrualError> {
        let client =
            Client::builder().timeout(timeout).build().map_err(|e| AccrualError::Initialization(e.to_string()))?;
        let base_url = normalize_base_url(address);
        if base_url.is_empty() {
            return Err(AccrualError::Initialization("The accrual service address is empty".into()));
        }
        debug!("🛰️ Accrual client configured for {base_url} with a {}s timeout", timeout.as_secs());
        Ok(Self { base_url, client: Arc::new(client) })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn url(&self, number: &OrderNumber) -> String {
        format!("{}/api/orders/{}", self.base_url, number.as_str())
    }
}

impl AccrualOracle for AccrualClient {
    async fn fetch_status(&self, number: &OrderNumber) -> Result<AccrualResponse, AccrualError> {
        let url = self.url(number);
        trace!("🛰️ GET {url}");
        let response = self.client.get(url).send().await.map_err(|e| AccrualError::Transport(e.to_string()))?;
        match response.status() {
            StatusCode::OK => {
                let body = response.json::<AccrualResponse>().await.map_err(|e| {
                    warn!("🛰️ Could not decode accrual response for order [{number}]. {e}");
                    AccrualError::InvalidResponse(e.to_string())
                })?;
                trace!("🛰️ Order [{number}] is {:?} with accrual {:?}", body.status, body.accrual);
                Ok(body)
            },
            StatusCode::NO_CONTENT => {
                debug!("🛰️ Order [{number}] is not registered with the accrual service");
                Err(AccrualError::NotRegistered)
            },
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response.headers().get(RETRY_AFTER).and_then(|v| v.to_str().ok()).unwrap_or("?");
                info!("🛰️ The accrual service is rate limiting us. Retry-After: {retry_after}");
                Err(AccrualError::TooManyRequests)
            },
            StatusCode::INTERNAL_SERVER_ERROR => {
                warn!("🛰️ The accrual service returned an internal error for order [{number}]");
                Err(AccrualError::InternalServerError)
            },
            status => {
                warn!("🛰️ Unexpected status {status} from the accrual service for order [{number}]");
                Err(AccrualError::UnexpectedStatus(status.as_u16()))
            },
        }
    }
}

fn normalize_base_url(address: &str) -> String {
    let address = address.trim().trim_end_matches('/');
    if address.is_empty() {
        return String::new();
    }
    if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("http://{address}")
    }
}
