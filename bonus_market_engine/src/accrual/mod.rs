//! # Accrual service client
//!
//! The accrual service is the external authority on how many bonus points an order earns. It is polled once per
//! reconciliation attempt with `GET <base>/api/orders/<number>`.
//!
//! [`AccrualOracle`] is the seam the reconciliation workers depend on. [`AccrualClient`] is the HTTP implementation.
use std::future::Future;

mod client;
mod data_objects;
mod errors;

pub use client::{AccrualClient, DEFAULT_ACCRUAL_TIMEOUT};
pub use data_objects::{AccrualResponse, AccrualStatus};
pub use errors::AccrualError;

use crate::db_types::OrderNumber;

pub trait AccrualOracle: Send + Sync {
    /// Asks the accrual service for the current state of `number`.
    ///
    /// Each non-200 status the service is known to send maps to its own [`AccrualError`] variant so that callers can
    /// decide whether to stop, wait or retry.
    fn fetch_status(
        &self,
        number: &OrderNumber,
    ) -> impl Future<Output = Result<AccrualResponse, AccrualError>> + Send;
}
