//! Bonus Market Engine
//!
//! The bonus market engine is the core of a loyalty backend. Users upload the numbers of purchase orders they made in
//! a partner shop. An external accrual service decides, in its own time, whether each order earns bonus points and how
//! many. The engine keeps asking until it gets a verdict, then stores it and credits the points to the user's wallet.
//! Users can spend their points by withdrawing them against a new order.
//!
//! The library is divided into these sections:
//! 1. Storage ([`mod@sqlite`] and [`mod@traits`]). The ledger traits describe what the engine needs from a store,
//!    and `SqliteDatabase` implements all of them. The data types used in the database live in [`mod@db_types`].
//! 2. The accrual client ([`mod@accrual`]), a thin HTTP client for the accrual service behind the [`AccrualOracle`]
//!    trait.
//! 3. The reconciliation pipeline ([`mod@reconciliation`]): a bounded job queue, a pool of workers, and the retry
//!    logic that drives each order to a verdict.
//! 4. The public API ([`mod@bm_api`]). This is what a server is expected to use. It covers order intake, wallets,
//!    account histories and user registration.
pub mod accrual;
pub mod bm_api;
pub mod db_types;
pub mod reconciliation;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use accrual::{AccrualClient, AccrualError, AccrualOracle};
pub use bm_api::{
    accounts_api::AccountApi,
    auth_api::AuthApi,
    errors::{OrderFlowError, WalletApiError},
    order_flow_api::{OrderFlowApi, SubmitOrderResult},
    wallet_api::WalletApi,
};
pub use reconciliation::{JobQueue, ReconciliationError, ReconciliationPool, Reconciler, RetryPolicy};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{AccountManagement, AuthApiError, LedgerError, OrderLedger, UserManagement, WalletLedger};
