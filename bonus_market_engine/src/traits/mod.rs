//! # Ledger and store contracts
//!
//! This module defines the interface contracts that storage backends must satisfy to drive the bonus market engine.
//!
//! * [`OrderLedger`] owns the order lifecycle: intake, status transitions and the order-to-user binding.
//! * [`WalletLedger`] owns balances, withdrawals and the per-order accrual credits.
//! * [`UserManagement`] stores registered users and their password hashes.
//! * [`AccountManagement`] provides read-only queries for a user's orders, wallet and withdrawal history.
//!
//! The two ledger traits return `Send` futures, since their methods are called from reconciliation tasks running on
//! the tokio runtime. The other traits back request handlers only.
mod account_management;
mod ledger_error;
mod order_ledger;
mod user_management;
mod wallet_ledger;

pub use account_management::AccountManagement;
pub use ledger_error::LedgerError;
pub use order_ledger::OrderLedger;
pub use user_management::{AuthApiError, UserManagement};
pub use wallet_ledger::WalletLedger;
