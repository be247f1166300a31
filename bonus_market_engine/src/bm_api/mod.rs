//! # Bonus market engine public API
//!
//! The `bm_api` module exposes the programmatic API for the bonus market engine. Each API is generic over the backend
//! traits it needs, so the parts can be wired to different stores (or mocks) independently.
//!
//! * [`accounts_api`] provides read access to a user's orders, wallet and withdrawal history.
//! * [`auth_api`] registers users, hashing their passwords, and checks credentials at login.
//! * [`order_flow_api`] is the intake side of the reconciliation pipeline. It validates and stores uploaded order
//!   numbers and hands them to the worker pool.
//! * [`wallet_api`] covers balance reads and withdrawals.
//!
//! # API usage
//!
//! An API instance is created by supplying a backend that implements the traits required by the API.
//!
//! ```rust,ignore
//! use bonus_market_engine::{AccountApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements AccountManagement
//! let api = AccountApi::new(db);
//! let orders = api.orders_for_user(user_id).await?;
//! ```

pub mod accounts_api;
pub mod auth_api;
pub mod errors;
pub mod order_flow_api;
pub mod wallet_api;
