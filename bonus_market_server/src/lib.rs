//! # Bonus market server
//! This crate hosts the HTTP server for the bonus market. It is responsible for:
//! * Registering users and issuing access tokens.
//! * Accepting uploaded order numbers and handing them to the reconciliation workers.
//! * Serving balances, order and withdrawal histories, and withdrawals.
//!
//! ## Configuration
//! The server is configured via environment variables and command-line flags. See [config](config/index.html) and
//! [cli](cli/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/user/register`, `/api/user/login`: Account creation and login.
//! * `/api/user/orders`: Upload an order number (`POST`), or list your orders (`GET`).
//! * `/api/user/balance`, `/api/user/balance/withdraw`, `/api/user/withdrawals`: The bonus wallet.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod recovery_worker;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
