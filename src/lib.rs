//! e-wallet Library
//!
//! Digital-wallet backend: accounts, balances, transfers, withdrawals,
//! gateway top-ups and paginated history. Re-exports modules for the server
//! binary and integration tests.

pub mod accounts;
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod ledger;
pub mod query;
pub mod state;
pub mod topup;

pub use config::Config;
pub use domain::{Amount, AmountError, Balance, DomainError, OperationContext};
pub use error::{AppError, AppResult};
pub use state::AppState;
