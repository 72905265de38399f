//! Ledger Store
//!
//! Durable account balances and the row-level locking used by the engines.

mod store;

pub use store::{LedgerError, LedgerStore};
