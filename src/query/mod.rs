//! Query Service
//!
//! Paginated, read-only history views over the ledger tables.

mod service;

pub use service::{normalize_page, page_offset, HistoryService, DEFAULT_PAGE_SIZE};
pub(crate) use service::topup_from_row;
