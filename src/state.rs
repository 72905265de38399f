//! Shared application state
//!
//! Built once at startup and cloned into every request.

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::TokenService;
use crate::config::Config;
use crate::query::HistoryService;
use crate::topup::{PaymentGateway, TopupService};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub tokens: TokenService,
    pub gateway: Arc<dyn PaymentGateway>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            tokens: TokenService::new(&config.token),
            pool,
            config: Arc::new(config),
            gateway,
        }
    }

    pub fn history(&self) -> HistoryService {
        HistoryService::new(self.pool.clone(), self.config.history_page_size)
    }

    pub fn topups(&self) -> TopupService {
        TopupService::new(self.pool.clone(), self.gateway.clone())
    }
}
