//! Configuration module
//!
//! Loads configuration from environment variables once at startup.
//! The resulting [`Config`] is shared read-only through the application state.

use std::env;
use std::time::Duration;

use crate::query::DEFAULT_PAGE_SIZE;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Per-statement timeout applied to every pooled connection
    pub statement_timeout: Duration,

    /// How long a request may wait for a pooled connection
    pub acquire_timeout: Duration,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Emit logs as JSON lines
    pub log_json: bool,

    /// Token settings
    pub token: TokenConfig,

    /// Records returned per history page
    pub history_page_size: i64,

    /// Shared secret for `POST /admin/register`; registration is disabled when unset
    pub admin_registration_key: Option<String>,

    /// Payment gateway settings
    pub gateway: GatewayConfig,

    /// Pending top-ups older than this are expired by the job scheduler
    pub topup_expiry: Duration,
}

/// JWT issuing and verification settings
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub issuer: String,
    pub signing_key: String,
    pub lifetime: Duration,
}

/// Payment gateway settings
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub server_key: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = parse_or("DATABASE_MAX_CONNECTIONS", 10)?;
        let statement_timeout =
            Duration::from_millis(parse_or("DATABASE_STATEMENT_TIMEOUT_MS", 5_000)?);
        let acquire_timeout =
            Duration::from_secs(parse_or("DATABASE_ACQUIRE_TIMEOUT_SECS", 5)?);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_or("PORT", 3000)?;
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let log_json = env::var("LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let signing_key =
            env::var("TOKEN_KEY").map_err(|_| ConfigError::MissingEnv("TOKEN_KEY"))?;
        if signing_key.len() < 16 {
            return Err(ConfigError::InvalidValue("TOKEN_KEY"));
        }
        let token = TokenConfig {
            issuer: env::var("TOKEN_ISSUER").unwrap_or_else(|_| "e-wallet".to_string()),
            signing_key,
            lifetime: Duration::from_secs(60 * parse_or::<u64>("TOKEN_LIFETIME_MINUTES", 60)?),
        };
        if token.lifetime.is_zero() {
            return Err(ConfigError::InvalidValue("TOKEN_LIFETIME_MINUTES"));
        }

        let history_page_size: i64 = parse_or("HISTORY_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if history_page_size <= 0 {
            return Err(ConfigError::InvalidValue("HISTORY_PAGE_SIZE"));
        }

        let admin_registration_key = env::var("ADMIN_REGISTRATION_KEY")
            .ok()
            .filter(|k| !k.is_empty());

        let gateway = GatewayConfig {
            base_url: env::var("GATEWAY_BASE_URL")
                .unwrap_or_else(|_| "https://app.sandbox.midtrans.com".to_string()),
            server_key: env::var("GATEWAY_SERVER_KEY")
                .map_err(|_| ConfigError::MissingEnv("GATEWAY_SERVER_KEY"))?,
        };

        let topup_expiry = Duration::from_secs(60 * parse_or::<u64>("TOPUP_EXPIRY_MINUTES", 60 * 24)?);

        Ok(Self {
            database_url,
            database_max_connections,
            statement_timeout,
            acquire_timeout,
            host,
            port,
            environment,
            log_json,
            token,
            history_page_size,
            admin_registration_key,
            gateway,
            topup_expiry,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
