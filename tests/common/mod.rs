//! Common test utilities
//!
//! Database-backed tests need `DATABASE_URL`. When it is unset the helpers
//! return `None` and the calling test returns early.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use e_wallet::auth::{password, Role, TokenService};
use e_wallet::config::{Config, GatewayConfig, TokenConfig};
use e_wallet::topup::{CheckoutRequest, CheckoutSession, GatewayError, PaymentGateway};
use e_wallet::AppState;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

pub const TEST_PIN: &str = "123456";
pub const TEST_PASSWORD: &str = "correct horse battery";
pub const TEST_SERVER_KEY: &str = "test-server-key";
pub const TEST_ADMIN_KEY: &str = "test-admin-key";

/// Connect and migrate the test database, or `None` without `DATABASE_URL`
pub async fn setup_test_db() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

/// Insert an account with a balance row. Usernames are unique per call so
/// tests sharing a database never collide.
pub async fn seed_account(pool: &PgPool, name: &str, balance: i64, verified: bool) -> Uuid {
    seed_account_with_role(pool, name, balance, verified, Role::User).await
}

pub async fn seed_account_with_role(
    pool: &PgPool,
    name: &str,
    balance: i64,
    verified: bool,
    role: Role,
) -> Uuid {
    let suffix = Uuid::new_v4().simple().to_string();
    let username = format!("{}_{}", name.to_lowercase(), &suffix[..12]);
    let status = if verified { "verified" } else { "unverified" };

    let mut tx = pool.begin().await.unwrap();

    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO users (name, username, email, phone_number, password_hash, role, verification_status)
        VALUES ($1, $2, $3, '08123456789', $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(&username)
    .bind(format!("{}@example.test", username))
    .bind(password::hash_secret(TEST_PASSWORD))
    .bind(role.as_str())
    .bind(status)
    .fetch_one(&mut *tx)
    .await
    .expect("Failed to seed user");

    sqlx::query("INSERT INTO balances (user_id, balance, pin_hash) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(balance)
        .bind(password::hash_secret(TEST_PIN))
        .execute(&mut *tx)
        .await
        .expect("Failed to seed balance");

    tx.commit().await.unwrap();
    id
}

pub async fn seed_payout_destination(pool: &PgPool, account_id: Uuid) {
    sqlx::query(
        r#"
        INSERT INTO payout_destinations (user_id, bank_name, account_number, account_holder)
        VALUES ($1, 'BCA', '0123456789', 'Test Holder')
        "#,
    )
    .bind(account_id)
    .execute(pool)
    .await
    .expect("Failed to seed payout destination");
}

pub async fn balance_of(pool: &PgPool, account_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT balance FROM balances WHERE user_id = $1")
        .bind(account_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn transfer_record_count(pool: &PgPool, account_id: Uuid) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM transfer_records WHERE sender_id = $1 OR recipient_id = $1",
    )
    .bind(account_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        database_max_connections: 5,
        statement_timeout: Duration::from_secs(5),
        acquire_timeout: Duration::from_secs(5),
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        log_json: false,
        token: TokenConfig {
            issuer: "e-wallet-test".to_string(),
            signing_key: "test-signing-key-0123456789".to_string(),
            lifetime: Duration::from_secs(3600),
        },
        history_page_size: 3,
        admin_registration_key: Some(TEST_ADMIN_KEY.to_string()),
        gateway: GatewayConfig {
            base_url: "http://gateway.invalid".to_string(),
            server_key: TEST_SERVER_KEY.to_string(),
        },
        topup_expiry: Duration::from_secs(3600),
    }
}

/// Gateway double that hands out a fixed checkout page
pub struct FakeGateway;

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        Ok(CheckoutSession {
            token: format!("tok-{}", request.order_id),
            redirect_url: format!("https://pay.example.test/{}", request.order_id),
        })
    }
}

pub fn test_state(pool: PgPool) -> AppState {
    AppState::new(pool, test_config(), Arc::new(FakeGateway))
}

pub fn bearer_for(state: &AppState, account_id: Uuid, role: Role) -> String {
    let token = state.tokens.issue(account_id, "Test", role).unwrap();
    format!("Bearer {}", token.access_token)
}

pub fn tokens() -> TokenService {
    TokenService::new(&test_config().token)
}
