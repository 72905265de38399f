//! Payment gateway client
//!
//! Snap-style checkout creation and notification signature checks.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha512};
use uuid::Uuid;

use crate::auth::password::constant_time_eq;
use crate::config::GatewayConfig;

/// Gateway errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    Request(String),

    #[error("Gateway returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Gateway response was invalid: {0}")]
    InvalidResponse(String),
}

/// What the gateway needs to open a checkout page
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub order_id: Uuid,
    pub amount: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub token: String,
    pub redirect_url: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout(&self, request: &CheckoutRequest)
        -> Result<CheckoutSession, GatewayError>;
}

/// HTTP notification body posted by the gateway
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentNotification {
    pub order_id: String,
    pub status_code: String,
    pub gross_amount: String,
    pub signature_key: String,
    pub transaction_status: String,
    #[serde(default)]
    pub fraud_status: Option<String>,
}

/// Check `signature_key == hex(sha512(order_id + status_code + gross_amount + server_key))`
pub fn verify_notification_signature(notification: &PaymentNotification, server_key: &str) -> bool {
    let digest = Sha512::new()
        .chain_update(notification.order_id.as_bytes())
        .chain_update(notification.status_code.as_bytes())
        .chain_update(notification.gross_amount.as_bytes())
        .chain_update(server_key.as_bytes())
        .finalize();

    let expected = hex::encode(digest);
    constant_time_eq(
        expected.as_bytes(),
        notification.signature_key.to_ascii_lowercase().as_bytes(),
    )
}

#[derive(Debug, Deserialize)]
struct SnapResponse {
    token: Option<String>,
    redirect_url: Option<String>,
}

/// Midtrans Snap client
#[derive(Debug, Clone)]
pub struct MidtransGateway {
    base_url: String,
    server_key: String,
    http: Client,
}

impl MidtransGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| GatewayError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            server_key: config.server_key.clone(),
            http,
        })
    }
}

#[async_trait]
impl PaymentGateway for MidtransGateway {
    async fn create_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let payload = json!({
            "transaction_details": {
                "order_id": request.order_id.to_string(),
                "gross_amount": request.amount,
            },
            "customer_details": {
                "first_name": request.customer_name,
                "email": request.customer_email,
                "phone": request.customer_phone,
            },
        });

        let response = self
            .http
            .post(format!("{}/snap/v1/transactions", self.base_url))
            .basic_auth(&self.server_key, Some(""))
            .json(&payload)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected { status, body });
        }

        let body: SnapResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        match (body.token, body.redirect_url) {
            (Some(token), Some(redirect_url)) => {
                tracing::info!(order_id = %request.order_id, "Checkout session created");
                Ok(CheckoutSession {
                    token,
                    redirect_url,
                })
            }
            _ => Err(GatewayError::InvalidResponse(
                "missing token or redirect_url".to_string(),
            )),
        }
    }
}
