//! Top-up lifecycle
//!
//! Only `pending` rows ever transition. The notification path locks the
//! top-up row and credits the balance in the same transaction, so a replayed
//! settlement is a no-op.

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::accounts::Account;
use crate::domain::{Amount, TopupRecord, TopupStatus};
use crate::error::{AppError, AppResult};
use crate::ledger::LedgerStore;
use crate::query::topup_from_row;

use super::gateway::{
    verify_notification_signature, CheckoutRequest, PaymentGateway, PaymentNotification,
};

const TOPUP_COLUMNS: &str = "order_id, user_id, amount, status, redirect_url, created_at, updated_at";

/// What a gateway notification asks us to do with a pending top-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    Settle,
    Fail,
    Expire,
    Ignore,
}

impl NotificationOutcome {
    pub fn from_status(transaction_status: &str, fraud_status: Option<&str>) -> Self {
        match transaction_status {
            "settlement" => NotificationOutcome::Settle,
            // Card captures flagged for review settle later via another notification
            "capture" => match fraud_status {
                None | Some("accept") => NotificationOutcome::Settle,
                Some("deny") => NotificationOutcome::Fail,
                Some(_) => NotificationOutcome::Ignore,
            },
            "deny" | "cancel" | "failure" => NotificationOutcome::Fail,
            "expire" => NotificationOutcome::Expire,
            _ => NotificationOutcome::Ignore,
        }
    }

    fn target_status(&self) -> Option<TopupStatus> {
        match self {
            NotificationOutcome::Settle => Some(TopupStatus::Paid),
            NotificationOutcome::Fail => Some(TopupStatus::Failed),
            NotificationOutcome::Expire => Some(TopupStatus::Expired),
            NotificationOutcome::Ignore => None,
        }
    }
}

/// Parse a gateway `gross_amount` ("10000.00") into minor units.
/// Fractional parts other than zero are rejected.
fn parse_gross_amount(gross_amount: &str) -> Option<i64> {
    let (whole, fraction) = match gross_amount.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (gross_amount, ""),
    };
    if !fraction.bytes().all(|b| b == b'0') {
        return None;
    }
    whole.parse().ok()
}

#[derive(Clone)]
pub struct TopupService {
    pool: PgPool,
    ledger: LedgerStore,
    gateway: Arc<dyn PaymentGateway>,
}

impl TopupService {
    pub fn new(pool: PgPool, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            ledger: LedgerStore::new(pool.clone()),
            pool,
            gateway,
        }
    }

    /// Open a pending top-up and a checkout session for it
    pub async fn create(&self, account: &Account, amount: Amount) -> AppResult<TopupRecord> {
        let order_id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO topups (order_id, user_id, amount, status)
            VALUES ($1, $2, $3, 'pending')
            "#,
        )
        .bind(order_id)
        .bind(account.id)
        .bind(amount.value())
        .execute(&self.pool)
        .await?;

        let request = CheckoutRequest {
            order_id,
            amount: amount.value(),
            customer_name: account.name.clone(),
            customer_email: account.email.clone(),
            customer_phone: account.phone_number.clone(),
        };

        let session = match self.gateway.create_checkout(&request).await {
            Ok(session) => session,
            Err(e) => {
                sqlx::query(
                    "UPDATE topups SET status = 'failed', updated_at = NOW() WHERE order_id = $1",
                )
                .bind(order_id)
                .execute(&self.pool)
                .await?;
                return Err(e.into());
            }
        };

        let row = sqlx::query_as(&format!(
            r#"
            UPDATE topups SET redirect_url = $1, updated_at = NOW()
            WHERE order_id = $2
            RETURNING {}
            "#,
            TOPUP_COLUMNS
        ))
        .bind(&session.redirect_url)
        .bind(order_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            order_id = %order_id,
            account = %account.id,
            amount = amount.value(),
            "Top-up created"
        );

        topup_from_row(row)
    }

    /// Apply a signed gateway notification
    pub async fn apply_notification(
        &self,
        notification: &PaymentNotification,
        server_key: &str,
    ) -> AppResult<TopupRecord> {
        if !verify_notification_signature(notification, server_key) {
            tracing::warn!(order_id = %notification.order_id, "Rejected notification signature");
            return Err(AppError::Forbidden("invalid notification signature".to_string()));
        }

        let order_id = Uuid::parse_str(&notification.order_id)
            .map_err(|_| AppError::InvalidRequest("malformed order_id".to_string()))?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as(&format!(
            "SELECT {} FROM topups WHERE order_id = $1 FOR UPDATE",
            TOPUP_COLUMNS
        ))
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("topup {}", order_id)))?;
        let topup = topup_from_row(row)?;

        let outcome = NotificationOutcome::from_status(
            &notification.transaction_status,
            notification.fraud_status.as_deref(),
        );

        let target = match (topup.status, outcome.target_status()) {
            (TopupStatus::Pending, Some(target)) => target,
            _ => {
                tracing::debug!(
                    order_id = %order_id,
                    status = %topup.status,
                    transaction_status = %notification.transaction_status,
                    "Notification left top-up unchanged"
                );
                tx.commit().await?;
                return Ok(topup);
            }
        };

        if target == TopupStatus::Paid {
            if parse_gross_amount(&notification.gross_amount) != Some(topup.amount) {
                return Err(AppError::InvalidRequest(
                    "gross_amount does not match top-up".to_string(),
                ));
            }
            let amount = Amount::new(topup.amount)
                .map_err(|e| AppError::Internal(format!("stored topup amount invalid: {e}")))?;
            self.ledger.credit(&mut tx, topup.account_id, &amount).await?;
        }

        let row = sqlx::query_as(&format!(
            r#"
            UPDATE topups SET status = $1, updated_at = NOW()
            WHERE order_id = $2
            RETURNING {}
            "#,
            TOPUP_COLUMNS
        ))
        .bind(target.as_str())
        .bind(order_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order_id,
            account = %topup.account_id,
            status = %target,
            "Top-up status updated"
        );

        topup_from_row(row)
    }
}
