//! Scheduled Jobs
//!
//! Background jobs for periodic maintenance tasks.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::time::Duration;
use tokio::time::interval;

// =========================================================================
// Top-up Expiry Job
// =========================================================================

/// Mark `pending` top-ups older than `older_than` as `expired`.
///
/// Rows that already settled, failed or expired are left alone, so a late
/// gateway notification for an expired order is a no-op.
pub async fn expire_stale_topups(pool: &PgPool, older_than: Duration) -> Result<u64, JobError> {
    let result = sqlx::query(
        r#"
        UPDATE topups
        SET status = 'expired', updated_at = NOW()
        WHERE status = 'pending'
          AND created_at < NOW() - make_interval(secs => $1)
        "#,
    )
    .bind(older_than.as_secs_f64())
    .execute(pool)
    .await?;

    let rows_expired = result.rows_affected();

    if rows_expired > 0 {
        tracing::info!(rows_expired, "Expired stale pending top-ups");
    }

    Ok(rows_expired)
}

// =========================================================================
// Job Scheduler
// =========================================================================

/// Configuration for job scheduler
#[derive(Debug, Clone)]
pub struct JobSchedulerConfig {
    /// How often to look for stale top-ups (default: 5 minutes)
    pub topup_expiry_interval: Duration,
    /// Age after which a pending top-up expires (default: 24 hours)
    pub topup_expiry_age: Duration,
}

impl Default for JobSchedulerConfig {
    fn default() -> Self {
        Self {
            topup_expiry_interval: Duration::from_secs(300),
            topup_expiry_age: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Job Scheduler - runs periodic maintenance tasks
pub struct JobScheduler {
    pool: PgPool,
    config: JobSchedulerConfig,
}

impl JobScheduler {
    /// Create with custom configuration
    pub fn with_config(pool: PgPool, config: JobSchedulerConfig) -> Self {
        Self { pool, config }
    }

    /// Start the job scheduler in the background
    /// Returns a handle that can be used to abort the scheduler
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    /// Run the scheduler loop
    async fn run(&self) {
        tracing::info!(
            interval_secs = self.config.topup_expiry_interval.as_secs(),
            "Job scheduler started"
        );

        let mut topup_interval = interval(self.config.topup_expiry_interval);

        loop {
            topup_interval.tick().await;
            let report = self.run_all_once().await;
            for error in &report.errors {
                tracing::error!(error = %error, "Maintenance job failed");
            }
        }
    }

    /// Run all maintenance jobs once (for manual trigger or testing)
    pub async fn run_all_once(&self) -> MaintenanceReport {
        let mut report = MaintenanceReport::default();

        match expire_stale_topups(&self.pool, self.config.topup_expiry_age).await {
            Ok(count) => report.topups_expired = count,
            Err(e) => report.errors.push(format!("Top-up expiry: {}", e)),
        }

        report.completed_at = Utc::now();
        report
    }
}

/// Report from running maintenance jobs
#[derive(Debug, Clone, Default)]
pub struct MaintenanceReport {
    pub topups_expired: u64,
    pub errors: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

/// Job execution errors
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

// =========================================================================
// Tests
// =========================================================================
