use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::models::{FinancialRecord, StatementKind};

pub mod alpha_vantage;
pub use alpha_vantage::AlphaVantageClient;

/// Failure modes of a single API request.
///
/// All three terminate the current run; `QuotaExceeded` and `NotFound` are
/// expected operational outcomes, not bugs.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("daily request quota exhausted: {0}")]
    QuotaExceeded(String),

    #[error("ticker not recognized by the API: {0}")]
    NotFound(String),

    #[error("transient fetch failure: {0}")]
    Transient(String),
}

/// Simple rate limiter for API requests
pub struct ApiRateLimiter {
    delay_ms: u64,
}

impl ApiRateLimiter {
    pub fn new(requests_per_minute: u32) -> Self {
        let delay_ms = if requests_per_minute > 0 {
            60_000 / requests_per_minute as u64
        } else {
            1000 // Default 1 second delay
        };

        Self { delay_ms }
    }

    pub async fn wait(&self) {
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
    }
}

/// Common trait for financial data providers.
///
/// A statement request yields rows for both annual and quarterly periods in
/// one call; the price series yields one row per trading day and field.
#[async_trait]
pub trait FinancialDataProvider: Send + Sync {
    async fn fetch(
        &self,
        ticker: &str,
        kind: StatementKind,
    ) -> Result<Vec<FinancialRecord>, FetchError>;
}
