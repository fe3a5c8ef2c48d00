use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::{FetchError, FinancialDataProvider};
use crate::database::DatabaseManager;
use crate::models::{FinancialRecord, ImportOutcome, StatementKind, StopReason};

/// Sequential ingestion loop: fetch each ticker's data and commit it
/// one ticker at a time.
///
/// The cursor only ever advances inside `commit_ticker`, in the same
/// transaction as the rows, so it always names a fully-imported ticker.
pub struct Importer {
    provider: Arc<dyn FinancialDataProvider>,
    database: DatabaseManager,
}

impl Importer {
    /// Create a new importer
    pub fn new(provider: Arc<dyn FinancialDataProvider>, database: DatabaseManager) -> Self {
        Self { provider, database }
    }

    /// Import tickers from `start_index` to the end of the list, in order.
    ///
    /// Fetch failures stop the run and are reported in the outcome; only
    /// store failures propagate as errors.
    pub async fn run(&self, tickers: &[String], start_index: usize) -> Result<ImportOutcome> {
        let mut tickers_imported = 0;
        let mut records_imported = 0;

        if start_index >= tickers.len() {
            info!("✅ Nothing to import; the ticker list is already complete");
            return Ok(ImportOutcome {
                tickers_imported,
                records_imported,
                reason: StopReason::Completed,
                stopped_at: None,
            });
        }

        info!(
            "📥 Importing {} tickers, starting at {}",
            tickers.len() - start_index,
            tickers[start_index]
        );

        for ticker in &tickers[start_index..] {
            match self.fetch_ticker(ticker).await {
                Ok(records) => {
                    self.database.commit_ticker(ticker, &records).await?;
                    tickers_imported += 1;
                    records_imported += records.len();
                    info!("✅ {} imported ({} rows)", ticker, records.len());
                }
                Err(err) => {
                    // Rows already fetched for this ticker are dropped; the
                    // cursor still names the previous fully-imported ticker
                    let reason = match &err {
                        FetchError::QuotaExceeded(_) => StopReason::QuotaExceeded,
                        FetchError::NotFound(_) => StopReason::NotFound,
                        FetchError::Transient(_) => StopReason::Transient,
                    };
                    warn!("⛔ Stopping at {}: {}", ticker, err);
                    return Ok(ImportOutcome {
                        tickers_imported,
                        records_imported,
                        reason,
                        stopped_at: Some(ticker.clone()),
                    });
                }
            }
        }

        info!(
            "🏁 Import complete: {} tickers, {} rows",
            tickers_imported, records_imported
        );

        Ok(ImportOutcome {
            tickers_imported,
            records_imported,
            reason: StopReason::Completed,
            stopped_at: None,
        })
    }

    /// Fetch all four request kinds for one ticker.
    ///
    /// The first failure aborts the remaining requests for the ticker.
    async fn fetch_ticker(&self, ticker: &str) -> Result<Vec<FinancialRecord>, FetchError> {
        let mut collected = Vec::new();

        for kind in StatementKind::ALL {
            let rows = self.provider.fetch(ticker, kind).await?;
            debug!("{} {}: {} rows fetched", ticker, kind, rows.len());
            collected.extend(rows);
        }

        Ok(collected)
    }
}
