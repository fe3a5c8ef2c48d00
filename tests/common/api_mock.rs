//! Scripted in-memory provider for ingestion loop tests

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;

use stock_importer::api::{FetchError, FinancialDataProvider};
use stock_importer::models::{FinancialRecord, PeriodType, StatementKind};

/// Canned failure for one (ticker, kind) request
#[derive(Debug, Clone, Copy)]
pub enum Scripted {
    Quota,
    NotFound,
    Transient,
}

/// Provider that returns a small fixed row set for every request unless a
/// failure has been scripted for that (ticker, kind) pair. Every request is
/// recorded, so tests can assert which calls the loop actually issued.
pub struct ScriptedProvider {
    failures: HashMap<(String, StatementKind), Scripted>,
    calls: Mutex<Vec<(String, StatementKind)>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            failures: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script a failure for one (ticker, kind) request
    pub fn fail(mut self, ticker: &str, kind: StatementKind, failure: Scripted) -> Self {
        self.failures.insert((ticker.to_string(), kind), failure);
        self
    }

    /// Requests issued so far, in order
    pub fn calls(&self) -> Vec<(String, StatementKind)> {
        self.calls.lock().unwrap().clone()
    }

    /// The rows every successful request yields for a (ticker, kind) pair
    pub fn rows_for(ticker: &str, kind: StatementKind) -> Vec<FinancialRecord> {
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        let record = |period: PeriodType, field: &str, value: f64| FinancialRecord {
            ticker: ticker.to_string(),
            statement: kind,
            period,
            fiscal_date: date,
            field: field.to_string(),
            value,
        };

        match kind {
            StatementKind::Price => vec![
                record(PeriodType::Daily, "close", 101.5),
                record(PeriodType::Daily, "volume", 1_000_000.0),
            ],
            _ => vec![
                record(PeriodType::Annual, "totalRevenue", 5_000_000_000.0),
                record(PeriodType::Quarterly, "totalRevenue", 1_200_000_000.0),
            ],
        }
    }

    /// Total rows a fully-imported ticker produces across all four kinds
    pub fn rows_per_ticker() -> usize {
        StatementKind::ALL
            .iter()
            .map(|kind| Self::rows_for("X", *kind).len())
            .sum()
    }
}

#[async_trait]
impl FinancialDataProvider for ScriptedProvider {
    async fn fetch(
        &self,
        ticker: &str,
        kind: StatementKind,
    ) -> Result<Vec<FinancialRecord>, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((ticker.to_string(), kind));

        if let Some(failure) = self.failures.get(&(ticker.to_string(), kind)) {
            return Err(match failure {
                Scripted::Quota => {
                    FetchError::QuotaExceeded("daily request limit reached".to_string())
                }
                Scripted::NotFound => FetchError::NotFound(format!("{}: unknown symbol", ticker)),
                Scripted::Transient => FetchError::Transient("connection reset".to_string()),
            });
        }

        Ok(Self::rows_for(ticker, kind))
    }
}
