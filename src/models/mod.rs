use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of data requested from the API for a ticker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementKind {
    Price,
    Income,
    Balance,
    CashFlow,
}

impl StatementKind {
    /// The four request kinds issued per ticker, in fetch order
    pub const ALL: [StatementKind; 4] = [
        StatementKind::Price,
        StatementKind::Income,
        StatementKind::Balance,
        StatementKind::CashFlow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Price => "price",
            StatementKind::Income => "income",
            StatementKind::Balance => "balance",
            StatementKind::CashFlow => "cashflow",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reporting period of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodType {
    /// Price series rows (one per trading day)
    Daily,
    Annual,
    Quarterly,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Daily => "daily",
            PeriodType::Annual => "annual",
            PeriodType::Quarterly => "quarterly",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One normalized row of imported data.
///
/// (ticker, statement, period, fiscal_date, field) is unique; the database
/// enforces this with a UNIQUE constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub ticker: String,
    pub statement: StatementKind,
    pub period: PeriodType,
    pub fiscal_date: NaiveDate,
    pub field: String,
    pub value: f64,
}

/// Why an import run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every ticker from the resume point onward was imported
    Completed,
    /// The daily API request quota ran out
    QuotaExceeded,
    /// The API did not recognize a ticker
    NotFound,
    /// Network or parse failure
    Transient,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StopReason::Completed => "completed",
            StopReason::QuotaExceeded => "quota",
            StopReason::NotFound => "not_found",
            StopReason::Transient => "transient",
        };
        write!(f, "{}", label)
    }
}

/// Summary of a single import run
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    /// Tickers fully imported during this run
    pub tickers_imported: usize,
    /// Rows written during this run
    pub records_imported: usize,
    pub reason: StopReason,
    /// The ticker the run stopped at; `None` when the list completed
    pub stopped_at: Option<String>,
}

/// Configuration for the application
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub rate_limit_per_minute: u32,
    /// Override for the API base URL; used by the HTTP-level tests
    pub api_base_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Ok(Config {
            // Alpha Vantage free tier allows 5 requests per minute
            rate_limit_per_minute: std::env::var("RATE_LIMIT_PER_MINUTE")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
            api_base_url: std::env::var("ALPHA_VANTAGE_URL").ok(),
        })
    }
}
