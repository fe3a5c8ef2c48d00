use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use super::{ApiRateLimiter, FetchError, FinancialDataProvider};
use crate::models::{Config, FinancialRecord, PeriodType, StatementKind};

const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Alpha Vantage daily price response
#[derive(Debug, Deserialize)]
struct DailyResponse {
    #[serde(rename = "Meta Data")]
    meta_data: DailyMetaData,
    #[serde(rename = "Time Series (Daily)")]
    time_series: HashMap<String, DailyBar>,
}

#[derive(Debug, Deserialize)]
struct DailyMetaData {
    #[serde(rename = "2. Symbol")]
    symbol: String,
    #[serde(rename = "3. Last Refreshed")]
    last_refreshed: String,
}

#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

/// Alpha Vantage financial statement response.
///
/// Each report is a flat map of field name to stringified value; numeric
/// fields parse as f64, everything else (dates, currency, literal "None")
/// is skipped during normalization.
#[derive(Debug, Deserialize)]
struct StatementResponse {
    #[allow(dead_code)]
    symbol: Option<String>,
    #[serde(rename = "annualReports", default)]
    annual_reports: Vec<HashMap<String, String>>,
    #[serde(rename = "quarterlyReports", default)]
    quarterly_reports: Vec<HashMap<String, String>>,
}

/// Alpha Vantage API client
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: ApiRateLimiter,
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client
    pub fn new(api_key: &str, config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("stock-importer/1.0")
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: config
                .api_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            rate_limiter: ApiRateLimiter::new(config.rate_limit_per_minute),
        })
    }

    /// Make a rate-limited request and classify the response body.
    ///
    /// Alpha Vantage reports quota exhaustion and bad tickers inside a 200
    /// body, so classification happens on the parsed JSON, not the status.
    async fn make_request(
        &self,
        function: &str,
        ticker: &str,
        extra_params: &[(&str, &str)],
    ) -> Result<Value, FetchError> {
        self.rate_limiter.wait().await;

        debug!("requesting {} for {}", function, ticker);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", function),
                ("symbol", ticker),
                ("apikey", self.api_key.as_str()),
            ])
            .query(extra_params)
            .send()
            .await
            .map_err(|e| FetchError::Transient(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(FetchError::Transient(format!(
                "API request failed with status {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| FetchError::Transient(format!("invalid JSON response: {}", e)))?;

        // Quota exhaustion arrives as a "Note" or "Information" message
        for key in ["Note", "Information"] {
            if let Some(message) = body.get(key).and_then(|v| v.as_str()) {
                return Err(FetchError::QuotaExceeded(message.to_string()));
            }
        }

        if let Some(message) = body.get("Error Message").and_then(|v| v.as_str()) {
            return Err(FetchError::NotFound(format!("{}: {}", ticker, message)));
        }

        Ok(body)
    }

    /// Fetch the full daily price series for a ticker
    async fn fetch_price_series(&self, ticker: &str) -> Result<Vec<FinancialRecord>, FetchError> {
        let body = self
            .make_request("TIME_SERIES_DAILY", ticker, &[("outputsize", "full")])
            .await?;

        // An unknown ticker that slipped past the error-message check shows
        // up as a body without the time series
        let daily: DailyResponse = serde_json::from_value(body)
            .map_err(|_| FetchError::NotFound(format!("{}: no price data retrieved", ticker)))?;

        debug!(
            "daily series for {} last refreshed {}",
            daily.meta_data.symbol, daily.meta_data.last_refreshed
        );

        let mut records = Vec::with_capacity(daily.time_series.len() * 5);
        for (date_str, bar) in &daily.time_series {
            let fiscal_date = chrono::NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .map_err(|e| FetchError::Transient(format!("bad date '{}': {}", date_str, e)))?;

            let fields = [
                ("open", &bar.open),
                ("high", &bar.high),
                ("low", &bar.low),
                ("close", &bar.close),
                ("volume", &bar.volume),
            ];
            for (field, raw) in fields {
                let value = raw.parse::<f64>().map_err(|e| {
                    FetchError::Transient(format!("bad {} value '{}': {}", field, raw, e))
                })?;
                records.push(FinancialRecord {
                    ticker: ticker.to_string(),
                    statement: StatementKind::Price,
                    period: PeriodType::Daily,
                    fiscal_date,
                    field: field.to_string(),
                    value,
                });
            }
        }

        // Oldest first, so inserts follow the calendar
        records.sort_by_key(|r| r.fiscal_date);

        Ok(records)
    }

    /// Fetch one financial statement for a ticker (annual + quarterly reports)
    async fn fetch_statement(
        &self,
        ticker: &str,
        kind: StatementKind,
    ) -> Result<Vec<FinancialRecord>, FetchError> {
        let function = match kind {
            StatementKind::Income => "INCOME_STATEMENT",
            StatementKind::Balance => "BALANCE_SHEET",
            StatementKind::CashFlow => "CASH_FLOW",
            StatementKind::Price => unreachable!("price series has its own endpoint"),
        };

        let body = self.make_request(function, ticker, &[]).await?;

        let statement: StatementResponse = serde_json::from_value(body)
            .map_err(|e| FetchError::Transient(format!("unexpected {} shape: {}", function, e)))?;

        if statement.annual_reports.is_empty() && statement.quarterly_reports.is_empty() {
            return Err(FetchError::NotFound(format!(
                "{}: no {} data retrieved",
                ticker, function
            )));
        }

        let mut records = Vec::new();
        let report_sets = [
            (PeriodType::Annual, &statement.annual_reports),
            (PeriodType::Quarterly, &statement.quarterly_reports),
        ];
        for (period, reports) in report_sets {
            for report in reports {
                let fiscal_date = report
                    .get("fiscalDateEnding")
                    .ok_or_else(|| {
                        FetchError::Transient(format!("{} report missing fiscalDateEnding", function))
                    })
                    .and_then(|raw| {
                        chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
                            FetchError::Transient(format!("bad fiscalDateEnding '{}': {}", raw, e))
                        })
                    })?;

                for (field, raw) in report {
                    if field == "fiscalDateEnding" || field == "reportedCurrency" {
                        continue;
                    }
                    // Unreported fields come through as the string "None"
                    if let Ok(value) = raw.parse::<f64>() {
                        records.push(FinancialRecord {
                            ticker: ticker.to_string(),
                            statement: kind,
                            period,
                            fiscal_date,
                            field: field.clone(),
                            value,
                        });
                    }
                }
            }
        }

        Ok(records)
    }
}

#[async_trait::async_trait]
impl FinancialDataProvider for AlphaVantageClient {
    async fn fetch(
        &self,
        ticker: &str,
        kind: StatementKind,
    ) -> Result<Vec<FinancialRecord>, FetchError> {
        match kind {
            StatementKind::Price => self.fetch_price_series(ticker).await,
            _ => self.fetch_statement(ticker, kind).await,
        }
    }
}
