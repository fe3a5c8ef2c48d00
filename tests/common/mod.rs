//! Common test utilities and helpers

pub mod api_mock;
pub mod database;

/// Test data utilities
pub mod test_data {
    use chrono::NaiveDate;
    use stock_importer::models::{FinancialRecord, PeriodType, StatementKind};

    /// Build a ticker list from string literals
    pub fn ticker_list(symbols: &[&str]) -> Vec<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    /// Create a single annual income-statement record
    pub fn create_test_record(ticker: &str, field: &str, value: f64) -> FinancialRecord {
        FinancialRecord {
            ticker: ticker.to_string(),
            statement: StatementKind::Income,
            period: PeriodType::Annual,
            fiscal_date: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
            field: field.to_string(),
            value,
        }
    }
}

/// Logging utilities for tests
pub mod logging {
    use std::sync::Once;
    use tracing::info;

    static INIT: Once = Once::new();

    /// Initialize test logging
    pub fn init_test_logging() {
        INIT.call_once(|| {
            let _ = tracing::subscriber::set_global_default(
                tracing_subscriber::fmt()
                    .with_env_filter("stock_importer=debug,test=debug")
                    .with_test_writer()
                    .finish(),
            );
        });
    }

    /// Log test step
    pub fn log_test_step(step: &str) {
        info!("🧪 Test Step: {}", step);
    }
}
