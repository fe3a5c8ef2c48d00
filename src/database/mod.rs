use anyhow::Result;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::models::{FinancialRecord, PeriodType, StatementKind};

/// Metadata key holding the last fully-imported ticker
const CURSOR_KEY: &str = "last_imported_ticker";

/// SQLite-backed store for imported records and the import cursor
#[derive(Clone)]
pub struct DatabaseManager {
    pool: SqlitePool,
}

impl DatabaseManager {
    /// Open (or create) the database and set up the schema
    pub async fn new(database_path: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(
                SqliteConnectOptions::new()
                    .filename(database_path)
                    .create_if_missing(true),
            )
            .await?;

        // Enable WAL mode for better concurrency
        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&pool)
            .await?;

        sqlx::query("PRAGMA synchronous = NORMAL")
            .execute(&pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS financial_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ticker TEXT NOT NULL,
                statement TEXT NOT NULL,
                period TEXT NOT NULL,
                fiscal_date DATE NOT NULL,
                field TEXT NOT NULL,
                value REAL NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(ticker, statement, period, fiscal_date, field)
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS metadata (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_financial_records_ticker ON financial_records(ticker)",
        )
        .execute(&pool)
        .await?;

        info!("Database initialized at {}", database_path);

        Ok(Self { pool })
    }

    /// Read the persisted import cursor
    pub async fn get_cursor(&self) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM metadata WHERE key = ?")
            .bind(CURSOR_KEY)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get::<String, _>("value")))
    }

    /// Advance the persisted import cursor
    pub async fn set_cursor(&self, symbol: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO metadata (key, value, updated_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(CURSOR_KEY)
        .bind(symbol)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Write a ticker's rows and advance the cursor in one transaction.
    ///
    /// The insert ignores rows that already exist, so a retried commit after
    /// an interrupted run cannot produce duplicates.
    pub async fn commit_ticker(&self, symbol: &str, records: &[FinancialRecord]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO financial_records (ticker, statement, period, fiscal_date, field, value)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(ticker, statement, period, fiscal_date, field) DO NOTHING
                "#,
            )
            .bind(&record.ticker)
            .bind(record.statement.as_str())
            .bind(record.period.as_str())
            .bind(record.fiscal_date)
            .bind(&record.field)
            .bind(record.value)
            .execute(&mut tx)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO metadata (key, value, updated_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(CURSOR_KEY)
        .bind(symbol)
        .execute(&mut tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Count the rows stored for one ticker
    pub async fn count_records(&self, ticker: &str) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM financial_records WHERE ticker = ?")
            .bind(ticker)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i64, _>("n"))
    }

    /// Fetch every row stored for one ticker
    pub async fn records_for_ticker(&self, ticker: &str) -> Result<Vec<FinancialRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT ticker, statement, period, fiscal_date, field, value
            FROM financial_records
            WHERE ticker = ?
            ORDER BY statement, period, fiscal_date, field
            "#,
        )
        .bind(ticker)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let statement = match r.get::<String, _>("statement").as_str() {
                    "income" => StatementKind::Income,
                    "balance" => StatementKind::Balance,
                    "cashflow" => StatementKind::CashFlow,
                    _ => StatementKind::Price,
                };
                let period = match r.get::<String, _>("period").as_str() {
                    "annual" => PeriodType::Annual,
                    "quarterly" => PeriodType::Quarterly,
                    _ => PeriodType::Daily,
                };

                FinancialRecord {
                    ticker: r.get::<String, _>("ticker"),
                    statement,
                    period,
                    fiscal_date: r.get::<NaiveDate, _>("fiscal_date"),
                    field: r.get::<String, _>("field"),
                    value: r.get::<f64, _>("value"),
                }
            })
            .collect())
    }

    /// Get database statistics: (distinct tickers, total rows)
    pub async fn get_stats(&self) -> Result<(i64, i64)> {
        let row =
            sqlx::query("SELECT COUNT(DISTINCT ticker) AS tickers, COUNT(*) AS total FROM financial_records")
                .fetch_one(&self.pool)
                .await?;

        Ok((row.get::<i64, _>("tickers"), row.get::<i64, _>("total")))
    }
}
