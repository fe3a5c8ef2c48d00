use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

use stock_importer::api::AlphaVantageClient;
use stock_importer::cursor;
use stock_importer::database::DatabaseManager;
use stock_importer::importer::Importer;
use stock_importer::models::Config;
use stock_importer::tickers;

/// Import stock prices and financial statements into a local SQLite database
#[derive(Parser, Debug)]
#[command(name = "import_data", version, about, long_about = None)]
struct Cli {
    /// Path to the SQLite database file (created if missing)
    db_path: String,

    /// CSV file with one ticker symbol per row
    ticker_csv_path: PathBuf,

    /// Alpha Vantage API key
    api_key: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    let config = Config::from_env()?;

    // Setup failures exit non-zero; a stopped import run does not
    let ticker_list = match tickers::load_tickers(&cli.ticker_csv_path) {
        Ok(list) => list,
        Err(e) => {
            error!("Failed to load ticker list: {:#}", e);
            eprintln!("❌ Ticker List Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let database = match DatabaseManager::new(&cli.db_path).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to initialize database: {:#}", e);
            eprintln!("❌ Database Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let client = AlphaVantageClient::new(&cli.api_key, &config)?;

    let persisted_cursor = database.get_cursor().await?;
    let start_index = cursor::resume_or_restart(&ticker_list, persisted_cursor.as_deref());

    let importer = Importer::new(Arc::new(client), database.clone());
    let outcome = importer.run(&ticker_list, start_index).await?;

    let (total_tickers, total_rows) = database.get_stats().await?;

    println!();
    println!("📊 Import summary");
    println!("   Tickers imported this run: {}", outcome.tickers_imported);
    println!("   Rows written this run:     {}", outcome.records_imported);
    println!("   Stop reason:               {}", outcome.reason);
    if let Some(ticker) = &outcome.stopped_at {
        println!("   Stopped at:                {}", ticker);
        println!("   The next run will resume from this ticker.");
    }
    println!("   Database now holds {} rows across {} tickers", total_rows, total_tickers);

    Ok(())
}
