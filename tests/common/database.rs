//! Test database utilities

use anyhow::Result;
use tempfile::TempDir;

use stock_importer::database::DatabaseManager;

/// Create a database manager backed by a throwaway SQLite file.
///
/// The returned `TempDir` must be kept alive for as long as the database
/// is in use; dropping it deletes the file.
pub async fn init_fresh_test_database() -> Result<(TempDir, DatabaseManager)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("test.db");
    let database = DatabaseManager::new(db_path.to_str().unwrap()).await?;

    Ok((dir, database))
}
