use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Load the ticker list from a headerless CSV file, one symbol per row.
///
/// Order is preserved; duplicates keep their first occurrence; blank rows
/// are skipped.
pub fn load_tickers(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open ticker list {}", path.display()))?;

    let mut seen = HashSet::new();
    let mut tickers = Vec::new();

    for result in reader.records() {
        let record =
            result.with_context(|| format!("failed to read ticker list {}", path.display()))?;

        if let Some(field) = record.get(0) {
            let symbol = field.trim();
            if symbol.is_empty() {
                continue;
            }
            if seen.insert(symbol.to_string()) {
                tickers.push(symbol.to_string());
            }
        }
    }

    info!("Loaded {} tickers from {}", tickers.len(), path.display());

    Ok(tickers)
}
