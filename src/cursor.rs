use thiserror::Error;
use tracing::warn;

/// The persisted cursor names a symbol that is no longer in the ticker list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cursor symbol '{symbol}' is not in the current ticker list")]
pub struct CursorMismatch {
    pub symbol: String,
}

/// Compute the index to resume importing from.
///
/// No cursor means start at 0. A cursor resumes at the index immediately
/// after the last matching symbol, so a cursor at the final ticker yields
/// `tickers.len()` (nothing left to do).
pub fn resume_point(
    tickers: &[String],
    persisted_cursor: Option<&str>,
) -> Result<usize, CursorMismatch> {
    match persisted_cursor {
        None => Ok(0),
        Some(symbol) => tickers
            .iter()
            .rposition(|t| t == symbol)
            .map(|index| index + 1)
            .ok_or_else(|| CursorMismatch {
                symbol: symbol.to_string(),
            }),
    }
}

/// Resume-index policy: a mismatched cursor restarts from the beginning.
///
/// The ticker list changed between runs; without manual intervention there
/// is no stronger recovery than a full pass, which the idempotent per-ticker
/// commit makes safe.
pub fn resume_or_restart(tickers: &[String], persisted_cursor: Option<&str>) -> usize {
    match resume_point(tickers, persisted_cursor) {
        Ok(index) => index,
        Err(err) => {
            warn!("{}; restarting from the top of the list", err);
            0
        }
    }
}
