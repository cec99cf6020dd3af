//! CSV export of bar series.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::SecondsFormat;
use thiserror::Error;

use crate::domain::Bar;

/// Column header, in write order.
pub const CSV_HEADER: [&str; 6] = ["timestamp", "open", "high", "low", "close", "volume"];

/// Export failures.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Output file could not be created.
    #[error("Failed to create {path}: {message}")]
    Create {
        /// Target path.
        path: PathBuf,
        /// OS error text.
        message: String,
    },

    /// Writing a record failed.
    #[error("Failed to write CSV: {0}")]
    Write(#[from] csv::Error),

    /// Flushing the output failed.
    #[error("Failed to flush CSV: {0}")]
    Flush(#[from] std::io::Error),
}

/// Write `bars` as CSV to any writer. Returns the number of rows written.
///
/// Timestamps are RFC 3339 in UTC; prices keep the precision they arrived with.
pub fn write_bars_csv<W: Write>(writer: W, bars: &[Bar]) -> Result<usize, ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER)?;

    for bar in bars {
        csv.write_record([
            bar.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])?;
    }

    csv.flush()?;
    Ok(bars.len())
}

/// Write `bars` to a file at `path`, replacing any existing file.
pub fn export_bars_csv(path: &Path, bars: &[Bar]) -> Result<usize, ExportError> {
    let file = File::create(path).map_err(|e| ExportError::Create {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let rows = write_bars_csv(file, bars)?;
    tracing::info!(path = %path.display(), rows, "Exported bars");
    Ok(rows)
}

/// Default file name for a symbol's export, e.g. `BTC-USD_1Hour.csv`.
#[must_use]
pub fn default_file_name(symbol: &str, timeframe: &str) -> String {
    format!("{}_{timeframe}.csv", symbol.replace('/', "-"))
}
