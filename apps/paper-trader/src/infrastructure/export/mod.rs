//! File exports.

mod bars_csv;

pub use bars_csv::{CSV_HEADER, ExportError, default_file_name, export_bars_csv, write_bars_csv};
