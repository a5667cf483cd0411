//! CSV Data Loader Module
//! Loads an exported `orders` table for offline charting using Polars.

use polars::prelude::*;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("CSV is missing required column '{0}'")]
    MissingColumn(String),
}

/// Columns every export must carry.
pub const REQUIRED_COLUMNS: [&str; 2] = ["order_date", "order_status"];

/// Loads an orders export from disk.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file using Polars.
    pub fn load_csv(file_path: &Path) -> Result<DataFrame, LoaderError> {
        let df = LazyCsvReader::new(file_path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        for column in REQUIRED_COLUMNS {
            if df.column(column).is_err() {
                return Err(LoaderError::MissingColumn(column.to_string()));
            }
        }

        log::info!(
            "Loaded {} rows, {} columns from {}",
            df.height(),
            df.width(),
            file_path.display()
        );
        Ok(df)
    }
}
