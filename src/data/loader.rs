//! CSV Data Loader Module
//! Handles telemetry CSV loading using Polars.

use super::model::Dataset;
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Rows scanned when inferring column dtypes.
const INFER_SCHEMA_ROWS: usize = 10_000;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("No data loaded")]
    NoData,
}

/// Handles CSV file loading with Polars and keeps the current dataset.
pub struct DataLoader {
    dataset: Option<Dataset>,
    file_path: Option<PathBuf>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            dataset: None,
            file_path: None,
        }
    }

    /// Read a CSV file into a dataset.
    ///
    /// Malformed cells become nulls instead of aborting the load; the
    /// pipeline drops the affected rows later.
    pub fn read_csv(path: &Path) -> Result<Dataset, LoaderError> {
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        log::info!(
            "Read {} rows x {} columns from {}",
            df.height(),
            df.width(),
            path.display()
        );
        Ok(Dataset::new(df))
    }

    /// Read CSV text that is already in memory.
    pub fn read_csv_bytes(bytes: &[u8]) -> Result<Dataset, LoaderError> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .with_ignore_errors(true)
            .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
            .finish()?;
        Ok(Dataset::new(df))
    }

    /// Load a CSV file and keep it as the current dataset.
    pub fn load_csv(&mut self, path: &Path) -> Result<&Dataset, LoaderError> {
        let dataset = Self::read_csv(path)?;
        self.file_path = Some(path.to_path_buf());
        self.dataset = Some(dataset);
        self.dataset.as_ref().ok_or(LoaderError::NoData)
    }

    /// Get list of column names from the loaded dataset.
    pub fn get_columns(&self) -> Vec<String> {
        self.dataset
            .as_ref()
            .map(|ds| ds.columns())
            .unwrap_or_default()
    }

    /// Get the number of rows in the loaded dataset.
    pub fn get_row_count(&self) -> usize {
        self.dataset.as_ref().map(|ds| ds.height()).unwrap_or(0)
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }

    /// Set dataset directly (used for async loading)
    pub fn set_dataset(&mut self, dataset: Dataset, path: PathBuf) {
        self.dataset = Some(dataset);
        self.file_path = Some(path);
    }
}
