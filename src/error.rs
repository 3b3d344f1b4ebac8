//! Error types for MNI aggregation and season comparison.

use std::path::PathBuf;

use polars::prelude::PolarsError;

/// Errors that abort an aggregation or comparison call.
///
/// Data anomalies (unparseable identifiers, empty season groups, undefined
/// statistics) are never reported here; they surface as nulls, skipped rows
/// or NaN values in the output.
#[derive(Debug, thiserror::Error)]
pub enum MniError {
    /// One or more required columns are absent. Names are sorted.
    #[error("Missing columns: {columns:?}")]
    MissingColumn { columns: Vec<String> },

    /// The element-count reference source does not exist.
    #[error("Element count source not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Dataframe error: {0}")]
    Polars(#[from] PolarsError),
}

impl MniError {
    /// Build a `MissingColumn` error with the names sorted and deduplicated.
    pub fn missing_columns<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut columns: Vec<String> = names.into_iter().map(Into::into).collect();
        columns.sort();
        columns.dedup();
        MniError::MissingColumn { columns }
    }

    /// Column names carried by a `MissingColumn` error, if any.
    pub fn missing(&self) -> Option<&[String]> {
        match self {
            MniError::MissingColumn { columns } => Some(columns),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MniError>;
