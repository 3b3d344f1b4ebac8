//! Element Count Reference Data
//!
//! Loads the element → count table used to correct side counts.
//! The table is handed back exactly as read (text cells, source row order);
//! numeric parsing and name normalization are done by the aggregator.

use polars::prelude::*;
use std::path::{Path, PathBuf};

use crate::error::{MniError, Result};

/// Normalized header of the element-name column
pub const ELEMENT_HEADER: &str = "element";
/// Normalized header of the divisor column
pub const COUNT_HEADER: &str = "count";

/// One row of the reference table, cells untouched
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementCountRow {
    pub element: Option<String>,
    pub count: Option<String>,
}

/// Element count table in source row order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementCountTable {
    pub rows: Vec<ElementCountRow>,
}

impl ElementCountTable {
    /// Build from (element, count) pairs
    pub fn from_pairs<I, E, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (E, C)>,
        E: Into<String>,
        C: ToString,
    {
        let rows = pairs
            .into_iter()
            .map(|(element, count)| ElementCountRow {
                element: Some(element.into()),
                count: Some(count.to_string()),
            })
            .collect();
        Self { rows }
    }

    /// Extract the `element` and `count` columns from an already-read sheet
    ///
    /// Headers are matched after trimming and lowercasing.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let mut element_col = None;
        let mut count_col = None;

        for name in df.get_column_names() {
            match name.trim().to_lowercase().as_str() {
                ELEMENT_HEADER if element_col.is_none() => element_col = Some(name.to_string()),
                COUNT_HEADER if count_col.is_none() => count_col = Some(name.to_string()),
                _ => {}
            }
        }

        let (element_col, count_col) = match (element_col, count_col) {
            (Some(e), Some(c)) => (e, c),
            (e, c) => {
                let mut missing = Vec::new();
                if e.is_none() {
                    missing.push(ELEMENT_HEADER);
                }
                if c.is_none() {
                    missing.push(COUNT_HEADER);
                }
                return Err(MniError::missing_columns(missing));
            }
        };

        let elements = df.column(&element_col)?.cast(&DataType::String)?;
        let counts = df.column(&count_col)?.cast(&DataType::String)?;

        let rows = elements
            .str()?
            .into_iter()
            .zip(counts.str()?.into_iter())
            .map(|(element, count)| ElementCountRow {
                element: element.map(str::to_string),
                count: count.map(str::to_string),
            })
            .collect();

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Supplier of element count reference data
///
/// The aggregator calls `load` at most once per invocation, and only when
/// the pivoted table has side-count columns to correct.
pub trait DivisorSource {
    fn load(&self) -> Result<ElementCountTable>;
}

impl DivisorSource for ElementCountTable {
    fn load(&self) -> Result<ElementCountTable> {
        Ok(self.clone())
    }
}

/// Element count table stored as CSV on disk
///
/// Read fresh on every `load`; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct ElementCountsFile {
    path: PathBuf,
}

impl ElementCountsFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DivisorSource for ElementCountsFile {
    fn load(&self) -> Result<ElementCountTable> {
        if !self.path.exists() {
            return Err(MniError::SourceNotFound { path: self.path.clone() });
        }

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(self.path.clone()))?
            .finish()?;

        let table = ElementCountTable::from_frame(&df)?;
        tracing::debug!("Loaded {} element count rows from {:?}", table.len(), self.path);
        Ok(table)
    }
}
