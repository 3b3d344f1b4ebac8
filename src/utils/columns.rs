//! Column access helpers with validation
//!
//! Presence checks report every missing name at once, sorted, so callers
//! can fix an export in a single pass.

use polars::prelude::*;
use std::collections::HashSet;

use crate::error::{MniError, Result};

/// Names of all columns in the frame
fn column_names(df: &DataFrame) -> HashSet<String> {
    df.get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Fail with `MissingColumn` listing every absent name
pub fn require_columns(df: &DataFrame, columns: &[&str]) -> Result<()> {
    let actual = column_names(df);
    let missing: Vec<&str> = columns
        .iter()
        .copied()
        .filter(|c| !actual.contains(*c))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(MniError::missing_columns(missing))
    }
}

/// Read a column as optional strings, casting non-string dtypes
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Read a column as optional floats; unparseable cells become null
pub fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df.column(name)?;
    if column.dtype() == &DataType::String {
        return Ok(column
            .str()?
            .into_iter()
            .map(|v| v.and_then(|s| s.trim().parse::<f64>().ok()))
            .collect());
    }
    let column = column.cast(&DataType::Float64)?;
    Ok(column.f64()?.into_iter().collect())
}
