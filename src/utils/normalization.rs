//! Value Normalization Utilities
//!
//! Identifier coercion, element-name cleanup and output rounding.

use polars::prelude::*;

use crate::error::Result;

/// Coerce a column to nullable integer identifiers
///
/// Text is trimmed and parsed as an integer, or as a float with no
/// fractional part ("12.0"). Anything else, including fractional and
/// non-finite numbers, becomes null.
pub fn coerce_integer_ids(column: &Column) -> Result<Vec<Option<i64>>> {
    if column.dtype() == &DataType::String {
        return Ok(column
            .str()?
            .into_iter()
            .map(|v| v.and_then(parse_integer_id))
            .collect());
    }

    let floats = column.cast(&DataType::Float64)?;
    Ok(floats
        .f64()?
        .into_iter()
        .map(|v| v.and_then(integral_value))
        .collect())
}

/// Parse a single textual identifier
pub fn parse_integer_id(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(id) = trimmed.parse::<i64>() {
        return Some(id);
    }
    trimmed.parse::<f64>().ok().and_then(integral_value)
}

fn integral_value(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

/// Replace blank element names with the default element
pub fn normalize_element_name(element: &str, default_element: &str) -> String {
    if element.trim().is_empty() {
        default_element.to_string()
    } else {
        element.to_string()
    }
}

/// Case-insensitive element key used for reference-table matching
pub fn element_key(element: &str) -> String {
    element.trim().to_lowercase()
}

/// Round to a fixed number of decimal places, ties to even
///
/// NaN and infinities pass through.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
