//! Utility modules shared by the aggregator and the season comparator
//!
//! - Columns: presence checks and typed column extraction
//! - Normalization: identifier coercion, element names, rounding

pub mod columns;
pub mod normalization;

// Re-export commonly used helpers
pub use columns::{has_column, require_columns, string_values, float_values};
pub use normalization::{coerce_integer_ids, element_key, normalize_element_name, round_to};
