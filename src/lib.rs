//! Transect MNI
//!
//! Zooarchaeological summaries over field-survey specimen tables.
//!
//! - `mni/`: Minimum Number of Individuals per transect, from raw specimen
//!   rows or pre-pivoted side counts
//! - `data`: element count reference table (divisors for count correction)
//! - `seasons`: Welch's t-test between consecutive field seasons
//! - `config`: column names and comparison options
//! - `utils/`: column access and value normalization

pub mod config;
pub mod data;
pub mod error;
pub mod mni;
pub mod seasons;
pub mod utils;

// Re-export commonly used types
pub use config::{AnalysisConfig, MniColumns, SeasonComparisonOptions};
pub use data::{DivisorSource, ElementCountRow, ElementCountTable, ElementCountsFile};
pub use error::{MniError, Result};
pub use mni::{calculate_mni, InputShape, MniCalculator, PivotTable, TransectMni};
pub use seasons::{compare_consecutive_seasons, compare_seasons, welch_t_test, SeasonComparison, WelchTest};
