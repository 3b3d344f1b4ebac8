//! Analysis Configuration
//!
//! Column names, divisor source location and comparison options.
//! Every field has a default matching the field-survey export, so a JSON
//! config only needs to name what differs.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};

use crate::data::{ElementCountTable, ElementCountsFile};
use crate::mni::MniCalculator;

/// Column names consumed by the MNI aggregator
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MniColumns {
    pub transect: String,
    pub taxon: String,
    /// Fallback taxon columns, consulted in this order
    pub taxon_alternates: Vec<String>,
    pub age: String,
    pub sex: String,
    pub element: String,
    pub side: String,
    /// Element label whose side counts are capped at one
    pub nonidentifiable_element: String,
    /// Substituted for blank element names
    pub default_element: String,
}

impl Default for MniColumns {
    fn default() -> Self {
        Self {
            transect: "TransectUID".to_string(),
            taxon: "Taxon Label".to_string(),
            taxon_alternates: vec!["Taxon Guess".to_string(), "Pre: Taxon".to_string()],
            age: "Pre: Age".to_string(),
            sex: "Pre: Sex".to_string(),
            element: "What element is this?".to_string(),
            side: "Side".to_string(),
            nonidentifiable_element: "bone nonidentifiable".to_string(),
            default_element: "teeth".to_string(),
        }
    }
}

impl MniColumns {
    /// The five grouping keys, in pivot order
    pub fn key_columns(&self) -> [&str; 5] {
        [
            self.transect.as_str(),
            self.taxon.as_str(),
            self.age.as_str(),
            self.sex.as_str(),
            self.element.as_str(),
        ]
    }

    pub fn is_key_column(&self, name: &str) -> bool {
        self.key_columns().contains(&name)
    }
}

/// Options for consecutive field-season comparison
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SeasonComparisonOptions {
    pub season_col: String,
    pub value_col: String,
    /// Significance threshold for the p-value
    pub alpha: f64,
}

impl Default for SeasonComparisonOptions {
    fn default() -> Self {
        Self {
            season_col: "Year".to_string(),
            value_col: "Pre: Distance spotted".to_string(),
            alpha: 0.05,
        }
    }
}

/// Top-level analysis configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub columns: MniColumns,
    pub seasons: SeasonComparisonOptions,
    /// CSV with `element` and `count` headers; no correction when unset
    pub element_counts_path: Option<PathBuf>,
}

impl AnalysisConfig {
    /// Load configuration from JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read analysis config: {:?}", path))?;

        let config: AnalysisConfig = serde_json::from_str(&contents)
            .with_context(|| "Failed to parse analysis config JSON")?;

        if !(config.seasons.alpha > 0.0 && config.seasons.alpha < 1.0) {
            anyhow::bail!("alpha must lie in (0, 1), got {}", config.seasons.alpha);
        }

        Ok(config)
    }

    /// Aggregator wired to the configured element-count source
    pub fn mni_calculator(&self) -> MniCalculator {
        match &self.element_counts_path {
            Some(path) => MniCalculator::new(self.columns.clone(), ElementCountsFile::new(path)),
            None => MniCalculator::new(self.columns.clone(), ElementCountTable::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.columns.transect, "TransectUID");
        assert_eq!(config.columns.taxon_alternates, vec!["Taxon Guess", "Pre: Taxon"]);
        assert_eq!(config.seasons.season_col, "Year");
        assert_eq!(config.seasons.alpha, 0.05);
        assert!(config.element_counts_path.is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{
            "columns": { "transect": "Transect" },
            "seasons": { "alpha": 0.01 },
            "element_counts_path": "refs/element_counts.csv"
        }"#;

        let config: AnalysisConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.columns.transect, "Transect");
        assert_eq!(config.columns.side, "Side");
        assert_eq!(config.seasons.alpha, 0.01);
        assert_eq!(config.seasons.value_col, "Pre: Distance spotted");
        assert_eq!(
            config.element_counts_path.as_deref(),
            Some(Path::new("refs/element_counts.csv"))
        );
    }

    #[test]
    fn test_load_rejects_bad_alpha() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "seasons": {{ "alpha": 1.5 }} }}"#).unwrap();

        let err = AnalysisConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("alpha"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = AnalysisConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read analysis config"));
    }

    #[test]
    fn test_key_columns() {
        let columns = MniColumns::default();
        assert!(columns.is_key_column("What element is this?"));
        assert!(!columns.is_key_column("Side"));
        assert!(!columns.is_key_column("L"));
    }
}
