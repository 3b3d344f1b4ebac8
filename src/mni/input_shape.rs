//! Input shape classification
//!
//! Specimen tables arrive either as one row per observed element (with a
//! side column) or already pivoted (one count column per side). The shape
//! is decided once here; everything downstream works on the pivot form.

use polars::prelude::*;

use crate::config::MniColumns;
use crate::error::Result;
use crate::utils::{has_column, require_columns};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputShape {
    /// One row per specimen observation; sides are values of `side_column`
    Raw { side_column: String },
    /// Already pivoted; each of `side_columns` holds a count
    Pivoted { side_columns: Vec<String> },
}

impl InputShape {
    /// Classify by presence of the side column
    ///
    /// In pivoted form every column that is not a grouping key and not one
    /// of the taxon alternates counts as a side column.
    pub fn classify(df: &DataFrame, columns: &MniColumns) -> Self {
        if has_column(df, &columns.side) {
            return InputShape::Raw { side_column: columns.side.clone() };
        }

        let side_columns = df
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .filter(|name| !columns.is_key_column(name))
            .filter(|name| !columns.taxon_alternates.contains(name))
            .collect();

        InputShape::Pivoted { side_columns }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, InputShape::Raw { .. })
    }

    /// Check the grouping keys (and side, for raw input) are present
    ///
    /// The taxon column is skipped when its labels were rebuilt from
    /// alternates and the column itself does not exist.
    pub fn require_columns(&self, df: &DataFrame, columns: &MniColumns, taxon_rebuilt: bool) -> Result<()> {
        let mut required: Vec<&str> = columns
            .key_columns()
            .into_iter()
            .filter(|name| !(taxon_rebuilt && *name == columns.taxon))
            .collect();

        if let InputShape::Raw { side_column } = self {
            required.push(side_column.as_str());
        }

        require_columns(df, &required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_raw() {
        let df = df![
            "TransectUID" => &[1i64],
            "Side" => &["L"],
        ].unwrap();

        let shape = InputShape::classify(&df, &MniColumns::default());
        assert_eq!(shape, InputShape::Raw { side_column: "Side".to_string() });
        assert!(shape.is_raw());
    }

    #[test]
    fn test_classify_pivoted_skips_keys_and_alternates() {
        let df = df![
            "TransectUID" => &[1i64],
            "Taxon Label" => &["Odocoileus"],
            "Taxon Guess" => &["deer"],
            "Pre: Age" => &["adult"],
            "Pre: Sex" => &["F"],
            "What element is this?" => &["femur"],
            "L" => &[2i64],
            "R" => &[1i64],
        ].unwrap();

        let shape = InputShape::classify(&df, &MniColumns::default());
        assert_eq!(
            shape,
            InputShape::Pivoted { side_columns: vec!["L".to_string(), "R".to_string()] }
        );
    }

    #[test]
    fn test_require_columns_raw_needs_side() {
        let df = df![
            "TransectUID" => &[1i64],
            "Taxon Label" => &["Odocoileus"],
            "Side" => &["L"],
        ].unwrap();

        let columns = MniColumns::default();
        let shape = InputShape::classify(&df, &columns);
        let err = shape.require_columns(&df, &columns, false).unwrap_err();
        assert_eq!(
            err.missing(),
            Some(&[
                "Pre: Age".to_string(),
                "Pre: Sex".to_string(),
                "What element is this?".to_string(),
            ][..])
        );
    }
}
