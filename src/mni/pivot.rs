//! Canonical pivot representation
//!
//! Both input shapes converge here: one row per
//! (transect, taxon, age, sex, element) with one count per side column.

use polars::prelude::*;
use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};
use std::collections::{BTreeMap, BTreeSet};

use crate::config::MniColumns;
use crate::error::Result;
use crate::utils::{float_values, normalize_element_name, string_values};

use super::input_shape::InputShape;

/// Per-row side counts; specimen sides rarely exceed left/right/axial
pub type SideCounts = SmallVec<[Option<f64>; 4]>;

/// Grouping key of a pivot row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpecimenKey {
    pub transect: i64,
    pub taxon: String,
    pub age: String,
    pub sex: String,
    pub element: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PivotRow {
    pub key: SpecimenKey,
    /// Aligned with `PivotTable::side_columns`; null cells are skipped by max
    pub counts: SideCounts,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PivotTable {
    pub side_columns: Vec<String>,
    pub rows: Vec<PivotRow>,
}

/// Key columns after identifier coercion and taxon reconstruction
pub struct KeyColumns {
    pub transect: Vec<Option<i64>>,
    pub taxon: Vec<Option<String>>,
    pub age: Vec<Option<String>>,
    pub sex: Vec<Option<String>>,
    pub element: Vec<Option<String>>,
}

impl KeyColumns {
    /// Read age, sex and element from `df`; transect and taxon come pre-resolved
    ///
    /// A null element name takes the default element, so only transect,
    /// taxon, age and sex can make a row incomplete.
    pub fn read(
        df: &DataFrame,
        columns: &MniColumns,
        transect: Vec<Option<i64>>,
        taxon: Vec<Option<String>>,
    ) -> Result<Self> {
        Ok(Self {
            transect,
            taxon,
            age: string_values(df, &columns.age)?,
            sex: string_values(df, &columns.sex)?,
            element: string_values(df, &columns.element)?
                .into_iter()
                .map(|element| element.or_else(|| Some(columns.default_element.clone())))
                .collect(),
        })
    }

    /// Key for row `idx`, or None if any key is null
    pub fn key(&self, idx: usize) -> Option<SpecimenKey> {
        Some(SpecimenKey {
            transect: self.transect[idx]?,
            taxon: self.taxon[idx].clone()?,
            age: self.age[idx].clone()?,
            sex: self.sex[idx].clone()?,
            element: self.element[idx].clone()?,
        })
    }

    pub fn len(&self) -> usize {
        self.transect.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transect.is_empty()
    }
}

impl PivotTable {
    /// Build the pivot form from either input shape, dropping incomplete rows
    pub fn build(df: &DataFrame, shape: &InputShape, keys: &KeyColumns) -> Result<Self> {
        match shape {
            InputShape::Raw { side_column } => {
                let sides = string_values(df, side_column)?;
                Ok(Self::from_raw(keys, &sides))
            }
            InputShape::Pivoted { side_columns } => {
                let counts = side_columns
                    .iter()
                    .map(|name| float_values(df, name))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::from_pivoted(keys, side_columns.clone(), &counts))
            }
        }
    }

    /// Count occurrences of each side value per key
    ///
    /// Side columns come out sorted. Rows with a null side add no count, so
    /// a key seen only with null sides produces no pivot row.
    pub fn from_raw(keys: &KeyColumns, sides: &[Option<String>]) -> Self {
        let complete: Vec<(SpecimenKey, &str)> = (0..keys.len())
            .filter_map(|idx| Some((keys.key(idx)?, sides[idx].as_deref()?)))
            .collect();

        let side_columns: Vec<String> = complete
            .iter()
            .map(|(_, side)| side.to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let side_index: FxHashMap<&str, usize> = side_columns
            .iter()
            .enumerate()
            .map(|(i, side)| (side.as_str(), i))
            .collect();

        let mut grouped: BTreeMap<SpecimenKey, SideCounts> = BTreeMap::new();
        for (key, side) in complete {
            let counts = grouped
                .entry(key)
                .or_insert_with(|| smallvec![Some(0.0); side_columns.len()]);
            if let Some(count) = counts[side_index[side]].as_mut() {
                *count += 1.0;
            }
        }

        let rows = grouped
            .into_iter()
            .map(|(key, counts)| PivotRow { key, counts })
            .collect();

        Self { side_columns, rows }
    }

    /// Keep complete rows of an already-pivoted table as they are
    ///
    /// `counts[c][idx]` is the value of side column `c` on row `idx`.
    pub fn from_pivoted(keys: &KeyColumns, side_columns: Vec<String>, counts: &[Vec<Option<f64>>]) -> Self {
        let rows = (0..keys.len())
            .filter_map(|idx| {
                let key = keys.key(idx)?;
                let counts = counts.iter().map(|column| column[idx]).collect();
                Some(PivotRow { key, counts })
            })
            .collect();

        Self { side_columns, rows }
    }

    /// Substitute the default element for blank element names
    pub fn normalize_elements(&mut self, default_element: &str) {
        for row in &mut self.rows {
            if row.key.element.trim().is_empty() {
                row.key.element = normalize_element_name(&row.key.element, default_element);
            }
        }
    }

    /// Render as a pivoted frame that `calculate` accepts back unchanged
    pub fn to_frame(&self, columns: &MniColumns) -> Result<DataFrame> {
        let mut frame_columns: Vec<Column> = vec![
            Column::new(
                columns.transect.as_str().into(),
                self.rows.iter().map(|r| Some(r.key.transect)).collect::<Vec<Option<i64>>>(),
            ),
            Column::new(
                columns.taxon.as_str().into(),
                self.rows.iter().map(|r| r.key.taxon.as_str()).collect::<Vec<&str>>(),
            ),
            Column::new(
                columns.age.as_str().into(),
                self.rows.iter().map(|r| r.key.age.as_str()).collect::<Vec<&str>>(),
            ),
            Column::new(
                columns.sex.as_str().into(),
                self.rows.iter().map(|r| r.key.sex.as_str()).collect::<Vec<&str>>(),
            ),
            Column::new(
                columns.element.as_str().into(),
                self.rows.iter().map(|r| r.key.element.as_str()).collect::<Vec<&str>>(),
            ),
        ];

        for (i, side) in self.side_columns.iter().enumerate() {
            frame_columns.push(Column::new(
                side.as_str().into(),
                self.rows.iter().map(|r| r.counts[i]).collect::<Vec<Option<f64>>>(),
            ));
        }

        Ok(DataFrame::new(frame_columns)?)
    }
}
