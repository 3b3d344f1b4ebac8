//! Hierarchical MNI aggregation
//!
//! element MNI   = max over side counts (left=3, right=5 means at least 5)
//! group MNI     = max over elements within (transect, taxon, age, sex)
//! transect MNI  = sum over groups; distinct taxon/age/sex are distinct animals

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::pivot::PivotTable;

/// MNI for a single transect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransectMni {
    pub transect_id: i64,
    pub mni: f64,
}

/// Largest non-null count across sides; None when every side is null
pub fn element_mni(counts: &[Option<f64>]) -> Option<f64> {
    counts
        .iter()
        .flatten()
        .copied()
        .filter(|c| !c.is_nan())
        .reduce(f64::max)
}

/// Aggregate a corrected pivot table to one MNI per transect
///
/// Output is ordered by transect id. A transect whose groups have no
/// countable sides still appears, with MNI 0.
pub fn transect_mni(pivot: &PivotTable) -> Vec<TransectMni> {
    let mut group_max: FxHashMap<(i64, &str, &str, &str), Option<f64>> = FxHashMap::default();

    for row in &pivot.rows {
        let group = (
            row.key.transect,
            row.key.taxon.as_str(),
            row.key.age.as_str(),
            row.key.sex.as_str(),
        );
        let value = element_mni(&row.counts);
        let entry = group_max.entry(group).or_insert(None);
        *entry = match (*entry, value) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }

    let mut totals: BTreeMap<i64, f64> = BTreeMap::new();
    for ((transect, _, _, _), max) in group_max {
        *totals.entry(transect).or_insert(0.0) += max.unwrap_or(0.0);
    }

    totals
        .into_iter()
        .map(|(transect_id, mni)| TransectMni { transect_id, mni })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mni::pivot::{PivotRow, SpecimenKey};
    use smallvec::smallvec;

    fn row(transect: i64, taxon: &str, element: &str, left: f64, right: f64) -> PivotRow {
        PivotRow {
            key: SpecimenKey {
                transect,
                taxon: taxon.into(),
                age: "adult".into(),
                sex: "F".into(),
                element: element.into(),
            },
            counts: smallvec![Some(left), Some(right)],
        }
    }

    fn pivot(rows: Vec<PivotRow>) -> PivotTable {
        PivotTable { side_columns: vec!["L".into(), "R".into()], rows }
    }

    #[test]
    fn test_element_mni_is_max_of_sides() {
        assert_eq!(element_mni(&[Some(3.0), Some(5.0)]), Some(5.0));
        assert_eq!(element_mni(&[None, Some(2.0)]), Some(2.0));
        assert_eq!(element_mni(&[None, None]), None);
        assert_eq!(element_mni(&[]), None);
    }

    #[test]
    fn test_elements_in_group_take_max() {
        let table = pivot(vec![
            row(1, "Odocoileus", "femur", 3.0, 1.0),
            row(1, "Odocoileus", "tibia", 2.0, 5.0),
        ]);

        let result = transect_mni(&table);

        assert_eq!(result, vec![TransectMni { transect_id: 1, mni: 5.0 }]);
    }

    #[test]
    fn test_groups_in_transect_are_summed() {
        let table = pivot(vec![
            row(1, "Odocoileus", "femur", 5.0, 4.0),
            row(1, "Lepus", "skull", 2.0, 0.0),
            row(2, "Lepus", "skull", 1.0, 0.0),
        ]);

        let result = transect_mni(&table);

        assert_eq!(
            result,
            vec![
                TransectMni { transect_id: 1, mni: 7.0 },
                TransectMni { transect_id: 2, mni: 1.0 },
            ]
        );
    }

    #[test]
    fn test_transect_without_counts_reports_zero() {
        let mut table = pivot(vec![row(4, "Lepus", "skull", 0.0, 0.0)]);
        table.rows[0].counts = smallvec![None, None];

        let result = transect_mni(&table);

        assert_eq!(result, vec![TransectMni { transect_id: 4, mni: 0.0 }]);
    }
}
