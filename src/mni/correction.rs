//! Element count corrections
//!
//! Two rules, applied per pivot row:
//! - nonidentifiable bone fragments count as exactly one per side column
//! - elements listed in the reference table have each side count divided by
//!   the element's divisor and rounded up

use rustc_hash::FxHashMap;

use crate::data::ElementCountTable;
use crate::utils::element_key;

use super::pivot::PivotTable;

/// Lowercased element name → positive divisor
///
/// Later rows replace earlier rows for the same element. Zero, negative
/// and non-numeric counts are skipped.
pub fn divisor_map(table: &ElementCountTable) -> FxHashMap<String, f64> {
    let mut divisors = FxHashMap::default();

    for row in &table.rows {
        let (Some(element), Some(count)) = (row.element.as_deref(), row.count.as_deref()) else {
            continue;
        };
        match count.trim().parse::<f64>() {
            Ok(divisor) if divisor.is_finite() && divisor > 0.0 => {
                divisors.insert(element_key(element), divisor);
            }
            _ => {}
        }
    }

    divisors
}

#[derive(Debug, Clone)]
pub struct CountCorrection {
    nonidentifiable: String,
    divisors: FxHashMap<String, f64>,
}

impl CountCorrection {
    pub fn new(nonidentifiable_element: &str, table: &ElementCountTable) -> Self {
        Self {
            nonidentifiable: element_key(nonidentifiable_element),
            divisors: divisor_map(table),
        }
    }

    pub fn divisor(&self, element: &str) -> Option<f64> {
        self.divisors.get(&element_key(element)).copied()
    }

    /// Correct every row of `pivot` in place
    pub fn apply(&self, pivot: &mut PivotTable) {
        let mut capped = 0usize;
        let mut divided = 0usize;

        for row in &mut pivot.rows {
            let key = element_key(&row.key.element);

            if key == self.nonidentifiable {
                for count in row.counts.iter_mut() {
                    *count = Some(1.0);
                }
                capped += 1;
            } else if let Some(&divisor) = self.divisors.get(&key) {
                for count in row.counts.iter_mut() {
                    *count = count.map(|c| (c / divisor).ceil());
                }
                divided += 1;
            }
        }

        tracing::debug!(
            "Count correction: {} nonidentifiable rows capped, {} rows divided",
            capped,
            divided
        );
    }
}
