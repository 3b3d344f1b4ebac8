//! Taxon label reconstruction
//!
//! When the taxon column is missing or has gaps, labels are filled from the
//! alternate columns in configured order. Each alternate only fills rows
//! still empty after the previous ones; a label is never overwritten.

use polars::prelude::*;

use crate::config::MniColumns;
use crate::error::{MniError, Result};
use crate::utils::{has_column, string_values};

/// Taxon labels per input row, plus the alternates that were read
#[derive(Debug, Clone, PartialEq)]
pub struct TaxonLabels {
    pub labels: Vec<Option<String>>,
    pub alternates_used: Vec<String>,
    /// False when the taxon column itself was absent
    pub column_present: bool,
}

/// Fill null labels from each alternate in turn
pub fn fill_from_alternates<I>(mut labels: Vec<Option<String>>, alternates: I) -> Vec<Option<String>>
where
    I: IntoIterator<Item = Vec<Option<String>>>,
{
    for alternate in alternates {
        for (label, candidate) in labels.iter_mut().zip(alternate) {
            if label.is_none() {
                *label = candidate;
            }
        }
    }
    labels
}

/// Resolve taxon labels for every row of `df`
///
/// Fails with `MissingColumn` only when the taxon column is absent and none
/// of the alternates exist. Rows left null here are dropped later.
pub fn reconstruct_taxon(df: &DataFrame, columns: &MniColumns) -> Result<TaxonLabels> {
    let column_present = has_column(df, &columns.taxon);
    let labels = if column_present {
        string_values(df, &columns.taxon)?
    } else {
        vec![None; df.height()]
    };

    if column_present && labels.iter().all(Option::is_some) {
        return Ok(TaxonLabels { labels, alternates_used: Vec::new(), column_present });
    }

    let alternates_used: Vec<String> = columns
        .taxon_alternates
        .iter()
        .filter(|name| has_column(df, name))
        .cloned()
        .collect();

    if !column_present && alternates_used.is_empty() {
        let mut missing = vec![columns.taxon.clone()];
        missing.extend(columns.taxon_alternates.iter().cloned());
        return Err(MniError::missing_columns(missing));
    }

    let alternate_values = alternates_used
        .iter()
        .map(|name| string_values(df, name))
        .collect::<Result<Vec<_>>>()?;

    let labels = fill_from_alternates(labels, alternate_values);

    tracing::debug!(
        "Rebuilt taxon labels from {:?}; {} rows still unlabelled",
        alternates_used,
        labels.iter().filter(|l| l.is_none()).count()
    );

    Ok(TaxonLabels { labels, alternates_used, column_present })
}
