//! Minimum Number of Individuals per transect
//!
//! Pipeline (each step runs once, in order):
//! 1. transect column must exist; ids coerced to nullable integers
//! 2. taxon labels rebuilt from alternates where missing
//! 3. input classified as raw or pivoted, required columns checked
//! 4. incomplete rows dropped, raw rows pivoted into side counts
//! 5. blank element names become the default element
//! 6. counts corrected (nonidentifiable cap, reference divisors)
//! 7. max per element, max per taxon/age/sex, sum per transect

pub mod aggregate;
pub mod correction;
pub mod input_shape;
pub mod pivot;
pub mod taxon;

pub use aggregate::{element_mni, transect_mni, TransectMni};
pub use correction::{divisor_map, CountCorrection};
pub use input_shape::InputShape;
pub use pivot::{PivotRow, PivotTable, SpecimenKey};
pub use taxon::{fill_from_alternates, reconstruct_taxon, TaxonLabels};

use polars::prelude::*;

use crate::config::MniColumns;
use crate::data::DivisorSource;
use crate::error::{MniError, Result};
use crate::utils::{coerce_integer_ids, has_column};

use self::pivot::KeyColumns;

/// Output column holding the MNI value
pub const MNI_COLUMN: &str = "MNI";

/// MNI aggregator bound to a column layout and a reference-data source
pub struct MniCalculator {
    columns: MniColumns,
    source: Box<dyn DivisorSource + Send + Sync>,
}

impl MniCalculator {
    pub fn new(columns: MniColumns, source: impl DivisorSource + Send + Sync + 'static) -> Self {
        Self { columns, source: Box::new(source) }
    }

    /// Default survey column names
    pub fn with_source(source: impl DivisorSource + Send + Sync + 'static) -> Self {
        Self::new(MniColumns::default(), source)
    }

    pub fn columns(&self) -> &MniColumns {
        &self.columns
    }

    /// Corrected pivot table, before any aggregation
    pub fn corrected_pivot_table(&self, df: &DataFrame) -> Result<PivotTable> {
        build_corrected_pivot(df, &self.columns, self.source.as_ref())
    }

    /// Corrected pivot as a frame; feeding it back in gives the same MNI
    /// provided no further reference divisors match
    pub fn corrected_pivot(&self, df: &DataFrame) -> Result<DataFrame> {
        self.corrected_pivot_table(df)?.to_frame(&self.columns)
    }

    pub fn calculate(&self, df: &DataFrame) -> Result<Vec<TransectMni>> {
        Ok(transect_mni(&self.corrected_pivot_table(df)?))
    }

    /// MNI per transect as a two-column frame
    pub fn calculate_frame(&self, df: &DataFrame) -> Result<DataFrame> {
        let results = self.calculate(df)?;
        mni_frame(&results, &self.columns.transect)
    }
}

/// Calculate MNI per transect using the default survey column names
pub fn calculate_mni(df: &DataFrame, source: &dyn DivisorSource) -> Result<DataFrame> {
    let columns = MniColumns::default();
    let pivot = build_corrected_pivot(df, &columns, source)?;
    mni_frame(&transect_mni(&pivot), &columns.transect)
}

/// Run the pipeline up to and including count correction
pub fn build_corrected_pivot(
    df: &DataFrame,
    columns: &MniColumns,
    source: &dyn DivisorSource,
) -> Result<PivotTable> {
    // ========================================================================
    // STEP 1: Transect presence comes before every other check
    // ========================================================================
    if !has_column(df, &columns.transect) {
        return Err(MniError::missing_columns([columns.transect.as_str()]));
    }
    let transect = coerce_integer_ids(df.column(&columns.transect)?)?;

    // ========================================================================
    // STEP 2: Taxon labels
    // ========================================================================
    let taxa = reconstruct_taxon(df, columns)?;

    // ========================================================================
    // STEP 3: Shape and required columns
    // ========================================================================
    let shape = InputShape::classify(df, columns);
    shape.require_columns(df, columns, !taxa.column_present)?;

    // ========================================================================
    // STEP 4: Drop incomplete rows, converge on pivot form
    // ========================================================================
    let keys = KeyColumns::read(df, columns, transect, taxa.labels)?;
    let mut pivot = PivotTable::build(df, &shape, &keys)?;

    tracing::debug!(
        "MNI input: {} rows ({}), {} pivot rows over sides {:?}",
        keys.len(),
        if shape.is_raw() { "raw" } else { "pivoted" },
        pivot.rows.len(),
        pivot.side_columns
    );

    // ========================================================================
    // STEP 5-6: Element names, then count correction
    // ========================================================================
    pivot.normalize_elements(&columns.default_element);

    if !pivot.side_columns.is_empty() {
        let table = source.load()?;
        CountCorrection::new(&columns.nonidentifiable_element, &table).apply(&mut pivot);
    }

    Ok(pivot)
}

/// Build the `transect id, MNI` output frame
pub fn mni_frame(results: &[TransectMni], transect_col: &str) -> Result<DataFrame> {
    let ids: Vec<Option<i64>> = results.iter().map(|r| Some(r.transect_id)).collect();
    let mni: Vec<f64> = results.iter().map(|r| r.mni).collect();

    Ok(DataFrame::new(vec![
        Column::new(transect_col.into(), ids),
        Column::new(MNI_COLUMN.into(), mni),
    ])?)
}
