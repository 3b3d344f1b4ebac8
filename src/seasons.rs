//! Consecutive field-season comparison
//!
//! Welch's two-sample t-test between each pair of adjacent seasons.
//! Pairs where either season has no values are skipped with a warning.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::collections::BTreeMap;

use crate::config::SeasonComparisonOptions;
use crate::error::Result;
use crate::utils::{coerce_integer_ids, float_values, require_columns, round_to};

const DECIMALS: i32 = 4;

/// Comparison between two adjacent field seasons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonComparison {
    pub season_a: i64,
    pub season_b: i64,
    pub mean_a: f64,
    pub mean_b: f64,
    pub t_stat: f64,
    pub p_value: f64,
    pub significant: bool,
}

/// Welch's t-test result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WelchTest {
    pub t_stat: f64,
    pub p_value: f64,
    pub degrees_of_freedom: f64,
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (n - 1 denominator); NaN for fewer than two values
fn sample_variance(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64
}

/// Two-sided Welch's t-test of `first` against `second`
///
/// t = (mean1 - mean2) / sqrt(v1/n1 + v2/n2), degrees of freedom from the
/// Welch–Satterthwaite equation. A group of one, or equal means with zero
/// variance in both groups, gives NaN rather than an error. Zero variance
/// with different means gives an infinite t; df is then taken as 1 and
/// p is 0.
pub fn welch_t_test(first: &[f64], second: &[f64]) -> WelchTest {
    let (n1, n2) = (first.len() as f64, second.len() as f64);
    let se1 = sample_variance(first) / n1;
    let se2 = sample_variance(second) / n2;
    let se = se1 + se2;

    let t_stat = (mean(first) - mean(second)) / se.sqrt();
    let mut degrees_of_freedom = se.powi(2) / (se1.powi(2) / (n1 - 1.0) + se2.powi(2) / (n2 - 1.0));
    if degrees_of_freedom.is_nan() && se == 0.0 {
        degrees_of_freedom = 1.0;
    }

    let p_value = if t_stat.is_nan() || !(degrees_of_freedom > 0.0) {
        f64::NAN
    } else if t_stat.is_infinite() {
        0.0
    } else {
        match StudentsT::new(0.0, 1.0, degrees_of_freedom) {
            Ok(dist) => (2.0 * dist.cdf(-t_stat.abs())).min(1.0),
            Err(_) => f64::NAN,
        }
    };

    WelchTest { t_stat, p_value, degrees_of_freedom }
}

/// Compare every pair of adjacent seasons
///
/// Seasons are the distinct non-null values of the season column, coerced
/// to integers and sorted. The later season is the first t-test operand, so
/// a positive t means the later season's mean is higher.
pub fn compare_seasons(df: &DataFrame, options: &SeasonComparisonOptions) -> Result<Vec<SeasonComparison>> {
    require_columns(df, &[options.season_col.as_str(), options.value_col.as_str()])?;

    let seasons = coerce_integer_ids(df.column(&options.season_col)?)?;
    let values = float_values(df, &options.value_col)?;

    // Every season present gets an entry, even if all its values are null
    let mut groups: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for (season, value) in seasons.into_iter().zip(values) {
        let Some(season) = season else { continue };
        let group = groups.entry(season).or_default();
        if let Some(v) = value.filter(|v| !v.is_nan()) {
            group.push(v);
        }
    }

    let ordered: Vec<(i64, Vec<f64>)> = groups.into_iter().collect();
    let mut results = Vec::new();

    for pair in ordered.windows(2) {
        let (season_a, group_a) = (&pair[0].0, &pair[0].1);
        let (season_b, group_b) = (&pair[1].0, &pair[1].1);

        if group_a.is_empty() || group_b.is_empty() {
            tracing::warn!(
                "Skipping comparison {} vs {} due to missing data",
                season_a,
                season_b
            );
            continue;
        }

        let test = welch_t_test(group_b, group_a);
        results.push(SeasonComparison {
            season_a: *season_a,
            season_b: *season_b,
            mean_a: round_to(mean(group_a), DECIMALS),
            mean_b: round_to(mean(group_b), DECIMALS),
            t_stat: round_to(test.t_stat, DECIMALS),
            p_value: round_to(test.p_value, DECIMALS),
            significant: test.p_value < options.alpha,
        });
    }

    Ok(results)
}

/// Compare adjacent seasons and return the comparison table
///
/// Columns: `Field Season A`, `Field Season B`, `Mean A`, `Mean B`,
/// `T-stat`, `p-value`, `Significant (p<alpha)`.
pub fn compare_consecutive_seasons(df: &DataFrame, options: &SeasonComparisonOptions) -> Result<DataFrame> {
    let results = compare_seasons(df, options)?;
    comparison_frame(&results, options.alpha)
}

pub fn comparison_frame(results: &[SeasonComparison], alpha: f64) -> Result<DataFrame> {
    let significant_col = format!("Significant (p<{})", alpha);

    Ok(DataFrame::new(vec![
        Column::new("Field Season A".into(), results.iter().map(|r| r.season_a).collect::<Vec<i64>>()),
        Column::new("Field Season B".into(), results.iter().map(|r| r.season_b).collect::<Vec<i64>>()),
        Column::new("Mean A".into(), results.iter().map(|r| r.mean_a).collect::<Vec<f64>>()),
        Column::new("Mean B".into(), results.iter().map(|r| r.mean_b).collect::<Vec<f64>>()),
        Column::new("T-stat".into(), results.iter().map(|r| r.t_stat).collect::<Vec<f64>>()),
        Column::new("p-value".into(), results.iter().map(|r| r.p_value).collect::<Vec<f64>>()),
        Column::new(significant_col.as_str().into(), results.iter().map(|r| r.significant).collect::<Vec<bool>>()),
    ])?)
}
