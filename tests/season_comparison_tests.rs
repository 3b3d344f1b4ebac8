//! Season Comparison Integration Tests
//!
//! Consecutive-season Welch comparisons over small survey tables.

use approx::assert_relative_eq;
use polars::prelude::*;

use transect_mni::{compare_consecutive_seasons, compare_seasons, MniError, SeasonComparisonOptions};

fn options() -> SeasonComparisonOptions {
    SeasonComparisonOptions::default()
}

#[test]
fn two_seasons_one_row() {
    let df = df![
        "Year" => &[2018i64, 2018, 2018, 2019, 2019, 2019],
        "Pre: Distance spotted" => &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
    ].unwrap();

    let rows = compare_seasons(&df, &options()).unwrap();

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!((row.season_a, row.season_b), (2018, 2019));
    assert_relative_eq!(row.mean_a, 2.0);
    assert_relative_eq!(row.mean_b, 5.0);
    assert_relative_eq!(row.t_stat, 3.6742, epsilon = 1e-9);
    assert_relative_eq!(row.p_value, 0.0213, epsilon = 1e-9);
    assert!(row.significant);
}

#[test]
fn empty_season_skips_both_neighbouring_pairs() {
    let df = df![
        "Year" => &[2019i64, 2019, 2020, 2021, 2021, 2022, 2022],
        "Pre: Distance spotted" => &[Some(10.0), Some(12.0), None, Some(8.0), Some(9.0), Some(20.0), Some(22.0)],
    ].unwrap();

    let rows = compare_seasons(&df, &options()).unwrap();

    // 2019-2020 and 2020-2021 both touch the empty season
    assert_eq!(rows.len(), 1);
    assert_eq!((rows[0].season_a, rows[0].season_b), (2021, 2022));
}

#[test]
fn three_seasons_with_empty_middle_yield_nothing() {
    let df = df![
        "Year" => &[2019i64, 2019, 2020, 2021, 2021],
        "Pre: Distance spotted" => &[Some(1.0), Some(2.0), None, Some(3.0), Some(4.0)],
    ].unwrap();

    let out = compare_consecutive_seasons(&df, &options()).unwrap();

    assert_eq!(out.height(), 0);
    assert_eq!(out.width(), 7);
}

#[test]
fn seasons_sorted_and_text_years_coerced() {
    let df = df![
        "season" => &["2021", "2019", "2021", "2019", "n/a"],
        "depth" => &[5.0, 1.0, 7.0, 3.0, 100.0],
    ].unwrap();
    let options = SeasonComparisonOptions {
        season_col: "season".into(),
        value_col: "depth".into(),
        alpha: 0.01,
    };

    let out = compare_consecutive_seasons(&df, &options).unwrap();

    assert_eq!(out.height(), 1);
    assert_eq!(out.column("Field Season A").unwrap().i64().unwrap().get(0), Some(2019));
    assert_eq!(out.column("Field Season B").unwrap().i64().unwrap().get(0), Some(2021));
    assert_eq!(out.column("Mean B").unwrap().f64().unwrap().get(0), Some(6.0));
    assert!(out.column("Significant (p<0.01)").is_ok());
}

#[test]
fn single_value_group_passes_nan_through() {
    let df = df![
        "Year" => &[2018i64, 2019, 2019],
        "Pre: Distance spotted" => &[1.0, 4.0, 5.0],
    ].unwrap();

    let rows = compare_seasons(&df, &options()).unwrap();

    assert_eq!(rows.len(), 1);
    assert!(rows[0].t_stat.is_nan());
    assert!(rows[0].p_value.is_nan());
    assert!(!rows[0].significant);
}

#[test]
fn missing_value_column() {
    let df = df!["Year" => &[2018i64]].unwrap();

    let err = compare_seasons(&df, &options()).unwrap_err();

    assert!(matches!(err, MniError::MissingColumn { .. }));
    assert_eq!(err.missing().unwrap(), &["Pre: Distance spotted"]);
}

#[test]
fn constant_seasons_with_different_means_are_significant() {
    let df = df![
        "Year" => &[2018i64, 2018, 2019, 2019],
        "Pre: Distance spotted" => &[1.0, 1.0, 2.0, 2.0],
    ].unwrap();

    let rows = compare_seasons(&df, &options()).unwrap();

    assert_eq!(rows.len(), 1);
    assert!(rows[0].t_stat.is_infinite() && rows[0].t_stat > 0.0);
    assert_eq!(rows[0].p_value, 0.0);
    assert!(rows[0].significant);
}
