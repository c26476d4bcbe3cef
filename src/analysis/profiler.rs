//! Column profiling: type inference and descriptive statistics
//!
//! Both entry points are pure functions of their input values. Type inference
//! looks at a bounded sample (first 100 values, missing skipped) and takes a
//! majority vote; statistics tolerate dirty data, since missing values are
//! expected input, not errors.

use crate::data::{CellValue, ColumnStats, ColumnType};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// Sample size cap for type inference.
const TYPE_SAMPLE_SIZE: usize = 100;
/// Fraction of sampled values that must match for a type to win.
const TYPE_VOTE_THRESHOLD: f64 = 0.8;

/// Date layouts accepted by the date-type vote.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

fn is_boolean_like(value: &CellValue) -> bool {
    match value {
        CellValue::Bool(_) => true,
        CellValue::Text(s) => {
            let t = s.trim();
            t.eq_ignore_ascii_case("true") || t.eq_ignore_ascii_case("false")
        }
        _ => false,
    }
}

fn is_number_like(value: &CellValue) -> bool {
    match value {
        CellValue::Number(_) => true,
        CellValue::Text(s) => s.trim().parse::<f64>().is_ok(),
        _ => false,
    }
}

fn is_date_like(value: &CellValue) -> bool {
    match value {
        CellValue::Text(s) => {
            let t = s.trim();
            DATE_FORMATS
                .iter()
                .any(|fmt| NaiveDate::parse_from_str(t, fmt).is_ok())
        }
        _ => false,
    }
}

/// Infers the semantic type of a column from its raw values.
///
/// Samples at most the first 100 values, skipping missing ones, then checks
/// boolean, numeric and date matches in that priority order against the 80%
/// threshold. Falls back to [`ColumnType::Text`].
pub fn infer_type(values: &[CellValue]) -> ColumnType {
    let sample: Vec<&CellValue> = values
        .iter()
        .take(TYPE_SAMPLE_SIZE)
        .filter(|v| !v.is_missing())
        .collect();

    if sample.is_empty() {
        return ColumnType::Text;
    }
    let total = sample.len() as f64;

    let bool_count = sample.iter().filter(|v| is_boolean_like(v)).count();
    if bool_count as f64 / total > TYPE_VOTE_THRESHOLD {
        return ColumnType::Boolean;
    }

    let number_count = sample.iter().filter(|v| is_number_like(v)).count();
    if number_count as f64 / total > TYPE_VOTE_THRESHOLD {
        return ColumnType::Number;
    }

    let date_count = sample.iter().filter(|v| is_date_like(v)).count();
    if date_count as f64 / total > TYPE_VOTE_THRESHOLD {
        return ColumnType::Date;
    }

    ColumnType::Text
}

/// Nearest-rank quantile on an ascending-sorted slice: index `floor(n * p)`.
///
/// This deliberately does not interpolate between ranks; downstream outputs
/// depend on this exact indexing.
pub(crate) fn nearest_rank(sorted: &[f64], p: f64) -> f64 {
    let idx = ((sorted.len() as f64 * p).floor() as usize).min(sorted.len() - 1);
    sorted[idx]
}

/// Most frequent value, ties broken by first occurrence.
fn mode(values: &[CellValue]) -> Option<CellValue> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    // (key, first instance) pairs in first-seen order for the stable tie-break
    let mut order: Vec<(String, CellValue)> = Vec::new();

    for value in values.iter().filter(|v| !v.is_missing()) {
        let key = value.display_key();
        let entry = counts.entry(key.clone()).or_insert(0);
        if *entry == 0 {
            order.push((key, value.clone()));
        }
        *entry += 1;
    }

    let mut best: Option<(&CellValue, usize)> = None;
    for (key, value) in &order {
        let count = counts[key];
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(v, _)| v.clone())
}

/// Computes the descriptive statistics snapshot for one column.
///
/// The numeric block (min/max/mean/median/std/quartiles) is populated only for
/// number columns with at least one valid value. `std_dev` is the population
/// standard deviation (divide by n, not n-1).
pub fn compute_stats(values: &[CellValue], column_type: ColumnType) -> ColumnStats {
    let count = values.len();
    let null_count = values.iter().filter(|v| v.is_missing()).count();

    let unique: HashSet<String> = values
        .iter()
        .filter(|v| !v.is_missing())
        .map(|v| v.display_key())
        .collect();

    let mut stats = ColumnStats::empty(count);
    stats.null_count = null_count;
    stats.unique_count = unique.len();
    stats.mode = mode(values);

    if column_type != ColumnType::Number {
        return stats;
    }

    let mut sorted: Vec<f64> = values.iter().filter_map(CellValue::as_finite_f64).collect();
    if sorted.is_empty() {
        return stats;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / n;
    let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    stats.min = Some(sorted[0]);
    stats.max = Some(sorted[sorted.len() - 1]);
    stats.mean = Some(mean);
    stats.median = Some(nearest_rank(&sorted, 0.5));
    stats.std_dev = Some(variance.sqrt());
    stats.quartiles = Some([
        nearest_rank(&sorted, 0.25),
        nearest_rank(&sorted, 0.5),
        nearest_rank(&sorted, 0.75),
    ]);

    stats
}
