//! Pairwise relationships: correlation, outlier and trend detection
//!
//! Numeric degeneracy is absorbed, never propagated: a zero denominator in
//! Pearson's formula yields 0, undersized inputs yield neutral defaults (no
//! outliers, stable trend).

use crate::analysis::profiler::nearest_rank;
use serde::{Deserialize, Serialize};

/// Pearson product-moment correlation, computed from running sums.
///
/// Returns 0 when either input is empty, lengths mismatch, or the denominator
/// is exactly zero (constant column).
pub fn correlation(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len();
    if n == 0 || n != y.len() {
        return 0.0;
    }

    let n_f = n as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx, mut sum_yy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        sum_x += xi;
        sum_y += yi;
        sum_xy += xi * yi;
        sum_xx += xi * xi;
        sum_yy += yi * yi;
    }

    let denominator =
        ((n_f * sum_xx - sum_x * sum_x) * (n_f * sum_yy - sum_y * sum_y)).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }
    (n_f * sum_xy - sum_x * sum_y) / denominator
}

/// Keeps only the index positions where both columns hold finite numbers.
pub(crate) fn paired_finite(x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut px = Vec::new();
    let mut py = Vec::new();
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        if xi.is_finite() && yi.is_finite() {
            px.push(xi);
            py.push(yi);
        }
    }
    (px, py)
}

/// Builds the symmetric n x n correlation matrix over aligned numeric columns.
///
/// The diagonal is always exactly 1. Rows where either value of a pair is
/// non-finite are excluded from that pair's computation only, not from the
/// whole dataset.
pub fn correlation_matrix(columns: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = columns.len();
    let mut matrix = vec![vec![0.0; n]; n];

    for i in 0..n {
        matrix[i][i] = 1.0;
        for j in (i + 1)..n {
            let (px, py) = paired_finite(&columns[i], &columns[j]);
            let r = correlation(&px, &py);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }

    matrix
}

/// IQR outlier report: fence bounds plus the offending row positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    pub count: usize,
    /// Positions into the input sequence, in row order.
    pub indices: Vec<usize>,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl OutlierReport {
    fn none() -> Self {
        Self {
            count: 0,
            indices: Vec::new(),
            lower_bound: f64::NEG_INFINITY,
            upper_bound: f64::INFINITY,
        }
    }
}

/// IQR fences at `Q1 - 1.5*IQR` and `Q3 + 1.5*IQR`, quartiles by nearest-rank
/// indexing. Fewer than 4 values reports zero outliers.
pub fn detect_outliers(values: &[f64]) -> OutlierReport {
    if values.len() < 4 {
        return OutlierReport::none();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let q1 = nearest_rank(&sorted, 0.25);
    let q3 = nearest_rank(&sorted, 0.75);
    let iqr = q3 - q1;
    let lower_bound = q1 - 1.5 * iqr;
    let upper_bound = q3 + 1.5 * iqr;

    let indices: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, &v)| v < lower_bound || v > upper_bound)
        .map(|(i, _)| i)
        .collect();

    OutlierReport {
        count: indices.len(),
        indices,
        lower_bound,
        upper_bound,
    }
}

/// Direction of a sequence over its full length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

/// Share of adjacent steps that must move one way to call a direction.
const TREND_THRESHOLD: f64 = 0.6;

/// Counts strictly increasing vs strictly decreasing adjacent steps across the
/// full sequence. A direction wins only if its count exceeds 60% of `n - 1`
/// steps. Fewer than 3 values is always stable.
pub fn detect_trend(values: &[f64]) -> Trend {
    if values.len() < 3 {
        return Trend::Stable;
    }

    let mut increasing = 0usize;
    let mut decreasing = 0usize;
    for pair in values.windows(2) {
        if pair[1] > pair[0] {
            increasing += 1;
        } else if pair[1] < pair[0] {
            decreasing += 1;
        }
    }

    let steps = (values.len() - 1) as f64;
    if increasing as f64 > steps * TREND_THRESHOLD {
        Trend::Increasing
    } else if decreasing as f64 > steps * TREND_THRESHOLD {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}
