//! Rule-based insight generation
//!
//! Turns profiler and relationship outputs into an ordered sequence of
//! human-readable findings. Rules are evaluated independently in a fixed
//! order; each may emit zero or more insights, and nothing is deduplicated:
//! the same finding can legitimately appear for multiple columns.

use crate::analysis::relationships::{correlation, detect_outliers, detect_trend, paired_finite, Trend};
use crate::data::{ColumnInfo, ColumnStats, ColumnType, Record};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Category of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Correlation,
    Outlier,
    Trend,
    Summary,
}

/// How urgent a finding is for the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A single generated finding. Has no identity beyond its position in the
/// produced sequence; regenerated fresh on every analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Insight {
    fn new(
        kind: InsightKind,
        title: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
            severity,
        }
    }
}

/// Minimum share of outlying values before the finding escalates to high.
const OUTLIER_HIGH_PCT: f64 = 10.0;
/// Coefficient-of-variation fences for the variability rules.
const CV_EXTREME: f64 = 75.0;
const CV_LOW: f64 = 5.0;
/// Correlation fences for rule 7.
const CORR_CANDIDATE: f64 = 0.5;
const CORR_REPORT: f64 = 0.7;
const CORR_STRONG: f64 = 0.9;

/// Runs all insight rules over the dataset. Output order is generation order:
/// summary first, then the per-column rules in column order, then correlation
/// pairs sorted descending by |r|, then category findings.
pub fn generate_insights(
    records: &[Record],
    columns: &[ColumnInfo],
    stats: &HashMap<String, ColumnStats>,
) -> Vec<Insight> {
    let mut insights = Vec::new();
    let row_count = records.len();

    // Rule 1: overall data quality, always emitted.
    let total_cells = row_count * columns.len();
    let missing_cells: usize = columns
        .iter()
        .filter_map(|c| stats.get(&c.name))
        .map(|s| s.null_count)
        .sum();
    let quality = if total_cells > 0 {
        100.0 * (total_cells - missing_cells) as f64 / total_cells as f64
    } else {
        0.0
    };
    let severity = if quality <= 60.0 {
        Severity::High
    } else if quality <= 80.0 {
        Severity::Medium
    } else {
        Severity::Low
    };
    insights.push(Insight::new(
        InsightKind::Summary,
        format!("Data quality: {quality:.1}%"),
        format!(
            "{row_count} rows across {} columns with {missing_cells} missing cells ({quality:.1}% complete)",
            columns.len()
        ),
        severity,
    ));

    let numeric_columns: Vec<&ColumnInfo> = columns
        .iter()
        .filter(|c| c.column_type == ColumnType::Number)
        .collect();

    // Rule 2: per-column outliers.
    for column in &numeric_columns {
        let values = valid_numeric(records, &column.name);
        let report = detect_outliers(&values);
        if report.count > 0 {
            let pct = 100.0 * report.count as f64 / values.len() as f64;
            let severity = if pct > OUTLIER_HIGH_PCT {
                Severity::High
            } else {
                Severity::Medium
            };
            insights.push(Insight::new(
                InsightKind::Outlier,
                format!("Outliers in {}", column.name),
                format!(
                    "{} values ({pct:.1}%) fall outside the IQR fences [{:.2}, {:.2}]",
                    report.count, report.lower_bound, report.upper_bound
                ),
                severity,
            ));
        }
    }

    // Rule 3: per-column trend.
    for column in &numeric_columns {
        let values = valid_numeric(records, &column.name);
        let direction = match detect_trend(&values) {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Stable => continue,
        };
        insights.push(Insight::new(
            InsightKind::Trend,
            format!("Trend in {}", column.name),
            format!("Values in {} are mostly {direction} over the row order", column.name),
            Severity::Medium,
        ));
    }

    // Rule 4: coefficient of variation extremes (mutually exclusive per column).
    for column in &numeric_columns {
        let Some(column_stats) = stats.get(&column.name) else {
            continue;
        };
        let (Some(mean), Some(std_dev)) = (column_stats.mean, column_stats.std_dev) else {
            continue;
        };
        if mean == 0.0 {
            continue;
        }
        let cv = 100.0 * std_dev / mean;
        if cv > CV_EXTREME {
            insights.push(Insight::new(
                InsightKind::Summary,
                format!("Extreme variability in {}", column.name),
                format!("Coefficient of variation is {cv:.1}%, values are widely dispersed"),
                Severity::High,
            ));
        } else if cv < CV_LOW {
            insights.push(Insight::new(
                InsightKind::Summary,
                format!("Low variability in {}", column.name),
                format!("Coefficient of variation is {cv:.1}%, values are nearly constant"),
                Severity::Low,
            ));
        }
    }

    // Rule 5: heavy missingness, any column type.
    for column in columns {
        let Some(column_stats) = stats.get(&column.name) else {
            continue;
        };
        if row_count > 0 && column_stats.null_count as f64 > 0.2 * row_count as f64 {
            let pct = 100.0 * column_stats.null_count as f64 / row_count as f64;
            insights.push(Insight::new(
                InsightKind::Summary,
                format!("Missing data in {}", column.name),
                format!("{pct:.1}% of values in {} are missing", column.name),
                Severity::High,
            ));
        }
    }

    // Rule 6: all-distinct columns look like identifiers.
    for column in columns {
        let Some(column_stats) = stats.get(&column.name) else {
            continue;
        };
        if row_count > 0 && column_stats.unique_count == row_count {
            insights.push(Insight::new(
                InsightKind::Summary,
                format!("{} looks like an identifier", column.name),
                format!("Every value in {} is distinct", column.name),
                Severity::Low,
            ));
        }
    }

    // Rule 7: strong pairwise correlations, strongest first.
    if numeric_columns.len() >= 2 {
        let coerced: Vec<Vec<f64>> = numeric_columns
            .iter()
            .map(|c| coerced_numeric(records, &c.name))
            .collect();

        let mut pairs: Vec<(usize, usize, f64)> = Vec::new();
        for i in 0..numeric_columns.len() {
            for j in (i + 1)..numeric_columns.len() {
                let (x, y) = paired_finite(&coerced[i], &coerced[j]);
                if x.len() < 3 {
                    continue;
                }
                let r = correlation(&x, &y);
                if r.abs() > CORR_CANDIDATE {
                    pairs.push((i, j, r));
                }
            }
        }
        pairs.sort_by(|a, b| {
            b.2.abs()
                .partial_cmp(&a.2.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        for (i, j, r) in pairs {
            if r.abs() <= CORR_REPORT {
                continue;
            }
            let severity = if r.abs() > CORR_STRONG {
                Severity::High
            } else {
                Severity::Medium
            };
            let direction = if r > 0.0 { "positive" } else { "negative" };
            insights.push(Insight::new(
                InsightKind::Correlation,
                format!(
                    "{} and {} are correlated",
                    numeric_columns[i].name, numeric_columns[j].name
                ),
                format!(
                    "Strong {direction} correlation (r = {r:.2}) between {} and {}",
                    numeric_columns[i].name, numeric_columns[j].name
                ),
                severity,
            ));
        }
    }

    // Rule 8: low-cardinality text columns.
    for column in columns {
        if column.column_type != ColumnType::Text {
            continue;
        }
        let Some(column_stats) = stats.get(&column.name) else {
            continue;
        };
        let unique = column_stats.unique_count;
        if unique > 0 && (unique as f64) < 0.05 * row_count as f64 {
            insights.push(Insight::new(
                InsightKind::Summary,
                format!("{} has few categories", column.name),
                format!("{} holds only {unique} distinct values, it may be categorical", column.name),
                Severity::Low,
            ));
        }
    }

    insights
}

/// Valid (finite) numeric values of a column in row order.
fn valid_numeric(records: &[Record], name: &str) -> Vec<f64> {
    crate::data::numeric_column_values(records, name)
}

/// Row-aligned numeric view with NaN holes, for pairwise filtering.
fn coerced_numeric(records: &[Record], name: &str) -> Vec<f64> {
    records
        .iter()
        .map(|r| {
            r.get(name)
                .map(|v| v.coerce_f64())
                .unwrap_or(f64::NAN)
        })
        .collect()
}
