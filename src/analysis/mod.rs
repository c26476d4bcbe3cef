//! Exploratory analysis over tabular records
//!
//! Three layers, leaves first:
//! - [`profiler`] - per-column type inference and descriptive statistics
//! - [`relationships`] - pairwise correlation, outlier and trend detection
//! - [`insights`] - rule engine turning the above into ranked findings

pub mod insights;
pub mod profiler;
pub mod relationships;

pub use insights::{generate_insights, Insight, InsightKind, Severity};
pub use profiler::{compute_stats, infer_type};
pub use relationships::{
    correlation, correlation_matrix, detect_outliers, detect_trend, OutlierReport, Trend,
};

use crate::data::{column_values, ColumnInfo, ColumnStats, ColumnType, Record};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Full analysis output for one dataset: inferred schema, per-column
/// statistics, the numeric correlation matrix and generated insights.
///
/// Plain structured value, serializable as an opaque document for whatever
/// persistence layer sits outside the crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetAnalysis {
    pub columns: Vec<ColumnInfo>,
    pub stats: HashMap<String, ColumnStats>,
    /// Names of the numeric columns, in the order used by `correlation`.
    pub numeric_columns: Vec<String>,
    pub correlation: Vec<Vec<f64>>,
    pub insights: Vec<Insight>,
}

/// Profiles every named column, builds the correlation matrix over the numeric
/// ones and runs the insight rules, in one pass.
///
/// `column_names` fixes the column order (records are unordered maps, so the
/// caller, typically the CSV ingestion boundary, supplies the header order).
pub fn analyze_dataset(records: &[Record], column_names: &[String]) -> DatasetAnalysis {
    let mut columns = Vec::with_capacity(column_names.len());
    let mut stats = HashMap::with_capacity(column_names.len());

    for name in column_names {
        let values = column_values(records, name);
        let column_type = infer_type(&values);
        let column_stats = compute_stats(&values, column_type);
        columns.push(ColumnInfo::new(
            name.clone(),
            column_type,
            column_stats.null_count > 0,
        ));
        stats.insert(name.clone(), column_stats);
    }

    let numeric_columns: Vec<String> = columns
        .iter()
        .filter(|c| c.column_type == ColumnType::Number)
        .map(|c| c.name.clone())
        .collect();

    let coerced: Vec<Vec<f64>> = numeric_columns
        .iter()
        .map(|name| {
            records
                .iter()
                .map(|r| r.get(name).map(|v| v.coerce_f64()).unwrap_or(f64::NAN))
                .collect()
        })
        .collect();
    let correlation = correlation_matrix(&coerced);

    let insights = generate_insights(records, &columns, &stats);

    DatasetAnalysis {
        columns,
        stats,
        numeric_columns,
        correlation,
        insights,
    }
}
