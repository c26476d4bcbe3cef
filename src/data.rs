//! Core data model: cell values, records, column metadata and statistics
//!
//! A dataset is an ordered `Vec<Record>` where each record maps column names to
//! scalar cells. Row order is the insertion order from ingestion; column order
//! comes from the caller-provided [`ColumnInfo`] list (records themselves are
//! unordered maps).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single scalar cell in a record.
///
/// Deserializes untagged, so JSON-ish documents (`null`, `true`, `3.5`, `"x"`)
/// map directly onto the variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Whether the cell counts as missing. Empty and whitespace-only strings
    /// count as missing everywhere missingness matters.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric coercion used at the training boundary: numbers pass through,
    /// booleans map to 0/1, parseable text parses, everything else becomes NaN.
    pub fn coerce_f64(&self) -> f64 {
        match self {
            CellValue::Number(v) => *v,
            CellValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            CellValue::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
            CellValue::Null => f64::NAN,
        }
    }

    /// Finite numeric view of a non-missing cell, `None` otherwise.
    pub fn as_finite_f64(&self) -> Option<f64> {
        if self.is_missing() {
            return None;
        }
        let v = self.coerce_f64();
        v.is_finite().then_some(v)
    }

    /// Canonical string key used for frequency counting and encoding tables.
    pub fn display_key(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Number(v) => {
                // Integral floats print without the trailing ".0" so that
                // 3.0 and "3" count as the same category.
                if v.fract() == 0.0 && v.is_finite() {
                    format!("{}", *v as i64)
                } else {
                    v.to_string()
                }
            }
            CellValue::Text(s) => s.trim().to_string(),
        }
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

/// A single row: column name to cell value.
pub type Record = HashMap<String, CellValue>;

/// Semantic column type inferred at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    Text,
    Date,
    Boolean,
}

/// Column metadata: name, inferred type, nullability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, column_type: ColumnType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable,
        }
    }
}

/// Read-only descriptive statistics snapshot for one column.
///
/// `count` is the total number of rows (so `null_count + valid = count`).
/// The numeric block is populated only for [`ColumnType::Number`] columns.
/// Quartiles use nearest-rank indexing (`floor(n * p)`) on the ascending-sorted
/// valid values; `std_dev` is the population standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub count: usize,
    pub null_count: usize,
    pub unique_count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
    /// `[Q1, Q2, Q3]`
    pub quartiles: Option<[f64; 3]>,
    /// Most frequent value, first-seen tie-break. Computed for all types.
    pub mode: Option<CellValue>,
}

impl ColumnStats {
    pub fn empty(count: usize) -> Self {
        Self {
            count,
            null_count: 0,
            unique_count: 0,
            min: None,
            max: None,
            mean: None,
            median: None,
            std_dev: None,
            quartiles: None,
            mode: None,
        }
    }
}

/// Extracts one column from the dataset, preserving row order. Absent keys
/// read as [`CellValue::Null`].
pub fn column_values(records: &[Record], name: &str) -> Vec<CellValue> {
    records
        .iter()
        .map(|r| r.get(name).cloned().unwrap_or(CellValue::Null))
        .collect()
}

/// Finite numeric values of a column, in row order, missing/non-numeric skipped.
pub fn numeric_column_values(records: &[Record], name: &str) -> Vec<f64> {
    records
        .iter()
        .filter_map(|r| r.get(name).and_then(CellValue::as_finite_f64))
        .collect()
}
