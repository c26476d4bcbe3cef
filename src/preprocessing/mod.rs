//! Data preparation: imputation, outlier filtering, encoding, scaling
//!
//! Produces the clean numeric matrix consumed by training. Stage order is
//! fixed and load-bearing: missing-value resolution runs first so encoded
//! integers never represent "missing", and scaling runs last so it operates on
//! fully numeric, fully imputed data.

mod pipeline;

pub use pipeline::DataPreprocessor;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Numeric scaling applied as the final stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    None,
    MinMax,
    ZScore,
}

/// How missing cells are resolved before any other stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingStrategy {
    /// Drop every row containing a missing cell.
    Remove,
    /// Column mean for numeric columns, mode for the rest.
    Mean,
    /// Column median for numeric columns, mode for the rest.
    Median,
    /// Column mode for every column.
    Mode,
}

/// Four independent preprocessing choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessingConfig {
    pub normalization: Normalization,
    pub missing_strategy: MissingStrategy,
    pub encode_categories: bool,
    pub remove_outliers: bool,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            normalization: Normalization::None,
            missing_strategy: MissingStrategy::Mean,
            encode_categories: true,
            remove_outliers: false,
        }
    }
}

impl PreprocessingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn with_missing_strategy(mut self, strategy: MissingStrategy) -> Self {
        self.missing_strategy = strategy;
        self
    }

    pub fn with_encode_categories(mut self, encode: bool) -> Self {
        self.encode_categories = encode;
        self
    }

    pub fn with_remove_outliers(mut self, remove: bool) -> Self {
        self.remove_outliers = remove;
        self
    }
}

/// Fitted scaling parameters for one column, kept so the same transform could
/// be replayed on new data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnScaling {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
}

/// Output of the preprocessing pipeline: transformed records plus the derived
/// invariant artifacts (encoding tables, scaling parameters, rows dropped).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessedData {
    pub records: Vec<crate::data::Record>,
    /// Column -> category string -> integer code, codes in first-seen order.
    pub encodings: HashMap<String, HashMap<String, i64>>,
    pub scaling: HashMap<String, ColumnScaling>,
    pub removed_rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PreprocessingConfig::default();
        assert_eq!(config.normalization, Normalization::None);
        assert_eq!(config.missing_strategy, MissingStrategy::Mean);
        assert!(config.encode_categories);
        assert!(!config.remove_outliers);
    }

    #[test]
    fn test_builder_pattern() {
        let config = PreprocessingConfig::new()
            .with_normalization(Normalization::ZScore)
            .with_missing_strategy(MissingStrategy::Median)
            .with_remove_outliers(true);
        assert_eq!(config.normalization, Normalization::ZScore);
        assert_eq!(config.missing_strategy, MissingStrategy::Median);
        assert!(config.remove_outliers);
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = PreprocessingConfig::new().with_normalization(Normalization::MinMax);
        let json = serde_json::to_string(&config).unwrap();
        let back: PreprocessingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
