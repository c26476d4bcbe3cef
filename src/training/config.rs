//! Model configuration and pre-flight validation

use crate::data::{CellValue, ColumnInfo, ColumnType, Record};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// The eleven supported model families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelType {
    #[serde(rename = "linear_regression")]
    LinearRegression,
    #[serde(rename = "logistic_regression")]
    LogisticRegression,
    #[serde(rename = "decision_tree")]
    DecisionTree,
    #[serde(rename = "random_forest")]
    RandomForest,
    #[serde(rename = "gradient_boosting")]
    GradientBoosting,
    #[serde(rename = "xgboost")]
    XGBoost,
    #[serde(rename = "svm")]
    Svm,
    #[serde(rename = "knn")]
    Knn,
    #[serde(rename = "naive_bayes")]
    NaiveBayes,
    #[serde(rename = "neural_network")]
    NeuralNetwork,
    #[serde(rename = "kmeans")]
    KMeans,
}

impl ModelType {
    /// The external identifier for this model family.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::LinearRegression => "linear_regression",
            ModelType::LogisticRegression => "logistic_regression",
            ModelType::DecisionTree => "decision_tree",
            ModelType::RandomForest => "random_forest",
            ModelType::GradientBoosting => "gradient_boosting",
            ModelType::XGBoost => "xgboost",
            ModelType::Svm => "svm",
            ModelType::Knn => "knn",
            ModelType::NaiveBayes => "naive_bayes",
            ModelType::NeuralNetwork => "neural_network",
            ModelType::KMeans => "kmeans",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModelType {
    type Err = crate::error::DataPilotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear_regression" => Ok(ModelType::LinearRegression),
            "logistic_regression" => Ok(ModelType::LogisticRegression),
            "decision_tree" => Ok(ModelType::DecisionTree),
            "random_forest" => Ok(ModelType::RandomForest),
            "gradient_boosting" => Ok(ModelType::GradientBoosting),
            "xgboost" => Ok(ModelType::XGBoost),
            "svm" => Ok(ModelType::Svm),
            "knn" => Ok(ModelType::Knn),
            "naive_bayes" => Ok(ModelType::NaiveBayes),
            "neural_network" => Ok(ModelType::NeuralNetwork),
            "kmeans" => Ok(ModelType::KMeans),
            other => Err(crate::error::DataPilotError::ConfigError(format!(
                "unknown model type: {other}"
            ))),
        }
    }
}

/// Configuration for one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model_type: ModelType,
    /// Ignored for the clustering model.
    pub target_column: String,
    /// Non-empty ordered sequence of distinct column names excluding the target.
    pub feature_columns: Vec<String>,
    /// Fraction of rows held out for testing, in (0, 1).
    pub test_size: f64,
    /// Seed for the deterministic split and trainer randomness. `None` means
    /// wall-clock seeding (non-reproducible by design).
    pub seed: Option<u64>,
}

impl ModelConfig {
    pub fn new(model_type: ModelType, target_column: impl Into<String>) -> Self {
        Self {
            model_type,
            target_column: target_column.into(),
            feature_columns: Vec::new(),
            test_size: 0.2,
            seed: None,
        }
    }

    pub fn with_features(mut self, features: &[&str]) -> Self {
        self.feature_columns = features.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Outcome of pre-flight configuration checks.
///
/// `errors` are blocking: training must not start while any is present.
/// `warnings` and `suggestions` are advisory and accompany a valid result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Absolute minimum dataset size for any training run.
const MIN_TRAINING_ROWS: usize = 20;
/// Below this, a small-dataset warning is attached.
const SMALL_DATASET_ROWS: usize = 50;
/// Distinct text-target values beyond this trigger the cardinality warning.
const HIGH_CARDINALITY_TARGET: usize = 10;

/// Checks a [`ModelConfig`] against the dataset before any training work.
pub fn validate_config(
    records: &[Record],
    columns: &[ColumnInfo],
    config: &ModelConfig,
) -> ConfigValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut suggestions = Vec::new();

    let known: HashSet<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    let clustering = config.model_type == ModelType::KMeans;

    if config.feature_columns.is_empty() {
        errors.push("at least one feature column must be selected".to_string());
    }

    let mut seen = HashSet::new();
    for feature in &config.feature_columns {
        if !known.contains(feature.as_str()) {
            errors.push(format!("feature column not found: {feature}"));
        }
        if !seen.insert(feature.as_str()) {
            errors.push(format!("duplicate feature column: {feature}"));
        }
        if !clustering && feature == &config.target_column {
            errors.push(format!("target column {feature} cannot also be a feature"));
        }
    }

    if !clustering {
        if config.target_column.is_empty() {
            errors.push("a target column is required for this model".to_string());
        } else if !known.contains(config.target_column.as_str()) {
            errors.push(format!("target column not found: {}", config.target_column));
        }
    }

    if records.len() < MIN_TRAINING_ROWS {
        errors.push(format!(
            "dataset has {} rows, need at least {MIN_TRAINING_ROWS} for training",
            records.len()
        ));
    }

    if !(config.test_size > 0.0 && config.test_size < 1.0) {
        errors.push(format!(
            "test_size must be in (0, 1), got {}",
            config.test_size
        ));
    }

    if clustering {
        let numeric_features = config
            .feature_columns
            .iter()
            .filter(|f| {
                columns
                    .iter()
                    .any(|c| &c.name == *f && c.column_type == ColumnType::Number)
            })
            .count();
        if numeric_features < 2 {
            errors.push("kmeans needs at least 2 numeric feature columns".to_string());
        }
    }

    // Advisory checks: never block execution.
    if records.len() >= MIN_TRAINING_ROWS && records.len() < SMALL_DATASET_ROWS {
        warnings.push(format!(
            "small dataset ({} rows), metrics may be unstable",
            records.len()
        ));
    }
    if config.feature_columns.len() == 1 {
        warnings.push("only one feature column selected".to_string());
    }
    if config.test_size >= 0.5 && config.test_size < 1.0 {
        warnings.push(format!(
            "test_size {} holds out more data than it trains on",
            config.test_size
        ));
    }
    if !clustering {
        if let Some(target) = columns.iter().find(|c| c.name == config.target_column) {
            if target.column_type == ColumnType::Text {
                let distinct: HashSet<String> = records
                    .iter()
                    .filter_map(|r| r.get(&config.target_column))
                    .filter(|v| !v.is_missing())
                    .map(CellValue::display_key)
                    .collect();
                if distinct.len() > HIGH_CARDINALITY_TARGET {
                    warnings.push(format!(
                        "target column {} has {} distinct categories",
                        config.target_column,
                        distinct.len()
                    ));
                }
            }
        }
    }

    match config.model_type {
        ModelType::Knn if records.len() > 1000 => {
            suggestions.push("knn computes all pairwise distances, expect slow predictions on large datasets".to_string());
        }
        ModelType::Svm if records.len() > 5000 => {
            suggestions.push("svm runs 100 full passes over the data, consider sampling large datasets".to_string());
        }
        ModelType::NeuralNetwork if records.len() < 100 => {
            suggestions.push("neural networks usually need more rows to learn anything useful".to_string());
        }
        _ => {}
    }

    ConfigValidation {
        is_valid: errors.is_empty(),
        errors,
        warnings,
        suggestions,
    }
}
