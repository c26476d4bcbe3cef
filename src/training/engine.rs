//! Training dispatcher
//!
//! Validates the configuration, carves the deterministic train/test split,
//! assembles the numeric design matrices and hands off to the model family's
//! trainer. All trainer randomness beyond the split itself flows through one
//! seeded `ChaCha8Rng` so a fixed seed reproduces the full run bit-for-bit.

use super::config::{validate_config, ModelConfig, ModelType};
use super::decision_tree::train_decision_tree;
use super::gradient_boosting::train_gradient_boosting;
use super::kmeans::train_kmeans;
use super::knn::train_knn;
use super::linear::{train_linear_regression, train_logistic_regression};
use super::metrics::{Progress, TrainingResult};
use super::naive_bayes::train_naive_bayes;
use super::neural_network::train_neural_network;
use super::random_forest::train_random_forest;
use super::split::train_test_split;
use super::svm::train_svm;
use super::xgboost::train_xgboost;
use crate::data::{CellValue, ColumnInfo, Record};
use crate::error::{DataPilotError, Result};
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

/// Builds the feature matrix for the given row indices, in partition order.
/// Missing cells and unparseable text coerce to NaN rather than erroring.
fn feature_matrix(records: &[Record], indices: &[usize], features: &[String]) -> Array2<f64> {
    let mut matrix = Array2::zeros((indices.len(), features.len()));
    for (r, &i) in indices.iter().enumerate() {
        for (c, feature) in features.iter().enumerate() {
            matrix[[r, c]] = records[i]
                .get(feature)
                .map(CellValue::coerce_f64)
                .unwrap_or(f64::NAN);
        }
    }
    matrix
}

fn target_vector(records: &[Record], indices: &[usize], target: &str) -> Array1<f64> {
    indices
        .iter()
        .map(|&i| {
            records[i]
                .get(target)
                .map(CellValue::coerce_f64)
                .unwrap_or(f64::NAN)
        })
        .collect()
}

/// Runs one full training pass: validate, split, train, stamp timing.
///
/// A failed validation short-circuits with [`DataPilotError::ValidationError`]
/// before any split or training work; advisory warnings never block.
pub fn train_model(
    records: &[Record],
    columns: &[ColumnInfo],
    config: &ModelConfig,
    progress_callback: Option<&mut dyn FnMut(f64)>,
) -> Result<TrainingResult> {
    let validation = validate_config(records, columns, config);
    if !validation.is_valid {
        return Err(DataPilotError::ValidationError(
            validation.errors.join("; "),
        ));
    }

    let seed = config
        .seed
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis() as u64);
    let (test_idx, train_idx) = train_test_split(records.len(), config.test_size, seed);
    tracing::info!(
        model = %config.model_type,
        train_rows = train_idx.len(),
        test_rows = test_idx.len(),
        seed,
        "starting training run"
    );

    let x_train = feature_matrix(records, &train_idx, &config.feature_columns);
    let x_test = feature_matrix(records, &test_idx, &config.feature_columns);
    let names = &config.feature_columns;

    let mut progress = Progress::new(progress_callback);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let started = Instant::now();

    let mut result = if config.model_type == ModelType::KMeans {
        train_kmeans(&x_train, &x_test, &mut progress)
    } else {
        let y_train = target_vector(records, &train_idx, &config.target_column);
        let y_test = target_vector(records, &test_idx, &config.target_column);
        match config.model_type {
            ModelType::LinearRegression => {
                train_linear_regression(&x_train, &y_train, &x_test, &y_test, names, &mut progress)
            }
            ModelType::LogisticRegression => {
                train_logistic_regression(&x_train, &y_train, &x_test, &y_test, names, &mut progress)
            }
            ModelType::DecisionTree => train_decision_tree(
                &x_train, &y_train, &x_test, &y_test, names, &mut rng, &mut progress,
            ),
            ModelType::RandomForest => train_random_forest(
                &x_train, &y_train, &x_test, &y_test, names, &mut rng, &mut progress,
            ),
            ModelType::GradientBoosting => {
                train_gradient_boosting(&x_train, &y_train, &x_test, &y_test, names, &mut progress)
            }
            ModelType::XGBoost => train_xgboost(
                &x_train, &y_train, &x_test, &y_test, names, &mut rng, &mut progress,
            ),
            ModelType::Svm => train_svm(&x_train, &y_train, &x_test, &y_test, names, &mut progress),
            ModelType::Knn => train_knn(&x_train, &y_train, &x_test, &y_test, names, &mut progress),
            ModelType::NaiveBayes => {
                train_naive_bayes(&x_train, &y_train, &x_test, &y_test, names, &mut progress)
            }
            ModelType::NeuralNetwork => train_neural_network(
                &x_train, &y_train, &x_test, &y_test, names, &mut rng, &mut progress,
            ),
            ModelType::KMeans => unreachable!("handled above"),
        }
    };

    result.train_time_ms = started.elapsed().as_secs_f64() * 1000.0;
    tracing::info!(
        model = %result.model_type,
        elapsed_ms = result.train_time_ms,
        "training run finished"
    );
    Ok(result)
}
