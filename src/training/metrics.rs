//! Training results, shared metric computations and progress reporting

use super::config::ModelType;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Immutable outcome of one training run, owned by the caller for display and
/// persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingResult {
    pub model_type: ModelType,
    /// Metric name to value; the key set depends on the model family.
    pub metrics: HashMap<String, f64>,
    /// Aligned with the test partition, in partition order.
    pub predictions: Vec<f64>,
    /// Same alignment as `predictions`, absent for clustering.
    pub actual_values: Option<Vec<f64>>,
    /// Keyed exactly by the configured feature columns; weights non-negative.
    pub feature_importance: Option<HashMap<String, f64>>,
    /// Stamped by the dispatcher from wall time, overriding the trainer.
    pub train_time_ms: f64,
    pub test_accuracy: Option<f64>,
    pub train_accuracy: Option<f64>,
}

impl TrainingResult {
    pub fn new(model_type: ModelType) -> Self {
        Self {
            model_type,
            metrics: HashMap::new(),
            predictions: Vec::new(),
            actual_values: None,
            feature_importance: None,
            train_time_ms: 0.0,
            test_accuracy: None,
            train_accuracy: None,
        }
    }
}

/// Cooperative progress sink. Invoked synchronously from inside training
/// loops; percentages are clamped to `[0, 100]` and forced non-decreasing, and
/// every trainer finishes with exactly 100.
pub struct Progress<'a> {
    callback: Option<&'a mut dyn FnMut(f64)>,
    last: f64,
}

impl<'a> Progress<'a> {
    pub fn new(callback: Option<&'a mut dyn FnMut(f64)>) -> Self {
        Self {
            callback,
            last: 0.0,
        }
    }

    pub fn emit(&mut self, pct: f64) {
        let pct = pct.clamp(0.0, 100.0).max(self.last);
        self.last = pct;
        if let Some(callback) = self.callback.as_mut() {
            callback(pct);
        }
    }
}

/// Exact-match accuracy with a half-unit tolerance, so 0/1, ±1 and rounded
/// continuous labels all compare sanely.
pub(crate) fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| (*t - *p).abs() < 0.5)
        .count();
    correct as f64 / y_true.len() as f64
}

/// Binary-oriented classification metrics. Class 1 (any value > 0.5) is the
/// positive class; multi-class inputs silently degrade to that convention.
pub(crate) fn classification_metrics(
    y_true: &Array1<f64>,
    y_pred: &Array1<f64>,
) -> HashMap<String, f64> {
    let mut metrics = HashMap::new();
    metrics.insert("accuracy".to_string(), accuracy(y_true, y_pred));

    let (mut tp, mut fp, mut fn_) = (0usize, 0usize, 0usize);
    for (t, p) in y_true.iter().zip(y_pred.iter()) {
        let t_pos = *t > 0.5;
        let p_pos = *p > 0.5;
        match (t_pos, p_pos) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (true, false) => fn_ += 1,
            (false, false) => {}
        }
    }

    let precision = if tp + fp > 0 {
        tp as f64 / (tp + fp) as f64
    } else {
        0.0
    };
    let recall = if tp + fn_ > 0 {
        tp as f64 / (tp + fn_) as f64
    } else {
        0.0
    };
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    metrics.insert("precision".to_string(), precision);
    metrics.insert("recall".to_string(), recall);
    metrics.insert("f1".to_string(), f1);
    metrics
}

/// Regression metrics: mse, rmse, r2. A zero total sum of squares yields
/// r2 = 0 rather than NaN.
pub(crate) fn regression_metrics(
    y_true: &Array1<f64>,
    y_pred: &Array1<f64>,
) -> HashMap<String, f64> {
    let mut metrics = HashMap::new();
    let n = y_true.len() as f64;
    if n == 0.0 {
        metrics.insert("mse".to_string(), 0.0);
        metrics.insert("rmse".to_string(), 0.0);
        metrics.insert("r2".to_string(), 0.0);
        return metrics;
    }

    let mse = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / n;
    let y_mean = y_true.sum() / n;
    let ss_tot: f64 = y_true.iter().map(|t| (t - y_mean).powi(2)).sum();
    let ss_res = mse * n;
    let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

    metrics.insert("mse".to_string(), mse);
    metrics.insert("rmse".to_string(), mse.sqrt());
    metrics.insert("r2".to_string(), r2);
    metrics
}

/// Number of distinct target values (exact float comparison after sorting).
pub(crate) fn distinct_count(y: &Array1<f64>) -> usize {
    let mut values: Vec<f64> = y.iter().copied().collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    values.dedup();
    values.len()
}

/// Distinct-value cutoff below which a target is treated as class labels.
pub(crate) const CLASSIFICATION_MAX_CLASSES: usize = 10;

/// Shared classification/regression switch for the tree ensembles and SVM.
pub(crate) fn is_classification(y: &Array1<f64>) -> bool {
    distinct_count(y) <= CLASSIFICATION_MAX_CLASSES
}

/// Placeholder feature-importance table: uniform noise per feature, drawn from
/// the injected generator. Kept deliberately: several model families report
/// this instead of a derived importance, and downstream consumers rely on the
/// shape, not the signal.
pub(crate) fn random_importance(
    feature_names: &[String],
    rng: &mut rand_chacha::ChaCha8Rng,
) -> HashMap<String, f64> {
    use rand::Rng;
    feature_names
        .iter()
        .map(|name| (name.clone(), rng.gen::<f64>()))
        .collect()
}

/// Majority value, first-encountered max wins.
pub(crate) fn majority_value(values: &[f64]) -> f64 {
    let mut counts: Vec<(f64, usize)> = Vec::new();
    for &v in values {
        match counts.iter_mut().find(|(label, _)| *label == v) {
            Some((_, c)) => *c += 1,
            None => counts.push((v, 1)),
        }
    }
    let mut best = (f64::NAN, 0usize);
    for &(label, count) in &counts {
        if count > best.1 {
            best = (label, count);
        }
    }
    best.0
}
