//! Gradient boosting with decision stumps
//!
//! Sequential residual fitting: each round searches every feature and every
//! unique value of that feature for the stump maximizing
//! `|leftMean| * leftCount + |rightMean| * rightCount` over the current
//! residuals. Feature importance reports stump-usage frequency.

use super::metrics::{
    accuracy, is_classification, regression_metrics, Progress, TrainingResult,
};
use crate::training::ModelType;
use ndarray::{Array1, Array2};
use std::collections::HashMap;

const N_STUMPS: usize = 20;
const LEARNING_RATE: f64 = 0.1;

/// Depth-1 weak learner: one split, two residual means.
struct Stump {
    feature: usize,
    threshold: f64,
    left_value: f64,
    right_value: f64,
}

impl Stump {
    fn predict(&self, row: ndarray::ArrayView1<f64>) -> f64 {
        if row[self.feature] < self.threshold {
            self.left_value
        } else {
            self.right_value
        }
    }
}

/// Exhaustive search for the best stump against the residuals, or `None` when
/// no threshold produces a non-empty two-way split (constant features).
fn best_stump(x: &Array2<f64>, residuals: &[f64]) -> Option<Stump> {
    let n = x.nrows();
    let mut best: Option<(f64, Stump)> = None;

    for feature in 0..x.ncols() {
        let mut thresholds: Vec<f64> = (0..n).map(|i| x[[i, feature]]).collect();
        thresholds.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        thresholds.dedup();

        for &threshold in &thresholds {
            let mut left_sum = 0.0;
            let mut left_count = 0usize;
            let mut right_sum = 0.0;
            let mut right_count = 0usize;
            for i in 0..n {
                if x[[i, feature]] < threshold {
                    left_sum += residuals[i];
                    left_count += 1;
                } else {
                    right_sum += residuals[i];
                    right_count += 1;
                }
            }
            if left_count == 0 || right_count == 0 {
                continue;
            }

            let left_mean = left_sum / left_count as f64;
            let right_mean = right_sum / right_count as f64;
            let score = left_mean.abs() * left_count as f64 + right_mean.abs() * right_count as f64;

            if best.as_ref().map_or(true, |(s, _)| score > *s) {
                best = Some((
                    score,
                    Stump {
                        feature,
                        threshold,
                        left_value: left_mean,
                        right_value: right_mean,
                    },
                ));
            }
        }
    }

    best.map(|(_, stump)| stump)
}

pub(crate) fn train_gradient_boosting(
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    x_test: &Array2<f64>,
    y_test: &Array1<f64>,
    feature_names: &[String],
    progress: &mut Progress,
) -> TrainingResult {
    progress.emit(5.0);

    let classification = is_classification(y_train);
    let n = x_train.nrows();
    let base = y_train.sum() / n as f64;

    let mut fitted = vec![base; n];
    let mut stumps: Vec<Stump> = Vec::with_capacity(N_STUMPS);
    let mut usage: Vec<usize> = vec![0; x_train.ncols()];

    for round in 0..N_STUMPS {
        let residuals: Vec<f64> = y_train
            .iter()
            .zip(fitted.iter())
            .map(|(y, f)| y - f)
            .collect();

        let Some(stump) = best_stump(x_train, &residuals) else {
            break;
        };

        for (i, row) in x_train.rows().into_iter().enumerate() {
            fitted[i] += LEARNING_RATE * stump.predict(row);
        }
        usage[stump.feature] += 1;
        stumps.push(stump);

        progress.emit(5.0 + 85.0 * (round + 1) as f64 / N_STUMPS as f64);
    }

    let raw_predictions: Array1<f64> = x_test
        .rows()
        .into_iter()
        .map(|row| {
            base + stumps
                .iter()
                .map(|stump| LEARNING_RATE * stump.predict(row))
                .sum::<f64>()
        })
        .collect();

    let mut result = TrainingResult::new(ModelType::GradientBoosting);
    if classification {
        let predictions = raw_predictions.mapv(f64::round);
        let acc = accuracy(y_test, &predictions);
        result.metrics.insert("accuracy".to_string(), acc);
        result.test_accuracy = Some(acc);
        result.predictions = predictions.to_vec();
    } else {
        result.metrics = regression_metrics(y_test, &raw_predictions);
        result.test_accuracy = result.metrics.get("r2").copied();
        result.predictions = raw_predictions.to_vec();
    }
    result.actual_values = Some(y_test.to_vec());

    let total_used = stumps.len().max(1) as f64;
    let importance: HashMap<String, f64> = feature_names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), usage.get(i).copied().unwrap_or(0) as f64 / total_used))
        .collect();
    result.feature_importance = Some(importance);

    progress.emit(100.0);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits_step_function() {
        // Regression-style target with many distinct values
        let n = 40;
        let xs: Vec<f64> = (0..n).map(|v| v as f64).collect();
        let ys: Vec<f64> = xs
            .iter()
            .map(|&v| if v < 20.0 { v * 0.1 } else { 100.0 + v * 0.1 })
            .collect();
        let x = Array2::from_shape_vec((n, 1), xs).unwrap();
        let y = Array1::from_vec(ys);
        let names = vec!["a".to_string()];
        let mut progress = Progress::new(None);

        let result = train_gradient_boosting(&x, &y, &x, &y, &names, &mut progress);
        assert!(result.metrics["r2"] > 0.8, "{:?}", result.metrics);
    }

    #[test]
    fn test_usage_frequency_importance() {
        let n = 40;
        // Only the first feature carries signal; the second is constant
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for v in 0..n {
            xs.push(v as f64);
            xs.push(1.0);
            ys.push(if v < 20 { 0.0 } else { 50.0 });
        }
        let x = Array2::from_shape_vec((n, 2), xs).unwrap();
        let y = Array1::from_vec(ys);
        let names = vec!["signal".to_string(), "noise".to_string()];
        let mut progress = Progress::new(None);

        let result = train_gradient_boosting(&x, &y, &x, &y, &names, &mut progress);
        let importance = result.feature_importance.unwrap();
        assert!(importance["signal"] > importance["noise"]);
        assert!(importance.values().all(|&v| v >= 0.0));
    }

    #[test]
    fn test_classification_rounds_predictions() {
        let n = 40;
        let xs: Vec<f64> = (0..n).map(|v| v as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|&v| if v < 20.0 { 0.0 } else { 1.0 }).collect();
        let x = Array2::from_shape_vec((n, 1), xs).unwrap();
        let y = Array1::from_vec(ys);
        let names = vec!["a".to_string()];
        let mut progress = Progress::new(None);

        let result = train_gradient_boosting(&x, &y, &x, &y, &names, &mut progress);
        assert!(result.metrics["accuracy"] > 0.9);
        assert!(result
            .predictions
            .iter()
            .all(|p| p.fract() == 0.0));
    }
}
