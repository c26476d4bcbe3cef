//! Linear support vector machine trainer
//!
//! Sub-gradient descent on hinge loss with L2 regularization. Class labels
//! are remapped to {-1, +1} for the margin computation and mapped back to
//! {0, 1} for the reported predictions. Continuous targets fall back to
//! running the same update loop on the raw values and reporting mse/rmse.

use super::metrics::{classification_metrics, is_classification, Progress, TrainingResult};
use crate::training::ModelType;
use ndarray::{Array1, Array2};

const LEARNING_RATE: f64 = 0.001;
const LAMBDA: f64 = 0.01;
const EPOCHS: usize = 100;

/// One pass of per-sample sub-gradient updates over the whole training set.
fn hinge_epoch(x: &Array2<f64>, y: &[f64], weights: &mut Array1<f64>, bias: &mut f64) {
    for (i, row) in x.rows().into_iter().enumerate() {
        let margin = y[i] * (row.dot(weights) + *bias);
        if margin < 1.0 {
            for (w, &v) in weights.iter_mut().zip(row.iter()) {
                *w -= LEARNING_RATE * (2.0 * LAMBDA * *w - y[i] * v);
            }
            *bias += LEARNING_RATE * y[i];
        } else {
            for w in weights.iter_mut() {
                *w -= LEARNING_RATE * 2.0 * LAMBDA * *w;
            }
        }
    }
}

pub(crate) fn train_svm(
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    x_test: &Array2<f64>,
    y_test: &Array1<f64>,
    _feature_names: &[String],
    progress: &mut Progress,
) -> TrainingResult {
    progress.emit(5.0);

    let classification = is_classification(y_train);
    let targets: Vec<f64> = if classification {
        y_train
            .iter()
            .map(|&y| if y > 0.0 { 1.0 } else { -1.0 })
            .collect()
    } else {
        y_train.iter().copied().collect()
    };

    let mut weights = Array1::<f64>::zeros(x_train.ncols());
    let mut bias = 0.0;
    for epoch in 0..EPOCHS {
        hinge_epoch(x_train, &targets, &mut weights, &mut bias);
        progress.emit(5.0 + 85.0 * (epoch + 1) as f64 / EPOCHS as f64);
    }

    let decision: Array1<f64> = x_test
        .rows()
        .into_iter()
        .map(|row| row.dot(&weights) + bias)
        .collect();

    let mut result = TrainingResult::new(ModelType::Svm);
    if classification {
        // Margin sign back to the original 0/1 label space
        let predictions = decision.mapv(|d| if d >= 0.0 { 1.0 } else { 0.0 });
        result.metrics = classification_metrics(y_test, &predictions);
        result.test_accuracy = result.metrics.get("accuracy").copied();
        result.predictions = predictions.to_vec();
    } else {
        let n = y_test.len() as f64;
        let mse = if n > 0.0 {
            y_test
                .iter()
                .zip(decision.iter())
                .map(|(t, p)| (t - p).powi(2))
                .sum::<f64>()
                / n
        } else {
            0.0
        };
        let rmse = mse.sqrt();
        result.metrics.insert("mse".to_string(), mse);
        result.metrics.insert("rmse".to_string(), rmse);
        result.test_accuracy = Some(1.0 / (1.0 + rmse));
        result.predictions = decision.to_vec();
    }
    result.actual_values = Some(y_test.to_vec());

    progress.emit(100.0);
    result
}
