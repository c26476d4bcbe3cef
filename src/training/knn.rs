//! K-nearest-neighbors trainer
//!
//! Lazy learner: no fitting, every test row scans the full training set and
//! takes a majority vote among the `k = min(5, n_train)` nearest rows by
//! Euclidean distance. Vote ties break toward the first-encountered label.

use super::metrics::{accuracy, majority_value, Progress, TrainingResult};
use crate::training::ModelType;
use ndarray::{Array1, Array2, ArrayView1};

const MAX_NEIGHBORS: usize = 5;

fn euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

pub(crate) fn train_knn(
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    x_test: &Array2<f64>,
    y_test: &Array1<f64>,
    _feature_names: &[String],
    progress: &mut Progress,
) -> TrainingResult {
    progress.emit(5.0);

    let n_train = x_train.nrows();
    let k = MAX_NEIGHBORS.min(n_train);
    let n_test = x_test.nrows();

    let mut predictions = Vec::with_capacity(n_test);
    for (t, test_row) in x_test.rows().into_iter().enumerate() {
        let mut distances: Vec<(f64, f64)> = x_train
            .rows()
            .into_iter()
            .zip(y_train.iter())
            .map(|(train_row, &label)| (euclidean(test_row, train_row), label))
            .collect();
        distances.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let neighbor_labels: Vec<f64> = distances.iter().take(k).map(|&(_, label)| label).collect();
        predictions.push(majority_value(&neighbor_labels));

        progress.emit(5.0 + 90.0 * (t + 1) as f64 / n_test.max(1) as f64);
    }
    let predictions = Array1::from_vec(predictions);

    let acc = accuracy(y_test, &predictions);
    let mut result = TrainingResult::new(ModelType::Knn);
    result.metrics.insert("accuracy".to_string(), acc);
    result.test_accuracy = Some(acc);
    result.predictions = predictions.to_vec();
    result.actual_values = Some(y_test.to_vec());

    progress.emit(100.0);
    result
}
