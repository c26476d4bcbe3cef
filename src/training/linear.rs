//! Linear and logistic regression via batch gradient descent
//!
//! Both operate on a bias-augmented design matrix (column of ones prepended)
//! with a fixed iteration count. No convergence check, no early exit.

use super::metrics::{classification_metrics, regression_metrics, Progress, TrainingResult};
use crate::training::ModelType;
use ndarray::{Array1, Array2};

const LINEAR_LEARNING_RATE: f64 = 0.01;
const LOGISTIC_LEARNING_RATE: f64 = 0.1;
const ITERATIONS: usize = 1000;

/// Prepends a column of ones so the bias term rides along in the weight vector.
fn augment(x: &Array2<f64>) -> Array2<f64> {
    let n = x.nrows();
    let mut design = Array2::ones((n, x.ncols() + 1));
    design
        .slice_mut(ndarray::s![.., 1..])
        .assign(x);
    design
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

pub(crate) fn train_linear_regression(
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    x_test: &Array2<f64>,
    y_test: &Array1<f64>,
    _feature_names: &[String],
    progress: &mut Progress,
) -> TrainingResult {
    progress.emit(5.0);

    let design = augment(x_train);
    let n = design.nrows() as f64;
    let mut weights = Array1::<f64>::zeros(design.ncols());

    for iteration in 0..ITERATIONS {
        let predictions = design.dot(&weights);
        let errors = &predictions - y_train;
        let gradient = design.t().dot(&errors) / n;
        weights = weights - gradient * LINEAR_LEARNING_RATE;

        if iteration % 100 == 0 {
            progress.emit(5.0 + 90.0 * iteration as f64 / ITERATIONS as f64);
        }
    }

    let predictions = augment(x_test).dot(&weights);
    let train_predictions = design.dot(&weights);

    let mut result = TrainingResult::new(ModelType::LinearRegression);
    result.metrics = regression_metrics(y_test, &predictions);
    result.test_accuracy = result.metrics.get("r2").copied();
    result.train_accuracy = regression_metrics(y_train, &train_predictions)
        .get("r2")
        .copied();
    result.predictions = predictions.to_vec();
    result.actual_values = Some(y_test.to_vec());

    progress.emit(100.0);
    result
}

pub(crate) fn train_logistic_regression(
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    x_test: &Array2<f64>,
    y_test: &Array1<f64>,
    _feature_names: &[String],
    progress: &mut Progress,
) -> TrainingResult {
    progress.emit(5.0);

    let design = augment(x_train);
    let n = design.nrows() as f64;
    let mut weights = Array1::<f64>::zeros(design.ncols());

    for iteration in 0..ITERATIONS {
        let probabilities = design.dot(&weights).mapv(sigmoid);
        let errors = &probabilities - y_train;
        let gradient = design.t().dot(&errors) / n;
        weights = weights - gradient * LOGISTIC_LEARNING_RATE;

        if iteration % 100 == 0 {
            progress.emit(5.0 + 90.0 * iteration as f64 / ITERATIONS as f64);
        }
    }

    let threshold = |p: f64| if p >= 0.5 { 1.0 } else { 0.0 };
    let predictions = augment(x_test).dot(&weights).mapv(sigmoid).mapv(threshold);
    let train_predictions = design.dot(&weights).mapv(sigmoid).mapv(threshold);

    let mut result = TrainingResult::new(ModelType::LogisticRegression);
    result.metrics = classification_metrics(y_test, &predictions);
    result.test_accuracy = result.metrics.get("accuracy").copied();
    result.train_accuracy = Some(super::metrics::accuracy(y_train, &train_predictions));
    result.predictions = predictions.to_vec();
    result.actual_values = Some(y_test.to_vec());

    progress.emit(100.0);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_linear(x: Array2<f64>, y: Array1<f64>, xt: Array2<f64>, yt: Array1<f64>) -> TrainingResult {
        let mut progress = Progress::new(None);
        train_linear_regression(&x, &y, &xt, &yt, &[], &mut progress)
    }

    #[test]
    fn test_linear_converges_on_noiseless_line() {
        // y = 2x + 3 over [-1, 1]; centered inputs keep the fixed-step descent fast
        let n = 40;
        let xs: Vec<f64> = (0..n).map(|i| -1.0 + 2.0 * i as f64 / (n - 1) as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 3.0).collect();
        let x = Array2::from_shape_vec((n, 1), xs.clone()).unwrap();
        let y = Array1::from_vec(ys.clone());

        let result = run_linear(x.clone(), y.clone(), x, y);
        assert!(result.metrics["r2"] > 0.98, "r2 = {}", result.metrics["r2"]);
        assert_eq!(result.test_accuracy, result.metrics.get("r2").copied());
    }

    #[test]
    fn test_linear_prediction_alignment() {
        let x = Array2::from_shape_vec((10, 1), (0..10).map(|v| v as f64 / 10.0).collect()).unwrap();
        let y = Array1::from_vec((0..10).map(|v| v as f64).collect());
        let xt = x.slice(ndarray::s![..4, ..]).to_owned();
        let yt = y.slice(ndarray::s![..4]).to_owned();
        let result = run_linear(x, y, xt, yt.clone());
        assert_eq!(result.predictions.len(), 4);
        assert_eq!(result.actual_values.as_ref().unwrap().len(), 4);
    }

    #[test]
    fn test_logistic_separates_classes() {
        // Two 1-D clusters around -1 and +1
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for i in 0..20 {
            let offset = (i % 5) as f64 * 0.05;
            xs.push(-1.0 - offset);
            ys.push(0.0);
            xs.push(1.0 + offset);
            ys.push(1.0);
        }
        let x = Array2::from_shape_vec((40, 1), xs).unwrap();
        let y = Array1::from_vec(ys);

        let mut progress = Progress::new(None);
        let result = train_logistic_regression(&x, &y, &x, &y, &[], &mut progress);
        assert!(result.metrics["accuracy"] > 0.95);
        assert!(result.metrics.contains_key("precision"));
        assert!(result.metrics.contains_key("recall"));
        assert!(result.metrics.contains_key("f1"));
    }

    #[test]
    fn test_progress_terminates_at_hundred() {
        let mut last = 0.0;
        {
            let mut record = |p: f64| last = p;
            let mut progress = Progress::new(Some(&mut record));
            let x = Array2::from_shape_vec((10, 1), (0..10).map(|v| v as f64 / 10.0).collect())
                .unwrap();
            let y = Array1::from_vec((0..10).map(|v| v as f64).collect());
            train_linear_regression(&x, &y, &x, &y, &[], &mut progress);
        }
        assert_eq!(last, 100.0);
    }
}
