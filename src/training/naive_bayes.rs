//! Gaussian Naive Bayes trainer
//!
//! Per-class priors plus an independent Gaussian per (class, feature). The
//! variance is floored with +1e-10 before the square root, and the density
//! itself gets a 1e-10 additive smoothing before the log, so degenerate
//! (constant) features cannot produce -inf log-likelihoods.

use super::metrics::{classification_metrics, Progress, TrainingResult};
use crate::training::ModelType;
use ndarray::{Array1, Array2, ArrayView1};

const VARIANCE_FLOOR: f64 = 1e-10;
const DENSITY_SMOOTHING: f64 = 1e-10;

struct ClassModel {
    label: f64,
    log_prior: f64,
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl ClassModel {
    fn log_likelihood(&self, row: ArrayView1<f64>) -> f64 {
        let mut total = self.log_prior;
        for (i, &v) in row.iter().enumerate() {
            let mean = self.means[i];
            let std = self.stds[i];
            let z = (v - mean) / std;
            let density =
                (-0.5 * z * z).exp() / (std * (2.0 * std::f64::consts::PI).sqrt());
            total += (density + DENSITY_SMOOTHING).ln();
        }
        total
    }
}

fn fit_class(x: &Array2<f64>, indices: &[usize], label: f64, n_total: usize) -> ClassModel {
    let n = indices.len() as f64;
    let d = x.ncols();
    let mut means = vec![0.0; d];
    let mut stds = vec![0.0; d];

    for j in 0..d {
        let mean = indices.iter().map(|&i| x[[i, j]]).sum::<f64>() / n;
        let variance = indices
            .iter()
            .map(|&i| (x[[i, j]] - mean).powi(2))
            .sum::<f64>()
            / n;
        means[j] = mean;
        stds[j] = (variance + VARIANCE_FLOOR).sqrt();
    }

    ClassModel {
        label,
        log_prior: (n / n_total as f64).ln(),
        means,
        stds,
    }
}

pub(crate) fn train_naive_bayes(
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    x_test: &Array2<f64>,
    y_test: &Array1<f64>,
    _feature_names: &[String],
    progress: &mut Progress,
) -> TrainingResult {
    progress.emit(10.0);

    let n = x_train.nrows();

    // Class labels in first-seen order
    let mut classes: Vec<(f64, Vec<usize>)> = Vec::new();
    for (i, &y) in y_train.iter().enumerate() {
        match classes.iter_mut().find(|(label, _)| *label == y) {
            Some((_, idx)) => idx.push(i),
            None => classes.push((y, vec![i])),
        }
    }

    let models: Vec<ClassModel> = classes
        .iter()
        .map(|(label, indices)| fit_class(x_train, indices, *label, n))
        .collect();
    progress.emit(60.0);

    let predictions: Array1<f64> = x_test
        .rows()
        .into_iter()
        .map(|row| {
            let mut best = (f64::NEG_INFINITY, f64::NAN);
            for model in &models {
                let ll = model.log_likelihood(row);
                if ll > best.0 {
                    best = (ll, model.label);
                }
            }
            best.1
        })
        .collect();

    let mut result = TrainingResult::new(ModelType::NaiveBayes);
    result.metrics = classification_metrics(y_test, &predictions);
    result.test_accuracy = result.metrics.get("accuracy").copied();
    result.predictions = predictions.to_vec();
    result.actual_values = Some(y_test.to_vec());

    progress.emit(100.0);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separates_gaussian_classes() {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for i in 0..20 {
            let jitter = (i % 5) as f64 * 0.2 - 0.4;
            xs.push(0.0 + jitter);
            ys.push(0.0);
            xs.push(8.0 + jitter);
            ys.push(1.0);
        }
        let x = Array2::from_shape_vec((40, 1), xs).unwrap();
        let y = Array1::from_vec(ys);
        let names = vec!["a".to_string()];
        let mut progress = Progress::new(None);

        let result = train_naive_bayes(&x, &y, &x, &y, &names, &mut progress);
        assert_eq!(result.metrics["accuracy"], 1.0);
        assert!(result.metrics.contains_key("precision"));
        assert!(result.metrics.contains_key("recall"));
        assert!(result.metrics.contains_key("f1"));
    }

    #[test]
    fn test_constant_feature_does_not_blow_up() {
        // Zero variance per class; the floor keeps the density finite
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for _ in 0..10 {
            xs.extend([1.0, 5.0]);
            ys.push(0.0);
            xs.extend([1.0, 9.0]);
            ys.push(1.0);
        }
        let x = Array2::from_shape_vec((20, 2), xs).unwrap();
        let y = Array1::from_vec(ys);
        let names = vec!["const".to_string(), "signal".to_string()];
        let mut progress = Progress::new(None);

        let result = train_naive_bayes(&x, &y, &x, &y, &names, &mut progress);
        assert!(result.predictions.iter().all(|p| p.is_finite()));
        assert_eq!(result.metrics["accuracy"], 1.0);
    }

    #[test]
    fn test_prior_dominates_uninformative_features() {
        // All features identical; the larger class should win every row
        let x = Array2::from_elem((20, 1), 3.0);
        let mut ys = vec![1.0; 15];
        ys.extend(vec![0.0; 5]);
        let y = Array1::from_vec(ys);
        let names = vec!["a".to_string()];
        let mut progress = Progress::new(None);

        let result = train_naive_bayes(&x, &y, &x, &y, &names, &mut progress);
        assert!(result.predictions.iter().all(|&p| p == 1.0));
    }
}
