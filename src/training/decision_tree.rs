//! Decision tree trainer
//!
//! This family is a deliberate stub: it predicts the training-set majority
//! class for every test row, and its feature importance is uniform noise.
//! Compatible output shape matters here, not tree building; the real tree
//! machinery lives in the ensemble trainers.

use super::metrics::{
    accuracy, is_classification, majority_value, random_importance, Progress, TrainingResult,
};
use crate::training::ModelType;
use ndarray::{Array1, Array2};
use rand_chacha::ChaCha8Rng;

pub(crate) fn train_decision_tree(
    _x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    x_test: &Array2<f64>,
    y_test: &Array1<f64>,
    feature_names: &[String],
    rng: &mut ChaCha8Rng,
    progress: &mut Progress,
) -> TrainingResult {
    progress.emit(10.0);

    let train_values: Vec<f64> = y_train.iter().copied().collect();
    let majority = majority_value(&train_values);
    let predictions = Array1::from_elem(x_test.nrows(), majority);
    progress.emit(60.0);

    let accuracy_value = if is_classification(y_train) {
        accuracy(y_test, &predictions)
    } else {
        // Continuous targets get the pseudo-accuracy transform 1 / (1 + mse)
        let n = y_test.len() as f64;
        let mse = if n > 0.0 {
            y_test
                .iter()
                .zip(predictions.iter())
                .map(|(t, p)| (t - p).powi(2))
                .sum::<f64>()
                / n
        } else {
            0.0
        };
        1.0 / (1.0 + mse)
    };

    let mut result = TrainingResult::new(ModelType::DecisionTree);
    result.metrics.insert("accuracy".to_string(), accuracy_value);
    result.test_accuracy = Some(accuracy_value);
    result.predictions = predictions.to_vec();
    result.actual_values = Some(y_test.to_vec());
    result.feature_importance = Some(random_importance(feature_names, rng));

    progress.emit(100.0);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_predicts_majority_class() {
        let x = Array2::zeros((10, 2));
        let y = Array1::from_vec(vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
        let xt = Array2::zeros((4, 2));
        let yt = Array1::from_vec(vec![1.0, 1.0, 0.0, 0.0]);
        let names = vec!["a".to_string(), "b".to_string()];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut progress = Progress::new(None);

        let result = train_decision_tree(&x, &y, &xt, &yt, &names, &mut rng, &mut progress);
        assert!(result.predictions.iter().all(|&p| p == 1.0));
        assert_eq!(result.metrics["accuracy"], 0.5);
        assert_eq!(result.predictions.len(), 4);
    }

    #[test]
    fn test_continuous_target_pseudo_accuracy() {
        let x = Array2::zeros((30, 1));
        let y = Array1::from_vec((0..30).map(|v| v as f64 * 1.7).collect());
        let xt = Array2::zeros((5, 1));
        let yt = Array1::from_vec((0..5).map(|v| v as f64 * 1.7).collect());
        let names = vec!["a".to_string()];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut progress = Progress::new(None);

        let result = train_decision_tree(&x, &y, &xt, &yt, &names, &mut rng, &mut progress);
        let acc = result.metrics["accuracy"];
        assert!(acc > 0.0 && acc <= 1.0);
    }

    #[test]
    fn test_importance_keys_match_features() {
        let x = Array2::zeros((10, 3));
        let y = Array1::from_vec(vec![0.0; 10]);
        let names = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut progress = Progress::new(None);

        let result = train_decision_tree(&x, &y, &x, &y, &names, &mut rng, &mut progress);
        let importance = result.feature_importance.unwrap();
        assert_eq!(importance.len(), 3);
        assert!(importance.values().all(|&v| v >= 0.0));
        for name in &names {
            assert!(importance.contains_key(name));
        }
    }
}
