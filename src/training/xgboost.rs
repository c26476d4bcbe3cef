//! Simplified boosted-tree trainer (xgboost-style)
//!
//! Structurally gradient boosting with depth-4 trees chosen by a regularized
//! gain over first-order gradients with a constant Hessian of 1, a
//! simplified, non-true-Newton variant. Feature importance is uniform noise,
//! not derived from tree structure (see the design notes).

use super::metrics::{
    accuracy, is_classification, random_importance, regression_metrics, Progress, TrainingResult,
};
use crate::training::ModelType;
use ndarray::{Array1, Array2, ArrayView1};
use rand_chacha::ChaCha8Rng;

const N_TREES: usize = 30;
const MAX_DEPTH: usize = 4;
const LEARNING_RATE: f64 = 0.1;
const LAMBDA: f64 = 1.0;

enum GainTreeNode {
    Leaf {
        weight: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<GainTreeNode>,
        right: Box<GainTreeNode>,
    },
}

impl GainTreeNode {
    fn predict(&self, row: ArrayView1<f64>) -> f64 {
        match self {
            GainTreeNode::Leaf { weight } => *weight,
            GainTreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if row[*feature] < *threshold {
                    left.predict(row)
                } else {
                    right.predict(row)
                }
            }
        }
    }
}

/// Leaf weight for squared loss with constant Hessian: `-G / (H + lambda)`.
fn leaf_weight(gradient_sum: f64, hessian_sum: f64) -> f64 {
    -gradient_sum / (hessian_sum + LAMBDA)
}

fn build_gain_tree(
    x: &Array2<f64>,
    gradients: &[f64],
    indices: &[usize],
    depth: usize,
) -> GainTreeNode {
    let g_total: f64 = indices.iter().map(|&i| gradients[i]).sum();
    let h_total = indices.len() as f64;

    if depth >= MAX_DEPTH || indices.len() < 2 {
        return GainTreeNode::Leaf {
            weight: leaf_weight(g_total, h_total),
        };
    }

    let parent_score = g_total * g_total / (h_total + LAMBDA);
    let mut best: Option<(f64, usize, f64)> = None; // (gain, feature, threshold)

    for feature in 0..x.ncols() {
        let mut thresholds: Vec<f64> = indices.iter().map(|&i| x[[i, feature]]).collect();
        thresholds.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        thresholds.dedup();

        for &threshold in &thresholds {
            let mut g_left = 0.0;
            let mut h_left = 0.0;
            for &i in indices {
                if x[[i, feature]] < threshold {
                    g_left += gradients[i];
                    h_left += 1.0;
                }
            }
            let h_right = h_total - h_left;
            if h_left == 0.0 || h_right == 0.0 {
                continue;
            }
            let g_right = g_total - g_left;

            let gain = g_left * g_left / (h_left + LAMBDA)
                + g_right * g_right / (h_right + LAMBDA)
                - parent_score;

            if gain > 0.0 && best.map_or(true, |(g, _, _)| gain > g) {
                best = Some((gain, feature, threshold));
            }
        }
    }

    let Some((_, feature, threshold)) = best else {
        return GainTreeNode::Leaf {
            weight: leaf_weight(g_total, h_total),
        };
    };

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| x[[i, feature]] < threshold);

    GainTreeNode::Split {
        feature,
        threshold,
        left: Box::new(build_gain_tree(x, gradients, &left_idx, depth + 1)),
        right: Box::new(build_gain_tree(x, gradients, &right_idx, depth + 1)),
    }
}

pub(crate) fn train_xgboost(
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    x_test: &Array2<f64>,
    y_test: &Array1<f64>,
    feature_names: &[String],
    rng: &mut ChaCha8Rng,
    progress: &mut Progress,
) -> TrainingResult {
    progress.emit(5.0);

    let classification = is_classification(y_train);
    let n = x_train.nrows();
    let all_indices: Vec<usize> = (0..n).collect();

    let mut fitted = vec![0.0; n];
    let mut trees: Vec<GainTreeNode> = Vec::with_capacity(N_TREES);

    for round in 0..N_TREES {
        // First-order gradients of squared loss at the current predictions
        let gradients: Vec<f64> = fitted
            .iter()
            .zip(y_train.iter())
            .map(|(f, y)| f - y)
            .collect();

        let tree = build_gain_tree(x_train, &gradients, &all_indices, 0);
        for (i, row) in x_train.rows().into_iter().enumerate() {
            fitted[i] += LEARNING_RATE * tree.predict(row);
        }
        trees.push(tree);

        progress.emit(5.0 + 85.0 * (round + 1) as f64 / N_TREES as f64);
    }

    let raw_predictions: Array1<f64> = x_test
        .rows()
        .into_iter()
        .map(|row| {
            trees
                .iter()
                .map(|tree| LEARNING_RATE * tree.predict(row))
                .sum::<f64>()
        })
        .collect();

    let mut result = TrainingResult::new(ModelType::XGBoost);
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
    result.feature_importance = Some(random_importance(feature_names, rng));

    progress.emit(100.0);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_fits_linear_target() {
        let n = 40;
        let xs: Vec<f64> = (0..n).map(|v| v as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|&v| 2.0 * v + 5.0).collect();
        let x = Array2::from_shape_vec((n, 1), xs).unwrap();
        let y = Array1::from_vec(ys);
        let names = vec!["a".to_string()];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut progress = Progress::new(None);

        let result = train_xgboost(&x, &y, &x, &y, &names, &mut rng, &mut progress);
        assert!(result.metrics["r2"] > 0.9, "{:?}", result.metrics);
    }

    #[test]
    fn test_binary_classification() {
        let n = 40;
        let xs: Vec<f64> = (0..n).map(|v| v as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|&v| if v < 20.0 { 0.0 } else { 1.0 }).collect();
        let x = Array2::from_shape_vec((n, 1), xs).unwrap();
        let y = Array1::from_vec(ys);
        let names = vec!["a".to_string()];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut progress = Progress::new(None);

        let result = train_xgboost(&x, &y, &x, &y, &names, &mut rng, &mut progress);
        assert!(result.metrics["accuracy"] > 0.9);
        assert_eq!(result.predictions.len(), 40);
    }

    #[test]
    fn test_importance_is_placeholder_noise() {
        let x = Array2::zeros((30, 2));
        let y = Array1::from_vec((0..30).map(|v| (v % 2) as f64).collect());
        let names = vec!["a".to_string(), "b".to_string()];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut progress = Progress::new(None);

        let result = train_xgboost(&x, &y, &x, &y, &names, &mut rng, &mut progress);
        let importance = result.feature_importance.unwrap();
        assert_eq!(importance.len(), 2);
        assert!(importance.values().all(|&v| (0.0..1.0).contains(&v)));
    }
}
