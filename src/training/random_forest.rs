//! Random forest trainer
//!
//! Bootstrap-aggregated ensemble of randomly-split trees. Splits are not
//! information-gain driven: each internal node picks a uniformly random
//! feature and a randomly chosen sample value of that feature as threshold.
//! Feature importance is uniform noise (see the design notes on placeholder
//! importances).

use super::metrics::{
    accuracy, is_classification, majority_value, random_importance, regression_metrics, Progress,
    TrainingResult,
};
use crate::training::ModelType;
use ndarray::{Array1, Array2, ArrayView1};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

const N_TREES: usize = 10;
const MAX_DEPTH: usize = 5;
const MIN_SAMPLES: usize = 5;

/// A randomly-split tree node. Leaves carry the aggregated value of the
/// samples that reached them; internal nodes route on `value < threshold`.
enum RandomTreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<RandomTreeNode>,
        right: Box<RandomTreeNode>,
    },
}

impl RandomTreeNode {
    fn predict(&self, row: &ArrayView1<f64>) -> f64 {
        match self {
            RandomTreeNode::Leaf { value } => *value,
            RandomTreeNode::Split {
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

fn leaf_value(y: &Array1<f64>, indices: &[usize], classification: bool) -> f64 {
    let values: Vec<f64> = indices.iter().map(|&i| y[i]).collect();
    if classification {
        majority_value(&values)
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn build_random_tree(
    x: &Array2<f64>,
    y: &Array1<f64>,
    indices: &[usize],
    depth: usize,
    classification: bool,
    rng: &mut ChaCha8Rng,
) -> RandomTreeNode {
    if depth >= MAX_DEPTH || indices.len() < MIN_SAMPLES {
        return RandomTreeNode::Leaf {
            value: leaf_value(y, indices, classification),
        };
    }

    let feature = rng.gen_range(0..x.ncols());
    let pivot = indices[rng.gen_range(0..indices.len())];
    let threshold = x[[pivot, feature]];

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| x[[i, feature]] < threshold);

    if left_idx.is_empty() || right_idx.is_empty() {
        return RandomTreeNode::Leaf {
            value: leaf_value(y, indices, classification),
        };
    }

    RandomTreeNode::Split {
        feature,
        threshold,
        left: Box::new(build_random_tree(x, y, &left_idx, depth + 1, classification, rng)),
        right: Box::new(build_random_tree(x, y, &right_idx, depth + 1, classification, rng)),
    }
}

pub(crate) fn train_random_forest(
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

    let mut trees = Vec::with_capacity(N_TREES);
    for t in 0..N_TREES {
        // Bootstrap sample: n draws with replacement
        let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
        trees.push(build_random_tree(x_train, y_train, &sample, 0, classification, rng));
        progress.emit(5.0 + 85.0 * (t + 1) as f64 / N_TREES as f64);
    }

    let predictions: Array1<f64> = x_test
        .rows()
        .into_iter()
        .map(|row| {
            let votes: Vec<f64> = trees.iter().map(|tree| tree.predict(&row)).collect();
            if classification {
                majority_value(&votes)
            } else {
                votes.iter().sum::<f64>() / votes.len() as f64
            }
        })
        .collect();

    let mut result = TrainingResult::new(ModelType::RandomForest);
    if classification {
        let acc = accuracy(y_test, &predictions);
        result.metrics.insert("accuracy".to_string(), acc);
        result.test_accuracy = Some(acc);
    } else {
        result.metrics = regression_metrics(y_test, &predictions);
        result.test_accuracy = result.metrics.get("r2").copied();
    }
    result.predictions = predictions.to_vec();
    result.actual_values = Some(y_test.to_vec());
    result.feature_importance = Some(random_importance(feature_names, rng));

    progress.emit(100.0);
    result
}
