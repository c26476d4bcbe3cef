//! K-means clustering trainer
//!
//! Lloyd's algorithm with `k = min(3, n_train)` and centroids seeded from the
//! first k training rows (no random init). An empty cluster keeps its previous
//! centroid rather than being dropped or reseeded; this degenerate-cluster
//! policy is part of the output contract. Inertia is the mean (not summed)
//! distance of test points to their assigned centroid.

use super::metrics::{Progress, TrainingResult};
use crate::training::ModelType;
use ndarray::{Array2, ArrayView1};

const MAX_CLUSTERS: usize = 3;
const MAX_ITERATIONS: usize = 100;

fn distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

fn nearest_centroid(row: ArrayView1<f64>, centroids: &Array2<f64>) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (c, centroid) in centroids.rows().into_iter().enumerate() {
        let d = distance(row, centroid);
        if d < best.1 {
            best = (c, d);
        }
    }
    best
}

pub(crate) fn train_kmeans(
    x_train: &Array2<f64>,
    x_test: &Array2<f64>,
    progress: &mut Progress,
) -> TrainingResult {
    progress.emit(5.0);

    let n = x_train.nrows();
    let d = x_train.ncols();
    let k = MAX_CLUSTERS.min(n);

    // First k training points as initial centroids
    let mut centroids = Array2::<f64>::zeros((k, d));
    for c in 0..k {
        centroids.row_mut(c).assign(&x_train.row(c));
    }

    let mut assignments = vec![0usize; n];
    for iteration in 0..MAX_ITERATIONS {
        let mut changed = false;
        for (i, row) in x_train.rows().into_iter().enumerate() {
            let (cluster, _) = nearest_centroid(row, &centroids);
            if assignments[i] != cluster {
                assignments[i] = cluster;
                changed = true;
            }
        }

        for c in 0..k {
            let members: Vec<usize> = (0..n).filter(|&i| assignments[i] == c).collect();
            // Empty cluster: keep the previous centroid, skip the update
            if members.is_empty() {
                continue;
            }
            for j in 0..d {
                centroids[[c, j]] =
                    members.iter().map(|&i| x_train[[i, j]]).sum::<f64>() / members.len() as f64;
            }
        }

        progress.emit(5.0 + 90.0 * (iteration + 1) as f64 / MAX_ITERATIONS as f64);
        if !changed && iteration > 0 {
            break;
        }
    }

    let mut total_distance = 0.0;
    let mut predictions = Vec::with_capacity(x_test.nrows());
    for row in x_test.rows() {
        let (cluster, dist) = nearest_centroid(row, &centroids);
        predictions.push(cluster as f64);
        total_distance += dist;
    }
    let inertia = if x_test.nrows() > 0 {
        total_distance / x_test.nrows() as f64
    } else {
        0.0
    };

    let mut result = TrainingResult::new(ModelType::KMeans);
    result.metrics.insert("clusters".to_string(), k as f64);
    result.metrics.insert("inertia".to_string(), inertia);
    result.predictions = predictions;

    progress.emit(100.0);
    result
}
