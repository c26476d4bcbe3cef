//! Single-hidden-layer neural network trainer
//!
//! Sigmoid activations throughout with online per-sample updates, but only the
//! hidden-to-output weights are ever trained: the input-to-hidden layer is
//! frozen at its random initialization, which makes this a fixed random
//! projection with a trainable linear head. Feature importance reports the
//! mean absolute frozen input weight per feature, not learned signal. Both
//! behaviors are preserved deliberately for output parity.

use super::metrics::{accuracy, Progress, TrainingResult};
use crate::training::ModelType;
use ndarray::{Array1, Array2, ArrayView1};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

const MIN_HIDDEN: usize = 4;
const LEARNING_RATE: f64 = 0.01;
const EPOCHS: usize = 50;

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

struct Network {
    /// Frozen after initialization; shape (inputs, hidden).
    w1: Array2<f64>,
    /// Frozen hidden biases.
    b1: Array1<f64>,
    /// Trainable hidden-to-output weights.
    w2: Array1<f64>,
    b2: f64,
}

impl Network {
    fn new(inputs: usize, hidden: usize, rng: &mut ChaCha8Rng) -> Self {
        let w1 = Array2::from_shape_fn((inputs, hidden), |_| rng.gen::<f64>() - 0.5);
        let b1 = Array1::from_shape_fn(hidden, |_| rng.gen::<f64>() - 0.5);
        let w2 = Array1::from_shape_fn(hidden, |_| rng.gen::<f64>() - 0.5);
        Self {
            w1,
            b1,
            w2,
            b2: rng.gen::<f64>() - 0.5,
        }
    }

    fn hidden_activations(&self, row: ArrayView1<f64>) -> Array1<f64> {
        (row.dot(&self.w1) + &self.b1).mapv(sigmoid)
    }

    fn forward(&self, row: ArrayView1<f64>) -> (Array1<f64>, f64) {
        let hidden = self.hidden_activations(row);
        let output = sigmoid(hidden.dot(&self.w2) + self.b2);
        (hidden, output)
    }

    /// One online step on the output layer; the input layer stays frozen.
    fn train_sample(&mut self, row: ArrayView1<f64>, target: f64) {
        let (hidden, output) = self.forward(row);
        let delta = (output - target) * output * (1.0 - output);
        for (w, &h) in self.w2.iter_mut().zip(hidden.iter()) {
            *w -= LEARNING_RATE * delta * h;
        }
        self.b2 -= LEARNING_RATE * delta;
    }
}

pub(crate) fn train_neural_network(
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    x_test: &Array2<f64>,
    y_test: &Array1<f64>,
    feature_names: &[String],
    rng: &mut ChaCha8Rng,
    progress: &mut Progress,
) -> TrainingResult {
    progress.emit(5.0);

    let inputs = x_train.ncols();
    let hidden = MIN_HIDDEN.max(inputs / 2);
    let mut network = Network::new(inputs, hidden, rng);

    for epoch in 0..EPOCHS {
        for (i, row) in x_train.rows().into_iter().enumerate() {
            network.train_sample(row, y_train[i]);
        }
        progress.emit(5.0 + 85.0 * (epoch + 1) as f64 / EPOCHS as f64);
    }

    let predictions: Array1<f64> = x_test
        .rows()
        .into_iter()
        .map(|row| network.forward(row).1.round())
        .collect();

    let acc = accuracy(y_test, &predictions);
    let mut result = TrainingResult::new(ModelType::NeuralNetwork);
    result.metrics.insert("accuracy".to_string(), acc);
    result.test_accuracy = Some(acc);
    result.predictions = predictions.to_vec();
    result.actual_values = Some(y_test.to_vec());

    // Mean absolute frozen input weight per feature
    let importance: HashMap<String, f64> = feature_names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mean_abs = network.w1.row(i).iter().map(|w| w.abs()).sum::<f64>()
                / hidden as f64;
            (name.clone(), mean_abs)
        })
        .collect();
    result.feature_importance = Some(importance);

    progress.emit(100.0);
    result
}
