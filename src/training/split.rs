//! Deterministic train/test partitioning
//!
//! The shuffle order is part of the external contract: a linear-congruential
//! generator drives a Fisher-Yates pass over row indices, so two invocations
//! with the same `(n, test_size, seed)` produce identical partitions.

/// Linear-congruential generator with the fixed constants the split contract
/// requires. Not a general-purpose RNG; trainers use `ChaCha8Rng` instead.
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

const LCG_MULTIPLIER: u64 = 9301;
const LCG_INCREMENT: u64 = 49297;
const LCG_MODULUS: u64 = 233280;

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Advances the generator and returns a value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = (self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT))
            % LCG_MODULUS;
        self.state as f64 / LCG_MODULUS as f64
    }
}

/// Splits `n` row indices into `(test, train)` partitions.
///
/// Fisher-Yates shuffle driven by the LCG; the first `floor(n * test_size)`
/// shuffled indices become the test partition, the remainder the train
/// partition, both keeping their shuffled order.
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = Lcg::new(seed);

    for i in (1..n).rev() {
        let j = (rng.next_f64() * (i as f64 + 1.0)).floor() as usize;
        indices.swap(i, j);
    }

    let test_count = (n as f64 * test_size).floor() as usize;
    let train = indices.split_off(test_count);
    (indices, train)
}
