//! Sparse random projection

use crate::error::{DriftError, Result};
use crate::preprocessing::Preprocessor;
use ndarray::{Array2, ArrayView2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Achlioptas projection to `n_components` dimensions.
///
/// Entries are `+sqrt(3 / k)` and `-sqrt(3 / k)` with probability 1/6 each and
/// zero otherwise, which preserves pairwise distances in expectation.
#[derive(Debug, Clone)]
pub struct RandomProjection {
    matrix: Array2<f64>,
}

impl RandomProjection {
    pub fn new(n_input: usize, n_components: usize, seed: u64) -> Result<Self> {
        if n_input == 0 || n_components == 0 {
            return Err(DriftError::invalid_parameter(
                "n_components",
                format!("{}x{}", n_input, n_components),
                "input and output dimensions must be positive",
            ));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let value = (3.0 / n_components as f64).sqrt();
        let matrix = Array2::from_shape_fn((n_input, n_components), |_| {
            match rng.gen_range(0..6) {
                0 => value,
                1 => -value,
                _ => 0.0,
            }
        });

        Ok(Self { matrix })
    }

    pub fn n_components(&self) -> usize {
        self.matrix.ncols()
    }
}

impl Preprocessor for RandomProjection {
    fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.matrix.nrows() {
            return Err(DriftError::DimensionMismatch {
                expected: self.matrix.nrows(),
                actual: x.ncols(),
            });
        }
        Ok(x.dot(&self.matrix))
    }

    fn name(&self) -> &str {
        "random-projection"
    }
}
