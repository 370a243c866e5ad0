//! Reference set storage and update policies

use crate::drift::UpdatePolicy;
use crate::error::{DriftError, Result};
use ndarray::{concatenate, s, Array2, ArrayView2, Axis};
use rand::seq::index;
use rand::Rng;
use tracing::debug;

/// Reference instances (one per row) plus the count of instances seen so far
#[derive(Debug, Clone)]
pub struct ReferenceSet {
    data: Array2<f64>,
    n_seen: usize,
}

impl ReferenceSet {
    pub fn new(data: Array2<f64>) -> Self {
        let n_seen = data.nrows();
        Self { data, n_seen }
    }

    pub fn data(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    pub fn n_features(&self) -> usize {
        self.data.ncols()
    }

    /// Total instances observed, initial reference included
    pub fn n_seen(&self) -> usize {
        self.n_seen
    }

    /// Fold `batch` into the reference set under `policy`.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        batch: ArrayView2<'_, f64>,
        policy: UpdatePolicy,
        rng: &mut R,
    ) -> Result<()> {
        if batch.ncols() != self.data.ncols() {
            return Err(DriftError::DimensionMismatch {
                expected: self.data.ncols(),
                actual: batch.ncols(),
            });
        }

        let data = match policy {
            UpdatePolicy::Last(n) => self.last_window(batch, n)?,
            UpdatePolicy::ReservoirSampling(n) => self.reservoir(batch, n, rng)?,
        };

        debug!(
            policy = ?policy,
            before = self.data.nrows(),
            after = data.nrows(),
            n_seen = self.n_seen + batch.nrows(),
            "Reference set updated"
        );

        self.data = data;
        self.n_seen += batch.nrows();
        Ok(())
    }

    fn last_window(&self, batch: ArrayView2<'_, f64>, n: usize) -> Result<Array2<f64>> {
        let combined = concatenate(Axis(0), &[self.data.view(), batch.view()])?;
        let start = combined.nrows().saturating_sub(n);
        Ok(combined.slice(s![start.., ..]).to_owned())
    }

    fn reservoir<R: Rng + ?Sized>(
        &self,
        batch: ArrayView2<'_, f64>,
        n: usize,
        rng: &mut R,
    ) -> Result<Array2<f64>> {
        if self.n_seen + batch.nrows() <= n {
            return Ok(concatenate(Axis(0), &[self.data.view(), batch.view()])?);
        }

        // An oversized initial reference is itself subsampled uniformly
        let mut reservoir = if self.data.nrows() > n {
            let mut keep = index::sample(rng, self.data.nrows(), n).into_vec();
            keep.sort_unstable();
            self.data.select(Axis(0), &keep)
        } else {
            self.data.clone()
        };

        let mut seen = self.n_seen;
        for item in batch.rows() {
            seen += 1;
            if reservoir.nrows() < n {
                reservoir.push_row(item)?;
            } else {
                let r = rng.gen_range(0..seen);
                if r < n {
                    reservoir.row_mut(r).assign(&item);
                }
            }
        }

        Ok(reservoir)
    }
}
