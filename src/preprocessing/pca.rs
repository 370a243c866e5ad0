//! PCA reducer
//!
//! Linear dimensionality reduction fitted on reference data. Computes the
//! top-k eigenvectors of the covariance matrix using power iteration with
//! deflation, then projects every batch onto them.

use crate::error::{DriftError, Result};
use crate::preprocessing::Preprocessor;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// PCA configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PcaConfig {
    /// Number of output dimensions
    pub n_components: usize,
    /// Whether to scale to unit variance before projecting
    pub scale: bool,
    /// Random seed for power iteration initialization
    pub random_state: u64,
    pub max_iter: usize,
    pub tol: f64,
}

impl Default for PcaConfig {
    fn default() -> Self {
        Self {
            n_components: 2,
            scale: true,
            random_state: 42,
            max_iter: 300,
            tol: 1e-10,
        }
    }
}

impl PcaConfig {
    pub fn with_n_components(mut self, n: usize) -> Self {
        self.n_components = n;
        self
    }

    pub fn with_scale(mut self, scale: bool) -> Self {
        self.scale = scale;
        self
    }
}

/// Fitted PCA projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PcaReducer {
    means: Array1<f64>,
    stds: Array1<f64>,
    /// d x k, one component per column
    components: Array2<f64>,
    /// Variance captured by each component
    eigenvalues: Vec<f64>,
    explained_variance_ratio: Vec<f64>,
}

impl PcaReducer {
    /// Fit principal components on `x` (one instance per row)
    pub fn fit(x: ArrayView2<'_, f64>, config: &PcaConfig) -> Result<Self> {
        let (n, d) = x.dim();
        if n < 2 {
            return Err(DriftError::InsufficientSamples(
                "PCA requires at least 2 samples".to_string(),
            ));
        }
        if d < 1 {
            return Err(DriftError::Data("PCA requires at least 1 feature".to_string()));
        }
        if config.n_components == 0 {
            return Err(DriftError::invalid_parameter(
                "n_components",
                0,
                "must be at least 1",
            ));
        }

        let k = config.n_components.min(d);

        let means = x
            .mean_axis(Axis(0))
            .ok_or_else(|| DriftError::InsufficientSamples("empty data".to_string()))?;
        let stds = if config.scale {
            x.std_axis(Axis(0), 1.0).mapv(|s| s.max(1e-12))
        } else {
            Array1::ones(d)
        };

        let centered = (&x - &means) / &stds;
        let cov = centered.t().dot(&centered) / (n as f64 - 1.0);

        let (eigenvalues, components) = power_iteration(&cov, k, config);

        let full_variance = cov.diag().sum().max(1e-12);
        let explained_variance_ratio = eigenvalues
            .iter()
            .map(|&ev| (ev / full_variance).max(0.0))
            .collect();

        Ok(Self {
            means,
            stds,
            components,
            eigenvalues,
            explained_variance_ratio,
        })
    }

    pub fn n_components(&self) -> usize {
        self.components.ncols()
    }

    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    pub fn explained_variance_ratio(&self) -> &[f64] {
        &self.explained_variance_ratio
    }
}

/// Top-k eigenpairs of a symmetric matrix; eigenvectors returned as columns
fn power_iteration(cov: &Array2<f64>, k: usize, config: &PcaConfig) -> (Vec<f64>, Array2<f64>) {
    let d = cov.nrows();
    let mut work = cov.clone();
    let mut eigenvalues = Vec::with_capacity(k);
    let mut components = Array2::zeros((d, k));
    let mut rng = ChaCha8Rng::seed_from_u64(config.random_state);

    for c in 0..k {
        let mut v: Array1<f64> = (0..d).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let norm = v.dot(&v).sqrt().max(1e-12);
        v /= norm;

        let mut eigenvalue = 0.0f64;
        for _ in 0..config.max_iter {
            let w = work.dot(&v);
            let new_eigenvalue = v.dot(&w);
            let w_norm = w.dot(&w).sqrt();
            if w_norm < 1e-12 {
                // Remaining spectrum is numerically zero
                eigenvalue = 0.0;
                break;
            }
            let new_v = w / w_norm;
            let diff = (&new_v - &v).mapv(|x| x * x).sum().sqrt();

            v = new_v;
            eigenvalue = new_eigenvalue;
            if diff < config.tol {
                break;
            }
        }

        let eigenvalue = eigenvalue.max(0.0);
        eigenvalues.push(eigenvalue);
        components.column_mut(c).assign(&v);

        // Deflate: A = A - lambda * v * v^T
        let outer = v
            .view()
            .insert_axis(Axis(1))
            .dot(&v.view().insert_axis(Axis(0)));
        work.scaled_add(-eigenvalue, &outer);
    }

    (eigenvalues, components)
}

impl Preprocessor for PcaReducer {
    fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.means.len() {
            return Err(DriftError::DimensionMismatch {
                expected: self.means.len(),
                actual: x.ncols(),
            });
        }
        let centered = (&x - &self.means) / &self.stds;
        Ok(centered.dot(&self.components))
    }

    fn name(&self) -> &str {
        "pca"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correlated_data(n: usize) -> Array2<f64> {
        // Second column is a noisy copy of the first, third is small noise
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        Array2::from_shape_fn((n, 3), |(i, j)| {
            let base = i as f64 / n as f64 * 10.0;
            match j {
                0 => base,
                1 => 2.0 * base + rng.gen_range(-0.1..0.1),
                _ => rng.gen_range(-0.01..0.01),
            }
        })
    }

    #[test]
    fn test_pca_output_shape() {
        let x = correlated_data(100);
        let pca = PcaReducer::fit(x.view(), &PcaConfig::default()).unwrap();
        let out = pca.transform(x.view()).unwrap();
        assert_eq!(out.dim(), (100, 2));
        assert_eq!(pca.n_components(), 2);
    }

    #[test]
    fn test_pca_first_component_dominates() {
        let x = correlated_data(200);
        let config = PcaConfig::default().with_n_components(1).with_scale(false);
        let pca = PcaReducer::fit(x.view(), &config).unwrap();
        assert!(pca.explained_variance_ratio()[0] > 0.95);
    }

    #[test]
    fn test_pca_components_capped_by_dimension() {
        let x = correlated_data(20);
        let config = PcaConfig::default().with_n_components(10);
        let pca = PcaReducer::fit(x.view(), &config).unwrap();
        assert_eq!(pca.n_components(), 3);
    }

    #[test]
    fn test_pca_rejects_small_input() {
        let x = Array2::<f64>::zeros((1, 3));
        assert!(PcaReducer::fit(x.view(), &PcaConfig::default()).is_err());
    }

    #[test]
    fn test_pca_dimension_check() {
        let x = correlated_data(20);
        let pca = PcaReducer::fit(x.view(), &PcaConfig::default()).unwrap();
        let err = pca.transform(Array2::<f64>::zeros((2, 5)).view()).unwrap_err();
        assert!(matches!(err, DriftError::DimensionMismatch { .. }));
    }
}
