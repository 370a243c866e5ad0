//! Preprocessing strategies
//!
//! A [`Preprocessor`] maps a batch of raw instances (rows) to a fixed-width
//! numeric feature matrix before the statistical tests run. The detector
//! only sees the trait, so any dimensionality reduction can be plugged in:
//! - [`Identity`] - no-op
//! - [`FnPreprocessor`] - wraps a closure; captured variables play the role of keyword arguments
//! - [`Scaler`] - per-column standard / min-max scaling fitted on reference data
//! - [`PcaReducer`] - principal component projection fitted on reference data
//! - [`RandomProjection`] - seeded sparse random projection
//! - [`Pipeline`] - sequential composition

mod pca;
mod projection;
mod scaler;

pub use pca::{PcaConfig, PcaReducer};
pub use projection::RandomProjection;
pub use scaler::{Scaler, ScalerType};

use crate::error::{DriftError, Result};
use ndarray::{Array2, ArrayView2};
use tracing::warn;

/// Strategy that reduces raw instances to the features under test
pub trait Preprocessor: Send + Sync {
    /// Transform a batch of instances (one per row)
    fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>>;

    /// Short descriptive name used in logs and result metadata
    fn name(&self) -> &str;
}

impl<P: Preprocessor + ?Sized> Preprocessor for Box<P> {
    fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        (**self).transform(x)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Returns the input unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Preprocessor for Identity {
    fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        Ok(x.to_owned())
    }

    fn name(&self) -> &str {
        "identity"
    }
}

/// Closure-backed preprocessor
pub struct FnPreprocessor<F> {
    name: String,
    func: F,
}

impl<F> FnPreprocessor<F>
where
    F: Fn(ArrayView2<'_, f64>) -> Result<Array2<f64>> + Send + Sync,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Preprocessor for FnPreprocessor<F>
where
    F: Fn(ArrayView2<'_, f64>) -> Result<Array2<f64>> + Send + Sync,
{
    fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        (self.func)(x)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Runs preprocessors one after another
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn Preprocessor>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step
    pub fn then<P: Preprocessor + 'static>(mut self, step: P) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Preprocessor for Pipeline {
    fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        let mut current = x.to_owned();
        for step in &self.steps {
            current = step.transform(current.view())?;
        }
        Ok(current)
    }

    fn name(&self) -> &str {
        "pipeline"
    }
}

/// Infer the output dimensionality of `preprocessor`.
///
/// Runs it on the first `n_infer` instances of `x` and on the first instance
/// alone. Both runs must keep one output row per input row and agree on a
/// non-zero column count.
pub fn infer_n_features(
    preprocessor: &dyn Preprocessor,
    x: ArrayView2<'_, f64>,
    n_infer: usize,
) -> Result<usize> {
    let n_rows = x.nrows();
    if n_rows == 0 {
        return Err(DriftError::InsufficientSamples(
            "cannot infer feature count from an empty reference set".to_string(),
        ));
    }
    let n_sample = n_infer.clamp(1, n_rows);

    let sample = preprocessor.transform(x.slice(ndarray::s![..n_sample, ..]))?;
    if sample.nrows() != n_sample {
        return Err(DriftError::FeatureInference(format!(
            "'{}' returned {} rows for {} instances",
            preprocessor.name(),
            sample.nrows(),
            n_sample
        )));
    }
    if sample.ncols() == 0 {
        return Err(DriftError::FeatureInference(format!(
            "'{}' produced no features",
            preprocessor.name()
        )));
    }

    let single = preprocessor.transform(x.slice(ndarray::s![..1, ..]))?;
    if single.ncols() != sample.ncols() {
        warn!(
            preprocessor = preprocessor.name(),
            batch = sample.ncols(),
            single = single.ncols(),
            "Preprocessor output width depends on batch size"
        );
        return Err(DriftError::FeatureInference(format!(
            "'{}' produced {} features for {} instances but {} for one",
            preprocessor.name(),
            sample.ncols(),
            n_sample,
            single.ncols()
        )));
    }

    Ok(sample.ncols())
}
