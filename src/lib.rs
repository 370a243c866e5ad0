//! ksdrift - Kolmogorov-Smirnov data drift detection
//!
//! Detects distribution shift between a stored reference set and incoming
//! batches by running a two-sample KS test on every feature:
//! - feature-level verdicts compare each p-value with the threshold
//! - batch-level verdicts aggregate p-values with a Bonferroni or
//!   Benjamini-Hochberg (FDR) correction
//!
//! # Modules
//!
//! - [`drift`] - the [`KSDrift`](drift::KSDrift) detector, its config and results
//! - [`stats`] - KS statistic, exact / asymptotic p-values, corrections
//! - [`preprocessing`] - pluggable preprocessing strategies
//! - [`utils`] - CSV loading into `ndarray` matrices
//! - [`cli`] - command-line interface

pub mod error;

pub mod stats;
pub mod preprocessing;
pub mod drift;

pub mod utils;
pub mod cli;

pub use error::{DriftError, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::drift::{
        DetectorConfig, DriftFlag, DriftType, FeatureScores, KSDrift, PredictionResult,
        ReferenceSet, UpdatePolicy,
    };
    pub use crate::error::{DriftError, Result};
    pub use crate::preprocessing::{
        FnPreprocessor, Identity, PcaConfig, PcaReducer, Pipeline, Preprocessor,
        RandomProjection, Scaler, ScalerType,
    };
    pub use crate::stats::{ks_2samp, Alternative, Correction, KsMode, KsResult};
}
