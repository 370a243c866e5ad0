//! Drift detection module
//!
//! Feature-wise Kolmogorov-Smirnov drift detection against a stored
//! reference set, with Bonferroni / FDR aggregation and optional reference
//! updates (fixed window or reservoir sampling).
//!
//! ```no_run
//! use ksdrift::drift::{DetectorConfig, DriftType, KSDrift};
//! use ndarray::Array2;
//!
//! let x_ref = Array2::<f64>::zeros((100, 3));
//! let x = Array2::<f64>::ones((50, 3));
//! let mut detector = KSDrift::new(x_ref, DetectorConfig::default())?;
//! let result = detector.predict(x.view(), DriftType::Batch, true, true)?;
//! println!("{}", result.summary());
//! # Ok::<(), ksdrift::DriftError>(())
//! ```

mod config;
mod detector;
mod reference;
mod result;

pub use config::{DetectorConfig, DriftType, UpdatePolicy};
pub use detector::{FeatureScores, KSDrift};
pub use reference::ReferenceSet;
pub use result::{DetectorMeta, DriftData, DriftFlag, PredictionResult};
