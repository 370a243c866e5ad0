//! Feature-wise Kolmogorov-Smirnov drift detector

use crate::drift::{
    DetectorConfig, DetectorMeta, DriftData, DriftFlag, DriftType, PredictionResult, ReferenceSet,
};
use crate::error::{DriftError, Result};
use crate::preprocessing::{infer_n_features, Identity, Preprocessor};
use crate::stats::{ks_2samp, PValueMethod};
use ndarray::{Array2, ArrayView2, CowArray, Ix2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Per-feature test outcome without aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScores {
    pub p_vals: Vec<f64>,
    pub distances: Vec<f64>,
    /// Whether any feature used the exact null distribution
    pub exact: bool,
}

/// Drift detector running a KS test on every feature.
///
/// The reference set is the only state that changes between calls; it is
/// replaced at the end of a successful [`predict`](Self::predict) when an
/// update policy is configured.
pub struct KSDrift<R: Rng = ChaCha8Rng> {
    config: DetectorConfig,
    preprocessor: Box<dyn Preprocessor>,
    reference: ReferenceSet,
    n_features: usize,
    rng: R,
}

impl KSDrift<ChaCha8Rng> {
    /// Detector on raw features
    pub fn new(x_ref: Array2<f64>, config: DetectorConfig) -> Result<Self> {
        Self::with_preprocessor(x_ref, config, Identity)
    }

    /// Detector with a preprocessing strategy; the generator is seeded from
    /// `config.random_state`, or from entropy when it is unset.
    pub fn with_preprocessor<P: Preprocessor + 'static>(
        x_ref: Array2<f64>,
        config: DetectorConfig,
        preprocessor: P,
    ) -> Result<Self> {
        let rng = match config.random_state {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(x_ref, config, preprocessor, rng)
    }
}

impl<R: Rng> KSDrift<R> {
    /// Detector with an injected random generator for reservoir sampling
    pub fn with_rng<P: Preprocessor + 'static>(
        x_ref: Array2<f64>,
        config: DetectorConfig,
        preprocessor: P,
        rng: R,
    ) -> Result<Self> {
        config.validate()?;
        if x_ref.nrows() == 0 {
            return Err(DriftError::InsufficientSamples(
                "reference set is empty".to_string(),
            ));
        }

        let preprocessor: Box<dyn Preprocessor> = Box::new(preprocessor);
        let n_features = match config.n_features {
            Some(n) => n,
            None => infer_n_features(preprocessor.as_ref(), x_ref.view(), config.n_infer)?,
        };

        if let Some(names) = &config.feature_names {
            if names.len() != n_features {
                return Err(DriftError::invalid_parameter(
                    "feature_names",
                    names.len(),
                    &format!("expected {} names", n_features),
                ));
            }
        }

        let reference = if config.preprocess_x_ref {
            let processed = preprocessor.transform(x_ref.view())?;
            check_width(n_features, processed.ncols())?;
            ReferenceSet::new(processed)
        } else {
            ReferenceSet::new(x_ref)
        };

        debug!(
            n_ref = reference.len(),
            n_features,
            preprocessor = preprocessor.name(),
            cached = config.preprocess_x_ref,
            "KSDrift initialised"
        );

        Ok(Self {
            config,
            preprocessor,
            reference,
            n_features,
            rng,
        })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Current reference set, preprocessed when `preprocess_x_ref` is set
    pub fn reference(&self) -> &ReferenceSet {
        &self.reference
    }

    pub fn meta(&self) -> DetectorMeta {
        DetectorMeta {
            name: "KSDrift".to_string(),
            detector_type: "drift".to_string(),
            data_type: self.config.data_type.clone(),
            online: false,
            version: env!("CARGO_PKG_VERSION").to_string(),
            preprocessor: self.preprocessor.name().to_string(),
            correction: self.config.correction,
            alternative: self.config.alternative,
        }
    }

    /// Preprocess the reference set (unless cached) and `x`
    pub fn preprocess(
        &self,
        x: ArrayView2<'_, f64>,
    ) -> Result<(CowArray<'_, f64, Ix2>, Array2<f64>)> {
        let x_ref = if self.config.preprocess_x_ref {
            CowArray::from(self.reference.data())
        } else {
            CowArray::from(self.preprocessor.transform(self.reference.data())?)
        };
        let x = self.preprocessor.transform(x)?;
        Ok((x_ref, x))
    }

    /// Per-feature p-values and distances for `x`
    pub fn score(&self, x: ArrayView2<'_, f64>) -> Result<FeatureScores> {
        self.score_with_batch(x).map(|(scores, _)| scores)
    }

    fn score_with_batch(&self, x: ArrayView2<'_, f64>) -> Result<(FeatureScores, Array2<f64>)> {
        if x.nrows() == 0 {
            return Err(DriftError::InsufficientSamples("test batch is empty".to_string()));
        }

        let (x_ref, x) = self.preprocess(x)?;
        check_width(self.n_features, x_ref.ncols())?;
        check_width(self.n_features, x.ncols())?;
        if x_ref.nrows() == 0 || x.nrows() == 0 {
            return Err(DriftError::InsufficientSamples(
                "preprocessing produced an empty sample".to_string(),
            ));
        }

        let mut p_vals = Vec::with_capacity(self.n_features);
        let mut distances = Vec::with_capacity(self.n_features);
        let mut exact = false;
        for f in 0..self.n_features {
            let result = ks_2samp(
                x_ref.column(f),
                x.column(f),
                self.config.alternative,
                self.config.mode,
            )?;
            exact |= result.method == PValueMethod::Exact;
            p_vals.push(result.p_value);
            distances.push(result.statistic);
        }

        Ok((
            FeatureScores {
                p_vals,
                distances,
                exact,
            },
            x,
        ))
    }

    /// Test `x` for drift against the reference set.
    ///
    /// Feature-level results compare every p-value with `p_val` directly;
    /// batch results apply the configured correction. When an update policy
    /// is set, the reference set absorbs `x` once the test has succeeded.
    pub fn predict(
        &mut self,
        x: ArrayView2<'_, f64>,
        drift_type: DriftType,
        return_p_val: bool,
        return_distance: bool,
    ) -> Result<PredictionResult> {
        let (scores, x_processed) = self.score_with_batch(x)?;
        let p_val = self.config.p_val;

        let (is_drift, threshold) = match drift_type {
            DriftType::Feature => (
                DriftFlag::Feature(scores.p_vals.iter().map(|&p| p <= p_val).collect()),
                p_val,
            ),
            DriftType::Batch => {
                let (drift, threshold) = self.config.correction.is_drift(&scores.p_vals, p_val);
                (DriftFlag::Batch(drift), threshold)
            }
        };

        debug!(
            n_ref = self.reference.len(),
            n_test = x.nrows(),
            n_features = self.n_features,
            drift_type = %drift_type,
            exact = scores.exact,
            threshold,
            "KS scores computed"
        );
        if is_drift.any() {
            info!(
                drift_type = %drift_type,
                correction = %self.config.correction,
                min_p = scores.p_vals.iter().copied().fold(f64::INFINITY, f64::min),
                "Drift detected"
            );
        }

        if let Some(policy) = self.config.update_x_ref {
            let batch = if self.config.preprocess_x_ref {
                x_processed.view()
            } else {
                x.view()
            };
            self.reference.update(batch, policy, &mut self.rng)?;
            info!(
                n_ref = self.reference.len(),
                n_seen = self.reference.n_seen(),
                "Reference set refreshed"
            );
        }

        Ok(PredictionResult {
            meta: self.meta(),
            data: DriftData {
                is_drift,
                distance: return_distance.then_some(scores.distances),
                p_val: return_p_val.then_some(scores.p_vals),
                threshold,
                drift_type,
            },
            feature_names: self.config.feature_names.clone(),
        })
    }

    /// Batch-level verdict only
    pub fn has_drift(&mut self, x: ArrayView2<'_, f64>) -> Result<bool> {
        Ok(self.predict(x, DriftType::Batch, false, false)?.is_drift())
    }
}

fn check_width(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(DriftError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
