//! Detector configuration

use crate::error::{DriftError, Result};
use crate::stats::{Alternative, Correction, KsMode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// How the reference set evolves after each prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Keep the most recent `n` instances
    Last(usize),
    /// Keep a uniform random sample of `n` instances from everything seen
    ReservoirSampling(usize),
}

impl UpdatePolicy {
    pub fn size(&self) -> usize {
        match *self {
            UpdatePolicy::Last(n) | UpdatePolicy::ReservoirSampling(n) => n,
        }
    }
}

/// Aggregation level of the drift verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftType {
    /// One corrected verdict for the whole batch
    #[default]
    Batch,
    /// One uncorrected verdict per feature
    Feature,
}

impl FromStr for DriftType {
    type Err = DriftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "batch" => Ok(DriftType::Batch),
            "feature" => Ok(DriftType::Feature),
            _ => Err(DriftError::InvalidDriftType(s.to_string())),
        }
    }
}

impl fmt::Display for DriftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriftType::Batch => f.write_str("batch"),
            DriftType::Feature => f.write_str("feature"),
        }
    }
}

/// Configuration for [`KSDrift`](crate::drift::KSDrift)
///
/// Fixed once the detector is built. Missing JSON fields take their
/// default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Significance threshold for the p-values
    pub p_val: f64,

    /// Correction used for batch-level verdicts
    pub correction: Correction,

    /// Alternative hypothesis of the KS test
    pub alternative: Alternative,

    /// Number of features after preprocessing; inferred when `None`
    pub n_features: Option<usize>,

    /// Instances used to infer `n_features`
    pub n_infer: usize,

    /// Preprocess the reference set once at construction and cache it
    pub preprocess_x_ref: bool,

    /// Reference update policy applied after each prediction
    pub update_x_ref: Option<UpdatePolicy>,

    /// Free-form domain tag, e.g. "tabular" or "image"
    pub data_type: Option<String>,

    /// Exact / asymptotic p-value selection
    pub mode: KsMode,

    /// Seed for the reservoir sampling generator
    pub random_state: Option<u64>,

    /// Names of the preprocessed features, used in reports
    pub feature_names: Option<Vec<String>>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            p_val: 0.05,
            correction: Correction::Bonferroni,
            alternative: Alternative::TwoSided,
            n_features: None,
            n_infer: 2,
            preprocess_x_ref: true,
            update_x_ref: None,
            data_type: None,
            mode: KsMode::Auto,
            random_state: None,
            feature_names: None,
        }
    }
}

impl DetectorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Parse a JSON configuration.
    ///
    /// Unknown correction, alternative or mode names are reported with
    /// their typed error rather than as a serialization failure.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if let Some(name) = value.get("correction").and_then(|v| v.as_str()) {
            name.parse::<Correction>()?;
        }
        if let Some(name) = value.get("alternative").and_then(|v| v.as_str()) {
            name.parse::<Alternative>()?;
        }
        if let Some(name) = value.get("mode").and_then(|v| v.as_str()) {
            name.parse::<KsMode>()?;
        }

        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_p_val(mut self, p_val: f64) -> Self {
        self.p_val = p_val;
        self
    }

    pub fn with_correction(mut self, correction: Correction) -> Self {
        self.correction = correction;
        self
    }

    pub fn with_alternative(mut self, alternative: Alternative) -> Self {
        self.alternative = alternative;
        self
    }

    pub fn with_n_features(mut self, n_features: usize) -> Self {
        self.n_features = Some(n_features);
        self
    }

    pub fn with_n_infer(mut self, n_infer: usize) -> Self {
        self.n_infer = n_infer;
        self
    }

    pub fn with_preprocess_x_ref(mut self, preprocess: bool) -> Self {
        self.preprocess_x_ref = preprocess;
        self
    }

    pub fn with_update_x_ref(mut self, policy: UpdatePolicy) -> Self {
        self.update_x_ref = Some(policy);
        self
    }

    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    pub fn with_mode(mut self, mode: KsMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = Some(names);
        self
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.p_val > 0.0 && self.p_val < 1.0) {
            return Err(DriftError::invalid_parameter(
                "p_val",
                self.p_val,
                "must be in (0, 1)",
            ));
        }
        if self.n_infer == 0 {
            return Err(DriftError::invalid_parameter("n_infer", 0, "must be at least 1"));
        }
        if self.n_features == Some(0) {
            return Err(DriftError::invalid_parameter("n_features", 0, "must be at least 1"));
        }
        if let Some(policy) = self.update_x_ref {
            if policy.size() == 0 {
                return Err(DriftError::invalid_parameter(
                    "update_x_ref",
                    0,
                    "window or reservoir size must be at least 1",
                ));
            }
        }
        Ok(())
    }
}
