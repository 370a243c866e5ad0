//! Prediction output

use crate::drift::DriftType;
use crate::stats::{Alternative, Correction};
use serde::{Deserialize, Serialize};

/// Descriptor of the detector that produced a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorMeta {
    pub name: String,
    pub detector_type: String,
    pub data_type: Option<String>,
    pub online: bool,
    pub version: String,
    pub preprocessor: String,
    pub correction: Correction,
    pub alternative: Alternative,
}

/// Drift verdict: one flag for the batch, or one per feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DriftFlag {
    Batch(bool),
    Feature(Vec<bool>),
}

impl DriftFlag {
    /// True when the batch, or at least one feature, drifted
    pub fn any(&self) -> bool {
        match self {
            DriftFlag::Batch(flag) => *flag,
            DriftFlag::Feature(flags) => flags.iter().any(|&f| f),
        }
    }

    /// Integer encoding (0 / 1) of a batch verdict
    pub fn as_int(&self) -> Option<u8> {
        match self {
            DriftFlag::Batch(flag) => Some(u8::from(*flag)),
            DriftFlag::Feature(_) => None,
        }
    }
}

/// Outputs of a single prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftData {
    pub is_drift: DriftFlag,
    /// Per-feature KS statistic
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub distance: Option<Vec<f64>>,
    /// Per-feature p-value
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub p_val: Option<Vec<f64>>,
    /// Threshold the p-values were compared against
    pub threshold: f64,
    pub drift_type: DriftType,
}

/// Result of [`KSDrift::predict`](crate::drift::KSDrift::predict)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub meta: DetectorMeta,
    pub data: DriftData,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub feature_names: Option<Vec<String>>,
}

impl PredictionResult {
    pub fn is_drift(&self) -> bool {
        self.data.is_drift.any()
    }

    /// Indices of drifted features.
    ///
    /// Batch results identify features whose p-value is under the corrected
    /// threshold, which needs the p-values to have been returned.
    pub fn drifted_features(&self) -> Vec<usize> {
        match &self.data.is_drift {
            DriftFlag::Feature(flags) => flags
                .iter()
                .enumerate()
                .filter(|(_, &f)| f)
                .map(|(i, _)| i)
                .collect(),
            DriftFlag::Batch(false) => Vec::new(),
            DriftFlag::Batch(true) => match &self.data.p_val {
                Some(p_vals) => p_vals
                    .iter()
                    .enumerate()
                    .filter(|(_, &p)| p <= self.data.threshold)
                    .map(|(i, _)| i)
                    .collect(),
                None => Vec::new(),
            },
        }
    }

    fn feature_name(&self, idx: usize) -> String {
        self.feature_names
            .as_ref()
            .and_then(|names| names.get(idx).cloned())
            .unwrap_or_else(|| format!("feature_{}", idx))
    }

    /// Plain-text report
    pub fn summary(&self) -> String {
        let n_features = self
            .data
            .p_val
            .as_ref()
            .or(self.data.distance.as_ref())
            .map(|v| v.len());
        let drifted = self.drifted_features();

        let mut s = String::new();
        s.push_str("Drift Report\n");
        s.push_str("============\n");
        s.push_str(&format!(
            "Detector: {} ({}, {})\n",
            self.meta.name, self.meta.alternative, self.meta.correction
        ));
        s.push_str(&format!("Drift type: {}\n", self.data.drift_type));
        s.push_str(&format!("Threshold: {:.6}\n", self.data.threshold));
        if let Some(n) = n_features {
            s.push_str(&format!("Total features: {}\n", n));
        }
        s.push_str(&format!("Drift detected: {}\n", self.is_drift()));

        if !drifted.is_empty() {
            s.push_str("\nDrifted Features:\n");
            for idx in drifted {
                let mut line = format!("  - {}", self.feature_name(idx));
                if let Some(p) = self.data.p_val.as_ref().and_then(|v| v.get(idx)) {
                    line.push_str(&format!(" p={:.4e}", p));
                }
                if let Some(d) = self.data.distance.as_ref().and_then(|v| v.get(idx)) {
                    line.push_str(&format!(" distance={:.4}", d));
                }
                s.push_str(&line);
                s.push('\n');
            }
        }

        s
    }
}
