//! Multiple-comparison corrections

use crate::error::{DriftError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Correction applied when aggregating feature-wise p-values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Correction {
    /// Family-wise error control: threshold divided by the number of tests
    #[default]
    Bonferroni,
    /// Benjamini-Hochberg false discovery rate control
    Fdr,
}

impl Correction {
    /// Decide whether the batch drifted.
    ///
    /// Returns the verdict and the threshold the p-values were held against.
    pub fn is_drift(&self, p_vals: &[f64], p_val: f64) -> (bool, f64) {
        match self {
            Correction::Bonferroni => bonferroni(p_vals, p_val),
            Correction::Fdr => fdr(p_vals, p_val),
        }
    }
}

impl FromStr for Correction {
    type Err = DriftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "bonferroni" => Ok(Correction::Bonferroni),
            "fdr" => Ok(Correction::Fdr),
            _ => Err(DriftError::InvalidCorrection(s.to_string())),
        }
    }
}

impl TryFrom<String> for Correction {
    type Error = DriftError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Correction::Bonferroni => f.write_str("bonferroni"),
            Correction::Fdr => f.write_str("fdr"),
        }
    }
}

/// Bonferroni: drift iff the smallest p-value is `<= p_val / n`.
pub fn bonferroni(p_vals: &[f64], p_val: f64) -> (bool, f64) {
    if p_vals.is_empty() {
        return (false, p_val);
    }
    let threshold = p_val / p_vals.len() as f64;
    let drift = p_vals.iter().any(|&p| p <= threshold);
    (drift, threshold)
}

/// Benjamini-Hochberg: number of rejected hypotheses.
///
/// Finds the largest `k` with `p_(k) <= k / n * q_val` over the ascending
/// p-values. The boundary is inclusive.
fn bh_rejections(sorted: &[f64], q_val: f64) -> usize {
    let n = sorted.len() as f64;
    sorted
        .iter()
        .enumerate()
        .rev()
        .find(|(i, &p)| p <= (*i as f64 + 1.0) / n * q_val)
        .map(|(i, _)| i + 1)
        .unwrap_or(0)
}

fn sorted_copy(p_vals: &[f64]) -> Vec<f64> {
    let mut sorted = p_vals.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// False discovery rate control.
///
/// Drift iff at least one hypothesis is rejected. The returned threshold is
/// the line value `k / n * q_val` at the largest rejected rank, or the
/// first line value `q_val / n` when nothing is rejected.
pub fn fdr(p_vals: &[f64], q_val: f64) -> (bool, f64) {
    if p_vals.is_empty() {
        return (false, q_val);
    }
    let n = p_vals.len() as f64;
    let k = bh_rejections(&sorted_copy(p_vals), q_val);
    if k == 0 {
        (false, q_val / n)
    } else {
        (true, k as f64 / n * q_val)
    }
}

/// Per-hypothesis rejection mask under Benjamini-Hochberg, in input order.
///
/// The rejected set is always a prefix of the sorted p-values: every
/// rejected p-value is `<=` every accepted one.
pub fn benjamini_hochberg(p_vals: &[f64], q_val: f64) -> Vec<bool> {
    let sorted = sorted_copy(p_vals);
    let k = bh_rejections(&sorted, q_val);
    if k == 0 {
        return vec![false; p_vals.len()];
    }
    let cutoff = sorted[k - 1];
    p_vals.iter().map(|&p| p <= cutoff).collect()
}
