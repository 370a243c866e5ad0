//! Two-sample Kolmogorov-Smirnov test

use crate::error::{DriftError, Result};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::distribution::{exact_sf, kolmogorov_sf, smirnov_one_sided_sf};

/// Largest `n_ref * n_test` for which `KsMode::Auto` uses the exact null distribution
pub const EXACT_MAX_PRODUCT: usize = 1_000_000;

/// Alternative hypothesis of the test
///
/// `Greater` tests whether the reference ECDF lies above the test ECDF
/// somewhere; `Less` tests the opposite direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum Alternative {
    #[default]
    TwoSided,
    Less,
    Greater,
}

impl FromStr for Alternative {
    type Err = DriftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "two-sided" | "two_sided" | "twosided" => Ok(Alternative::TwoSided),
            "less" => Ok(Alternative::Less),
            "greater" => Ok(Alternative::Greater),
            _ => Err(DriftError::InvalidAlternative(s.to_string())),
        }
    }
}

impl TryFrom<String> for Alternative {
    type Error = DriftError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Alternative::TwoSided => "two-sided",
            Alternative::Less => "less",
            Alternative::Greater => "greater",
        };
        f.write_str(name)
    }
}

/// How the p-value is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum KsMode {
    /// Exact for small samples, asymptotic otherwise
    #[default]
    Auto,
    Exact,
    Asymptotic,
}

impl FromStr for KsMode {
    type Err = DriftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(KsMode::Auto),
            "exact" => Ok(KsMode::Exact),
            "asymptotic" => Ok(KsMode::Asymptotic),
            _ => Err(DriftError::invalid_parameter(
                "mode",
                s,
                "expected 'auto', 'exact' or 'asymptotic'",
            )),
        }
    }
}

impl TryFrom<String> for KsMode {
    type Error = DriftError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for KsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KsMode::Auto => "auto",
            KsMode::Exact => "exact",
            KsMode::Asymptotic => "asymptotic",
        };
        f.write_str(name)
    }
}

/// Method actually used for a given p-value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PValueMethod {
    Exact,
    Asymptotic,
}

/// Outcome of a single two-sample test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KsResult {
    /// Supremum distance between the empirical distribution functions
    pub statistic: f64,
    /// Probability of a statistic at least this large under the null
    pub p_value: f64,
    pub method: PValueMethod,
}

fn sorted_sample(data: ArrayView1<'_, f64>, label: &str) -> Result<Vec<f64>> {
    if data.is_empty() {
        return Err(DriftError::InsufficientSamples(format!("{} sample is empty", label)));
    }
    if data.iter().any(|v| v.is_nan()) {
        return Err(DriftError::Data(format!("{} sample contains NaN", label)));
    }
    let mut sorted: Vec<f64> = data.iter().copied().collect();
    sorted.sort_by(f64::total_cmp);
    Ok(sorted)
}

/// Largest positive and negative values of `i * n - j * m` over the merged sample.
///
/// `i` and `j` count the reference and test observations that are `<=` the
/// current value, so ties are consumed together as the ECDF requires.
fn scaled_extremes(reference: &[f64], test: &[f64]) -> (u64, u64) {
    let (m, n) = (reference.len(), test.len());
    let (mut i, mut j) = (0usize, 0usize);
    let mut d_plus = 0i64;
    let mut d_minus = 0i64;

    while i < m && j < n {
        let x = reference[i].min(test[j]);
        while i < m && reference[i] <= x {
            i += 1;
        }
        while j < n && test[j] <= x {
            j += 1;
        }
        let diff = (i * n) as i64 - (j * m) as i64;
        d_plus = d_plus.max(diff);
        d_minus = d_minus.max(-diff);
    }

    (d_plus as u64, d_minus as u64)
}

/// Run the two-sample KS test of `reference` against `test`.
pub fn ks_2samp(
    reference: ArrayView1<'_, f64>,
    test: ArrayView1<'_, f64>,
    alternative: Alternative,
    mode: KsMode,
) -> Result<KsResult> {
    let ref_sorted = sorted_sample(reference, "reference")?;
    let test_sorted = sorted_sample(test, "test")?;
    let (m, n) = (ref_sorted.len(), test_sorted.len());

    let (d_plus, d_minus) = scaled_extremes(&ref_sorted, &test_sorted);
    let h = match alternative {
        Alternative::TwoSided => d_plus.max(d_minus),
        Alternative::Greater => d_plus,
        Alternative::Less => d_minus,
    };
    let statistic = h as f64 / (m as f64 * n as f64);

    let use_exact = match mode {
        KsMode::Exact => true,
        KsMode::Asymptotic => false,
        KsMode::Auto => m.saturating_mul(n) <= EXACT_MAX_PRODUCT,
    };

    let (p_value, method) = if use_exact {
        (exact_sf(h, m, n, alternative), PValueMethod::Exact)
    } else {
        let p = match alternative {
            Alternative::TwoSided => {
                let en = (m as f64 * n as f64) / (m + n) as f64;
                let sqrt_en = en.sqrt();
                kolmogorov_sf((sqrt_en + 0.12 + 0.11 / sqrt_en) * statistic)
            }
            Alternative::Less | Alternative::Greater => smirnov_one_sided_sf(statistic, m, n),
        };
        (p, PValueMethod::Asymptotic)
    };

    Ok(KsResult {
        statistic,
        p_value: p_value.clamp(0.0, 1.0),
        method,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;

    fn arr(values: impl IntoIterator<Item = f64>) -> Array1<f64> {
        values.into_iter().collect()
    }

    #[test]
    fn test_identical_samples() {
        let data = arr((0..50).map(|i| i as f64));
        let result = ks_2samp(data.view(), data.view(), Alternative::TwoSided, KsMode::Auto).unwrap();
        assert_eq!(result.statistic, 0.0);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn test_shifted_uniform_detects_drift() {
        let reference = arr((0..100).map(|i| i as f64));
        let test = arr((50..150).map(|i| i as f64));
        let result = ks_2samp(reference.view(), test.view(), Alternative::TwoSided, KsMode::Auto).unwrap();

        assert!((result.statistic - 0.5).abs() < 1e-12);
        assert_eq!(result.method, PValueMethod::Exact);
        assert!(result.p_value < 1e-6);

        let asymp = ks_2samp(reference.view(), test.view(), Alternative::TwoSided, KsMode::Asymptotic).unwrap();
        assert_eq!(asymp.method, PValueMethod::Asymptotic);
        assert!(asymp.p_value < 1e-6);
    }

    #[test]
    fn test_one_sided_direction() {
        // Test values are larger, so the reference ECDF rises first
        let reference = arr((0..40).map(|i| i as f64));
        let test = arr((20..60).map(|i| i as f64));

        let greater = ks_2samp(reference.view(), test.view(), Alternative::Greater, KsMode::Auto).unwrap();
        let less = ks_2samp(reference.view(), test.view(), Alternative::Less, KsMode::Auto).unwrap();

        assert!((greater.statistic - 0.5).abs() < 1e-12);
        assert_eq!(less.statistic, 0.0);
        assert!(greater.p_value < 0.01);
        assert_eq!(less.p_value, 1.0);
    }

    #[test]
    fn test_ties_are_consumed_together() {
        let reference = arr(vec![1.0, 1.0, 2.0, 2.0]);
        let test = arr(vec![1.0, 2.0, 2.0, 2.0]);
        let result = ks_2samp(reference.view(), test.view(), Alternative::TwoSided, KsMode::Exact).unwrap();
        // ECDFs at 1.0 are 0.5 and 0.25, equal at 2.0
        assert!((result.statistic - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_unequal_sample_sizes() {
        let reference = arr((0..30).map(|i| i as f64));
        let test = arr((0..70).map(|i| i as f64 * 0.5));
        let result = ks_2samp(reference.view(), test.view(), Alternative::TwoSided, KsMode::Auto).unwrap();
        assert!(result.statistic > 0.0 && result.statistic <= 1.0);
        assert!((0.0..=1.0).contains(&result.p_value));
    }

    #[test]
    fn test_p_values_in_unit_interval() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for trial in 0..50 {
            let n1 = rng.gen_range(1..60);
            let n2 = rng.gen_range(1..60);
            let shift = trial as f64 * 0.05;
            let a = arr((0..n1).map(|_| rng.gen::<f64>()));
            let b = arr((0..n2).map(|_| rng.gen::<f64>() + shift));
            for alt in [Alternative::TwoSided, Alternative::Less, Alternative::Greater] {
                for mode in [KsMode::Exact, KsMode::Asymptotic] {
                    let r = ks_2samp(a.view(), b.view(), alt, mode).unwrap();
                    assert!((0.0..=1.0).contains(&r.p_value), "p={} alt={alt} mode={mode:?}", r.p_value);
                    assert!((0.0..=1.0).contains(&r.statistic));
                }
            }
        }
    }

    #[test]
    fn test_empty_sample_rejected() {
        let empty = Array1::<f64>::zeros(0);
        let data = arr(vec![1.0, 2.0]);
        let err = ks_2samp(empty.view(), data.view(), Alternative::TwoSided, KsMode::Auto).unwrap_err();
        assert!(matches!(err, DriftError::InsufficientSamples(_)));
        let err = ks_2samp(data.view(), empty.view(), Alternative::TwoSided, KsMode::Auto).unwrap_err();
        assert!(matches!(err, DriftError::InsufficientSamples(_)));
    }

    #[test]
    fn test_nan_rejected() {
        let data = arr(vec![1.0, f64::NAN]);
        let other = arr(vec![1.0, 2.0]);
        assert!(ks_2samp(data.view(), other.view(), Alternative::TwoSided, KsMode::Auto).is_err());
    }

    #[test]
    fn test_alternative_parsing() {
        assert_eq!("two-sided".parse::<Alternative>().unwrap(), Alternative::TwoSided);
        assert_eq!("Greater".parse::<Alternative>().unwrap(), Alternative::Greater);
        assert_eq!("less".parse::<Alternative>().unwrap(), Alternative::Less);
        assert!(matches!(
            "sideways".parse::<Alternative>(),
            Err(DriftError::InvalidAlternative(_))
        ));
        assert_eq!(Alternative::TwoSided.to_string(), "two-sided");
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("auto".parse::<KsMode>().unwrap(), KsMode::Auto);
        assert_eq!("Exact".parse::<KsMode>().unwrap(), KsMode::Exact);
        assert_eq!("asymptotic".parse::<KsMode>().unwrap(), KsMode::Asymptotic);
        assert!(matches!(
            "bootstrap".parse::<KsMode>(),
            Err(DriftError::InvalidParameter { .. })
        ));
        for mode in [KsMode::Auto, KsMode::Exact, KsMode::Asymptotic] {
            assert_eq!(mode.to_string().parse::<KsMode>().unwrap(), mode);
        }
    }
}
