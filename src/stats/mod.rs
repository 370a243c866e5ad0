//! Statistical primitives for drift detection
//!
//! Two-sample Kolmogorov-Smirnov test with exact and asymptotic null
//! distributions, plus the multiple-comparison corrections used to turn
//! feature-wise p-values into a single verdict.

mod correction;
mod distribution;
mod ks;

pub use correction::{benjamini_hochberg, bonferroni, fdr, Correction};
pub use distribution::{exact_sf, kolmogorov_sf, smirnov_one_sided_sf};
pub use ks::{ks_2samp, Alternative, KsMode, KsResult, PValueMethod, EXACT_MAX_PRODUCT};
