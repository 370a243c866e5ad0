//! Feature scaling fitted on the reference set

use crate::error::{DriftError, Result};
use crate::preprocessing::Preprocessor;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Type of scaler to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalerType {
    /// Standard scaling (z-score normalization): (x - mean) / std
    Standard,
    /// Min-Max scaling: (x - min) / (max - min)
    MinMax,
}

/// Column-wise scaler
///
/// KS statistics are invariant under monotone transforms of a single
/// column, so scaling matters when it feeds a later reducer in a
/// [`Pipeline`](crate::preprocessing::Pipeline).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    scaler_type: ScalerType,
    center: Array1<f64>,
    scale: Array1<f64>,
}

impl Scaler {
    /// Fit scaling parameters on reference data
    pub fn fit(x: ArrayView2<'_, f64>, scaler_type: ScalerType) -> Result<Self> {
        if x.nrows() == 0 {
            return Err(DriftError::InsufficientSamples(
                "scaler needs at least one instance".to_string(),
            ));
        }

        let (center, scale) = match scaler_type {
            ScalerType::Standard => {
                let mean = x.mean_axis(Axis(0)).ok_or_else(|| {
                    DriftError::InsufficientSamples("empty reference".to_string())
                })?;
                let ddof = if x.nrows() > 1 { 1.0 } else { 0.0 };
                let std = x.std_axis(Axis(0), ddof);
                (mean, std)
            }
            ScalerType::MinMax => {
                let min = x.fold_axis(Axis(0), f64::INFINITY, |&acc, &v| acc.min(v));
                let max = x.fold_axis(Axis(0), f64::NEG_INFINITY, |&acc, &v| acc.max(v));
                let range = &max - &min;
                (min, range)
            }
        };

        // Constant columns are passed through centred
        let scale = scale.mapv(|s| if s == 0.0 || !s.is_finite() { 1.0 } else { s });

        Ok(Self {
            scaler_type,
            center,
            scale,
        })
    }

    pub fn scaler_type(&self) -> ScalerType {
        self.scaler_type
    }
}

impl Preprocessor for Scaler {
    fn transform(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.center.len() {
            return Err(DriftError::DimensionMismatch {
                expected: self.center.len(),
                actual: x.ncols(),
            });
        }
        Ok((&x - &self.center) / &self.scale)
    }

    fn name(&self) -> &str {
        match self.scaler_type {
            ScalerType::Standard => "standard-scaler",
            ScalerType::MinMax => "minmax-scaler",
        }
    }
}
