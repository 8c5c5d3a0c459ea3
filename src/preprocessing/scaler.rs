//! Feature scaling implementations

use super::Transformer;
use crate::error::{PrepError, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Standard scaling (z-score normalization): (x - mean) / std
///
/// Statistics use the population variance and only finite values; `NaN` and
/// infinities pass through `transform` unchanged. Columns with zero variance
/// are divided by 1.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    with_mean: bool,
    with_std: bool,
    mean: Option<Array1<f64>>,
    scale: Option<Array1<f64>>,
}

impl StandardScaler {
    /// Create a scaler that centers and scales
    pub fn new() -> Self {
        Self {
            with_mean: true,
            with_std: true,
            mean: None,
            scale: None,
        }
    }

    /// Create a scaler that only divides by the standard deviation.
    /// Used on one-hot output, where centering would destroy sparsity.
    pub fn without_mean() -> Self {
        Self {
            with_mean: false,
            ..Self::new()
        }
    }

    pub fn with_mean(&self) -> bool {
        self.with_mean
    }

    pub fn with_std(&self) -> bool {
        self.with_std
    }

    /// Builder method to toggle division by the standard deviation
    pub fn set_with_std(mut self, with_std: bool) -> Self {
        self.with_std = with_std;
        self
    }

    /// Per-column mean learned by `fit`
    pub fn mean(&self) -> Option<&Array1<f64>> {
        self.mean.as_ref()
    }

    /// Per-column scale learned by `fit`
    pub fn scale(&self) -> Option<&Array1<f64>> {
        self.scale.as_ref()
    }

    /// Undo the scaling
    pub fn inverse_transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (mean, scale) = self.fitted_params(x)?;

        let mut result = x.clone();
        for ((mut column, &m), &s) in result
            .axis_iter_mut(Axis(1))
            .zip(mean.iter())
            .zip(scale.iter())
        {
            column.mapv_inplace(|v| {
                let v = if self.with_std { v * s } else { v };
                if self.with_mean { v + m } else { v }
            });
        }
        Ok(result)
    }

    fn fitted_params(&self, x: &Array2<f64>) -> Result<(&Array1<f64>, &Array1<f64>)> {
        let (mean, scale) = match (&self.mean, &self.scale) {
            (Some(mean), Some(scale)) => (mean, scale),
            _ => return Err(PrepError::ModelNotFitted),
        };
        if x.ncols() != mean.len() {
            return Err(PrepError::ShapeError {
                expected: format!("{} columns", mean.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }
        Ok((mean, scale))
    }

    fn compute_params(column: ArrayView1<f64>) -> (f64, f64) {
        let finite: Vec<f64> = column.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return (0.0, 1.0);
        }

        let n = finite.len() as f64;
        let mean = finite.iter().sum::<f64>() / n;
        let var = finite.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        let std = var.sqrt();

        (mean, if std == 0.0 { 1.0 } else { std })
    }
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformer<Array2<f64>> for StandardScaler {
    type Output = Array2<f64>;

    fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        let (mean, scale): (Vec<f64>, Vec<f64>) =
            x.axis_iter(Axis(1)).map(Self::compute_params).unzip();

        self.mean = Some(Array1::from(mean));
        self.scale = Some(Array1::from(scale));
        Ok(self)
    }

    fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (mean, scale) = self.fitted_params(x)?;

        let mut result = x.clone();
        for ((mut column, &m), &s) in result
            .axis_iter_mut(Axis(1))
            .zip(mean.iter())
            .zip(scale.iter())
        {
            column.mapv_inplace(|v| {
                let v = if self.with_mean { v - m } else { v };
                if self.with_std { v / s } else { v }
            });
        }
        Ok(result)
    }
}
