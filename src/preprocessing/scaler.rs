//! Feature standardization
//!
//! Centers each feature column to zero mean and scales it to unit variance.
//! Operates on the extracted matrix rather than the frame, since it runs
//! after feature selection.

use crate::error::{BenchError, Result};
use ndarray::{Array1, Array2, Axis};

/// Z-score standardizer over matrix columns
#[derive(Debug, Clone, Default)]
pub struct StandardScaler {
    means: Option<Array1<f64>>,
    scales: Option<Array1<f64>>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute per-column mean and standard deviation
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        if x.nrows() == 0 {
            return Err(BenchError::Preprocessing(
                "cannot fit scaler on an empty matrix".to_string(),
            ));
        }

        let means = x.mean_axis(Axis(0)).ok_or_else(|| {
            BenchError::Preprocessing("failed to compute column means".to_string())
        })?;
        let stds = x.std_axis(Axis(0), 0.0);

        // Constant columns keep a unit divisor so they map to zero
        let scales = stds.mapv(|s| if s == 0.0 { 1.0 } else { s });

        self.means = Some(means);
        self.scales = Some(scales);
        Ok(self)
    }

    /// Apply the fitted standardization
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (means, scales) = match (&self.means, &self.scales) {
            (Some(m), Some(s)) => (m, s),
            _ => return Err(BenchError::NotFitted),
        };
        if x.ncols() != means.len() {
            return Err(BenchError::Shape {
                expected: format!("{} columns", means.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }

        let mut out = x.clone();
        for (j, mut col) in out.axis_iter_mut(Axis(1)).enumerate() {
            col.mapv_inplace(|v| (v - means[j]) / scales[j]);
        }
        Ok(out)
    }

    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Fitted column means
    pub fn means(&self) -> Option<&Array1<f64>> {
        self.means.as_ref()
    }

    /// Fitted column scales (standard deviations, zero replaced by one)
    pub fn scales(&self) -> Option<&Array1<f64>> {
        self.scales.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_standardized_columns_have_zero_mean_unit_variance() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]];
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x).unwrap();

        for col in scaled.axis_iter(Axis(1)) {
            let mean = col.mean().unwrap();
            let std = col.std(0.0);
            assert!(mean.abs() < 1e-10);
            assert!((std - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_constant_column_maps_to_zero() {
        let x = array![[5.0], [5.0], [5.0]];
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x).unwrap();
        assert!(scaled.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_transform_requires_fit() {
        let scaler = StandardScaler::new();
        let x = array![[1.0]];
        assert!(matches!(scaler.transform(&x), Err(BenchError::NotFitted)));
    }

    #[test]
    fn test_column_mismatch_is_shape_error() {
        let mut scaler = StandardScaler::new();
        scaler.fit(&array![[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let result = scaler.transform(&array![[1.0], [2.0]]);
        assert!(matches!(result, Err(BenchError::Shape { .. })));
    }
}
