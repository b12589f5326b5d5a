// src/data_analysis/regression.rs

use serde::Serialize;

use crate::error::{ensure_same_len, ReductionError, ReductionResult};

/// Ordinary least-squares line y = slope * x + intercept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation coefficient r.
    pub r_value: f64,
    /// Standard error of the slope.
    pub slope_stderr: f64,
    /// Standard error of the intercept.
    pub intercept_stderr: f64,
    /// sqrt(SSR / (n - 2)); the residual standard uncertainty of y.
    pub residual_std: f64,
    pub n: usize,
}

impl LinearFit {
    pub fn r_squared(&self) -> f64 {
        self.r_value * self.r_value
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    pub fn residuals(&self, x: &[f64], y: &[f64]) -> ReductionResult<Vec<f64>> {
        ensure_same_len("residuals", x.len(), y.len())?;
        Ok(x.iter().zip(y).map(|(&xi, &yi)| yi - self.predict(xi)).collect())
    }

    /// Fitted line sampled at `n` evenly spaced x values over [x_min, x_max].
    pub fn line_points(&self, x_min: f64, x_max: f64, n: usize) -> Vec<(f64, f64)> {
        let n = n.max(2);
        let step = (x_max - x_min) / (n - 1) as f64;
        (0..n)
            .map(|i| {
                let x = x_min + step * i as f64;
                (x, self.predict(x))
            })
            .collect()
    }
}

/// Least-squares fit of `y` against `x`.
pub fn linear_regression(x: &[f64], y: &[f64]) -> ReductionResult<LinearFit> {
    ensure_same_len("linear regression", x.len(), y.len())?;
    let n = x.len();
    if n < 2 {
        return Err(ReductionError::shape(format!(
            "linear regression needs at least 2 points, got {n}"
        )));
    }

    let n_f = n as f64;
    let x_mean = x.iter().sum::<f64>() / n_f;
    let y_mean = y.iter().sum::<f64>() / n_f;

    let mut ssxm = 0.0;
    let mut ssym = 0.0;
    let mut ssxym = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        let dy = yi - y_mean;
        ssxm += dx * dx;
        ssym += dy * dy;
        ssxym += dx * dy;
    }

    if ssxm == 0.0 {
        return Err(ReductionError::domain(
            "linear regression is undefined when all x values are identical",
        ));
    }

    let slope = ssxym / ssxm;
    let intercept = y_mean - slope * x_mean;

    let r_value = if ssym == 0.0 {
        0.0
    } else {
        (ssxym / (ssxm * ssym).sqrt()).clamp(-1.0, 1.0)
    };

    let (slope_stderr, intercept_stderr, residual_std) = if n == 2 {
        (0.0, 0.0, 0.0)
    } else {
        let df = n_f - 2.0;
        let ssr = (ssym - slope * ssxym).max(0.0);
        let residual_std = (ssr / df).sqrt();
        let slope_stderr = ((1.0 - r_value * r_value) * ssym / ssxm / df).max(0.0).sqrt();
        let x_sq_mean = x.iter().map(|v| v * v).sum::<f64>() / n_f;
        let intercept_stderr = slope_stderr * x_sq_mean.sqrt();
        (slope_stderr, intercept_stderr, residual_std)
    };

    Ok(LinearFit {
        slope,
        intercept,
        r_value,
        slope_stderr,
        intercept_stderr,
        residual_std,
        n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn perfect_line_round_trip() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
        let fit = linear_regression(&x, &y).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.r_squared() - 1.0).abs() < 1e-12);
        assert!(fit.slope_stderr.abs() < 1e-12);
        assert!(fit.residual_std.abs() < 1e-12);
    }

    #[test]
    fn noisy_line_standard_errors() {
        // Hand-checked: x = 0..4, y = [0, 1, 1, 3, 4]
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [0.0, 1.0, 1.0, 3.0, 4.0];
        let fit = linear_regression(&x, &y).unwrap();
        // ssxm = 10, ssxym = 10, ssym = 10.8
        assert!((fit.slope - 1.0).abs() < 1e-12);
        assert!((fit.intercept - (1.8 - 2.0)).abs() < 1e-12);
        let ssr: f64 = 10.8 - 10.0;
        assert!((fit.residual_std - (ssr / 3.0).sqrt()).abs() < 1e-12);
        assert!((fit.slope_stderr - (ssr / 3.0 / 10.0).sqrt()).abs() < 1e-12);
        assert!((fit.r_value - 10.0 / (10.0f64 * 10.8).sqrt()).abs() < 1e-12);
        let residuals = fit.residuals(&x, &y).unwrap();
        assert!(residuals.iter().sum::<f64>().abs() < 1e-12);
    }

    #[test]
    fn negative_slope_gives_negative_r() {
        let fit = linear_regression(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap();
        assert!((fit.r_value + 1.0).abs() < 1e-12);
    }

    #[test]
    fn two_points_have_zero_stderr() {
        let fit = linear_regression(&[0.0, 1.0], &[1.0, 3.0]).unwrap();
        assert_eq!(fit.slope, 2.0);
        assert_eq!(fit.slope_stderr, 0.0);
    }

    #[test]
    fn invalid_inputs() {
        assert_eq!(
            linear_regression(&[1.0, 2.0], &[1.0]).unwrap_err().kind(),
            ErrorKind::Shape
        );
        assert_eq!(linear_regression(&[1.0], &[1.0]).unwrap_err().kind(), ErrorKind::Shape);
        assert_eq!(
            linear_regression(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0])
                .unwrap_err()
                .kind(),
            ErrorKind::Domain
        );
    }

    #[test]
    fn line_points_span_requested_range() {
        let fit = linear_regression(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]).unwrap();
        let pts = fit.line_points(0.0, 10.0, 11);
        assert_eq!(pts.len(), 11);
        assert_eq!(pts[0], (0.0, 1.0));
        assert!((pts[10].1 - 21.0).abs() < 1e-12);
    }
}
