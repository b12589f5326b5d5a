// src/data_analysis/uncertainty.rs
//
// Standard uncertainties (GUM style): resolution (Type B, uniform),
// repeatability (Type A), root-sum-square combination, first-order
// propagation and coverage factors.

use std::f64::consts::SQRT_2;
use std::fmt;

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use statrs::function::erf::erf;

use crate::error::{ensure_same_len, ReductionError, ReductionResult};

/// Standard uncertainty of a reading limited by display resolution,
/// assuming a uniform distribution over one resolution step.
pub fn resolution_uncertainty(resolution: f64) -> ReductionResult<f64> {
    if !(resolution > 0.0) || !resolution.is_finite() {
        return Err(ReductionError::domain(format!(
            "instrument resolution must be positive, got {resolution}"
        )));
    }
    Ok(resolution / 12f64.sqrt())
}

/// Divisor used for the standard deviation of repeated readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StdDevEstimator {
    /// n - 1
    #[default]
    Sample,
    /// n
    Population,
}

impl StdDevEstimator {
    fn ddof(self) -> f64 {
        match self {
            StdDevEstimator::Sample => 1.0,
            StdDevEstimator::Population => 0.0,
        }
    }
}

pub fn mean(samples: &[f64]) -> ReductionResult<f64> {
    ArrayView1::from(samples)
        .mean()
        .ok_or_else(|| ReductionError::shape("mean of an empty sample"))
}

pub fn std_dev(samples: &[f64], estimator: StdDevEstimator) -> ReductionResult<f64> {
    let min_len = match estimator {
        StdDevEstimator::Sample => 2,
        StdDevEstimator::Population => 1,
    };
    if samples.len() < min_len {
        return Err(ReductionError::shape(format!(
            "{:?} standard deviation needs at least {} readings, got {}",
            estimator,
            min_len,
            samples.len()
        )));
    }
    Ok(ArrayView1::from(samples).std(estimator.ddof()))
}

/// Type A uncertainty of the mean: s / sqrt(n).
pub fn type_a_uncertainty(samples: &[f64], estimator: StdDevEstimator) -> ReductionResult<f64> {
    let s = std_dev(samples, estimator)?;
    Ok(s / (samples.len() as f64).sqrt())
}

/// Root-sum-square of independent standard uncertainties.
pub fn combined_uncertainty(components: &[f64]) -> ReductionResult<f64> {
    if let Some(bad) = components.iter().find(|u| !(**u >= 0.0) || !u.is_finite()) {
        return Err(ReductionError::domain(format!(
            "uncertainty components must be finite and non-negative, got {bad}"
        )));
    }
    Ok(components.iter().map(|u| u * u).sum::<f64>().sqrt())
}

/// One input of a first-order propagation: ∂f/∂x_i and u(x_i).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sensitivity {
    pub coefficient: f64,
    pub uncertainty: f64,
}

impl Sensitivity {
    pub fn new(coefficient: f64, uncertainty: f64) -> Self {
        Self {
            coefficient,
            uncertainty,
        }
    }
}

/// Delta method with uncorrelated inputs: sqrt(Σ (c_i u_i)^2).
pub fn propagate(terms: &[Sensitivity]) -> ReductionResult<f64> {
    let contributions: Vec<f64> = terms
        .iter()
        .map(|t| (t.coefficient * t.uncertainty).abs())
        .collect();
    combined_uncertainty(&contributions)
}

/// Delta method with partial derivatives from central differences.
pub fn propagate_numeric<F>(f: F, x: &[f64], u: &[f64]) -> ReductionResult<f64>
where
    F: Fn(&[f64]) -> ReductionResult<f64>,
{
    ensure_same_len("propagation inputs", x.len(), u.len())?;
    let step_scale = f64::EPSILON.cbrt();
    let mut point = x.to_vec();
    let mut terms = Vec::with_capacity(x.len());
    for i in 0..x.len() {
        let h = if x[i] != 0.0 {
            x[i].abs() * step_scale
        } else {
            step_scale
        };
        point[i] = x[i] + h;
        let upper = f(&point)?;
        point[i] = x[i] - h;
        let lower = f(&point)?;
        point[i] = x[i];
        terms.push(Sensitivity::new((upper - lower) / (2.0 * h), u[i]));
    }
    propagate(&terms)
}

/// Multiplier from standard to expanded uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageFactor(pub f64);

impl Default for CoverageFactor {
    fn default() -> Self {
        CoverageFactor(2.0)
    }
}

impl CoverageFactor {
    /// Two-sided normal coverage factor for a confidence level in (0, 1).
    pub fn for_confidence(level: f64) -> ReductionResult<Self> {
        if !(level > 0.0 && level < 1.0) {
            return Err(ReductionError::domain(format!(
                "confidence level must lie in (0, 1), got {level}"
            )));
        }
        let standard = Normal::new(0.0, 1.0)
            .map_err(|e| ReductionError::domain(format!("standard normal: {e}")))?;
        Ok(CoverageFactor(standard.inverse_cdf(0.5 * (1.0 + level))))
    }

    /// Two-sided normal confidence level reached by this factor.
    pub fn confidence(self) -> f64 {
        erf(self.0 / SQRT_2)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

pub fn expanded(uncertainty: f64, k: CoverageFactor) -> f64 {
    k.0 * uncertainty
}

/// A derived value with its standard uncertainty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measured {
    pub value: f64,
    pub uncertainty: f64,
    pub unit: String,
}

impl Measured {
    pub fn new(value: f64, uncertainty: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            uncertainty,
            unit: unit.into(),
        }
    }

    pub fn expanded(&self, k: CoverageFactor) -> Measured {
        Measured::new(self.value, expanded(self.uncertainty, k), self.unit.clone())
    }

    /// u / |value|, or None for a zero value.
    pub fn relative_uncertainty(&self) -> Option<f64> {
        if self.value == 0.0 {
            None
        } else {
            Some(self.uncertainty / self.value.abs())
        }
    }
}

impl fmt::Display for Measured {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.value.abs().max(self.uncertainty.abs());
        let body = if magnitude != 0.0 && !(1e-3..1e5).contains(&magnitude) {
            format!("{:.3e} ± {:.2e}", self.value, self.uncertainty)
        } else {
            format!("{:.4} ± {:.4}", self.value, self.uncertainty)
        };
        if self.unit.is_empty() {
            write!(f, "{body}")
        } else {
            write!(f, "{body} {}", self.unit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use statrs::assert_almost_eq;

    #[test]
    fn resolution_uncertainty_is_uniform_width_over_sqrt12() {
        let u = resolution_uncertainty(0.1).unwrap();
        assert_eq!(u, 0.1 / 12f64.sqrt());
        assert!((u - 0.028_867_5).abs() < 1e-6);
        for r in [1e-9, 0.01, 0.5, 3.0] {
            assert_eq!(resolution_uncertainty(r).unwrap(), r / 12f64.sqrt());
        }
        assert_eq!(resolution_uncertainty(0.0).unwrap_err().kind(), ErrorKind::Domain);
    }

    #[test]
    fn type_a_of_constant_sample_is_zero() {
        let u = type_a_uncertainty(&[21.3; 8], StdDevEstimator::Sample).unwrap();
        assert_eq!(u, 0.0);
    }

    #[test]
    fn type_a_is_std_over_sqrt_n() {
        let samples = [6.2, 6.5, 6.4, 6.4, 6.4, 6.4, 6.4, 6.6];
        let n = samples.len() as f64;
        let m = samples.iter().sum::<f64>() / n;
        let s = (samples.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();
        let u = type_a_uncertainty(&samples, StdDevEstimator::Sample).unwrap();
        assert!((u - s / n.sqrt()).abs() < 1e-12);

        let s_pop = (samples.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n).sqrt();
        let u_pop = type_a_uncertainty(&samples, StdDevEstimator::Population).unwrap();
        assert!((u_pop - s_pop / n.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn type_a_needs_enough_readings() {
        assert_eq!(
            type_a_uncertainty(&[1.0], StdDevEstimator::Sample).unwrap_err().kind(),
            ErrorKind::Shape
        );
        assert!(type_a_uncertainty(&[], StdDevEstimator::Population).is_err());
    }

    #[test]
    fn combined_is_root_sum_square_and_symmetric() {
        let a = combined_uncertainty(&[0.3, 0.4]).unwrap();
        let b = combined_uncertainty(&[0.4, 0.3]).unwrap();
        assert!((a - 0.5).abs() < 1e-15);
        assert_eq!(a, b);
        assert!(combined_uncertainty(&[-0.1]).is_err());
    }

    #[test]
    fn numeric_propagation_matches_analytic_for_a_ratio() {
        // c = d / t with the speed-of-light magnitudes.
        let (d, t) = (19.32, 218.5e-9);
        let (u_d, u_t) = (0.0144, 2.9e-11);
        let analytic = propagate(&[
            Sensitivity::new(1.0 / t, u_d),
            Sensitivity::new(-d / (t * t), u_t),
        ])
        .unwrap();
        let numeric = propagate_numeric(|x| Ok(x[0] / x[1]), &[d, t], &[u_d, u_t]).unwrap();
        assert!((numeric - analytic).abs() / analytic < 1e-6);
    }

    #[test]
    fn coverage_factors_for_common_levels() {
        let k95 = CoverageFactor::for_confidence(0.95).unwrap();
        assert_almost_eq!(k95.value(), 1.959_963_984_540_054, 1e-9);
        let k99 = CoverageFactor::for_confidence(0.99).unwrap();
        assert_almost_eq!(k99.value(), 2.575_829_303_548_901, 1e-9);
        assert_almost_eq!(CoverageFactor(2.0).confidence(), 0.954_499_736_103_642, 1e-12);
        // Quantile and confidence invert each other.
        assert_almost_eq!(k95.confidence(), 0.95, 1e-12);
        assert!(CoverageFactor::for_confidence(1.0).is_err());
        assert_eq!(expanded(0.5, CoverageFactor(2.0)), 1.0);
    }

    #[test]
    fn measured_display_and_relative() {
        let m = Measured::new(2.0, 0.1, "V");
        assert_eq!(m.to_string(), "2.0000 ± 0.1000 V");
        assert!((m.relative_uncertainty().unwrap() - 0.05).abs() < 1e-12);
        let c = Measured::new(2.9e8, 2.0e6, "m/s");
        assert_eq!(c.to_string(), "2.900e8 ± 2.00e6 m/s");
        assert_eq!(m.expanded(CoverageFactor(2.0)).uncertainty, 0.2);
    }
}
