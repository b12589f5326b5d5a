// src/data_analysis/physical_models.rs
//
// Closed-form models used by the laboratory reductions.
// All functions are pure; invalid inputs are reported as domain errors.

use serde::{Deserialize, Serialize};

use crate::error::{ReductionError, ReductionResult};

/// Offset between the Celsius and Kelvin scales.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Thermistor model T = 1 / (A + B ln R + C (ln R)^3), R in ohms, T in kelvin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteinhartHart {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl SteinhartHart {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    fn denominator(&self, resistance: f64) -> ReductionResult<(f64, f64)> {
        if !(resistance > 0.0) || !resistance.is_finite() {
            return Err(ReductionError::domain(format!(
                "Steinhart-Hart needs a positive resistance, got {resistance}"
            )));
        }
        let ln_r = resistance.ln();
        let denom = self.a + self.b * ln_r + self.c * ln_r.powi(3);
        if denom <= 0.0 {
            return Err(ReductionError::domain(format!(
                "Steinhart-Hart gives a non-positive temperature at R = {resistance}"
            )));
        }
        Ok((denom, ln_r))
    }

    pub fn temperature(&self, resistance: f64) -> ReductionResult<f64> {
        self.denominator(resistance).map(|(denom, _)| 1.0 / denom)
    }

    pub fn temperatures(&self, resistances: &[f64]) -> ReductionResult<Vec<f64>> {
        resistances.iter().map(|&r| self.temperature(r)).collect()
    }

    /// dT/dR = -T^2 (B + 3C (ln R)^2) / R
    pub fn temperature_derivative(&self, resistance: f64) -> ReductionResult<f64> {
        let (denom, ln_r) = self.denominator(resistance)?;
        let t = 1.0 / denom;
        Ok(-t * t * (self.b + 3.0 * self.c * ln_r * ln_r) / resistance)
    }
}

/// Ohm's law R = V / I.
pub fn ohmic_resistance(voltage: f64, current: f64) -> ReductionResult<f64> {
    if current == 0.0 || !current.is_finite() {
        return Err(ReductionError::domain(format!(
            "resistance undefined for current {current}"
        )));
    }
    Ok(voltage / current)
}

/// 1 / r^2 for a source-detector distance r.
pub fn inverse_square(distance: f64) -> ReductionResult<f64> {
    if !(distance > 0.0) || !distance.is_finite() {
        return Err(ReductionError::domain(format!(
            "inverse-square needs a positive distance, got {distance}"
        )));
    }
    Ok(1.0 / (distance * distance))
}

/// T^4 for an absolute temperature.
pub fn fourth_power(temperature: f64) -> ReductionResult<f64> {
    if temperature < 0.0 || !temperature.is_finite() {
        return Err(ReductionError::domain(format!(
            "absolute temperature must be non-negative, got {temperature}"
        )));
    }
    Ok(temperature.powi(4))
}

pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    celsius + KELVIN_OFFSET
}

/// Rounds to the nearest multiple of `step` (e.g. 0.1 K).
pub fn round_to_resolution(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    (value / step).round() * step
}

/// Elementwise application of a fallible scalar model.
pub fn map_elementwise<F>(values: &[f64], model: F) -> ReductionResult<Vec<f64>>
where
    F: Fn(f64) -> ReductionResult<f64>,
{
    values.iter().map(|&v| model(v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const SH: SteinhartHart = SteinhartHart {
        a: 8.467428050163e-4,
        b: 2.058325204985e-4,
        c: 9.050118014518e-8,
    };

    #[test]
    fn steinhart_hart_matches_thermistor_table() {
        // 2041.7 ohm is listed at 134 C, 79422 ohm at 30 C.
        let hot = SH.temperature(2041.7).unwrap();
        let cold = SH.temperature(79422.0).unwrap();
        assert!((hot - celsius_to_kelvin(134.0)).abs() < 1.0, "hot = {}", hot);
        assert!((cold - celsius_to_kelvin(30.0)).abs() < 1.0, "cold = {}", cold);
    }

    #[test]
    fn steinhart_hart_rejects_non_positive_resistance() {
        assert_eq!(SH.temperature(0.0).unwrap_err().kind(), ErrorKind::Domain);
        assert_eq!(SH.temperature(-5.0).unwrap_err().kind(), ErrorKind::Domain);
        assert!(SH.temperatures(&[1000.0, -1.0]).is_err());
    }

    #[test]
    fn steinhart_hart_derivative_matches_finite_difference() {
        let r = 5000.0;
        let h = 1e-3;
        let numeric = (SH.temperature(r + h).unwrap() - SH.temperature(r - h).unwrap()) / (2.0 * h);
        let analytic = SH.temperature_derivative(r).unwrap();
        assert!(analytic < 0.0);
        assert!((numeric - analytic).abs() < 1e-8);
    }

    #[test]
    fn simple_models() {
        assert!((ohmic_resistance(2.0, 1.41).unwrap() - 1.4184397).abs() < 1e-6);
        assert_eq!(ohmic_resistance(1.0, 0.0).unwrap_err().kind(), ErrorKind::Domain);
        assert_eq!(inverse_square(4.0).unwrap(), 0.0625);
        assert_eq!(inverse_square(0.0).unwrap_err().kind(), ErrorKind::Domain);
        assert_eq!(fourth_power(10.0).unwrap(), 10_000.0);
        assert!(fourth_power(-1.0).is_err());
    }

    #[test]
    fn rounding_to_resolution() {
        assert!((round_to_resolution(404.3449, 0.1) - 404.3).abs() < 1e-9);
        assert!((round_to_resolution(404.36, 0.1) - 404.4).abs() < 1e-9);
        assert_eq!(round_to_resolution(3.3, 0.0), 3.3);
    }
}
