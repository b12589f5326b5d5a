// src/experiments/stefan_boltzmann.rs
//
// Tungsten filament: temperature from the resistance ratio through the
// manufacturer table, then radiance against T^4.

use log::{debug, info};

use crate::data_analysis::derivative::gradient;
use crate::data_analysis::interpolation::{InterpolationKind, Interpolator};
use crate::data_analysis::physical_models::{fourth_power, ohmic_resistance};
use crate::data_analysis::regression::{linear_regression, LinearFit};
use crate::data_analysis::uncertainty::{
    expanded, propagate, resolution_uncertainty, CoverageFactor, Measured, Sensitivity,
};
use crate::data_input::config::StefanBoltzmannConfig;
use crate::data_input::measurement::CalibrationTable;
use crate::error::{ensure_same_len, ReductionResult};
use crate::experiments::{check_linearity, fit_line_series};
use crate::report::{
    ChartSeries, ChartSpec, ExperimentReport, NamedFit, ReportLine, ReportSection, SeriesKind,
};

/// One operating point of the lamp.
#[derive(Debug, Clone, PartialEq)]
pub struct LampPoint {
    pub voltage_v: f64,
    pub current_a: f64,
    pub resistance: Measured,
    /// R / R_ref
    pub relative_resistance: Measured,
    pub temperature: Measured,
    pub fourth_power: Measured,
    pub radiance_mv: f64,
    /// Tabulated tungsten resistivity at the filament temperature, µΩ·cm.
    pub resistivity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StefanBoltzmannResult {
    pub points: Vec<LampPoint>,
    pub table_relative_resistance: Vec<f64>,
    pub table_temperature_k: Vec<f64>,
    pub u_voltmeter_v: f64,
    pub u_ammeter_a: f64,
    pub u_radiometer_mv: f64,
    pub coverage_factor: CoverageFactor,
    pub fit: LinearFit,
}

impl StefanBoltzmannResult {
    pub fn fourth_powers(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.fourth_power.value).collect()
    }
}

pub fn analyze(config: &StefanBoltzmannConfig) -> ReductionResult<StefanBoltzmannResult> {
    ensure_same_len("voltages/currents", config.voltages_v.len(), config.currents_a.len())?;
    ensure_same_len(
        "voltages/radiance",
        config.voltages_v.len(),
        config.radiance_mv.len(),
    )?;

    let u_voltmeter_v = resolution_uncertainty(config.voltmeter.resolution)?;
    let u_ammeter_a = resolution_uncertainty(config.ammeter.resolution)?;
    let u_radiometer_mv = resolution_uncertainty(config.radiometer.resolution)?;

    let table_relative_resistance: Vec<f64> = config
        .tungsten_table
        .iter()
        .map(|row| row.relative_resistance)
        .collect();
    let table_temperature_k: Vec<f64> = config
        .tungsten_table
        .iter()
        .map(|row| row.temperature_k)
        .collect();
    let table_resistivity: Vec<f64> = config
        .tungsten_table
        .iter()
        .map(|row| row.resistivity)
        .collect();

    let conversion = Interpolator::new(
        &CalibrationTable::new(table_relative_resistance.clone(), table_temperature_k.clone())?,
        config.calibration,
        config.extrapolation,
    )
    .map_err(|e| e.context("tungsten table"))?;

    // dT/d(R/R_ref) from the table itself, interpolated like the conversion.
    let table_slope = gradient(&table_relative_resistance, &table_temperature_k)?;
    let slope_curve = Interpolator::new(
        &CalibrationTable::new(table_relative_resistance.clone(), table_slope)?,
        config.calibration,
        config.extrapolation,
    )?;
    let resistivity_curve = Interpolator::new(
        &CalibrationTable::new(table_temperature_k.clone(), table_resistivity)?,
        InterpolationKind::Linear,
        config.extrapolation,
    )?;

    let r_ref = config.reference_resistance_ohm;
    let mut points = Vec::with_capacity(config.voltages_v.len());
    for ((&v, &i), &radiance) in config
        .voltages_v
        .iter()
        .zip(&config.currents_a)
        .zip(&config.radiance_mv)
    {
        let resistance =
            ohmic_resistance(v, i).map_err(|e| e.context(format!("point at {v} V")))?;
        let u_resistance = propagate(&[
            Sensitivity::new(1.0 / i, u_voltmeter_v),
            Sensitivity::new(-v / (i * i), u_ammeter_a),
        ])?;

        let relative = resistance / r_ref;
        let u_relative = u_resistance / r_ref;
        let temperature = conversion
            .evaluate(relative)
            .map_err(|e| e.context(format!("temperature at {v} V")))?;
        let slope = slope_curve.evaluate(relative)?;
        let spline_slope = conversion.derivative(relative)?;
        debug!(
            "{v} V: R/R_ref = {relative:.4}, T = {temperature:.1} K, \
             dT/dR_rel = {slope:.2} (table), {spline_slope:.2} (spline)"
        );
        let u_temperature = propagate(&[Sensitivity::new(slope, u_relative)])?;

        let t4 = fourth_power(temperature).map_err(|e| e.context(format!("T^4 at {v} V")))?;
        let u_t4 = propagate(&[Sensitivity::new(4.0 * temperature.powi(3), u_temperature)])?;

        points.push(LampPoint {
            voltage_v: v,
            current_a: i,
            resistance: Measured::new(resistance, u_resistance, "Ω"),
            relative_resistance: Measured::new(relative, u_relative, ""),
            temperature: Measured::new(temperature, u_temperature, "K"),
            fourth_power: Measured::new(t4, u_t4, "K^4"),
            radiance_mv: radiance,
            resistivity: resistivity_curve.evaluate(temperature)?,
        });
    }

    let t4: Vec<f64> = points.iter().map(|p| p.fourth_power.value).collect();
    let fit = linear_regression(&t4, &config.radiance_mv)?;
    check_linearity("Stefan-Boltzmann", "radiance vs T^4", &fit);
    info!(
        "Stefan-Boltzmann: slope = {:.3e} mV/K^4, R^2 = {:.4}",
        fit.slope,
        fit.r_squared()
    );

    Ok(StefanBoltzmannResult {
        points,
        table_relative_resistance,
        table_temperature_k,
        u_voltmeter_v,
        u_ammeter_a,
        u_radiometer_mv,
        coverage_factor: config.coverage_factor,
        fit,
    })
}

pub fn to_report(result: &StefanBoltzmannResult) -> ReductionResult<ExperimentReport> {
    let mut report = ExperimentReport::new(
        "stefan_boltzmann",
        "Stefan-Boltzmann law (tungsten filament)",
    );
    let k = result.coverage_factor;

    let mut resolution = ReportSection::new("Resolution uncertainties");
    resolution.push(ReportLine::scalar("u_res(voltmeter)", result.u_voltmeter_v, "V"));
    resolution.push(ReportLine::scalar("u_res(ammeter)", result.u_ammeter_a, "A"));
    resolution.push(ReportLine::scalar("u_res(radiometer)", result.u_radiometer_mv, "mV"));
    report.sections.push(resolution);

    let mut filament = ReportSection::new("Filament");
    for p in &result.points {
        let at = format!("{} V", p.voltage_v);
        filament.push(ReportLine::measured(format!("R @ {at}"), &p.resistance));
        filament.push(ReportLine::measured(format!("R/R_ref @ {at}"), &p.relative_resistance));
        filament.push(ReportLine::measured(format!("T @ {at}"), &p.temperature));
        filament.push(ReportLine::measured(format!("T^4 @ {at}"), &p.fourth_power));
        filament.push(ReportLine::scalar(format!("ρ @ {at}"), p.resistivity, "µΩ·cm"));
    }
    report.sections.push(filament);

    let mut coverage = ReportSection::new("Expanded uncertainties");
    coverage.push(ReportLine::scalar("k", k.value(), ""));
    coverage.push(ReportLine::scalar("confidence level", k.confidence(), ""));
    coverage.push(ReportLine::scalar(
        "U(radiance)",
        expanded(result.u_radiometer_mv, k),
        "mV",
    ));
    for p in &result.points {
        coverage.push(ReportLine::measured(
            format!("T^4 @ {} V", p.voltage_v),
            &p.fourth_power.expanded(k),
        ));
    }
    report.sections.push(coverage);

    report.fits.push(NamedFit {
        label: "Radiance vs T^4".to_string(),
        x_unit: "K^4".to_string(),
        y_unit: "mV".to_string(),
        fit: result.fit,
    });

    let mut conversion = ChartSpec::new(
        "stefan_boltzmann_conversion",
        "Tungsten filament: resistance to temperature",
        "Temperature [K]",
        "R / R_300K",
    )
    .with_series(ChartSeries::new(
        "Manufacturer table",
        SeriesKind::Line,
        result
            .table_temperature_k
            .iter()
            .copied()
            .zip(result.table_relative_resistance.iter().copied())
            .collect(),
    ))
    .with_series(ChartSeries::new(
        "Measured",
        SeriesKind::Scatter,
        result
            .points
            .iter()
            .map(|p| (p.temperature.value, p.relative_resistance.value))
            .collect(),
    ));
    conversion.x_range = Some((0.0, 3600.0));

    let t4 = result.fourth_powers();
    let x_errors = result
        .points
        .iter()
        .map(|p| expanded(p.fourth_power.uncertainty, k))
        .collect();
    let y_errors = vec![expanded(result.u_radiometer_mv, k); result.points.len()];
    let radiance = ChartSpec::new(
        "stefan_boltzmann_radiance",
        "Radiance vs T^4",
        "T^4 [K^4]",
        "Radiance [mV]",
    )
    .with_series(
        ChartSeries::new(
            format!(
                "Measured (k = {}, {:.1}%)",
                k.value(),
                k.confidence() * 100.0
            ),
            SeriesKind::ErrorBars,
            t4.iter()
                .copied()
                .zip(result.points.iter().map(|p| p.radiance_mv))
                .collect(),
        )
        .with_errors(x_errors, y_errors),
    )
    .with_series(fit_line_series(
        "Linear fit",
        SeriesKind::DashedLine,
        &result.fit,
        &t4,
    )?);

    report.charts = vec![conversion, radiance];
    Ok(report)
}

pub fn run(config: &StefanBoltzmannConfig) -> ReductionResult<ExperimentReport> {
    let result = analyze(config)?;
    to_report(&result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_analysis::interpolation::Extrapolation;
    use crate::error::ErrorKind;

    #[test]
    fn resistance_and_its_uncertainty() {
        let result = analyze(&StefanBoltzmannConfig::default()).unwrap();
        let first = &result.points[0];
        assert!((first.resistance.value - 1.0 / 1.18).abs() < 1e-12);
        let u_v = 0.5 / 12f64.sqrt();
        let u_i = 0.01 / 12f64.sqrt();
        let expected = ((u_v / 1.18f64).powi(2) + (1.0 / (1.18f64 * 1.18) * u_i).powi(2)).sqrt();
        assert!((first.resistance.uncertainty - expected).abs() < 1e-12);
        assert!((first.relative_resistance.uncertainty - expected / 0.6).abs() < 1e-12);
    }

    #[test]
    fn temperatures_rise_with_voltage() {
        let result = analyze(&StefanBoltzmannConfig::default()).unwrap();
        let temps: Vec<f64> = result.points.iter().map(|p| p.temperature.value).collect();
        assert!(temps.windows(2).all(|w| w[1] > w[0]));
        assert!(temps[0] > 385.0 && temps[0] < 405.0, "T(1 V) = {}", temps[0]);
        assert!(temps[10] > 1430.0 && temps[10] < 1460.0, "T(11 V) = {}", temps[10]);
    }

    #[test]
    fn fourth_power_uncertainty_is_4t3_ut() {
        let result = analyze(&StefanBoltzmannConfig::default()).unwrap();
        for p in &result.points {
            let t = p.temperature.value;
            assert!((p.fourth_power.value - t.powi(4)).abs() / t.powi(4) < 1e-12);
            let expected = 4.0 * t.powi(3) * p.temperature.uncertainty;
            assert!((p.fourth_power.uncertainty - expected).abs() / expected < 1e-12);
        }
    }

    #[test]
    fn radiance_is_linear_in_t4() {
        let result = analyze(&StefanBoltzmannConfig::default()).unwrap();
        assert!(result.fit.slope > 0.0);
        assert!(result.fit.r_squared() > 0.95);
        assert_eq!(result.fit.n, 11);
    }

    #[test]
    fn extrapolation_can_be_disabled() {
        let mut config = StefanBoltzmannConfig::default();
        config.extrapolation = Extrapolation::Error;
        // All default points lie inside the table.
        assert!(analyze(&config).is_ok());

        config.voltages_v[0] = 0.5;
        config.currents_a[0] = 1.0;
        let err = analyze(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);

        config.extrapolation = Extrapolation::Extrapolate;
        let result = analyze(&config).unwrap();
        assert!(result.points[0].temperature.value < 300.0);
    }

    #[test]
    fn zero_current_is_a_domain_error() {
        let mut config = StefanBoltzmannConfig::default();
        config.currents_a[3] = 0.0;
        assert_eq!(analyze(&config).unwrap_err().kind(), ErrorKind::Domain);
    }

    #[test]
    fn error_bars_use_the_coverage_factor() {
        let report = run(&StefanBoltzmannConfig::default()).unwrap();
        let radiance = &report.charts[1];
        let bars = &radiance.series[0];
        assert_eq!(bars.kind, SeriesKind::ErrorBars);
        let expected_y = 2.0 * 0.1 / 12f64.sqrt();
        assert!(bars.y_errors.iter().all(|e| (e - expected_y).abs() < 1e-12));
        assert_eq!(bars.x_errors.len(), 11);
        let k = report.line("Expanded uncertainties", "k").unwrap();
        assert_eq!(k.value, 2.0);
    }
}

// src/experiments/stefan_boltzmann.rs
