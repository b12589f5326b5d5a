// src/experiments/inverse_square.rs

use log::info;

use crate::constants::CURVE_SAMPLE_POINTS;
use crate::data_analysis::interpolation::{Extrapolation, Interpolator};
use crate::data_analysis::physical_models::{inverse_square, map_elementwise};
use crate::data_analysis::regression::{linear_regression, LinearFit};
use crate::data_analysis::uncertainty::{
    combined_uncertainty, mean, propagate, resolution_uncertainty, type_a_uncertainty, Measured,
    Sensitivity,
};
use crate::data_input::config::InverseSquareConfig;
use crate::data_input::measurement::{CalibrationTable, MeasurementSeries};
use crate::error::ReductionResult;
use crate::experiments::{check_linearity, fit_line_series, zip_points};
use crate::report::{
    ChartSeries, ChartSpec, ExperimentReport, NamedFit, ReferenceLine, ReportLine, ReportSection,
    SeriesKind,
};

#[derive(Debug, Clone, PartialEq)]
pub struct InverseSquareResult {
    pub readings: MeasurementSeries,
    /// 1/r² in cm⁻².
    pub inverse_square_cm2: Vec<f64>,
    pub repeatability_mv: Vec<f64>,
    pub repeatability_mean_mv: f64,
    pub u_voltmeter_mv: f64,
    pub u_tape_cm: f64,
    pub type_a_mv: f64,
    pub combined_mv: f64,
    pub mean_distance_cm: f64,
    /// Representative u(1/r²) at the mean distance.
    pub inverse_square_at_mean: Measured,
    pub smooth_curve: Vec<(f64, f64)>,
    pub fit: LinearFit,
}

pub fn analyze(config: &InverseSquareConfig) -> ReductionResult<InverseSquareResult> {
    let readings = MeasurementSeries::new(
        "distance",
        "voltage",
        config.distances_cm.clone(),
        config.voltages_mv.clone(),
    )?;
    let inverse_square_cm2 = map_elementwise(readings.x(), inverse_square)?;

    let u_voltmeter_mv = resolution_uncertainty(config.voltmeter.resolution)?;
    let u_tape_cm = resolution_uncertainty(config.tape.resolution)?;
    let type_a_mv = type_a_uncertainty(&config.repeatability_mv, config.type_a_estimator)?;
    let combined_mv = combined_uncertainty(&[u_voltmeter_mv, type_a_mv])?;

    // d(1/r²)/dr = -2/r³
    let mean_distance_cm = mean(readings.x())?;
    let u_inverse = propagate(&[Sensitivity::new(
        -2.0 / mean_distance_cm.powi(3),
        u_tape_cm,
    )])?;
    let inverse_square_at_mean =
        Measured::new(inverse_square(mean_distance_cm)?, u_inverse, "cm⁻²");

    let smoothing = Interpolator::new(
        &CalibrationTable::new(readings.x().to_vec(), readings.y().to_vec())?,
        config.smoothing,
        Extrapolation::Error,
    )?;
    let smooth_curve = smoothing.sample_curve(CURVE_SAMPLE_POINTS)?;

    let fit = linear_regression(&inverse_square_cm2, readings.y())?;
    check_linearity("inverse-square law", "V vs 1/r²", &fit);
    info!(
        "inverse-square law: u(1/r²) = {:.5} cm⁻² at r̄ = {:.1} cm, R^2 = {:.4}",
        u_inverse,
        mean_distance_cm,
        fit.r_squared()
    );

    Ok(InverseSquareResult {
        readings,
        inverse_square_cm2,
        repeatability_mean_mv: mean(&config.repeatability_mv)?,
        repeatability_mv: config.repeatability_mv.clone(),
        u_voltmeter_mv,
        u_tape_cm,
        type_a_mv,
        combined_mv,
        mean_distance_cm,
        inverse_square_at_mean,
        smooth_curve,
        fit,
    })
}

pub fn to_report(result: &InverseSquareResult) -> ReductionResult<ExperimentReport> {
    let mut report = ExperimentReport::new("inverse_square", "Inverse-square law (infrared)");

    let mut uncertainties = ReportSection::new("Uncertainties");
    uncertainties.push(ReportLine::scalar("u_res(voltmeter)", result.u_voltmeter_mv, "mV"));
    uncertainties.push(ReportLine::scalar("u_res(tape)", result.u_tape_cm, "cm"));
    uncertainties.push(ReportLine::scalar("u_A(V)", result.type_a_mv, "mV"));
    uncertainties.push(ReportLine::scalar("u_c(V)", result.combined_mv, "mV"));
    report.sections.push(uncertainties);

    let mut propagation = ReportSection::new("Propagation");
    propagation.push(ReportLine::scalar("r_mean", result.mean_distance_cm, "cm"));
    propagation.push(ReportLine::measured(
        "1/r² at r_mean",
        &result.inverse_square_at_mean,
    ));
    report.sections.push(propagation);

    report.fits.push(NamedFit {
        label: "V vs 1/r²".to_string(),
        x_unit: "cm⁻²".to_string(),
        y_unit: "mV".to_string(),
        fit: result.fit,
    });

    let mut repeatability = ChartSpec::new(
        "inverse_square_repeatability",
        "Repeatability of voltage readings",
        "Reading",
        "Voltage [mV]",
    )
    .with_series(ChartSeries::new(
        "Readings",
        SeriesKind::Bar,
        result
            .repeatability_mv
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as f64, v))
            .collect(),
    ));
    repeatability.categories = Some(
        (1..=result.repeatability_mv.len())
            .map(|i| i.to_string())
            .collect(),
    );
    repeatability.reference_lines.push(ReferenceLine {
        y: result.repeatability_mean_mv,
        label: format!("Mean = {:.2} mV", result.repeatability_mean_mv),
    });

    let distance = ChartSpec::new(
        "inverse_square_voltage_vs_distance",
        "Voltage vs distance",
        "Distance [cm]",
        "Voltage [mV]",
    )
    .with_series(ChartSeries::new(
        "Measured",
        SeriesKind::Scatter,
        result.readings.points(),
    ))
    .with_series(ChartSeries::new(
        "Cubic spline",
        SeriesKind::Line,
        result.smooth_curve.clone(),
    ));

    let linearity = ChartSpec::new(
        "inverse_square_linearity",
        "Voltage vs 1/r²",
        "1 / r² [1/cm²]",
        "Voltage [mV]",
    )
    .with_series(ChartSeries::new(
        "Measured",
        SeriesKind::Scatter,
        zip_points(&result.inverse_square_cm2, result.readings.y()),
    ))
    .with_series(fit_line_series(
        format!("Linear fit (R² = {:.4})", result.fit.r_squared()),
        SeriesKind::Line,
        &result.fit,
        &result.inverse_square_cm2,
    )?);

    report.charts = vec![repeatability, distance, linearity];
    Ok(report)
}

pub fn run(config: &InverseSquareConfig) -> ReductionResult<ExperimentReport> {
    let result = analyze(config)?;
    to_report(&result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn uncertainties_match_hand_calculation() {
        let result = analyze(&InverseSquareConfig::default()).unwrap();
        assert!((result.u_voltmeter_mv - 0.1 / 12f64.sqrt()).abs() < 1e-12);
        assert!((result.u_tape_cm - 0.1 / 12f64.sqrt()).abs() < 1e-12);

        // [6.2, 6.5, 6.4 x5, 6.6]: mean 6.4125
        assert!((result.repeatability_mean_mv - 6.4125).abs() < 1e-12);
        let samples = [6.2, 6.5, 6.4, 6.4, 6.4, 6.4, 6.4, 6.6];
        let ss: f64 = samples.iter().map(|v| (v - 6.4125f64).powi(2)).sum();
        let expected = (ss / 7.0).sqrt() / 8f64.sqrt();
        assert!((result.type_a_mv - expected).abs() < 1e-12);
        assert!(
            (result.combined_mv - (expected.powi(2) + result.u_voltmeter_mv.powi(2)).sqrt()).abs()
                < 1e-12
        );
    }

    #[test]
    fn representative_inverse_square_uncertainty() {
        let result = analyze(&InverseSquareConfig::default()).unwrap();
        let r_mean: f64 = IR_SUM / 16.0;
        assert!((result.mean_distance_cm - r_mean).abs() < 1e-12);
        let expected = 2.0 / r_mean.powi(3) * (0.1 / 12f64.sqrt());
        assert!((result.inverse_square_at_mean.uncertainty - expected).abs() < 1e-15);
        assert!((result.inverse_square_at_mean.value - 1.0 / (r_mean * r_mean)).abs() < 1e-15);
    }

    const IR_SUM: f64 = 3.0 + 3.5 + 4.0 + 4.5 + 5.0 + 6.0 + 7.0 + 8.0 + 9.0 + 10.0 + 15.0 + 20.0
        + 25.0 + 30.0 + 40.0 + 50.0;

    #[test]
    fn voltage_grows_with_inverse_square() {
        let result = analyze(&InverseSquareConfig::default()).unwrap();
        assert!(result.fit.slope > 0.0);
        assert!(result.fit.r_value > 0.9);
        assert_eq!(result.fit.n, 16);
    }

    #[test]
    fn smooth_curve_passes_through_the_readings() {
        let result = analyze(&InverseSquareConfig::default()).unwrap();
        assert_eq!(result.smooth_curve.len(), CURVE_SAMPLE_POINTS);
        let (x0, y0) = result.smooth_curve[0];
        assert_eq!(x0, 3.0);
        assert!((y0 - 92.0).abs() < 1e-9);
        let (xn, yn) = result.smooth_curve[CURVE_SAMPLE_POINTS - 1];
        assert!((xn - 50.0).abs() < 1e-9);
        assert!(yn.abs() < 1e-6);
    }

    #[test]
    fn zero_distance_is_a_domain_error() {
        let mut config = InverseSquareConfig::default();
        config.distances_cm[0] = 0.0;
        assert_eq!(analyze(&config).unwrap_err().kind(), ErrorKind::Domain);
    }

    #[test]
    fn mismatched_readings_are_a_shape_error() {
        let mut config = InverseSquareConfig::default();
        config.voltages_mv.pop();
        assert_eq!(analyze(&config).unwrap_err().kind(), ErrorKind::Shape);
    }

    #[test]
    fn report_has_three_charts_and_the_fit() {
        let report = run(&InverseSquareConfig::default()).unwrap();
        assert_eq!(report.charts.len(), 3);
        assert_eq!(report.fits.len(), 1);
        let bars = &report.charts[0];
        assert_eq!(bars.categories.as_ref().map(Vec::len), Some(8));
        assert_eq!(bars.reference_lines[0].label, "Mean = 6.41 mV");
        assert!(report.line("Propagation", "1/r² at r_mean").is_some());
    }
}

// src/experiments/inverse_square.rs
