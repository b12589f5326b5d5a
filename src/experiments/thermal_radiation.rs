// src/experiments/thermal_radiation.rs
//
// Leslie cube: thermistor calibration against the Steinhart-Hart model,
// thermopile repeatability and the relative emissivity of the four faces.

use log::{debug, info};
use ndarray::Array1;
use ndarray_stats::QuantileExt;

use crate::constants::CURVE_SAMPLE_POINTS;
use crate::data_analysis::interpolation::{Extrapolation, Interpolator};
use crate::data_analysis::physical_models::{celsius_to_kelvin, round_to_resolution};
use crate::data_analysis::uncertainty::{
    combined_uncertainty, mean, propagate, resolution_uncertainty, type_a_uncertainty, Measured,
    Sensitivity,
};
use crate::data_input::config::ThermalRadiationConfig;
use crate::data_input::measurement::CalibrationTable;
use crate::error::{ensure_same_len, ReductionError, ReductionResult};
use crate::experiments::zip_points;
use crate::report::{
    ChartSeries, ChartSpec, ExperimentReport, ReferenceLine, ReportLine, ReportSection, SeriesKind,
};

const KOHM: f64 = 1000.0;

/// Largest disagreement between the calibration and the model over the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelComparison {
    pub resistance_ohm: f64,
    pub calibrated_k: f64,
    pub model_k: f64,
}

impl ModelComparison {
    pub fn difference_k(&self) -> f64 {
        (self.calibrated_k - self.model_k).abs()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepeatabilityResult {
    pub label: String,
    pub resistance_ohm: f64,
    /// Calibrated temperature, rounded to the display resolution.
    pub temperature_k: f64,
    pub mean_voltage_mv: f64,
    pub type_a_mv: f64,
    /// Type A combined with the voltmeter resolution.
    pub combined_mv: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaceReadings {
    pub label: String,
    pub resistance_ohm: f64,
    /// Rounded value, uncertainty from the ohmmeter through the calibration slope.
    pub temperature: Measured,
    pub voltages_mv: Vec<f64>,
    /// Voltage of each face over the reference (first) face.
    pub relative_emissivity: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThermalRadiationResult {
    pub table_resistance_ohm: Vec<f64>,
    pub table_temperature_k: Vec<f64>,
    pub model_temperature_k: Vec<f64>,
    pub calibration_curve: Vec<(f64, f64)>,
    pub model_curve: Vec<(f64, f64)>,
    pub worst_model_agreement: ModelComparison,
    pub ambient_temperature_k: f64,
    pub u_voltmeter_mv: f64,
    pub u_ohmmeter_kohm: f64,
    pub repeatability: Vec<RepeatabilityResult>,
    pub faces: Vec<String>,
    pub face_readings: Vec<FaceReadings>,
}

fn display_temperature(config: &ThermalRadiationConfig, t: f64) -> f64 {
    match config.temperature_rounding_k {
        Some(step) => round_to_resolution(t, step),
        None => t,
    }
}

pub fn analyze(config: &ThermalRadiationConfig) -> ReductionResult<ThermalRadiationResult> {
    let table_temperature_k: Vec<f64> = config
        .thermistor_temperature_c
        .iter()
        .map(|&t| celsius_to_kelvin(t))
        .collect();
    let table = CalibrationTable::new(
        config.thermistor_resistance_ohm.clone(),
        table_temperature_k.clone(),
    )
    .map_err(|e| e.context("thermistor table"))?;
    let calibration = Interpolator::new(&table, config.calibration, Extrapolation::Error)
        .map_err(|e| e.context("thermistor calibration"))?;

    let model = &config.steinhart_hart;
    let model_temperature_k = model
        .temperatures(&config.thermistor_resistance_ohm)
        .map_err(|e| e.context("Steinhart-Hart model"))?;

    // Calibration vs model at the table resistances.
    let calibrated = calibration.evaluate_many(&config.thermistor_resistance_ohm)?;
    let differences: Array1<f64> = calibrated
        .iter()
        .zip(&model_temperature_k)
        .map(|(c, m)| (c - m).abs())
        .collect();
    let worst = differences
        .argmax()
        .map_err(|e| ReductionError::domain(format!("spline vs model difference: {e}")))?;
    let worst_model_agreement = ModelComparison {
        resistance_ohm: config.thermistor_resistance_ohm[worst],
        calibrated_k: calibrated[worst],
        model_k: model_temperature_k[worst],
    };
    info!(
        "thermal radiation: max |calibration - Steinhart-Hart| = {:.3} K at R = {} Ω",
        worst_model_agreement.difference_k(),
        worst_model_agreement.resistance_ohm
    );

    let calibration_curve = calibration.sample_curve(CURVE_SAMPLE_POINTS)?;
    let model_curve = calibration_curve
        .iter()
        .map(|&(r, _)| model.temperature(r).map(|t| (r, t)))
        .collect::<ReductionResult<Vec<_>>>()?;

    let u_voltmeter_mv = resolution_uncertainty(config.voltmeter.resolution)?;
    let u_ohmmeter_kohm = resolution_uncertainty(config.ohmmeter.resolution)?;

    let mut repeatability = Vec::with_capacity(config.repeatability.len());
    for level in &config.repeatability {
        let resistance_ohm = level.resistance_kohm * KOHM;
        let temperature = calibration
            .evaluate(resistance_ohm)
            .map_err(|e| e.context(format!("repeatability {}", level.label)))?;
        let type_a_mv = type_a_uncertainty(&level.voltages_mv, config.type_a_estimator)?;
        let combined_mv = combined_uncertainty(&[u_voltmeter_mv, type_a_mv])?;
        debug!(
            "{}: R = {resistance_ohm} Ω, T = {temperature:.3} K, u_A = {type_a_mv:.5} mV",
            level.label
        );
        repeatability.push(RepeatabilityResult {
            label: level.label.clone(),
            resistance_ohm,
            temperature_k: display_temperature(config, temperature),
            mean_voltage_mv: mean(&level.voltages_mv)?,
            type_a_mv,
            combined_mv,
        });
    }

    let u_ohmmeter_ohm = u_ohmmeter_kohm * KOHM;
    let mut face_readings = Vec::with_capacity(config.face_readings.len());
    for level in &config.face_readings {
        ensure_same_len(
            &format!("faces of {}", level.label),
            config.faces.len(),
            level.voltages_mv.len(),
        )?;
        let resistance_ohm = level.resistance_kohm * KOHM;
        let temperature = calibration
            .evaluate(resistance_ohm)
            .map_err(|e| e.context(format!("face readings {}", level.label)))?;
        let slope = calibration.derivative(resistance_ohm)?;
        let u_temperature = propagate(&[Sensitivity::new(slope, u_ohmmeter_ohm)])?;

        let reference = level.voltages_mv.first().copied().unwrap_or(0.0);
        if reference == 0.0 {
            return Err(ReductionError::domain(format!(
                "{}: reference face voltage is zero, relative emissivity undefined",
                level.label
            )));
        }
        let relative_emissivity = level.voltages_mv.iter().map(|v| v / reference).collect();

        face_readings.push(FaceReadings {
            label: level.label.clone(),
            resistance_ohm,
            temperature: Measured::new(
                display_temperature(config, temperature),
                u_temperature,
                "K",
            ),
            voltages_mv: level.voltages_mv.clone(),
            relative_emissivity,
        });
    }

    Ok(ThermalRadiationResult {
        table_resistance_ohm: config.thermistor_resistance_ohm.clone(),
        table_temperature_k,
        model_temperature_k,
        calibration_curve,
        model_curve,
        worst_model_agreement,
        ambient_temperature_k: celsius_to_kelvin(config.ambient_temperature_c),
        u_voltmeter_mv,
        u_ohmmeter_kohm,
        repeatability,
        faces: config.faces.clone(),
        face_readings,
    })
}

pub fn to_report(result: &ThermalRadiationResult) -> ExperimentReport {
    let mut report = ExperimentReport::new(
        "thermal_radiation",
        "Thermal radiation (Leslie cube)",
    );

    let mut calibration = ReportSection::new("Thermistor calibration");
    let worst = &result.worst_model_agreement;
    calibration.push(ReportLine::scalar(
        "max |spline - Steinhart-Hart|",
        worst.difference_k(),
        "K",
    ));
    calibration.push(ReportLine::scalar("at R", worst.resistance_ohm, "Ω"));
    calibration.push(ReportLine::scalar("T_spline", worst.calibrated_k, "K"));
    calibration.push(ReportLine::scalar("T_SH", worst.model_k, "K"));
    calibration.push(ReportLine::scalar(
        "ambient temperature",
        result.ambient_temperature_k,
        "K",
    ));
    report.sections.push(calibration);

    let mut resolution = ReportSection::new("Resolution uncertainties");
    resolution.push(ReportLine::scalar("u_res(voltmeter)", result.u_voltmeter_mv, "mV"));
    resolution.push(ReportLine::scalar("u_res(ohmmeter)", result.u_ohmmeter_kohm, "kΩ"));
    report.sections.push(resolution);

    let mut repeatability = ReportSection::new("Repeatability");
    for level in &result.repeatability {
        repeatability.push(ReportLine::scalar(
            format!("u_A({})", level.label),
            level.type_a_mv,
            "mV",
        ));
        repeatability.push(ReportLine::scalar(
            format!("u_c({})", level.label),
            level.combined_mv,
            "mV",
        ));
        repeatability.push(ReportLine::measured(
            format!("V({})", level.label),
            &Measured::new(level.mean_voltage_mv, level.combined_mv, "mV"),
        ));
        repeatability.push(ReportLine::scalar(
            format!("T({})", level.label),
            level.temperature_k,
            "K",
        ));
    }
    report.sections.push(repeatability);

    let mut temperatures = ReportSection::new("Face temperatures");
    for level in &result.face_readings {
        temperatures.push(ReportLine::measured(
            format!("T({})", level.label),
            &level.temperature,
        ));
    }
    report.sections.push(temperatures);

    let reference_face = result.faces.first().cloned().unwrap_or_default();
    let mut emissivity = ReportSection::new(format!("Emissivity relative to {reference_face}"));
    for level in &result.face_readings {
        for (face, ratio) in result.faces.iter().zip(&level.relative_emissivity) {
            emissivity.push(ReportLine::scalar(
                format!("{} {}", level.label, face),
                *ratio,
                "",
            ));
        }
    }
    report.sections.push(emissivity);

    report.charts = charts(result);
    report
}

fn charts(result: &ThermalRadiationResult) -> Vec<ChartSpec> {
    let calibration = ChartSpec::new(
        "thermal_radiation_calibration",
        "Thermistor calibration: spline vs Steinhart-Hart",
        "Resistance [Ω]",
        "Temperature [K]",
    )
    .with_series(ChartSeries::new(
        "Table",
        SeriesKind::Scatter,
        zip_points(&result.table_resistance_ohm, &result.table_temperature_k),
    ))
    .with_series(ChartSeries::new(
        "Cubic spline",
        SeriesKind::DashedLine,
        result.calibration_curve.clone(),
    ))
    .with_series(ChartSeries::new(
        "Steinhart-Hart",
        SeriesKind::Line,
        result.model_curve.clone(),
    ));

    let mut voltage = ChartSpec::new(
        "thermal_radiation_voltage_vs_temperature",
        "Radiation signal vs temperature",
        "Temperature [K]",
        "Thermopile voltage [mV]",
    );
    for (i, face) in result.faces.iter().enumerate() {
        let points = result
            .face_readings
            .iter()
            .filter_map(|level| {
                level
                    .voltages_mv
                    .get(i)
                    .map(|&v| (level.temperature.value, v))
            })
            .collect();
        voltage
            .series
            .push(ChartSeries::new(format!("{face} face"), SeriesKind::Line, points));
    }

    let mut emissivity = ChartSpec::new(
        "thermal_radiation_emissivity",
        "Relative emissivities",
        "Power setting and face",
        "ε / ε_ref",
    );
    let face_count = result.faces.len();
    let mut categories = Vec::with_capacity(face_count * result.face_readings.len());
    for (l, level) in result.face_readings.iter().enumerate() {
        let points = level
            .relative_emissivity
            .iter()
            .enumerate()
            .map(|(f, &ratio)| ((l * face_count + f) as f64, ratio))
            .collect();
        emissivity
            .series
            .push(ChartSeries::new(level.label.clone(), SeriesKind::Bar, points));
        categories.extend(result.faces.iter().map(|face| format!("{}-{face}", level.label)));
    }
    emissivity.categories = Some(categories);
    emissivity.reference_lines.push(ReferenceLine {
        y: 1.0,
        label: String::new(),
    });
    emissivity.y_range = Some((0.0, 1.1));

    vec![calibration, voltage, emissivity]
}

pub fn run(config: &ThermalRadiationConfig) -> ReductionResult<ExperimentReport> {
    let result = analyze(config)?;
    Ok(to_report(&result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_analysis::interpolation::InterpolationKind;
    use crate::error::ErrorKind;

    #[test]
    fn spline_agrees_with_model_within_a_fraction_of_a_kelvin() {
        let result = analyze(&ThermalRadiationConfig::default()).unwrap();
        let worst = result.worst_model_agreement;
        assert!(worst.difference_k() < 0.5, "diff = {}", worst.difference_k());
        // At the table knots the spline returns the table itself.
        let idx = result
            .table_resistance_ohm
            .iter()
            .position(|&r| r == worst.resistance_ohm)
            .unwrap();
        assert!((worst.calibrated_k - result.table_temperature_k[idx]).abs() < 1e-9);
    }

    #[test]
    fn repeatability_uncertainties() {
        let result = analyze(&ThermalRadiationConfig::default()).unwrap();
        assert!((result.u_voltmeter_mv - 0.1 / 12f64.sqrt()).abs() < 1e-12);
        assert!((result.u_ohmmeter_kohm - 0.01 / 12f64.sqrt()).abs() < 1e-12);

        let p9 = &result.repeatability[0];
        assert_eq!(p9.label, "P9");
        assert!((p9.resistance_ohm - 2280.0).abs() < 1e-9);
        // Six 28.6 and two 28.7 readings.
        let s = (2.0 * 0.075f64.powi(2) + 6.0 * 0.025f64.powi(2)) / 7.0;
        assert!((p9.type_a_mv - s.sqrt() / 8f64.sqrt()).abs() < 1e-9);
        assert!(
            (p9.combined_mv - (p9.type_a_mv.powi(2) + result.u_voltmeter_mv.powi(2)).sqrt()).abs()
                < 1e-12
        );
        assert!((p9.mean_voltage_mv - 28.625).abs() < 1e-9);
    }

    #[test]
    fn temperatures_fall_with_resistance_and_are_rounded() {
        let result = analyze(&ThermalRadiationConfig::default()).unwrap();
        let temps: Vec<f64> = result
            .face_readings
            .iter()
            .map(|l| l.temperature.value)
            .collect();
        assert!(temps.windows(2).all(|w| w[1] < w[0]));
        for t in &temps {
            assert!(((t * 10.0).round() - t * 10.0).abs() < 1e-6);
        }
        // 2.18 kΩ lies between the 132 °C and 130 °C rows.
        assert!(temps[0] > 400.0 && temps[0] < 410.0, "T(P9) = {}", temps[0]);
        assert!(result.face_readings[0].temperature.uncertainty > 0.0);
    }

    #[test]
    fn unrounded_temperatures_when_rounding_disabled() {
        let mut config = ThermalRadiationConfig::default();
        config.temperature_rounding_k = None;
        let unrounded = analyze(&config).unwrap();
        let rounded = analyze(&ThermalRadiationConfig::default()).unwrap();
        for (a, b) in unrounded.face_readings.iter().zip(&rounded.face_readings) {
            assert!((a.temperature.value - b.temperature.value).abs() <= 0.05 + 1e-9);
            // Uncertainty never depends on rounding.
            assert_eq!(a.temperature.uncertainty, b.temperature.uncertainty);
        }
    }

    #[test]
    fn emissivity_is_normalised_to_the_black_face() {
        let result = analyze(&ThermalRadiationConfig::default()).unwrap();
        for level in &result.face_readings {
            assert_eq!(level.relative_emissivity[0], 1.0);
            assert!(level.relative_emissivity.iter().all(|&e| e > 0.0 && e <= 1.0));
        }
        let p9 = &result.face_readings[0];
        assert!((p9.relative_emissivity[3] - 1.4 / 28.6).abs() < 1e-12);
    }

    #[test]
    fn out_of_table_resistance_is_a_range_error() {
        let mut config = ThermalRadiationConfig::default();
        config.face_readings[0].resistance_kohm = 1.0;
        let err = analyze(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        assert!(err.message().contains("P9"));
    }

    #[test]
    fn zero_reference_voltage_is_a_domain_error() {
        let mut config = ThermalRadiationConfig::default();
        config.face_readings[1].voltages_mv[0] = 0.0;
        assert_eq!(analyze(&config).unwrap_err().kind(), ErrorKind::Domain);
    }

    #[test]
    fn face_voltage_count_must_match_faces() {
        let mut config = ThermalRadiationConfig::default();
        config.face_readings[0].voltages_mv.pop();
        config.face_readings[1].voltages_mv.push(0.5);
        let err = run(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);
        assert!(err.message().contains("faces of P9"), "{}", err.message());
    }

    #[test]
    fn monotone_calibration_is_selectable() {
        let mut config = ThermalRadiationConfig::default();
        config.calibration = InterpolationKind::MonotoneCubic;
        let result = analyze(&config).unwrap();
        assert!(result.worst_model_agreement.difference_k() < 0.5);
    }

    #[test]
    fn report_layout() {
        let report = run(&ThermalRadiationConfig::default()).unwrap();
        assert_eq!(report.charts.len(), 3);
        let bars = &report.charts[2];
        assert_eq!(bars.categories.as_ref().map(Vec::len), Some(16));
        assert_eq!(bars.series.len(), 4);
        assert_eq!(bars.series[1].points[0].0, 4.0);
        assert!(report.line("Repeatability", "u_A(P5)").is_some());
        assert!(report.line("Emissivity relative to black", "P7 polished").is_some());
    }
}

// src/experiments/thermal_radiation.rs
