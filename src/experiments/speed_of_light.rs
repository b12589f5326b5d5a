// src/experiments/speed_of_light.rs

use log::info;

use crate::constants::SPEED_OF_LIGHT_VACUUM;
use crate::data_analysis::regression::{linear_regression, LinearFit};
use crate::data_analysis::uncertainty::{
    mean, propagate, resolution_uncertainty, Measured, Sensitivity,
};
use crate::data_input::config::SpeedOfLightConfig;
use crate::data_input::measurement::MeasurementSeries;
use crate::error::{ReductionError, ReductionResult};
use crate::experiments::{check_linearity, fit_line_series};
use crate::report::{
    ChartSeries, ChartSpec, ExperimentReport, NamedFit, ReportLine, ReportSection, SeriesKind,
};

const NANOSECOND: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct SpeedOfLightResult {
    pub readings: MeasurementSeries,
    pub u_time_s: f64,
    pub u_distance_m: f64,
    pub mean_time_s: f64,
    pub mean_distance_m: f64,
    pub fit: LinearFit,
    /// Slope of Δd vs Δt, with u(c) propagated at the mean point.
    pub speed: Measured,
    /// (c - c0) / c0
    pub relative_deviation: f64,
    /// c0 / c
    pub refractive_index: f64,
}

pub fn analyze(config: &SpeedOfLightConfig) -> ReductionResult<SpeedOfLightResult> {
    let readings = MeasurementSeries::new(
        "time offset",
        "distance",
        config.time_offsets_s.clone(),
        config.distances_m.clone(),
    )?;
    let u_time_s = resolution_uncertainty(config.timebase.resolution)?;
    let u_distance_m = resolution_uncertainty(config.tape.resolution)?;

    let fit = linear_regression(readings.x(), readings.y())?;
    check_linearity("speed of light", "Δd vs Δt", &fit);

    let mean_time_s = mean(readings.x())?;
    let mean_distance_m = mean(readings.y())?;
    if mean_time_s == 0.0 {
        return Err(ReductionError::domain(
            "mean time offset is zero, u(c) undefined",
        ));
    }
    // c ≈ d̄ / t̄: ∂c/∂d = 1/t̄, ∂c/∂t = -d̄/t̄²
    let u_speed = propagate(&[
        Sensitivity::new(1.0 / mean_time_s, u_distance_m),
        Sensitivity::new(-mean_distance_m / (mean_time_s * mean_time_s), u_time_s),
    ])?;
    if fit.slope == 0.0 {
        return Err(ReductionError::domain("fitted speed is zero"));
    }
    let speed = Measured::new(fit.slope, u_speed, "m/s");
    let relative_deviation = (fit.slope - SPEED_OF_LIGHT_VACUUM) / SPEED_OF_LIGHT_VACUUM;
    info!(
        "speed of light: c = {speed} ({:+.2}% from vacuum)",
        relative_deviation * 100.0
    );

    Ok(SpeedOfLightResult {
        readings,
        u_time_s,
        u_distance_m,
        mean_time_s,
        mean_distance_m,
        fit,
        speed,
        relative_deviation,
        refractive_index: SPEED_OF_LIGHT_VACUUM / fit.slope,
    })
}

pub fn to_report(result: &SpeedOfLightResult) -> ReductionResult<ExperimentReport> {
    let mut report = ExperimentReport::new("speed_of_light", "Speed of light in air");

    let mut uncertainties = ReportSection::new("Uncertainties");
    uncertainties.push(ReportLine::scalar("u_res(time base)", result.u_time_s, "s"));
    uncertainties.push(ReportLine::scalar("u_res(tape)", result.u_distance_m, "m"));
    report.sections.push(uncertainties);

    let mut speed = ReportSection::new("Speed of light");
    speed.push(ReportLine::measured("c", &result.speed));
    if let Some(relative) = result.speed.relative_uncertainty() {
        speed.push(ReportLine::scalar("u(c) / c", relative, ""));
    }
    speed.push(ReportLine::scalar(
        "slope standard error",
        result.fit.slope_stderr,
        "m/s",
    ));
    speed.push(ReportLine::scalar("c0 (vacuum)", SPEED_OF_LIGHT_VACUUM, "m/s"));
    speed.push(ReportLine::scalar(
        "relative deviation from c0",
        result.relative_deviation,
        "",
    ));
    speed.push(ReportLine::scalar("n = c0 / c", result.refractive_index, ""));
    report.sections.push(speed);

    report.fits.push(NamedFit {
        label: "Δd vs Δt".to_string(),
        x_unit: "s".to_string(),
        y_unit: "m".to_string(),
        fit: result.fit,
    });

    // Time axis in nanoseconds.
    let to_ns = |(t, d): (f64, f64)| (t / NANOSECOND, d);
    let mut fit_line = fit_line_series(
        format!("Fit: c = {}", result.speed),
        SeriesKind::Line,
        &result.fit,
        result.readings.x(),
    )?;
    fit_line.points = fit_line.points.into_iter().map(to_ns).collect();

    let chart = ChartSpec::new(
        "speed_of_light_fit",
        "Speed of light measurement",
        "Δt [ns]",
        "Δd [m]",
    )
    .with_series(ChartSeries::new(
        "Measured",
        SeriesKind::Scatter,
        result.readings.points().into_iter().map(to_ns).collect(),
    ))
    .with_series(fit_line);
    report.charts.push(chart);
    Ok(report)
}

pub fn run(config: &SpeedOfLightConfig) -> ReductionResult<ExperimentReport> {
    let result = analyze(config)?;
    to_report(&result)
}


// src/experiments/speed_of_light.rs
