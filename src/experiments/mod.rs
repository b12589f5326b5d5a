// src/experiments/mod.rs
//
// One driver per laboratory session. Each turns its configuration record
// into an `ExperimentReport`, or fails on the first error.

pub mod inverse_square;
pub mod speed_of_light;
pub mod stefan_boltzmann;
pub mod thermal_radiation;

use log::{debug, info, warn};
use ndarray::ArrayView1;
use ndarray_stats::QuantileExt;

use crate::constants::{FIT_LINE_SAMPLE_POINTS, LINEARITY_WARNING_R2};
use crate::data_analysis::regression::LinearFit;
use crate::data_input::config::LabConfig;
use crate::error::{ReductionError, ReductionResult};
use crate::report::{ChartSeries, ExperimentReport, SeriesKind};

/// Runs the four reductions in laboratory order.
pub fn run_all(config: &LabConfig) -> ReductionResult<Vec<ExperimentReport>> {
    Ok(vec![
        run_step("thermal radiation", || {
            thermal_radiation::run(&config.thermal_radiation)
        })?,
        run_step("inverse-square law", || {
            inverse_square::run(&config.inverse_square)
        })?,
        run_step("Stefan-Boltzmann", || {
            stefan_boltzmann::run(&config.stefan_boltzmann)
        })?,
        run_step("speed of light", || speed_of_light::run(&config.speed_of_light))?,
    ])
}

fn run_step<F>(name: &str, run: F) -> ReductionResult<ExperimentReport>
where
    F: FnOnce() -> ReductionResult<ExperimentReport>,
{
    info!("Running {name} reduction");
    let report = run().map_err(|e| e.context(name))?;
    debug!(
        "{name}: {} section(s), {} fit(s), {} chart(s)",
        report.sections.len(),
        report.fits.len(),
        report.charts.len()
    );
    Ok(report)
}

/// Logs a warning when a fit used as a linearity check falls short.
pub(crate) fn check_linearity(experiment: &str, label: &str, fit: &LinearFit) {
    let r2 = fit.r_squared();
    if r2 < LINEARITY_WARNING_R2 {
        warn!("{experiment}: {label} is poorly linear (R^2 = {r2:.4} < {LINEARITY_WARNING_R2})");
    } else {
        debug!("{experiment}: {label} R^2 = {r2:.6}");
    }
}

/// Smallest and largest value of a non-empty series.
pub(crate) fn extent(values: &[f64]) -> ReductionResult<(f64, f64)> {
    let view = ArrayView1::from(values);
    let min = view
        .min()
        .map_err(|e| ReductionError::shape(format!("extent of series: {e}")))?;
    let max = view
        .max()
        .map_err(|e| ReductionError::shape(format!("extent of series: {e}")))?;
    Ok((*min, *max))
}

pub(crate) fn zip_points(x: &[f64], y: &[f64]) -> Vec<(f64, f64)> {
    x.iter().copied().zip(y.iter().copied()).collect()
}

/// The fitted line over the x extent of the data it was fitted to.
pub(crate) fn fit_line_series(
    label: impl Into<String>,
    kind: SeriesKind,
    fit: &LinearFit,
    x: &[f64],
) -> ReductionResult<ChartSeries> {
    let (x_min, x_max) = extent(x)?;
    Ok(ChartSeries::new(
        label,
        kind,
        fit.line_points(x_min, x_max, FIT_LINE_SAMPLE_POINTS),
    ))
}


// src/experiments/mod.rs
