// src/report/csv_export.rs
//
// Structured output: one CSV of quantities and fit parameters per
// experiment, and one CSV per chart with the plotted series.

use std::fs;
use std::path::{Path, PathBuf};

use csv::Writer;
use log::debug;

use crate::error::ReductionResult;
use crate::report::{ChartSpec, ExperimentReport, ReportSink};

pub struct CsvSink {
    output_dir: PathBuf,
    written: Vec<PathBuf>,
}

impl CsvSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            written: Vec::new(),
        }
    }

    /// Files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write_quantities(&self, report: &ExperimentReport, path: &Path) -> ReductionResult<()> {
        let mut writer = Writer::from_path(path)?;
        writer.write_record(["section", "label", "value", "uncertainty", "unit"])?;
        for section in &report.sections {
            for line in &section.lines {
                writer.write_record([
                    section.title.clone(),
                    line.label.clone(),
                    line.value.to_string(),
                    line.uncertainty.map(|u| u.to_string()).unwrap_or_default(),
                    line.unit.clone(),
                ])?;
            }
        }
        for named in &report.fits {
            let fit = &named.fit;
            let slope_unit = format!("{}/{}", named.y_unit, named.x_unit);
            let rows = [
                ("slope", fit.slope, Some(fit.slope_stderr), slope_unit.as_str()),
                (
                    "intercept",
                    fit.intercept,
                    Some(fit.intercept_stderr),
                    named.y_unit.as_str(),
                ),
                ("r", fit.r_value, None, ""),
                ("r_squared", fit.r_squared(), None, ""),
                ("residual_std", fit.residual_std, None, named.y_unit.as_str()),
                ("n", fit.n as f64, None, ""),
            ];
            for (param, value, uncertainty, unit) in rows {
                writer.write_record([
                    format!("fit: {}", named.label),
                    param.to_string(),
                    value.to_string(),
                    uncertainty.map(|u| u.to_string()).unwrap_or_default(),
                    unit.to_string(),
                ])?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    fn write_chart(&self, chart: &ChartSpec, path: &Path) -> ReductionResult<()> {
        let mut writer = Writer::from_path(path)?;
        writer.write_record(["series", "kind", "x", "y", "x_error", "y_error", "category"])?;
        for series in &chart.series {
            for (i, &(x, y)) in series.points.iter().enumerate() {
                let category = chart
                    .categories
                    .as_ref()
                    .and_then(|c| {
                        let idx = x.round();
                        (idx >= 0.0 && (x - idx).abs() < 1e-9)
                            .then(|| c.get(idx as usize).cloned())
                            .flatten()
                    })
                    .unwrap_or_default();
                writer.write_record([
                    series.label.clone(),
                    format!("{:?}", series.kind),
                    x.to_string(),
                    y.to_string(),
                    series.x_errors.get(i).map(|e| e.to_string()).unwrap_or_default(),
                    series.y_errors.get(i).map(|e| e.to_string()).unwrap_or_default(),
                    category,
                ])?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}

impl ReportSink for CsvSink {
    fn emit(&mut self, report: &ExperimentReport) -> ReductionResult<()> {
        fs::create_dir_all(&self.output_dir)?;

        let quantities_path = self
            .output_dir
            .join(format!("{}_quantities.csv", report.name));
        self.write_quantities(report, &quantities_path)?;
        debug!("wrote {}", quantities_path.display());
        self.written.push(quantities_path);

        for chart in &report.charts {
            let path = self.output_dir.join(format!("{}.csv", chart.file_stem));
            self.write_chart(chart, &path)?;
            debug!("wrote {}", path.display());
            self.written.push(path);
        }
        Ok(())
    }
}
