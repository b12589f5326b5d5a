// src/report/plot.rs

use std::fs;
use std::path::PathBuf;

use log::{debug, info};

use crate::error::{ReductionError, ReductionResult};
use crate::plot_framework::draw_chart;
use crate::report::{ExperimentReport, ReportSink};

/// Renders every chart of a report to `<output_dir>/<file_stem>.png`.
pub struct PlotSink {
    output_dir: PathBuf,
    written: Vec<PathBuf>,
}

impl PlotSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ReportSink for PlotSink {
    fn emit(&mut self, report: &ExperimentReport) -> ReductionResult<()> {
        fs::create_dir_all(&self.output_dir)?;
        for chart in &report.charts {
            let path = self.output_dir.join(format!("{}.png", chart.file_stem));
            draw_chart(chart, &path).map_err(|e| {
                ReductionError::output(format!("rendering {}: {e}", path.display()))
            })?;
            debug!("rendered {}", path.display());
            self.written.push(path);
        }
        info!(
            "{}: {} chart(s) written to {}",
            report.name,
            report.charts.len(),
            self.output_dir.display()
        );
        Ok(())
    }
}
