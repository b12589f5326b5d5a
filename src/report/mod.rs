// src/report/mod.rs
//
// Presentation side of a run. Experiments produce an `ExperimentReport`;
// sinks turn it into console text, CSV files or PNG charts.

pub mod console;
pub mod csv_export;
pub mod plot;

use crate::data_analysis::regression::LinearFit;
use crate::data_analysis::uncertainty::Measured;
use crate::error::ReductionResult;

pub use console::ConsoleSink;
pub use csv_export::CsvSink;
pub use plot::PlotSink;

/// One labelled number in a report, optionally with its standard uncertainty.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
    pub label: String,
    pub value: f64,
    pub uncertainty: Option<f64>,
    pub unit: String,
}

impl ReportLine {
    pub fn scalar(label: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value,
            uncertainty: None,
            unit: unit.into(),
        }
    }

    pub fn measured(label: impl Into<String>, measured: &Measured) -> Self {
        Self {
            label: label.into(),
            value: measured.value,
            uncertainty: Some(measured.uncertainty),
            unit: measured.unit.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSection {
    pub title: String,
    pub lines: Vec<ReportLine>,
}

impl ReportSection {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    pub fn push(&mut self, line: ReportLine) {
        self.lines.push(line);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedFit {
    pub label: String,
    pub x_unit: String,
    pub y_unit: String,
    pub fit: LinearFit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Scatter,
    Line,
    DashedLine,
    /// Bars centred on category indices.
    Bar,
    /// Markers with x and/or y error bars.
    ErrorBars,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub kind: SeriesKind,
    pub points: Vec<(f64, f64)>,
    /// Half-widths, empty when absent.
    pub x_errors: Vec<f64>,
    pub y_errors: Vec<f64>,
}

impl ChartSeries {
    pub fn new(label: impl Into<String>, kind: SeriesKind, points: Vec<(f64, f64)>) -> Self {
        Self {
            label: label.into(),
            kind,
            points,
            x_errors: Vec::new(),
            y_errors: Vec::new(),
        }
    }

    pub fn with_errors(mut self, x_errors: Vec<f64>, y_errors: Vec<f64>) -> Self {
        self.x_errors = x_errors;
        self.y_errors = y_errors;
        self
    }

    /// (x_min, x_max, y_min, y_max) including error bar extents.
    pub fn extent(&self) -> Option<(f64, f64, f64, f64)> {
        if self.points.is_empty() {
            return None;
        }
        let mut ext = (
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
        );
        for (i, &(x, y)) in self.points.iter().enumerate() {
            let ex = self.x_errors.get(i).copied().unwrap_or(0.0).abs();
            let ey = self.y_errors.get(i).copied().unwrap_or(0.0).abs();
            ext.0 = ext.0.min(x - ex);
            ext.1 = ext.1.max(x + ex);
            ext.2 = ext.2.min(y - ey);
            ext.3 = ext.3.max(y + ey);
        }
        if self.kind == SeriesKind::Bar {
            ext.2 = ext.2.min(0.0);
            ext.3 = ext.3.max(0.0);
        }
        Some(ext)
    }
}

/// Horizontal reference line, e.g. a mean or a normalisation level.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLine {
    pub y: f64,
    pub label: String,
}

/// Everything a renderer needs to draw one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    /// File name without extension.
    pub file_stem: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<ChartSeries>,
    pub reference_lines: Vec<ReferenceLine>,
    /// Category names for bar charts, indexed by x position.
    pub categories: Option<Vec<String>>,
    /// Fixed y range instead of the data extent.
    pub y_range: Option<(f64, f64)>,
    /// Fixed x range instead of the data extent.
    pub x_range: Option<(f64, f64)>,
}

impl ChartSpec {
    pub fn new(
        file_stem: impl Into<String>,
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Self {
        Self {
            file_stem: file_stem.into(),
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            series: Vec::new(),
            reference_lines: Vec::new(),
            categories: None,
            y_range: None,
            x_range: None,
        }
    }

    pub fn with_series(mut self, series: ChartSeries) -> Self {
        self.series.push(series);
        self
    }

    pub fn has_data(&self) -> bool {
        self.series.iter().any(|s| !s.points.is_empty())
    }
}

/// Result of one experiment ready for presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentReport {
    /// Short machine name, used for file names.
    pub name: String,
    pub title: String,
    pub sections: Vec<ReportSection>,
    pub fits: Vec<NamedFit>,
    pub charts: Vec<ChartSpec>,
}

impl ExperimentReport {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            sections: Vec::new(),
            fits: Vec::new(),
            charts: Vec::new(),
        }
    }

    /// Looks up a line by section title and label.
    pub fn line(&self, section: &str, label: &str) -> Option<&ReportLine> {
        self.sections
            .iter()
            .find(|s| s.title == section)
            .and_then(|s| s.lines.iter().find(|l| l.label == label))
    }
}

/// Destination for finished experiment reports.
pub trait ReportSink {
    fn emit(&mut self, report: &ExperimentReport) -> ReductionResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_extent_includes_zero() {
        let s = ChartSeries::new("bars", SeriesKind::Bar, vec![(0.0, 0.5), (1.0, 0.9)]);
        assert_eq!(s.extent(), Some((0.0, 1.0, 0.0, 0.9)));
    }

    #[test]
    fn error_extent_includes_bars() {
        let s = ChartSeries::new("pts", SeriesKind::ErrorBars, vec![(1.0, 2.0)])
            .with_errors(vec![0.5], vec![0.25]);
        assert_eq!(s.extent(), Some((0.5, 1.5, 1.75, 2.25)));
    }

    #[test]
    fn line_lookup() {
        let mut report = ExperimentReport::new("demo", "Demo");
        let mut section = ReportSection::new("Uncertainties");
        section.push(ReportLine::scalar("u(V)", 0.03, "mV"));
        report.sections.push(section);
        assert_eq!(report.line("Uncertainties", "u(V)").map(|l| l.value), Some(0.03));
        assert!(report.line("Uncertainties", "missing").is_none());
    }
}
