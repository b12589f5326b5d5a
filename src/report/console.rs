// src/report/console.rs

use std::io::{self, Write};

use crate::error::ReductionResult;
use crate::report::{ExperimentReport, ReportLine, ReportSink};

/// Formats a number with fixed decimals, switching to scientific notation
/// for very large or very small magnitudes.
pub fn format_value(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-3..1e5).contains(&magnitude) {
        format!("{value:.4e}")
    } else {
        format!("{value:.4}")
    }
}

fn format_line(line: &ReportLine) -> String {
    let unit = if line.unit.is_empty() {
        String::new()
    } else {
        format!(" {}", line.unit)
    };
    match line.uncertainty {
        Some(u) => format!(
            "  {}: {} ± {}{}",
            line.label,
            format_value(line.value),
            format_value(u),
            unit
        ),
        None => format!("  {}: {}{}", line.label, format_value(line.value), unit),
    }
}

/// Plain-text report writer; stdout by default.
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for ConsoleSink<W> {
    fn emit(&mut self, report: &ExperimentReport) -> ReductionResult<()> {
        let rule = "=".repeat(report.title.chars().count().max(20));
        writeln!(self.out, "\n{rule}\n{}\n{rule}", report.title)?;

        for section in &report.sections {
            writeln!(self.out, "\n--- {} ---", section.title)?;
            for line in &section.lines {
                writeln!(self.out, "{}", format_line(line))?;
            }
        }

        if !report.fits.is_empty() {
            writeln!(self.out, "\n--- Linear fits ---")?;
        }
        for named in &report.fits {
            let fit = &named.fit;
            writeln!(self.out, "  {} (n = {})", named.label, fit.n)?;
            writeln!(
                self.out,
                "    Slope: {} ± {} {}/{}",
                format_value(fit.slope),
                format_value(fit.slope_stderr),
                named.y_unit,
                named.x_unit
            )?;
            writeln!(
                self.out,
                "    Intercept: {} ± {} {}",
                format_value(fit.intercept),
                format_value(fit.intercept_stderr),
                named.y_unit
            )?;
            writeln!(self.out, "    r: {:.6}  R^2: {:.4}", fit.r_value, fit.r_squared())?;
            writeln!(
                self.out,
                "    Residual std: {} {}",
                format_value(fit.residual_std),
                named.y_unit
            )?;
        }
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_analysis::regression::linear_regression;
    use crate::report::{NamedFit, ReportSection};

    #[test]
    fn value_formatting() {
        assert_eq!(format_value(0.0), "0.0000");
        assert_eq!(format_value(450.0), "450.0000");
        assert_eq!(format_value(2.9e8), "2.9000e8");
        assert_eq!(format_value(1.5e-10), "1.5000e-10");
    }

    #[test]
    fn console_output_lists_sections_and_fits() {
        let mut report = ExperimentReport::new("demo", "Demo experiment");
        let mut section = ReportSection::new("Temperatures");
        section.push(ReportLine::scalar("T", 450.0, "K"));
        section.push(ReportLine {
            label: "u(T)".to_string(),
            value: 1.5,
            uncertainty: Some(0.1),
            unit: "K".to_string(),
        });
        report.sections.push(section);
        report.fits.push(NamedFit {
            label: "y vs x".to_string(),
            x_unit: "s".to_string(),
            y_unit: "m".to_string(),
            fit: linear_regression(&[1.0, 2.0, 3.0, 4.0], &[3.0, 5.0, 7.0, 9.0]).unwrap(),
        });

        let mut sink = ConsoleSink::new(Vec::new());
        sink.emit(&report).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert!(text.contains("Demo experiment"));
        assert!(text.contains("--- Temperatures ---"));
        assert!(text.contains("  T: 450.0000 K"));
        assert!(text.contains("  u(T): 1.5000 ± 0.1000 K"));
        assert!(text.contains("Slope: 2.0000 ± 0.0000 m/s"));
        assert!(text.contains("R^2: 1.0000"));
    }
}
