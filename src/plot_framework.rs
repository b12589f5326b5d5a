// src/plot_framework.rs

use plotters::backend::BitMapBackend;
use plotters::chart::{ChartBuilder, SeriesLabelPosition};
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::{Circle, ErrorBar, PathElement, Rectangle, Text};
use plotters::series::LineSeries;
use plotters::style::colors::{BLACK, RED, WHITE};
use plotters::style::{Color, IntoFont, RGBColor};

use std::error::Error;
use std::ops::Range;
use std::path::Path;

use crate::constants::{
    BAR_HALF_WIDTH, BAR_OPACITY, COLOR_REFERENCE_LINE, DASH_SEGMENT_STRIDE, ERROR_BAR_CAP_PX,
    FONT_FAMILY, FONT_SIZE_AXIS_LABEL, FONT_SIZE_CHART_TITLE, FONT_SIZE_LEGEND,
    FONT_SIZE_MESSAGE, LINE_WIDTH_ERROR_BAR, LINE_WIDTH_LEGEND, LINE_WIDTH_PLOT, PLOT_HEIGHT,
    PLOT_WIDTH, POINT_SIZE, RANGE_PADDING_FRACTION,
};
use crate::report::{ChartSeries, ChartSpec, SeriesKind};

/// Calculate plot range with padding.
/// Adds a fractional padding, or a fixed padding for very small ranges.
pub fn calculate_range(min_val: f64, max_val: f64) -> (f64, f64) {
    let (min, max) = if min_val <= max_val {
        (min_val, max_val)
    } else {
        (max_val, min_val)
    };
    let range = (max - min).abs();
    let padding = if range < 1e-12 {
        if max.abs() > 0.0 {
            max.abs() * 0.1
        } else {
            0.5
        }
    } else {
        range * RANGE_PADDING_FRACTION
    };
    (min - padding, max + padding)
}

/// Colour of the n-th series (Tableau 10 palette).
pub fn series_color(index: usize) -> RGBColor {
    let c = colorous::CATEGORY10[index % colorous::CATEGORY10.len()];
    RGBColor(c.r, c.g, c.b)
}

/// Axis ranges for a chart: fixed ranges when given, otherwise the padded
/// extent of all series and reference lines.
pub fn chart_ranges(spec: &ChartSpec) -> Option<(Range<f64>, Range<f64>)> {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    for (sx0, sx1, sy0, sy1) in spec.series.iter().filter_map(ChartSeries::extent) {
        x_min = x_min.min(sx0);
        x_max = x_max.max(sx1);
        y_min = y_min.min(sy0);
        y_max = y_max.max(sy1);
    }
    for reference in &spec.reference_lines {
        y_min = y_min.min(reference.y);
        y_max = y_max.max(reference.y);
    }
    if let Some(categories) = &spec.categories {
        if !categories.is_empty() {
            x_min = x_min.min(0.0);
            x_max = x_max.max((categories.len() - 1) as f64);
        }
    }

    let finite = [x_min, x_max, y_min, y_max].iter().all(|v| v.is_finite());
    if !finite {
        return None;
    }

    let (x0, x1) = match spec.x_range {
        Some(range) => range,
        None if spec.categories.is_some() => (x_min - 0.6, x_max + 0.6),
        None => calculate_range(x_min, x_max),
    };
    let (y0, y1) = spec.y_range.unwrap_or_else(|| calculate_range(y_min, y_max));
    if x1 > x0 && y1 > y0 {
        Some((x0..x1, y0..y1))
    } else {
        None
    }
}

fn format_axis_value(v: f64) -> String {
    let magnitude = v.abs();
    if magnitude == 0.0 {
        "0".to_string()
    } else if magnitude >= 1e5 || magnitude < 1e-3 {
        format!("{v:.2e}")
    } else if magnitude >= 100.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

fn format_category(x: f64, categories: Option<&[String]>) -> String {
    match categories {
        Some(names) => {
            let idx = x.round();
            if (x - idx).abs() < 1e-6 && idx >= 0.0 {
                names.get(idx as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        }
        None => format_axis_value(x),
    }
}

/// Draw a "Data Unavailable" message on a plot area.
pub fn draw_unavailable_message(
    area: &DrawingArea<BitMapBackend, Shift>,
    chart_title: &str,
    reason: &str,
) -> Result<(), Box<dyn Error>> {
    let (width, height) = area.dim_in_pixel();
    let text_style = (FONT_FAMILY, FONT_SIZE_MESSAGE).into_font().color(&RED);
    area.draw(&Text::new(
        format!("{chart_title} Data Unavailable: {reason}"),
        (width as i32 / 4, height as i32 / 2),
        text_style,
    ))?;
    Ok(())
}

/// Renders one chart to a PNG file.
pub fn draw_chart(spec: &ChartSpec, output_path: &Path) -> Result<(), Box<dyn Error>> {
    let root_area = BitMapBackend::new(output_path, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root_area.fill(&WHITE)?;

    let ranges = if spec.has_data() {
        chart_ranges(spec)
    } else {
        None
    };
    let Some((x_range, y_range)) = ranges else {
        let reason = if spec.has_data() {
            "Invalid ranges"
        } else {
            "No data points"
        };
        draw_unavailable_message(&root_area, &spec.title, reason)?;
        root_area.present()?;
        return Ok(());
    };

    let mut chart = ChartBuilder::on(&root_area)
        .caption(&spec.title, (FONT_FAMILY, FONT_SIZE_CHART_TITLE))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(x_range.clone(), y_range.clone())?;

    let categories = spec.categories.as_deref();
    let x_label_count = categories.map(|c| c.len().max(1)).unwrap_or(12);
    let x_formatter = |x: &f64| format_category(*x, categories);
    let y_formatter = |y: &f64| format_axis_value(*y);

    chart
        .configure_mesh()
        .x_desc(&spec.x_label)
        .y_desc(&spec.y_label)
        .x_labels(x_label_count)
        .y_labels(10)
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .light_line_style(WHITE.mix(0.7))
        .label_style((FONT_FAMILY, FONT_SIZE_AXIS_LABEL))
        .draw()?;

    let mut legend_series_count = 0;

    for (index, series) in spec.series.iter().enumerate() {
        if series.points.is_empty() {
            continue;
        }
        let color = series_color(index);
        let labelled = !series.label.is_empty();

        match series.kind {
            SeriesKind::Scatter => {
                let drawn = chart.draw_series(
                    series
                        .points
                        .iter()
                        .map(|&p| Circle::new(p, POINT_SIZE, color.filled())),
                )?;
                if labelled {
                    drawn
                        .label(&series.label)
                        .legend(move |(x, y)| Circle::new((x + 10, y), POINT_SIZE, color.filled()));
                }
            }
            SeriesKind::Line => {
                let drawn = chart.draw_series(LineSeries::new(
                    series.points.iter().copied(),
                    color.stroke_width(LINE_WIDTH_PLOT),
                ))?;
                if labelled {
                    drawn.label(&series.label).legend(move |(x, y)| {
                        PathElement::new(
                            vec![(x, y), (x + 20, y)],
                            color.stroke_width(LINE_WIDTH_LEGEND),
                        )
                    });
                }
            }
            SeriesKind::DashedLine => {
                // Every other segment of a densely sampled curve.
                let mut first = true;
                for (i, pair) in series.points.windows(2).enumerate() {
                    if i % DASH_SEGMENT_STRIDE != 0 {
                        continue;
                    }
                    let drawn = chart.draw_series(LineSeries::new(
                        vec![pair[0], pair[1]],
                        color.stroke_width(LINE_WIDTH_PLOT),
                    ))?;
                    if first && labelled {
                        drawn.label(&series.label).legend(move |(x, y)| {
                            PathElement::new(
                                vec![(x, y), (x + 8, y)],
                                color.stroke_width(LINE_WIDTH_LEGEND),
                            )
                        });
                    }
                    first = false;
                }
            }
            SeriesKind::Bar => {
                let fill = color.mix(BAR_OPACITY).filled();
                let drawn = chart.draw_series(series.points.iter().map(|&(x, y)| {
                    Rectangle::new([(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, y)], fill)
                }))?;
                if labelled {
                    drawn.label(&series.label).legend(move |(x, y)| {
                        Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.mix(BAR_OPACITY).filled())
                    });
                }
            }
            SeriesKind::ErrorBars => {
                let bar_style = BLACK.mix(0.5).stroke_width(LINE_WIDTH_ERROR_BAR);
                if !series.y_errors.is_empty() {
                    chart.draw_series(series.points.iter().zip(&series.y_errors).map(
                        |(&(x, y), &ey)| {
                            ErrorBar::new_vertical(x, y - ey, y, y + ey, bar_style, ERROR_BAR_CAP_PX)
                        },
                    ))?;
                }
                if !series.x_errors.is_empty() {
                    chart.draw_series(series.points.iter().zip(&series.x_errors).map(
                        |(&(x, y), &ex)| {
                            ErrorBar::new_horizontal(y, x - ex, x, x + ex, bar_style, ERROR_BAR_CAP_PX)
                        },
                    ))?;
                }
                let drawn = chart.draw_series(
                    series
                        .points
                        .iter()
                        .map(|&p| Circle::new(p, POINT_SIZE, color.filled())),
                )?;
                if labelled {
                    drawn
                        .label(&series.label)
                        .legend(move |(x, y)| Circle::new((x + 10, y), POINT_SIZE, color.filled()));
                }
            }
        }
        if labelled {
            legend_series_count += 1;
        }
    }

    for reference in &spec.reference_lines {
        let drawn = chart.draw_series(LineSeries::new(
            vec![(x_range.start, reference.y), (x_range.end, reference.y)],
            COLOR_REFERENCE_LINE.stroke_width(1),
        ))?;
        if !reference.label.is_empty() {
            drawn.label(&reference.label).legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], COLOR_REFERENCE_LINE.stroke_width(1))
            });
            legend_series_count += 1;
        }
    }

    if legend_series_count > 0 {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font((FONT_FAMILY, FONT_SIZE_LEGEND))
            .draw()?;
    }

    root_area.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReferenceLine;

    #[test]
    fn range_padding() {
        let (lo, hi) = calculate_range(0.0, 10.0);
        assert!((lo + 0.8).abs() < 1e-12);
        assert!((hi - 10.8).abs() < 1e-12);
        // Reversed arguments are normalised.
        assert_eq!(calculate_range(10.0, 0.0), (lo, hi));
        // Degenerate ranges still open up.
        let (lo, hi) = calculate_range(5.0, 5.0);
        assert!(lo < 5.0 && hi > 5.0);
    }

    #[test]
    fn ranges_cover_series_and_reference_lines() {
        let spec = ChartSpec::new("t", "T", "x", "y")
            .with_series(ChartSeries::new(
                "pts",
                SeriesKind::Scatter,
                vec![(1.0, 2.0), (3.0, 4.0)],
            ));
        let mut spec = spec;
        spec.reference_lines.push(ReferenceLine {
            y: 10.0,
            label: "ref".to_string(),
        });
        let (x, y) = chart_ranges(&spec).unwrap();
        assert!(x.start < 1.0 && x.end > 3.0);
        assert!(y.start < 2.0 && y.end > 10.0);
    }

    #[test]
    fn category_ranges_surround_every_bar() {
        let mut spec = ChartSpec::new("t", "T", "face", "ratio").with_series(ChartSeries::new(
            "P9",
            SeriesKind::Bar,
            vec![(0.0, 1.0), (1.0, 0.5), (2.0, 0.1)],
        ));
        spec.categories = Some(vec!["a".into(), "b".into(), "c".into()]);
        spec.y_range = Some((0.0, 1.1));
        let (x, y) = chart_ranges(&spec).unwrap();
        assert!((x.start + 0.6).abs() < 1e-12);
        assert!((x.end - 2.6).abs() < 1e-12);
        assert_eq!(y, 0.0..1.1);
    }

    #[test]
    fn empty_chart_has_no_ranges() {
        let spec = ChartSpec::new("t", "T", "x", "y");
        assert!(chart_ranges(&spec).is_none());
    }

    #[test]
    fn category_labels() {
        let names = vec!["black".to_string(), "white".to_string()];
        assert_eq!(format_category(1.0, Some(&names)), "white");
        assert_eq!(format_category(0.5, Some(&names)), "");
        assert_eq!(format_category(7.0, Some(&names)), "");
        assert_eq!(format_category(250.0, None), "250");
    }

    #[test]
    fn palette_cycles() {
        assert_eq!(series_color(0), series_color(10));
        assert_ne!(series_color(0), series_color(1));
    }
}

// src/plot_framework.rs
