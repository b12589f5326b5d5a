// src/constants.rs

use plotters::style::colors::full_palette::GREY_600;
use plotters::style::RGBColor;

// Plot dimensions.
pub const PLOT_WIDTH: u32 = 1280;
pub const PLOT_HEIGHT: u32 = 800;

// Font sizes
pub const FONT_SIZE_CHART_TITLE: i32 = 28;
pub const FONT_SIZE_AXIS_LABEL: i32 = 16;
pub const FONT_SIZE_LEGEND: i32 = 16;
pub const FONT_SIZE_MESSAGE: i32 = 22;
pub const FONT_FAMILY: &str = "sans-serif";

// Stroke widths for lines
pub const LINE_WIDTH_PLOT: u32 = 2;
pub const LINE_WIDTH_LEGEND: u32 = 2;
pub const LINE_WIDTH_ERROR_BAR: u32 = 1;

// Markers and bars
pub const POINT_SIZE: i32 = 5;
pub const ERROR_BAR_CAP_PX: u32 = 6;
pub const BAR_HALF_WIDTH: f64 = 0.35;
pub const BAR_OPACITY: f64 = 0.75;
pub const DASH_SEGMENT_STRIDE: usize = 2;

pub const COLOR_REFERENCE_LINE: RGBColor = GREY_600;

// Relative padding added around the data extent.
pub const RANGE_PADDING_FRACTION: f64 = 0.08;

// Points used when sampling smooth curves (splines, fitted lines).
pub const CURVE_SAMPLE_POINTS: usize = 300;
pub const FIT_LINE_SAMPLE_POINTS: usize = 200;

// A fit below this R^2 is reported as poorly linear.
pub const LINEARITY_WARNING_R2: f64 = 0.95;

// Default output directory of the batch binary.
pub const DEFAULT_OUTPUT_DIR: &str = "lab_reduction_output";

// Speed of light in vacuum (m/s), exact by definition of the metre.
pub const SPEED_OF_LIGHT_VACUUM: f64 = 299_792_458.0;

// src/constants.rs
