// src/lib.rs - Library interface for the reduction pipeline and its tests

pub mod constants;
pub mod data_analysis;
pub mod data_input;
pub mod error;
pub mod experiments;
pub mod plot_framework;
pub mod report;

pub use error::{ErrorKind, ReductionError, ReductionResult};

// Package version, for the banner and --version.
pub fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
