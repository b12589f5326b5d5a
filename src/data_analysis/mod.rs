// src/data_analysis/mod.rs

pub mod derivative;
pub mod interpolation;
pub mod physical_models;
pub mod regression;
pub mod uncertainty;

// src/data_analysis/mod.rs
