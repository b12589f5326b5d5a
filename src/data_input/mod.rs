// src/data_input/mod.rs

pub mod config;
pub mod datasets;
pub mod measurement;

// src/data_input/mod.rs
