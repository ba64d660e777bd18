// src/utils/mod.rs

pub mod telemetry;
