//! Core zone registry, alert rules, and climate analysis for ClimateWatch
//!
//! This crate holds the pure computations: the six Indian climate zones,
//! threshold-based alert generation, persistence-style reports and
//! historical trend summaries. Nothing here performs I/O.

pub mod alerts;
pub mod analyzer;
pub mod error;
pub mod rollups;
pub mod types;
pub mod zones;

pub use alerts::*;
pub use analyzer::*;
pub use error::*;
pub use rollups::*;
pub use types::*;
pub use zones::*;

/// Appended to every human-readable output
pub const ENVIRONMENTAL_DISCLAIMER: &str = "Climate and weather data provided by this tool are \
estimates based on historical averages and modelled projections. Do not use this tool as the sole \
basis for emergency response decisions. Always verify alerts with official meteorological \
authorities such as IMD (India Meteorological Department) before taking action.";
