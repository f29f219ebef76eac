//! Error taxonomy for zone lookup and observation handling

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClimateError {
    #[error("Zone '{zone_id}' not found. Available zones: {}", available.join(", "))]
    NotFound {
        zone_id: String,
        available: Vec<String>,
    },

    #[error("Observation field '{field}' is not numeric: {value}")]
    TypeMismatch { field: String, value: String },

    #[error("Invalid climate zone '{zone_id}': {reason}")]
    InvalidZone { zone_id: String, reason: String },

    #[error("Invalid alert thresholds: {0}")]
    InvalidThresholds(String),
}

pub type ClimateResult<T> = Result<T, ClimateError>;
