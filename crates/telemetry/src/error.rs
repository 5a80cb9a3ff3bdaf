//! Error types for telemetry acquisition and deriver configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("shared memory '{name}' unavailable: {reason}")]
    Unavailable { name: String, reason: String },

    #[error("telemetry buffer too short: need {needed} bytes, got {actual}")]
    ShortBuffer { needed: usize, actual: usize },

    #[error("invalid vehicle geometry: {field} = {value}")]
    InvalidGeometry { field: &'static str, value: f64 },
}

pub type TelemetryResult<T> = Result<T, TelemetryError>;
