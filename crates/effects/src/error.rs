//! Configuration errors.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Fails unless `value` is finite and within `min..=max`.
///
/// # Errors
///
/// [`ConfigError::NotFinite`] for NaN or infinities, otherwise
/// [`ConfigError::OutOfRange`] when outside the bounds.
pub fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> ConfigResult<()> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field, value });
    }
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_checks() {
        assert!(check_range("x", 0.5, 0.0, 1.0).is_ok());
        assert!(check_range("x", 1.0, 0.0, 1.0).is_ok());
        assert_eq!(
            check_range("x", f64::NAN, 0.0, 1.0).map_err(|e| e.to_string()),
            Err("x must be finite, got NaN".to_string())
        );
        assert_eq!(
            check_range("gain", 2.5, 0.0, 2.0).map_err(|e| e.to_string()),
            Err("gain = 2.5 is outside 0..=2".to_string())
        );
    }
}
