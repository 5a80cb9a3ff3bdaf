//! Tuning knobs for the effect engines and mixer.
//!
//! All fields have defaults, so a config file only needs to name the knobs
//! it changes.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, check_range};
use crate::trigger::{MAX_START_POSITION, MAX_STRENGTH, MIN_STRENGTH};

/// Upper bound accepted for any rumble gain.
pub const MAX_RUMBLE_GAIN: f64 = 4.0;

/// Per-source rumble gains plus the master gain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RumbleGains {
    pub master: f64,
    pub road: f64,
    pub kerb: f64,
    pub g_force: f64,
    pub abs: f64,
    pub traction_control: f64,
    pub engine: f64,
    pub impact: f64,
    pub oversteer: f64,
}

impl Default for RumbleGains {
    fn default() -> Self {
        Self {
            master: 1.0,
            road: 0.5,
            kerb: 1.0,
            g_force: 0.7,
            abs: 0.8,
            traction_control: 0.3,
            engine: 0.3,
            impact: 1.0,
            oversteer: 0.4,
        }
    }
}

impl RumbleGains {
    /// Same gains with a different master level.
    pub fn with_master(mut self, master: f64) -> Self {
        self.master = master.clamp(0.0, MAX_RUMBLE_GAIN);
        self
    }

    fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("gains.master", self.master),
            ("gains.road", self.road),
            ("gains.kerb", self.kerb),
            ("gains.g_force", self.g_force),
            ("gains.abs", self.abs),
            ("gains.traction_control", self.traction_control),
            ("gains.engine", self.engine),
            ("gains.impact", self.impact),
            ("gains.oversteer", self.oversteer),
        ] {
            check_range(field, value, 0.0, MAX_RUMBLE_GAIN)?;
        }
        Ok(())
    }
}

/// Engine and mixer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    /// Smoothed brake below this turns the left trigger off.
    pub brake_deadzone: f64,
    /// Smoothed throttle below this turns the right trigger off.
    pub throttle_deadzone: f64,
    pub brake_start_position: u8,
    pub throttle_start_position: u8,
    pub max_brake_strength: u8,
    pub max_throttle_strength: u8,
    /// Baseline throttle resistance, capped by `max_throttle_strength`.
    pub fixed_throttle_strength: u8,

    /// ABS pulses while front grip is below this.
    pub abs_grip_threshold: f64,
    /// Traction-control pulses while rear grip is below this.
    pub tc_grip_threshold: f64,
    pub impact_trigger_gain: f64,
    pub oversteer_threshold_deg: f64,

    pub gains: RumbleGains,

    /// Minimum peak suspension velocity for a kerb strike, m/s.
    pub kerb_susp_velocity_threshold: f64,
    pub kerb_rumble_scale: f64,
    pub kerb_trigger_gain: f64,
    pub kerb_trigger_frequency_hz: u8,

    pub rumble_smoothing_alpha: f64,
    pub rumble_noise_gate: f64,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            brake_deadzone: 0.02,
            throttle_deadzone: 0.02,
            brake_start_position: 2,
            throttle_start_position: 1,
            max_brake_strength: 8,
            max_throttle_strength: 5,
            fixed_throttle_strength: 2,
            abs_grip_threshold: 0.85,
            tc_grip_threshold: 0.60,
            impact_trigger_gain: 0.5,
            oversteer_threshold_deg: 10.0,
            gains: RumbleGains::default(),
            kerb_susp_velocity_threshold: 0.15,
            kerb_rumble_scale: 3.0,
            kerb_trigger_gain: 0.8,
            kerb_trigger_frequency_hz: 45,
            rumble_smoothing_alpha: 0.5,
            rumble_noise_gate: 0.05,
        }
    }
}

impl EffectsConfig {
    /// Steady throttle resistance actually emitted.
    pub fn effective_throttle_strength(&self) -> u8 {
        self.fixed_throttle_strength
            .min(self.max_throttle_strength)
            .clamp(MIN_STRENGTH, MAX_STRENGTH)
    }

    /// Checks every knob against its usable range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> ConfigResult<()> {
        check_range("brake_deadzone", self.brake_deadzone, 0.0, 0.99)?;
        check_range("throttle_deadzone", self.throttle_deadzone, 0.0, 0.99)?;

        check_position("brake_start_position", self.brake_start_position)?;
        check_position("throttle_start_position", self.throttle_start_position)?;
        check_strength("max_brake_strength", self.max_brake_strength)?;
        check_strength("max_throttle_strength", self.max_throttle_strength)?;
        check_strength("fixed_throttle_strength", self.fixed_throttle_strength)?;

        // Severity divides by (1 - threshold).
        check_range("abs_grip_threshold", self.abs_grip_threshold, 0.01, 0.99)?;
        check_range("tc_grip_threshold", self.tc_grip_threshold, 0.01, 0.99)?;
        check_range("impact_trigger_gain", self.impact_trigger_gain, 0.0, 10.0)?;
        check_range(
            "oversteer_threshold_deg",
            self.oversteer_threshold_deg,
            0.0,
            180.0,
        )?;

        self.gains.validate()?;

        check_range(
            "kerb_susp_velocity_threshold",
            self.kerb_susp_velocity_threshold,
            0.001,
            100.0,
        )?;
        check_range("kerb_rumble_scale", self.kerb_rumble_scale, 0.0, 100.0)?;
        check_range("kerb_trigger_gain", self.kerb_trigger_gain, 0.0, 10.0)?;
        if self.kerb_trigger_frequency_hz == 0 {
            return Err(ConfigError::Invalid {
                field: "kerb_trigger_frequency_hz",
                reason: "must be at least 1 Hz".to_string(),
            });
        }

        check_range(
            "rumble_smoothing_alpha",
            self.rumble_smoothing_alpha,
            0.01,
            1.0,
        )?;
        check_range("rumble_noise_gate", self.rumble_noise_gate, 0.0, 0.99)?;
        Ok(())
    }
}

fn check_position(field: &'static str, value: u8) -> ConfigResult<()> {
    check_range(field, f64::from(value), 0.0, f64::from(MAX_START_POSITION))
}

fn check_strength(field: &'static str, value: u8) -> ConfigResult<()> {
    check_range(
        field,
        f64::from(value),
        f64::from(MIN_STRENGTH),
        f64::from(MAX_STRENGTH),
    )
}
