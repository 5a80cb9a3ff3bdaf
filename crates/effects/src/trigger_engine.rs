//! Trigger Synthesis Engine
//!
//! Left trigger (brake): proportional resistance, with a strength-1
//! release pulse when the deceleration profile suggests wheel lockup.
//!
//! Right trigger (throttle), first match wins:
//!
//! 1. impact decay > 0.2: vibration at 50 Hz
//! 2. gear-shift decay > 0.1: vibration at 35 Hz
//! 3. kerb decay > 0.15: vibration at the configured kerb frequency
//! 4. steady resistance at the configured strength

use padhaptics_telemetry::TelemetryFrame;
use tracing::debug;

use crate::config::EffectsConfig;
use crate::rumble_engine::is_upshift;
use crate::state::TickState;
use crate::trigger::{MAX_STRENGTH, MIN_STRENGTH, TriggerEffect};

/// Exponential smoothing factor applied to both pedals.
pub const PEDAL_ALPHA: f64 = 0.15;

pub const IMPACT_VIBRATION_HZ: u8 = 50;
pub const GEAR_SHIFT_VIBRATION_HZ: u8 = 35;

const IMPACT_DECAY_RATE: f64 = 5.0;
const GEAR_SHIFT_DECAY: f64 = 0.6;
const GEAR_SHIFT_DECAY_RATE: f64 = 7.0;
const KERB_SUSP_VELOCITY: f64 = 0.6;
const KERB_DECAY_RATE: f64 = 8.0;

const HARD_BRAKE_PEDAL: f64 = 0.3;
const HARD_BRAKE_SPEED_MS: f64 = 5.0;
const LOCKUP_PEDAL: f64 = 0.5;
const LOCKUP_MIN_PEAK_DECEL: f64 = 6.0;
const LOCKUP_DECEL_FRACTION: f64 = 0.55;
const PEAK_DECEL_RELEASE: f64 = 4.0;

/// Accumulators owned by the engine. Public for inspection in tests.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TriggerState {
    pub smooth_brake: f64,
    pub smooth_throttle: f64,
    pub pedals_initialized: bool,
    pub impact_decay: f64,
    pub prev_gear: i32,
    pub gear_shift_decay: f64,
    pub kerb_decay: f64,
    /// Peak deceleration tracked while braking hard, m/s².
    pub peak_decel: f64,
}

/// Both trigger commands for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerPair {
    pub left: TriggerEffect,
    pub right: TriggerEffect,
}

#[derive(Debug, Clone)]
pub struct TriggerEngine {
    config: EffectsConfig,
    state: TriggerState,
}

impl TriggerEngine {
    pub fn new(config: EffectsConfig) -> Self {
        Self {
            config,
            state: TriggerState::default(),
        }
    }

    pub fn state(&self) -> &TriggerState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut TriggerState {
        &mut self.state
    }

    pub fn update(&mut self, frame: &TelemetryFrame) -> TriggerPair {
        self.update_accumulators(frame);
        TriggerPair {
            left: self.brake_trigger(frame),
            right: self.throttle_trigger(),
        }
    }

    fn update_accumulators(&mut self, frame: &TelemetryFrame) {
        let dt = frame.delta_time;
        let s = &mut self.state;

        if s.pedals_initialized {
            s.smooth_brake = PEDAL_ALPHA * frame.brake + (1.0 - PEDAL_ALPHA) * s.smooth_brake;
            s.smooth_throttle =
                PEDAL_ALPHA * frame.throttle + (1.0 - PEDAL_ALPHA) * s.smooth_throttle;
        } else {
            s.smooth_brake = frame.brake;
            s.smooth_throttle = frame.throttle;
            s.pedals_initialized = true;
        }

        s.impact_decay = if frame.impact_this_tick {
            (frame.last_impact_magnitude * self.config.impact_trigger_gain / 50.0).clamp(0.3, 1.0)
        } else {
            (s.impact_decay - dt * IMPACT_DECAY_RATE).max(0.0)
        };

        if is_upshift(s.prev_gear, frame.gear) {
            s.gear_shift_decay = GEAR_SHIFT_DECAY;
        }
        s.prev_gear = frame.gear;
        s.gear_shift_decay = (s.gear_shift_decay - dt * GEAR_SHIFT_DECAY_RATE).max(0.0);

        if frame.max_susp_velocity > KERB_SUSP_VELOCITY && !frame.is_stationary {
            let hit = (frame.max_susp_velocity * 1.5).clamp(0.3, 1.0);
            s.kerb_decay = s.kerb_decay.max(hit);
        }
        s.kerb_decay = (s.kerb_decay - dt * KERB_DECAY_RATE).max(0.0);
    }

    fn brake_trigger(&mut self, frame: &TelemetryFrame) -> TriggerEffect {
        let cfg = &self.config;
        let s = &mut self.state;

        if s.smooth_brake < cfg.brake_deadzone {
            s.peak_decel = 0.0;
            return TriggerEffect::Off;
        }

        let decel = frame.long_accel.abs();
        if s.smooth_brake > HARD_BRAKE_PEDAL && frame.speed_ms > HARD_BRAKE_SPEED_MS {
            s.peak_decel = if decel > s.peak_decel {
                decel
            } else {
                decel.max(s.peak_decel - frame.delta_time * PEAK_DECEL_RELEASE)
            };

            if s.smooth_brake > LOCKUP_PEDAL
                && s.peak_decel > LOCKUP_MIN_PEAK_DECEL
                && decel < s.peak_decel * LOCKUP_DECEL_FRACTION
            {
                debug!(decel, peak = s.peak_decel, "brake lockup release pulse");
                return TriggerEffect::feedback(cfg.brake_start_position, MIN_STRENGTH);
            }
        } else {
            s.peak_decel = 0.0;
        }

        let strength = (s.smooth_brake * f64::from(cfg.max_brake_strength)).round_ties_even();
        TriggerEffect::feedback(cfg.brake_start_position, level(strength, MAX_STRENGTH))
    }

    fn throttle_trigger(&self) -> TriggerEffect {
        let cfg = &self.config;
        let s = &self.state;
        let start = cfg.throttle_start_position;

        if s.smooth_throttle < cfg.throttle_deadzone {
            return TriggerEffect::Off;
        }
        if s.impact_decay > 0.2 {
            let amp = level((6.0 * s.impact_decay).trunc(), MAX_STRENGTH);
            return TriggerEffect::vibration(start, amp, IMPACT_VIBRATION_HZ);
        }
        if s.gear_shift_decay > 0.1 {
            let amp = level((4.0 * s.gear_shift_decay).trunc(), 5);
            return TriggerEffect::vibration(start, amp, GEAR_SHIFT_VIBRATION_HZ);
        }
        if s.kerb_decay > 0.15 {
            let amp = level((5.0 * s.kerb_decay * cfg.kerb_trigger_gain).trunc(), MAX_STRENGTH);
            return TriggerEffect::vibration(start, amp, cfg.kerb_trigger_frequency_hz);
        }
        TriggerEffect::feedback(start, cfg.effective_throttle_strength())
    }
}

impl TickState for TriggerEngine {
    fn reset(&mut self) {
        self.state = TriggerState::default();
    }
}

/// Clamps an integral-valued float into `MIN_STRENGTH..=max`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is clamped to a small positive range before the cast"
)]
fn level(value: f64, max: u8) -> u8 {
    if !value.is_finite() {
        return MIN_STRENGTH;
    }
    value.clamp(f64::from(MIN_STRENGTH), f64::from(max)) as u8
}
