//! Effect Mixer
//!
//! Last stage before the output sink. Rumble is exponentially smoothed with
//! a transient boost and a noise gate; each trigger channel is debounced on
//! mode changes so the actuator does not flip between resistance and
//! vibration every tick.

use crate::config::EffectsConfig;
use crate::rumble::RumbleEffect;
use crate::state::TickState;
use crate::trigger::TriggerEffect;
use crate::trigger_engine::TriggerPair;

/// Ticks a mode change must persist before it is accepted.
pub const MODE_HOLD_MIN_FRAMES: u32 = 6;

/// Per-tick channel change above which smoothing is relaxed.
pub const TRANSIENT_DELTA: f64 = 0.15;
/// Upper bound of the boosted smoothing factor.
pub const TRANSIENT_ALPHA_CAP: f64 = 0.85;

/// Mode debounce for one trigger channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeHold {
    /// Last accepted effect.
    pub accepted: TriggerEffect,
    pub hold_frames: u32,
}

impl ModeHold {
    /// Returns the effect to emit this tick.
    ///
    /// A change between two active modes is suppressed, re-emitting the last
    /// accepted effect, until it has been requested for
    /// [`MODE_HOLD_MIN_FRAMES`] ticks. Changes to or from `Off` pass
    /// immediately. A request in the current mode passes with its own
    /// parameters and clears the counter.
    pub fn stabilize(&mut self, effect: TriggerEffect) -> TriggerEffect {
        if effect.mode() == self.accepted.mode() {
            self.hold_frames = 0;
            self.accepted = effect;
            return effect;
        }

        self.hold_frames += 1;
        let involves_off = effect.is_off() || self.accepted.is_off();
        if self.hold_frames < MODE_HOLD_MIN_FRAMES && !involves_off {
            return self.accepted;
        }
        self.accepted = effect;
        self.hold_frames = 0;
        effect
    }
}

/// Output smoothing and stabilization.
#[derive(Debug, Clone)]
pub struct EffectMixer {
    alpha: f64,
    noise_gate: f64,
    smoothed: RumbleEffect,
    rumble_initialized: bool,
    left: ModeHold,
    right: ModeHold,
}

impl EffectMixer {
    pub fn new(config: &EffectsConfig) -> Self {
        Self {
            alpha: config.rumble_smoothing_alpha,
            noise_gate: config.rumble_noise_gate,
            smoothed: RumbleEffect::NONE,
            rumble_initialized: false,
            left: ModeHold::default(),
            right: ModeHold::default(),
        }
    }

    /// Smoothed rumble before the noise gate.
    pub fn smoothed(&self) -> RumbleEffect {
        self.smoothed
    }

    pub fn left_hold(&self) -> &ModeHold {
        &self.left
    }

    pub fn right_hold(&self) -> &ModeHold {
        &self.right
    }

    pub fn smooth_rumble(&mut self, raw: RumbleEffect) -> RumbleEffect {
        if self.rumble_initialized {
            let delta = (raw.right - self.smoothed.right)
                .abs()
                .max((raw.left - self.smoothed.left).abs());
            let alpha = if delta > TRANSIENT_DELTA {
                (self.alpha + delta * 1.5).min(TRANSIENT_ALPHA_CAP)
            } else {
                self.alpha
            };
            self.smoothed = raw * alpha + self.smoothed * (1.0 - alpha);
        } else {
            self.smoothed = raw;
            self.rumble_initialized = true;
        }

        let gate = |v: f64| if v < self.noise_gate { 0.0 } else { v };
        RumbleEffect::new(gate(self.smoothed.right), gate(self.smoothed.left))
    }

    pub fn stabilize_triggers(&mut self, triggers: TriggerPair) -> TriggerPair {
        TriggerPair {
            left: self.left.stabilize(triggers.left),
            right: self.right.stabilize(triggers.right),
        }
    }
}

impl TickState for EffectMixer {
    fn reset(&mut self) {
        self.smoothed = RumbleEffect::NONE;
        self.rumble_initialized = false;
        self.left = ModeHold::default();
        self.right = ModeHold::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixer() -> EffectMixer {
        EffectMixer::new(&EffectsConfig::default())
    }

    #[test]
    fn first_sample_passes_through() {
        let mut m = mixer();
        let out = m.smooth_rumble(RumbleEffect::new(0.4, 0.2));
        assert_eq!(out, RumbleEffect::new(0.4, 0.2));
    }

    #[test]
    fn small_changes_use_configured_alpha() {
        let mut m = mixer();
        m.smooth_rumble(RumbleEffect::new(0.4, 0.4));
        let out = m.smooth_rumble(RumbleEffect::new(0.5, 0.4));
        assert!((out.right - 0.45).abs() < 1e-12);
        assert!((out.left - 0.4).abs() < 1e-12);
    }

    #[test]
    fn transients_boost_alpha() {
        let mut m = mixer();
        m.smooth_rumble(RumbleEffect::new(0.0, 0.0));
        let out = m.smooth_rumble(RumbleEffect::new(1.0, 0.0));
        // alpha = min(0.5 + 1.0 * 1.5, 0.85)
        assert!((out.right - 0.85).abs() < 1e-12);

        let mut m = mixer();
        m.smooth_rumble(RumbleEffect::new(0.0, 0.0));
        let out = m.smooth_rumble(RumbleEffect::new(0.0, 0.2));
        // alpha = 0.5 + 0.3
        assert!((out.left - 0.16).abs() < 1e-12);
    }

    #[test]
    fn noise_gate_zeroes_idle_hum() {
        let mut m = mixer();
        let out = m.smooth_rumble(RumbleEffect::new(0.04, 0.3));
        assert!(out.right.abs() < f64::EPSILON);
        assert!((out.left - 0.3).abs() < f64::EPSILON);
        assert!((m.smoothed().right - 0.04).abs() < f64::EPSILON);
    }

    #[test]
    fn mode_change_between_active_modes_is_held() {
        let mut hold = ModeHold::default();
        let res = TriggerEffect::feedback(1, 2);
        let vib = TriggerEffect::vibration(1, 4, 50);

        assert_eq!(hold.stabilize(res), res);
        for _ in 0..5 {
            assert_eq!(hold.stabilize(vib), res);
        }
        assert_eq!(hold.stabilize(vib), vib);
        assert_eq!(hold.hold_frames, 0);
    }

    #[test]
    fn off_transitions_pass_immediately() {
        let mut hold = ModeHold::default();
        let res = TriggerEffect::feedback(2, 6);
        assert_eq!(hold.stabilize(res), res);
        assert_eq!(hold.stabilize(TriggerEffect::Off), TriggerEffect::Off);
        assert_eq!(hold.stabilize(res), res);
    }

    #[test]
    fn same_mode_updates_parameters() {
        let mut hold = ModeHold::default();
        hold.stabilize(TriggerEffect::feedback(2, 3));
        let stronger = TriggerEffect::feedback(2, 7);
        assert_eq!(hold.stabilize(stronger), stronger);

        // While holding, the latest accepted parameters are re-emitted.
        assert_eq!(hold.stabilize(TriggerEffect::vibration(1, 2, 35)), stronger);
    }

    #[test]
    fn reset_clears_smoothing_and_holds() {
        let mut m = mixer();
        m.smooth_rumble(RumbleEffect::new(0.9, 0.9));
        m.stabilize_triggers(TriggerPair {
            left: TriggerEffect::feedback(2, 8),
            right: TriggerEffect::vibration(1, 3, 45),
        });

        m.reset();
        assert_eq!(*m.left_hold(), ModeHold::default());
        assert_eq!(*m.right_hold(), ModeHold::default());
        let out = m.smooth_rumble(RumbleEffect::new(0.2, 0.0));
        assert_eq!(out, RumbleEffect::new(0.2, 0.0));
    }
}
