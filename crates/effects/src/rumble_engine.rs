//! Rumble Synthesis Engine
//!
//! Eight independent sources are evaluated every tick and summed with their
//! configured gains:
//!
//! | Source | State | Channel split (right / left) |
//! |--------|-------|------------------------------|
//! | Road surface | none | 1.0 / 0.15 |
//! | Kerb strike | baseline, decay, side bias, pulse phase | side-biased |
//! | G-force | none | load-transfer biased |
//! | ABS | phase | 1.0 / 0.3 |
//! | Traction control | phase | 0.5 / 0.4 |
//! | Gear shift | previous gear, decay | 0.4 / 0.3 |
//! | Impact | decay | 0.5 / 1.0 |
//! | Oversteer | none | 0.5 / 0.7 |
//!
//! The sum is scaled by the master gain and soft-clipped per channel.

use padhaptics_telemetry::TelemetryFrame;
use tracing::debug;

use crate::config::EffectsConfig;
use crate::rumble::RumbleEffect;
use crate::state::TickState;

/// Smoothing factor of the slow suspension-velocity baseline.
pub const KERB_BASELINE_ALPHA: f64 = 0.015;
/// Kerb decay above which road texture is suppressed.
pub const KERB_ACTIVE_DECAY: f64 = 0.05;

const KERB_DECAY_RATE: f64 = 4.5;
const KERB_RETRIGGER_DECAY: f64 = 0.1;
const KERB_RATIO: f64 = 2.5;
const KERB_RETRIGGER_RATIO: f64 = 1.8;
const KERB_RETRIGGER_THRESHOLD_FACTOR: f64 = 0.6;
const KERB_SILENT_DECAY: f64 = 0.02;
const KERB_MIN_BASELINE: f64 = 0.01;
const KERB_ROAD_SUPPRESSION: f64 = 0.1;

const ENGINE_SHIFT_DECAY: f64 = 0.7;
const ENGINE_DECAY_RATE: f64 = 6.0;
const IMPACT_DECAY_RATE: f64 = 4.0;
const IMPACT_MAGNITUDE_SCALE: f64 = 50.0;

const PEDAL_BRAKING: f64 = 0.15;
const PEDAL_ACCELERATING: f64 = 0.5;
const GRIP_FLOOR: f64 = 0.01;

/// Accumulators owned by the engine. Public for inspection in tests.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RumbleState {
    pub susp_baseline: f64,
    pub baseline_initialized: bool,
    pub kerb_decay: f64,
    /// Left-channel weight frozen at the last kerb strike (1.0 or 0.3).
    pub kerb_side_bias_left: f64,
    pub kerb_pulse_phase: u32,
    pub abs_phase: u32,
    pub tc_phase: u32,
    pub prev_gear: i32,
    pub gear_shift_decay: f64,
    pub impact_decay: f64,
}

/// Per-source contributions of the last tick, before gains.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RumbleComponents {
    pub road: RumbleEffect,
    pub kerb: RumbleEffect,
    pub g_force: RumbleEffect,
    pub abs: RumbleEffect,
    pub traction_control: RumbleEffect,
    pub engine: RumbleEffect,
    pub impact: RumbleEffect,
    pub oversteer: RumbleEffect,
}

#[derive(Debug, Clone)]
pub struct RumbleEngine {
    config: EffectsConfig,
    state: RumbleState,
    components: RumbleComponents,
    output: RumbleEffect,
}

impl RumbleEngine {
    pub fn new(config: EffectsConfig) -> Self {
        Self {
            config,
            state: RumbleState::default(),
            components: RumbleComponents::default(),
            output: RumbleEffect::NONE,
        }
    }

    pub fn state(&self) -> &RumbleState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut RumbleState {
        &mut self.state
    }

    pub fn components(&self) -> &RumbleComponents {
        &self.components
    }

    /// Output of the last [`RumbleEngine::update`].
    pub fn output(&self) -> RumbleEffect {
        self.output
    }

    /// Whether a kerb strike is still decaying.
    pub fn kerb_active(&self) -> bool {
        self.state.kerb_decay > KERB_ACTIVE_DECAY
    }

    /// Runs one tick and returns the combined, soft-clipped rumble.
    pub fn update(&mut self, frame: &TelemetryFrame) -> RumbleEffect {
        self.update_baseline(frame);

        let kerb = self.kerb(frame);
        let components = RumbleComponents {
            road: road_surface(frame, self.kerb_active()),
            kerb,
            g_force: g_force(frame),
            abs: self.abs(frame),
            traction_control: self.traction_control(frame),
            engine: self.engine(frame),
            impact: self.impact(frame),
            oversteer: oversteer(frame, self.config.oversteer_threshold_deg),
        };

        let gains = &self.config.gains;
        let combined = components.road * gains.road
            + components.kerb * gains.kerb
            + components.g_force * gains.g_force
            + components.abs * gains.abs
            + components.traction_control * gains.traction_control
            + components.engine * gains.engine
            + components.impact * gains.impact
            + components.oversteer * gains.oversteer;

        self.components = components;
        self.output = (combined * gains.master).soft_clipped().clamped();
        self.output
    }

    fn update_baseline(&mut self, frame: &TelemetryFrame) {
        let avg = frame.avg_abs_susp_velocity();
        let s = &mut self.state;
        if s.baseline_initialized {
            s.susp_baseline =
                s.susp_baseline * (1.0 - KERB_BASELINE_ALPHA) + avg * KERB_BASELINE_ALPHA;
        } else {
            s.susp_baseline = avg;
            s.baseline_initialized = true;
        }
    }

    fn kerb(&mut self, frame: &TelemetryFrame) -> RumbleEffect {
        let s = &mut self.state;
        if frame.is_stationary {
            s.kerb_decay = 0.0;
            s.kerb_pulse_phase = 0;
            return RumbleEffect::NONE;
        }

        let peak = frame.max_susp_velocity;
        let ratio = peak / s.susp_baseline.max(KERB_MIN_BASELINE);
        let retrigger = s.kerb_decay > KERB_RETRIGGER_DECAY;
        let (threshold, required_ratio) = if retrigger {
            (
                self.config.kerb_susp_velocity_threshold * KERB_RETRIGGER_THRESHOLD_FACTOR,
                KERB_RETRIGGER_RATIO,
            )
        } else {
            (self.config.kerb_susp_velocity_threshold, KERB_RATIO)
        };

        if ratio > required_ratio && peak > threshold {
            let hit = ((peak - threshold) * self.config.kerb_rumble_scale).clamp(0.5, 1.0);
            s.kerb_decay = s.kerb_decay.max(hit);
            s.kerb_side_bias_left = if frame.max_susp_velocity_left > frame.max_susp_velocity_right
            {
                1.0
            } else {
                0.3
            };
            debug!(peak, ratio, hit, "kerb strike");
        }

        s.kerb_decay = (s.kerb_decay - frame.delta_time * KERB_DECAY_RATE).max(0.0);
        if s.kerb_decay <= KERB_SILENT_DECAY {
            s.kerb_pulse_phase = 0;
            return RumbleEffect::NONE;
        }

        s.kerb_pulse_phase = s.kerb_pulse_phase.wrapping_add(1);
        let pulse = if s.kerb_pulse_phase % 4 < 3 { 1.0 } else { 0.2 };
        let intensity = s.kerb_decay * pulse;
        let right_bias = if s.kerb_side_bias_left < 0.5 { 1.0 } else { 0.5 };
        RumbleEffect::new(intensity * right_bias, intensity * s.kerb_side_bias_left)
    }

    fn abs(&mut self, frame: &TelemetryFrame) -> RumbleEffect {
        let threshold = self.config.abs_grip_threshold;
        let active = frame.brake > PEDAL_BRAKING
            && frame.front_grip > GRIP_FLOOR
            && frame.front_grip < threshold
            && !frame.is_stationary;
        let phase = &mut self.state.abs_phase;
        if !active {
            *phase = 0;
            return RumbleEffect::NONE;
        }

        *phase = phase.wrapping_add(1);
        let on = *phase % 3 < 2;
        let severity = ((1.0 - frame.front_grip) / (1.0 - threshold)).clamp(0.0, 1.0);
        let amp = if on {
            (severity * 0.8).clamp(0.15, 0.8)
        } else {
            0.0
        };
        RumbleEffect::new(amp, amp * 0.3)
    }

    fn traction_control(&mut self, frame: &TelemetryFrame) -> RumbleEffect {
        let threshold = self.config.tc_grip_threshold;
        let active = frame.throttle > PEDAL_ACCELERATING
            && frame.rear_grip > GRIP_FLOOR
            && frame.rear_grip < threshold
            && !frame.is_stationary;
        let phase = &mut self.state.tc_phase;
        if !active {
            *phase = 0;
            return RumbleEffect::NONE;
        }

        *phase = phase.wrapping_add(1);
        let on = *phase % 4 < 2;
        let severity = ((1.0 - frame.rear_grip) / (1.0 - threshold)).clamp(0.0, 1.0);
        let amp = if on {
            (severity * 0.7).clamp(0.15, 0.7)
        } else {
            0.0
        };
        RumbleEffect::new(amp * 0.5, amp * 0.4)
    }

    fn engine(&mut self, frame: &TelemetryFrame) -> RumbleEffect {
        let s = &mut self.state;
        if is_upshift(s.prev_gear, frame.gear) {
            s.gear_shift_decay = ENGINE_SHIFT_DECAY;
        }
        s.prev_gear = frame.gear;

        s.gear_shift_decay = (s.gear_shift_decay - frame.delta_time * ENGINE_DECAY_RATE).max(0.0);
        if s.gear_shift_decay <= 0.0 {
            return RumbleEffect::NONE;
        }
        RumbleEffect::new(s.gear_shift_decay * 0.4, s.gear_shift_decay * 0.3)
    }

    fn impact(&mut self, frame: &TelemetryFrame) -> RumbleEffect {
        let s = &mut self.state;
        s.impact_decay = if frame.impact_this_tick {
            (frame.last_impact_magnitude / IMPACT_MAGNITUDE_SCALE).clamp(0.3, 1.0)
        } else {
            (s.impact_decay - frame.delta_time * IMPACT_DECAY_RATE).max(0.0)
        };
        if s.impact_decay <= 0.0 {
            return RumbleEffect::NONE;
        }
        RumbleEffect::new(s.impact_decay * 0.5, s.impact_decay)
    }
}

impl TickState for RumbleEngine {
    fn reset(&mut self) {
        self.state = RumbleState::default();
        self.components = RumbleComponents::default();
        self.output = RumbleEffect::NONE;
    }
}

/// Upward shift out of a real gear into a forward gear.
pub fn is_upshift(prev_gear: i32, gear: i32) -> bool {
    prev_gear != 0 && gear > 0 && gear > prev_gear
}

/// Road texture from the mean and spread of suspension activity, ramped in
/// between 30 and 110 km/h.
pub fn road_surface(frame: &TelemetryFrame, kerb_active: bool) -> RumbleEffect {
    if frame.is_stationary {
        return RumbleEffect::NONE;
    }
    let speed_factor = ((frame.speed_kph - 30.0) / 80.0).clamp(0.0, 1.0);

    let avg = frame.avg_abs_susp_velocity();
    let variance = frame
        .wheels
        .iter()
        .map(|w| {
            let d = w.suspension_velocity.abs() - avg;
            d * d
        })
        .sum::<f64>()
        / 4.0;

    let mut intensity = (avg * 0.08 + variance.sqrt() * 0.4).clamp(0.0, 0.3) * speed_factor;
    if kerb_active {
        intensity *= KERB_ROAD_SUPPRESSION;
    }
    RumbleEffect::new(intensity, intensity * 0.15)
}

/// Longitudinal and lateral load, ramped in between 20 and 60 km/h.
///
/// Lateral load goes mostly to the motor on the outside of the turn.
pub fn g_force(frame: &TelemetryFrame) -> RumbleEffect {
    if frame.is_stationary {
        return RumbleEffect::NONE;
    }
    let speed_factor = ((frame.speed_kph - 20.0) / 40.0).clamp(0.0, 1.0);
    let long = ((frame.long_accel.abs() - 1.5) / 12.0).clamp(0.0, 0.5) * speed_factor;
    let lat = ((frame.lat_accel.abs() - 3.0) / 20.0).clamp(0.0, 0.5) * speed_factor;

    let mut right = long;
    let mut left = long;
    if lat > 0.01 {
        right += if frame.lat_accel < 0.0 { lat * 0.8 } else { lat * 0.3 };
        left += if frame.lat_accel > 0.0 { lat * 0.8 } else { lat * 0.3 };
    }
    right = right.min(0.7);
    left = left.min(0.7);

    if right < 0.02 && left < 0.02 {
        return RumbleEffect::NONE;
    }
    RumbleEffect::new(right, left)
}

/// Severity ramps over 30° past the threshold.
pub fn oversteer(frame: &TelemetryFrame, threshold_deg: f64) -> RumbleEffect {
    if frame.oversteer_angle_deg < threshold_deg || frame.is_stationary {
        return RumbleEffect::NONE;
    }
    let severity = ((frame.oversteer_angle_deg - threshold_deg) / 30.0).clamp(0.0, 1.0);
    RumbleEffect::new(severity * 0.5, severity * 0.7)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moving(speed_ms: f64) -> TelemetryFrame {
        let mut frame = TelemetryFrame {
            delta_time: 0.01,
            speed_ms,
            front_grip: 1.0,
            rear_grip: 1.0,
            ..TelemetryFrame::default()
        };
        frame.refresh_aggregates();
        frame
    }

    fn with_susp(mut frame: TelemetryFrame, velocities: [f64; 4]) -> TelemetryFrame {
        for (wheel, v) in frame.wheels.iter_mut().zip(velocities) {
            wheel.suspension_velocity = v;
        }
        frame.refresh_aggregates();
        frame
    }

    #[test]
    fn stationary_car_is_silent() {
        let mut engine = RumbleEngine::new(EffectsConfig::default());
        let frame = moving(0.0);
        for _ in 0..10 {
            assert!(engine.update(&frame).is_none());
        }
        assert_eq!(*engine.components(), RumbleComponents::default());
    }

    #[test]
    fn kerb_strike_on_left_side() {
        let mut engine = RumbleEngine::new(EffectsConfig::default());
        let calm = with_susp(moving(30.0), [0.05; 4]);
        for _ in 0..50 {
            engine.update(&calm);
        }
        assert!(!engine.kerb_active());

        let hit = with_susp(moving(30.0), [0.6, 0.05, 0.3, 0.05]);
        engine.update(&hit);

        let s = engine.state();
        // (0.6 - 0.15) * 3.0 clamps to 1.0, then one tick of decay.
        assert!((s.kerb_decay - (1.0 - 0.01 * 4.5)).abs() < 1e-9);
        assert!((s.kerb_side_bias_left - 1.0).abs() < f64::EPSILON);
        assert_eq!(s.kerb_pulse_phase, 1);
        assert!(engine.kerb_active());

        let kerb = engine.components().kerb;
        assert!((kerb.left - s.kerb_decay).abs() < 1e-12);
        assert!((kerb.right - s.kerb_decay * 0.5).abs() < 1e-12);
    }

    #[test]
    fn kerb_pulse_drops_every_fourth_tick() {
        let mut engine = RumbleEngine::new(EffectsConfig::default());
        engine.state_mut().kerb_decay = 1.0;
        engine.state_mut().kerb_side_bias_left = 0.3;
        let frame = with_susp(moving(30.0), [0.0; 4]);

        let [first, second, third, fourth]: [f64; 4] = std::array::from_fn(|_| {
            engine.update(&frame);
            engine.components().kerb.right
        });
        // Phases 1, 2 on, 3 dropped, 4 wraps to on.
        assert!(first > 0.8 && second > 0.8 && fourth > 0.8);
        assert!(third < 0.25);
    }

    fn calm_engine(level: f64) -> RumbleEngine {
        let mut engine = RumbleEngine::new(EffectsConfig::default());
        let calm = with_susp(moving(30.0), [level; 4]);
        for _ in 0..50 {
            engine.update(&calm);
        }
        engine
    }

    #[test]
    fn relaxed_ratio_only_applies_while_decaying() {
        // About 2.1x the 0.2 baseline: below 2.5, above 1.8.
        let spike = with_susp(moving(30.0), [0.42, 0.2, 0.2, 0.2]);

        let mut at_rest = calm_engine(0.2);
        at_rest.update(&spike);
        assert!(at_rest.state().kerb_decay.abs() < f64::EPSILON);
        assert!(!at_rest.kerb_active());

        let mut decaying = calm_engine(0.2);
        decaying.state_mut().kerb_decay = 0.5;
        decaying.state_mut().kerb_side_bias_left = 0.3;
        decaying.update(&spike);
        let s = decaying.state();
        // (0.42 - 0.15 * 0.6) * 3.0 = 0.99, then one tick of decay.
        assert!((s.kerb_decay - (0.99 - 0.01 * 4.5)).abs() < 1e-9);
        assert!((s.kerb_side_bias_left - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn weaker_second_strike_keeps_higher_decay() {
        let mut engine = calm_engine(0.05);
        engine.update(&with_susp(moving(30.0), [0.6, 0.05, 0.3, 0.05]));
        let before = engine.state().kerb_decay;

        // Clears both thresholds but only earns the 0.5 floor.
        engine.update(&with_susp(moving(30.0), [0.2, 0.05, 0.05, 0.05]));
        assert!((engine.state().kerb_decay - (before - 0.01 * 4.5)).abs() < 1e-9);
    }

    #[test]
    fn side_bias_holds_between_strikes() {
        let mut engine = calm_engine(0.05);
        engine.update(&with_susp(moving(30.0), [0.6, 0.05, 0.3, 0.05]));
        assert!((engine.state().kerb_side_bias_left - 1.0).abs() < f64::EPSILON);

        // Right side dominates but stays under the relaxed ratio.
        let right_heavy = with_susp(moving(30.0), [0.05, 0.08, 0.05, 0.08]);
        for _ in 0..10 {
            engine.update(&right_heavy);
            assert!((engine.state().kerb_side_bias_left - 1.0).abs() < f64::EPSILON);
        }
        assert!(engine.kerb_active());
        let kerb = engine.components().kerb;
        assert!(kerb.left >= kerb.right);
    }

    #[test]
    fn road_texture_ramps_with_speed_and_yields_to_kerb() {
        let slow = with_susp(moving(30.0 / 3.6), [0.5, 0.1, 0.5, 0.1]);
        assert!(road_surface(&slow, false).is_none());

        let fast = with_susp(moving(110.0 / 3.6), [0.5, 0.1, 0.5, 0.1]);
        let road = road_surface(&fast, false);
        // avg 0.3, stddev 0.2 -> 0.024 + 0.08
        assert!((road.right - 0.104).abs() < 1e-9);
        assert!((road.left - 0.104 * 0.15).abs() < 1e-9);

        let suppressed = road_surface(&fast, true);
        assert!((suppressed.right - road.right * 0.1).abs() < 1e-12);
    }

    #[test]
    fn g_force_biases_outside_motor() {
        let mut frame = moving(30.0);
        frame.lat_accel = 13.0;
        let effect = g_force(&frame);
        assert!((effect.left - 0.4).abs() < 1e-9);
        assert!((effect.right - 0.15).abs() < 1e-9);

        frame.lat_accel = -13.0;
        let effect = g_force(&frame);
        assert!((effect.right - 0.4).abs() < 1e-9);

        frame.lat_accel = 3.2;
        assert!(g_force(&frame).is_none());
    }

    #[test]
    fn abs_pulses_two_on_one_off() {
        let mut engine = RumbleEngine::new(EffectsConfig::default());
        let mut frame = moving(20.0);
        frame.brake = 0.9;
        frame.front_grip = 0.5;

        let rights: [f64; 5] = std::array::from_fn(|_| {
            engine.update(&frame);
            engine.components().abs.right
        });
        // severity (1 - 0.5) / 0.15 clamps to 1 -> 0.8
        let [first, second, third, fourth, fifth] = rights;
        assert!((first - 0.8).abs() < 1e-9);
        assert!(second.abs() < f64::EPSILON);
        assert!((third - 0.8).abs() < 1e-9);
        assert!((fourth - 0.8).abs() < 1e-9);
        assert!(fifth.abs() < f64::EPSILON);

        frame.brake = 0.0;
        engine.update(&frame);
        assert_eq!(engine.state().abs_phase, 0);
    }

    #[test]
    fn traction_control_pulses_two_on_two_off() {
        let mut engine = RumbleEngine::new(EffectsConfig::default());
        let mut frame = moving(20.0);
        frame.throttle = 1.0;
        frame.rear_grip = 0.3;

        let on: Vec<bool> = (0..8)
            .map(|_| {
                engine.update(&frame);
                engine.components().traction_control.right > 0.0
            })
            .collect();
        assert_eq!(on, [true, false, false, true, true, false, false, true]);
    }

    #[test]
    fn upshift_only_triggers_engine_cue() {
        assert!(is_upshift(2, 3));
        assert!(!is_upshift(0, 1));
        assert!(!is_upshift(3, 2));
        assert!(!is_upshift(1, 0));
        assert!(!is_upshift(1, -1));

        let mut engine = RumbleEngine::new(EffectsConfig::default());
        let mut frame = moving(20.0);
        frame.gear = 2;
        engine.update(&frame);
        frame.gear = 3;
        engine.update(&frame);
        assert!((engine.state().gear_shift_decay - (0.7 - 0.06)).abs() < 1e-9);
        let cue = engine.components().engine;
        assert!((cue.right - 0.64 * 0.4).abs() < 1e-9);
    }

    #[test]
    fn impact_sets_and_decays() {
        let mut engine = RumbleEngine::new(EffectsConfig::default());
        let mut frame = moving(20.0);
        frame.impact_this_tick = true;
        frame.last_impact_magnitude = 40.0;
        engine.update(&frame);
        assert!((engine.state().impact_decay - 0.8).abs() < 1e-12);

        frame.impact_this_tick = false;
        engine.update(&frame);
        assert!((engine.state().impact_decay - 0.76).abs() < 1e-9);
    }

    #[test]
    fn oversteer_ramps_past_threshold() {
        let mut frame = moving(20.0);
        frame.oversteer_angle_deg = 9.0;
        assert!(oversteer(&frame, 10.0).is_none());

        frame.oversteer_angle_deg = 25.0;
        let effect = oversteer(&frame, 10.0);
        assert!((effect.right - 0.25).abs() < 1e-9);
        assert!((effect.left - 0.35).abs() < 1e-9);
    }

    #[test]
    fn output_is_soft_clipped() {
        let mut cfg = EffectsConfig::default();
        cfg.gains.master = 4.0;
        let mut engine = RumbleEngine::new(cfg);
        let mut frame = moving(20.0);
        frame.impact_this_tick = true;
        frame.last_impact_magnitude = 100.0;

        let out = engine.update(&frame);
        assert!(out.left > 0.7 && out.left < 1.0);
    }

    #[test]
    fn reset_restores_fresh_state() {
        let mut engine = RumbleEngine::new(EffectsConfig::default());
        let mut frame = with_susp(moving(30.0), [0.9, 0.1, 0.1, 0.1]);
        frame.gear = 3;
        engine.update(&frame);

        engine.reset();
        assert_eq!(*engine.state(), RumbleState::default());
        assert!(engine.output().is_none());
    }
}
