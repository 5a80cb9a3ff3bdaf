//! Per-tick haptic pipeline: deriver, both engines, mixer.

use padhaptics_telemetry::{DeriverConfig, RawVehicleSample, SignalDeriver, TelemetryFrame};

use crate::config::EffectsConfig;
use crate::mixer::EffectMixer;
use crate::rumble::RumbleEffect;
use crate::rumble_engine::RumbleEngine;
use crate::state::TickState;
use crate::trigger::TriggerEffect;
use crate::trigger_engine::{TriggerEngine, TriggerPair};

/// Everything produced for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HapticOutput {
    pub left: TriggerEffect,
    pub right: TriggerEffect,
    pub rumble: RumbleEffect,
    /// The frame the effects were computed from.
    pub frame: TelemetryFrame,
}

/// Owns one instance of every stage for a single tick stream.
#[derive(Debug, Clone)]
pub struct HapticPipeline {
    deriver: SignalDeriver,
    rumble: RumbleEngine,
    triggers: TriggerEngine,
    mixer: EffectMixer,
}

impl Default for HapticPipeline {
    fn default() -> Self {
        Self::new(EffectsConfig::default(), DeriverConfig::default())
    }
}

impl HapticPipeline {
    pub fn new(effects: EffectsConfig, geometry: DeriverConfig) -> Self {
        Self {
            deriver: SignalDeriver::new(geometry),
            mixer: EffectMixer::new(&effects),
            rumble: RumbleEngine::new(effects.clone()),
            triggers: TriggerEngine::new(effects),
        }
    }

    pub fn rumble_engine(&self) -> &RumbleEngine {
        &self.rumble
    }

    pub fn trigger_engine(&self) -> &TriggerEngine {
        &self.triggers
    }

    pub fn mixer(&self) -> &EffectMixer {
        &self.mixer
    }

    /// Derives the frame from a raw sample and runs the engines on it.
    pub fn process(&mut self, raw: &RawVehicleSample) -> HapticOutput {
        let frame = self.deriver.derive(raw);
        self.process_frame(&frame)
    }

    /// Runs the engines and mixer on an already derived frame.
    pub fn process_frame(&mut self, frame: &TelemetryFrame) -> HapticOutput {
        let raw_triggers = self.triggers.update(frame);
        let raw_rumble = self.rumble.update(frame);

        let TriggerPair { left, right } = self.mixer.stabilize_triggers(raw_triggers);
        let rumble = self.mixer.smooth_rumble(raw_rumble);

        HapticOutput {
            left,
            right,
            rumble,
            frame: *frame,
        }
    }
}

impl TickState for HapticPipeline {
    fn reset(&mut self) {
        self.deriver.reset();
        self.rumble.reset();
        self.triggers.reset();
        self.mixer.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use padhaptics_telemetry::Vec3;

    #[test]
    fn pipeline_reset_matches_fresh_instance() {
        let raw = RawVehicleSample {
            delta_time: 0.01,
            local_vel: Vec3::new(0.0, 0.0, 25.0),
            unfiltered_brake: 0.6,
            unfiltered_throttle: 0.2,
            gear: 3,
            ..RawVehicleSample::default()
        };

        let mut used = HapticPipeline::default();
        for _ in 0..20 {
            used.process(&raw);
        }
        used.reset();

        let mut fresh = HapticPipeline::default();
        assert_eq!(used.process(&raw), fresh.process(&raw));
    }
}
