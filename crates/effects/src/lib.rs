//! Haptic effect synthesis for PadHaptics.
//!
//! A [`HapticPipeline`] runs once per tick:
//!
//! ```text
//! RawVehicleSample -> SignalDeriver -> TelemetryFrame
//!                                        |-> RumbleEngine  -> RumbleEffect  -\
//!                                        |-> TriggerEngine -> TriggerPair   ---> EffectMixer -> HapticOutput
//! ```
//!
//! The engines share nothing but the frame they read. Every stateful stage
//! implements [`TickState`], whose `reset` is used after any telemetry gap.
//!
//! # Example
//!
//! ```
//! use padhaptics_effects::{HapticPipeline, TriggerEffect};
//! use padhaptics_telemetry::RawVehicleSample;
//!
//! let mut pipeline = HapticPipeline::default();
//! let out = pipeline.process(&RawVehicleSample::default());
//! assert_eq!(out.left, TriggerEffect::Off);
//! assert!(out.rumble.is_none());
//! ```

#![deny(static_mut_refs)]

pub mod config;
pub mod error;
pub mod mixer;
pub mod pipeline;
pub mod rumble;
pub mod rumble_engine;
pub mod state;
pub mod trigger;
pub mod trigger_engine;

pub use config::{EffectsConfig, RumbleGains};
pub use error::{ConfigError, ConfigResult};
pub use mixer::{EffectMixer, MODE_HOLD_MIN_FRAMES, ModeHold};
pub use pipeline::{HapticOutput, HapticPipeline};
pub use rumble::{RumbleEffect, soft_clip};
pub use rumble_engine::{RumbleComponents, RumbleEngine, RumbleState};
pub use state::TickState;
pub use trigger::{TriggerEffect, TriggerMode};
pub use trigger_engine::{TriggerEngine, TriggerPair, TriggerState};
