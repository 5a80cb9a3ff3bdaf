//! rFactor 2 to DualSense haptic bridge.
//!
//! Wires an rF2 [`TelemetrySource`](padhaptics_telemetry::TelemetrySource)
//! through the [`HapticPipeline`](padhaptics_effects::HapticPipeline) into an
//! [`OutputSink`] on a fixed-rate loop. The `padhapticsd` binary adds the CLI
//! and logging setup.

#![deny(static_mut_refs)]

pub mod config;
pub mod error;
pub mod output;
pub mod runtime;

pub use config::{BridgeConfig, OutputMode, default_config_path};
pub use error::{OutputError, OutputResult};
pub use output::{DsxFileSink, HidOutputSink, MockSink, OutputSink, SinkEvent, create_sink};
pub use runtime::{Bridge, TickOutcome, log_startup, status_line};
