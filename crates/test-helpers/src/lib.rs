//! Shared test utilities for PadHaptics.
//!
//! - [`mod@must`]: unwrap helpers with `#[track_caller]` and [`assert_close!`]
//! - [`builders`]: raw-sample and frame builders
//! - [`source`]: a scripted [`TelemetrySource`](padhaptics_telemetry::TelemetrySource)
//!
//! ```toml
//! [dev-dependencies]
//! padhaptics-test-helpers = { workspace = true }
//! ```

#![allow(clippy::panic, reason = "helpers fail the calling test on purpose")]

pub mod builders;
pub mod must;
pub mod source;

pub use builders::{FrameBuilder, RawSampleBuilder, TICK_120HZ};
pub use must::*;
pub use source::{ScriptStep, ScriptedTelemetrySource};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
