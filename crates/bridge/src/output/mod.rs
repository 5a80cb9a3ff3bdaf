//! Output sinks: where mixed effects go each tick.

pub mod dsx;
pub mod hid;
pub mod mock;

use padhaptics_effects::{RumbleEffect, TriggerEffect};

use crate::config::{BridgeConfig, OutputMode};
use crate::error::OutputResult;

pub use dsx::DsxFileSink;
pub use hid::HidOutputSink;
pub use mock::{MockSink, SinkEvent};

/// A controller (or controller proxy) that renders trigger and rumble
/// effects.
///
/// A failed write leaves the sink disconnected; the bridge retries through
/// [`OutputSink::try_connect`].
pub trait OutputSink {
    fn name(&self) -> &'static str;

    /// Attempt to (re)open the target. Returns the resulting connection state.
    fn try_connect(&mut self) -> bool;

    fn is_connected(&self) -> bool;

    /// Render one tick of effects.
    ///
    /// # Errors
    ///
    /// Fails when the sink is not connected or the write fails.
    fn send(
        &mut self,
        left: TriggerEffect,
        right: TriggerEffect,
        rumble: RumbleEffect,
    ) -> OutputResult<()>;

    /// Motors stopped and both triggers released.
    ///
    /// # Errors
    ///
    /// Same as [`OutputSink::send`].
    fn send_safe_state(&mut self) -> OutputResult<()> {
        self.send(TriggerEffect::Off, TriggerEffect::Off, RumbleEffect::NONE)
    }
}

impl<T: OutputSink + ?Sized> OutputSink for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn try_connect(&mut self) -> bool {
        (**self).try_connect()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn send(
        &mut self,
        left: TriggerEffect,
        right: TriggerEffect,
        rumble: RumbleEffect,
    ) -> OutputResult<()> {
        (**self).send(left, right, rumble)
    }

    fn send_safe_state(&mut self) -> OutputResult<()> {
        (**self).send_safe_state()
    }
}

/// The sink selected by `output_mode`.
pub fn create_sink(config: &BridgeConfig) -> Box<dyn OutputSink> {
    match config.output_mode {
        OutputMode::Hid => Box::new(HidOutputSink::new()),
        OutputMode::Dsx => Box::new(DsxFileSink::new(config.dsx_file_path.clone())),
    }
}
