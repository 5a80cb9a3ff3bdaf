//! Reset contract shared by every stateful stage.

use padhaptics_telemetry::SignalDeriver;

/// A stage that accumulates state across ticks.
///
/// `reset` returns the stage to the state of a freshly constructed instance
/// with the same configuration. Calling it twice is the same as calling it
/// once.
pub trait TickState {
    fn reset(&mut self);
}

impl TickState for SignalDeriver {
    fn reset(&mut self) {
        SignalDeriver::reset(self);
    }
}
