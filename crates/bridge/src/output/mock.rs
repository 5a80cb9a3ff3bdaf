//! In-memory sink that records every call.

use padhaptics_effects::{RumbleEffect, TriggerEffect};

use super::OutputSink;
use crate::error::{OutputError, OutputResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SinkEvent {
    Effects {
        left: TriggerEffect,
        right: TriggerEffect,
        rumble: RumbleEffect,
    },
    SafeState,
}

/// Records sends; can refuse connects and fail writes on demand.
#[derive(Debug, Clone, Default)]
pub struct MockSink {
    connected: bool,
    refuse_connects: u32,
    fail_next_writes: u32,
    connect_attempts: u32,
    events: Vec<SinkEvent>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refusing_connects(mut self, attempts: u32) -> Self {
        self.refuse_connects = attempts;
        self
    }

    /// The next `count` sends fail and disconnect the sink.
    pub fn fail_next_writes(&mut self, count: u32) {
        self.fail_next_writes = count;
    }

    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    pub fn last_event(&self) -> Option<&SinkEvent> {
        self.events.last()
    }

    pub fn connect_attempts(&self) -> u32 {
        self.connect_attempts
    }

    fn record(&mut self, event: SinkEvent) -> OutputResult<()> {
        if !self.connected {
            return Err(OutputError::NotConnected);
        }
        if self.fail_next_writes > 0 {
            self.fail_next_writes -= 1;
            self.connected = false;
            return Err(OutputError::ShortWrite {
                written: 0,
                expected: 1,
            });
        }
        self.events.push(event);
        Ok(())
    }
}

impl OutputSink for MockSink {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn try_connect(&mut self) -> bool {
        if self.connected {
            return true;
        }
        self.connect_attempts += 1;
        if self.refuse_connects > 0 {
            self.refuse_connects -= 1;
            return false;
        }
        self.connected = true;
        true
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn send(
        &mut self,
        left: TriggerEffect,
        right: TriggerEffect,
        rumble: RumbleEffect,
    ) -> OutputResult<()> {
        self.record(SinkEvent::Effects {
            left,
            right,
            rumble,
        })
    }

    fn send_safe_state(&mut self) -> OutputResult<()> {
        self.record(SinkEvent::SafeState)
    }
}
