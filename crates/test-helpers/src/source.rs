//! Scripted telemetry source for loop and reconnect tests.

use std::collections::VecDeque;

use padhaptics_telemetry::{RawVehicleSample, TelemetrySource};

/// What the source does on one `poll`.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    Sample(RawVehicleSample),
    /// Connected but nothing published this tick.
    NoData,
    /// The source goes away; the next connect attempt may succeed again.
    Drop,
}

/// [`TelemetrySource`] that replays a fixed script.
///
/// Connection attempts fail `refuse_connects` times before succeeding.
/// Once the script is exhausted every poll returns `None`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTelemetrySource {
    script: VecDeque<ScriptStep>,
    connected: bool,
    refuse_connects: u32,
    connect_attempts: u32,
    polls: u32,
}

impl ScriptedTelemetrySource {
    pub fn new(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self {
            script: steps.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Script of `count` copies of `sample`.
    pub fn repeating(sample: RawVehicleSample, count: usize) -> Self {
        Self::new(std::iter::repeat_n(ScriptStep::Sample(sample), count))
    }

    pub fn refusing_connects(mut self, attempts: u32) -> Self {
        self.refuse_connects = attempts;
        self
    }

    pub fn push(&mut self, step: ScriptStep) {
        self.script.push_back(step);
    }

    pub fn connect_attempts(&self) -> u32 {
        self.connect_attempts
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl TelemetrySource for ScriptedTelemetrySource {
    fn name(&self) -> &'static str {
        "scripted"
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

    fn poll(&mut self) -> Option<RawVehicleSample> {
        if !self.connected {
            return None;
        }
        self.polls += 1;
        match self.script.pop_front()? {
            ScriptStep::Sample(sample) => Some(sample),
            ScriptStep::NoData => None,
            ScriptStep::Drop => {
                self.connected = false;
                None
            }
        }
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }
}
