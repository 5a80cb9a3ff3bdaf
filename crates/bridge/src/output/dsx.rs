//! Trigger commands written to a text file polled by the DSX mediator.
//!
//! ```text
//! left=Resistance 2 8
//! right=Normal
//! ```
//!
//! DSX cannot drive the rumble motors and has no vibration command here:
//! rumble is dropped and vibration is sent as resistance with
//! strength = amplitude.

use std::fs;
use std::path::{Path, PathBuf};

use padhaptics_effects::{RumbleEffect, TriggerEffect};
use tracing::{debug, warn};

use super::OutputSink;
use crate::error::{OutputError, OutputResult};

/// DSX command for one trigger.
pub fn dsx_command(effect: TriggerEffect) -> String {
    match effect {
        TriggerEffect::Off => "Normal".to_owned(),
        TriggerEffect::Feedback {
            start_position,
            strength,
        } => format!("Resistance {start_position} {strength}"),
        TriggerEffect::Vibration {
            start_position,
            amplitude,
            ..
        } => format!("Resistance {start_position} {amplitude}"),
    }
}

/// File contents for one trigger pair.
pub fn render(left: TriggerEffect, right: TriggerEffect) -> String {
    format!(
        "left={}\nright={}\n",
        dsx_command(left),
        dsx_command(right)
    )
}

#[derive(Debug, Clone)]
pub struct DsxFileSink {
    path: PathBuf,
    connected: bool,
    last_written: Option<String>,
}

impl DsxFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            connected: false,
            last_written: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn target_dir_exists(&self) -> bool {
        match self.path.parent() {
            Some(dir) if dir.as_os_str().is_empty() => true,
            Some(dir) => dir.is_dir(),
            None => false,
        }
    }

    fn write_atomically(&self, content: &str) -> OutputResult<()> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, content).map_err(|source| OutputError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| OutputError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl OutputSink for DsxFileSink {
    fn name(&self) -> &'static str {
        "DSX file"
    }

    fn try_connect(&mut self) -> bool {
        self.connected = self.target_dir_exists();
        if self.connected {
            self.last_written = None;
        } else {
            debug!(path = %self.path.display(), "DSX directory not found");
        }
        self.connected
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn send(
        &mut self,
        left: TriggerEffect,
        right: TriggerEffect,
        _rumble: RumbleEffect,
    ) -> OutputResult<()> {
        if !self.connected {
            return Err(OutputError::NotConnected);
        }
        let content = render(left, right);
        if self.last_written.as_deref() == Some(content.as_str()) {
            return Ok(());
        }
        match self.write_atomically(&content) {
            Ok(()) => {
                self.last_written = Some(content);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "DSX write failed, disconnecting");
                self.connected = false;
                self.last_written = None;
                Err(err)
            }
        }
    }
}
