//! Bridge configuration: loop rate, output selection and every effect knob.
//!
//! One flat document; the effect and geometry fields sit next to the bridge
//! fields. JSON or YAML is picked by file extension.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use padhaptics_effects::EffectsConfig;
use padhaptics_telemetry::DeriverConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// File the DSX mediator polls for trigger commands.
pub const DEFAULT_DSX_FILE_PATH: &str = r"C:\ProgramData\DualSenseX\triggers.txt";

/// Config file looked up beside the executable when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "padhaptics.json";

pub const MAX_UPDATE_HZ: u32 = 1000;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Raw HID reports to a DualSense.
    #[default]
    Hid,
    /// Trigger commands written to a file for the DSX mediator.
    Dsx,
}

impl OutputMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hid => "hid",
            Self::Dsx => "dsx",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub output_mode: OutputMode,
    pub update_hz: u32,
    pub reconnect_interval_ms: u64,
    pub dsx_file_path: PathBuf,
    #[serde(flatten)]
    pub effects: EffectsConfig,
    #[serde(flatten)]
    pub geometry: DeriverConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            output_mode: OutputMode::Hid,
            update_hz: 120,
            reconnect_interval_ms: 2000,
            dsx_file_path: PathBuf::from(DEFAULT_DSX_FILE_PATH),
            effects: EffectsConfig::default(),
            geometry: DeriverConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Load from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::parse(&content, is_yaml(path))
            .with_context(|| format!("failed to parse config file {}", path.display()))?;

        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse a document as YAML or JSON.
    ///
    /// # Errors
    ///
    /// Returns the deserializer error.
    pub fn parse(content: &str, yaml: bool) -> Result<Self> {
        let config = if yaml {
            serde_yaml::from_str(content)?
        } else {
            serde_json::from_str(content)?
        };
        Ok(config)
    }

    /// Apply command-line overrides on top of the file values.
    pub fn apply_overrides(&mut self, output_mode: Option<OutputMode>, update_hz: Option<u32>) {
        if let Some(mode) = output_mode {
            self.output_mode = mode;
        }
        if let Some(hz) = update_hz {
            self.update_hz = hz;
        }
    }

    /// # Errors
    ///
    /// Fails on the first out-of-range value.
    pub fn validate(&self) -> Result<()> {
        if self.update_hz == 0 || self.update_hz > MAX_UPDATE_HZ {
            bail!(
                "invalid update rate: {} Hz (expected 1..={MAX_UPDATE_HZ})",
                self.update_hz
            );
        }
        if self.reconnect_interval_ms == 0 {
            bail!("reconnect_interval_ms must be positive");
        }
        if self.output_mode == OutputMode::Dsx && self.dsx_file_path.as_os_str().is_empty() {
            bail!("dsx_file_path is required in dsx mode");
        }
        self.effects
            .validate()
            .context("invalid effects configuration")?;
        self.geometry
            .validate()
            .context("invalid vehicle geometry")?;
        Ok(())
    }

    /// Loop period, `1000 / max(1, update_hz)` milliseconds.
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(u64::from(1000 / self.update_hz.max(1)))
    }

    /// Ticks between reconnect attempts, at least one.
    pub fn reconnect_ticks(&self) -> u32 {
        let tick_ms = (1000 / self.update_hz.max(1)).max(1);
        let ticks = self.reconnect_interval_ms / u64::from(tick_ms);
        u32::try_from(ticks).unwrap_or(u32::MAX).max(1)
    }
}

/// `padhaptics.json` beside the running executable, else in the working
/// directory.
pub fn default_config_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_CONFIG_FILE)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}
