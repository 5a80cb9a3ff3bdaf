//! Fixed-rate bridge loop: reconnect polling, one pipeline pass per tick,
//! safe state on loss and on shutdown.

use std::future::Future;

use padhaptics_effects::{HapticOutput, HapticPipeline, TickState};
use padhaptics_telemetry::{Corner, TelemetrySource};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};

use crate::config::{BridgeConfig, OutputMode};
use crate::output::OutputSink;

/// What one call to [`Bridge::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Telemetry or output not connected.
    Waiting,
    /// Connected but no sample this tick; safe state sent.
    Idle,
    /// Effects computed and sent.
    Sent(HapticOutput),
}

/// One-line summary logged once per second.
pub fn status_line(out: &HapticOutput) -> String {
    let frame = &out.frame;
    let front_ang = (frame.wheel(Corner::FrontLeft).angular_velocity.abs()
        + frame.wheel(Corner::FrontRight).angular_velocity.abs())
        * 0.5;
    format!(
        "{:3.0}kph G{} L2:{:<10} R2:{:<10} R:{:03}/{:03} Gr:{:.2}/{:.2} Sl:{:.1} Ang:{:.0} Gf:{:.1}/{:.1}",
        frame.speed_kph,
        frame.gear,
        out.left,
        out.right,
        out.rumble.right_byte(),
        out.rumble.left_byte(),
        frame.front_grip,
        frame.rear_grip,
        frame.front_slip_avg,
        front_ang,
        frame.lat_accel,
        frame.long_accel,
    )
}

/// Startup summary of the effective configuration.
pub fn log_startup(config: &BridgeConfig) {
    let fx = &config.effects;
    info!(
        output = config.output_mode.as_str(),
        hz = config.update_hz,
        "padhapticsd {}",
        env!("CARGO_PKG_VERSION")
    );
    info!(
        deadzone = fx.brake_deadzone,
        start = fx.brake_start_position,
        max = fx.max_brake_strength,
        "brake"
    );
    info!(
        deadzone = fx.throttle_deadzone,
        start = fx.throttle_start_position,
        max = fx.max_throttle_strength,
        "throttle"
    );
    info!(
        abs_grip = fx.abs_grip_threshold,
        tc_grip = fx.tc_grip_threshold,
        oversteer_deg = fx.oversteer_threshold_deg,
        master_gain = fx.gains.master,
        "thresholds"
    );
    if config.output_mode == OutputMode::Dsx {
        warn!("DSX mode: rumble is not available and trigger vibration falls back to resistance");
        warn!("for full effects use output_mode \"hid\" with the DualSense on USB");
    }
}

pub struct Bridge<T, S> {
    config: BridgeConfig,
    telemetry: T,
    sink: S,
    pipeline: HapticPipeline,
    reconnect_ticks: u32,
    telemetry_reconnect_counter: u32,
    sink_reconnect_counter: u32,
    telemetry_was_connected: bool,
    sink_was_connected: bool,
    status_counter: u32,
}

impl<T: TelemetrySource, S: OutputSink> Bridge<T, S> {
    /// `config` is assumed validated.
    pub fn new(config: BridgeConfig, telemetry: T, sink: S) -> Self {
        let pipeline = HapticPipeline::new(config.effects.clone(), config.geometry);
        let reconnect_ticks = config.reconnect_ticks();
        Self {
            config,
            telemetry,
            sink,
            pipeline,
            reconnect_ticks,
            // First attempt happens on the first tick.
            telemetry_reconnect_counter: reconnect_ticks.saturating_sub(1),
            sink_reconnect_counter: reconnect_ticks.saturating_sub(1),
            telemetry_was_connected: false,
            sink_was_connected: false,
            status_counter: 0,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn telemetry(&self) -> &T {
        &self.telemetry
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn pipeline(&self) -> &HapticPipeline {
        &self.pipeline
    }

    /// Run one loop iteration.
    pub fn tick(&mut self) -> TickOutcome {
        self.poll_telemetry_connection();
        self.poll_sink_connection();

        if self.telemetry.is_connected() && self.sink.is_connected() {
            return match self.telemetry.poll() {
                Some(raw) => {
                    let out = self.pipeline.process(&raw);
                    if let Err(err) = self.sink.send(out.left, out.right, out.rumble) {
                        warn!(sink = self.sink.name(), error = %err, "output send failed");
                        // Nothing reached the controller; next frame starts clean.
                        self.pipeline.reset();
                    }
                    self.status_counter += 1;
                    if self.status_counter >= self.config.update_hz {
                        self.status_counter = 0;
                        let line = status_line(&out);
                        info!("{line}");
                    }
                    TickOutcome::Sent(out)
                }
                None => {
                    self.reset_all();
                    TickOutcome::Idle
                }
            };
        }

        if !self.telemetry.is_connected() && self.telemetry_was_connected {
            warn!(
                source = self.telemetry.name(),
                "lost telemetry connection, reverting to safe state"
            );
            self.reset_all();
            self.telemetry_was_connected = false;
        }
        if !self.sink.is_connected() && self.sink_was_connected {
            warn!(
                sink = self.sink.name(),
                "lost controller connection, waiting for reconnect"
            );
            self.pipeline.reset();
            self.sink_was_connected = false;
        }
        TickOutcome::Waiting
    }

    /// Tick at the configured rate until `shutdown` resolves, then clear all
    /// effects.
    pub async fn run_until<F: Future>(&mut self, shutdown: F) {
        let mut ticker = interval(self.config.tick_period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!("waiting for telemetry and controller");
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    self.tick();
                }
            }
        }
        self.shutdown();
    }

    /// [`Bridge::run_until`] Ctrl-C.
    pub async fn run(&mut self) {
        self.run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "cannot listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await;
    }

    /// Reset every stage, send the safe state and release telemetry.
    pub fn shutdown(&mut self) {
        info!("shutting down, clearing effects");
        self.reset_all();
        self.telemetry.disconnect();
    }

    fn reset_all(&mut self) {
        self.pipeline.reset();
        if !self.sink.is_connected() {
            return;
        }
        if let Err(err) = self.sink.send_safe_state() {
            warn!(sink = self.sink.name(), error = %err, "safe state send failed");
        }
    }

    fn poll_telemetry_connection(&mut self) {
        if self.telemetry.is_connected() {
            return;
        }
        self.telemetry_reconnect_counter += 1;
        if self.telemetry_reconnect_counter < self.reconnect_ticks {
            return;
        }
        self.telemetry_reconnect_counter = 0;
        if self.telemetry.try_connect() {
            info!(source = self.telemetry.name(), "telemetry connected");
            self.telemetry_was_connected = true;
        }
    }

    fn poll_sink_connection(&mut self) {
        if self.sink.is_connected() {
            return;
        }
        self.sink_reconnect_counter += 1;
        if self.sink_reconnect_counter < self.reconnect_ticks {
            return;
        }
        self.sink_reconnect_counter = 0;
        if self.sink.try_connect() {
            if !self.sink_was_connected {
                info!(sink = self.sink.name(), "output connected");
            }
            self.sink_was_connected = true;
        }
    }
}
