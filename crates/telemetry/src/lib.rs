//! Vehicle telemetry for PadHaptics.
//!
//! This crate owns everything between the simulator and the effect engines:
//!
//! - [`RawVehicleSample`]: one tick of player-vehicle state as published.
//! - [`SignalDeriver`]: turns raw samples into [`TelemetryFrame`]s with
//!   finite-difference wheel velocities, grip estimates and oversteer.
//! - [`TelemetrySource`]: the acquisition capability polled by the bridge,
//!   with the rFactor 2 shared-memory implementation in [`rf2`].

#![deny(static_mut_refs)]

pub mod deriver;
pub mod error;
pub mod frame;
pub mod raw;
pub mod rf2;
pub mod source;

pub use deriver::{DeriverConfig, GripEstimate, SignalDeriver, estimate_grip, oversteer_angle_deg};
pub use error::{TelemetryError, TelemetryResult};
pub use frame::{Corner, GripSource, STATIONARY_SPEED_MS, TelemetryFrame, WheelCorner};
pub use raw::{RawVehicleSample, RawWheel, Vec3};
pub use rf2::{Rf2SharedMemorySource, decode_player_vehicle};
pub use source::TelemetrySource;
