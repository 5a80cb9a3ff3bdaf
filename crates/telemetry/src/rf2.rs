//! rFactor 2 telemetry via the shared-memory map plugin.
//!
//! The plugin publishes `$rFactor2SMMP_Telemetry$`: a small header followed
//! by an array of `rF2VehicleTelemetry` records, the first of which is the
//! player vehicle. The layout is packed to 4 bytes and little-endian.
//! [`decode_player_vehicle`] is a pure decoder over that layout; the
//! [`Rf2SharedMemorySource`] owns the mapping and copies a consistent
//! snapshot out of it each tick.

use shared_memory::{Shmem, ShmemConf};
use tracing::{debug, info, warn};

use crate::error::{TelemetryError, TelemetryResult};
use crate::raw::{RawVehicleSample, RawWheel, Vec3};
use crate::source::TelemetrySource;

/// Name of the telemetry mapping created by the plugin.
pub const RF2_TELEMETRY_MAPPING: &str = "$rFactor2SMMP_Telemetry$";

/// Retries while the writer is mid-update (version counters disagree).
const STABLE_READ_ATTEMPTS: usize = 3;

/// Header and record offsets.
pub mod layout {
    pub const VERSION_UPDATE_BEGIN: usize = 0;
    pub const VERSION_UPDATE_END: usize = 4;
    pub const NUM_VEHICLES: usize = 12;
    pub const VEHICLES: usize = 16;

    pub const VEHICLE_SIZE: usize = 1888;
    pub const WHEEL_SIZE: usize = 260;

    /// Bytes needed to decode the player vehicle.
    pub const PLAYER_VEHICLE_END: usize = VEHICLES + VEHICLE_SIZE;

    /// Offsets inside one vehicle record.
    pub mod vehicle {
        pub const DELTA_TIME: usize = 4;
        pub const ELAPSED_TIME: usize = 12;
        pub const LOCAL_VEL: usize = 184;
        pub const LOCAL_ACCEL: usize = 208;
        pub const LOCAL_ROT: usize = 304;
        pub const LOCAL_ROT_ACCEL: usize = 328;
        pub const GEAR: usize = 352;
        pub const ENGINE_RPM: usize = 356;
        pub const UNFILTERED_THROTTLE: usize = 388;
        pub const UNFILTERED_BRAKE: usize = 396;
        pub const UNFILTERED_STEERING: usize = 404;
        pub const ENGINE_MAX_RPM: usize = 532;
        pub const LAST_IMPACT_ET: usize = 552;
        pub const LAST_IMPACT_MAGNITUDE: usize = 560;
        pub const WHEELS: usize = 848;
    }

    /// Offsets inside one wheel record.
    pub mod wheel {
        pub const SUSPENSION_DEFLECTION: usize = 0;
        pub const SUSP_FORCE: usize = 16;
        pub const BRAKE_PRESSURE: usize = 32;
        pub const ROTATION: usize = 40;
        pub const LATERAL_PATCH_VEL: usize = 48;
        pub const LONGITUDINAL_PATCH_VEL: usize = 56;
        pub const LATERAL_GROUND_VEL: usize = 64;
        pub const LONGITUDINAL_GROUND_VEL: usize = 72;
        pub const LATERAL_FORCE: usize = 88;
        pub const LONGITUDINAL_FORCE: usize = 96;
        pub const TIRE_LOAD: usize = 104;
        pub const GRIP_FRACT: usize = 112;
        pub const SURFACE_TYPE: usize = 176;
    }
}

fn field<const N: usize>(buf: &[u8], offset: usize) -> TelemetryResult<[u8; N]> {
    buf.get(offset..offset + N)
        .and_then(|bytes| <[u8; N]>::try_from(bytes).ok())
        .ok_or(TelemetryError::ShortBuffer {
            needed: offset + N,
            actual: buf.len(),
        })
}

fn read_f64(buf: &[u8], offset: usize) -> TelemetryResult<f64> {
    field::<8>(buf, offset).map(f64::from_le_bytes)
}

fn read_i32(buf: &[u8], offset: usize) -> TelemetryResult<i32> {
    field::<4>(buf, offset).map(i32::from_le_bytes)
}

fn read_u32(buf: &[u8], offset: usize) -> TelemetryResult<u32> {
    field::<4>(buf, offset).map(u32::from_le_bytes)
}

fn read_vec3(buf: &[u8], offset: usize) -> TelemetryResult<Vec3> {
    Ok(Vec3::new(
        read_f64(buf, offset)?,
        read_f64(buf, offset + 8)?,
        read_f64(buf, offset + 16)?,
    ))
}

fn read_wheel(buf: &[u8], base: usize) -> TelemetryResult<RawWheel> {
    use layout::wheel as w;
    let [surface_type] = field::<1>(buf, base + w::SURFACE_TYPE)?;
    Ok(RawWheel {
        suspension_deflection: read_f64(buf, base + w::SUSPENSION_DEFLECTION)?,
        suspension_force: read_f64(buf, base + w::SUSP_FORCE)?,
        brake_pressure: read_f64(buf, base + w::BRAKE_PRESSURE)?,
        rotation: read_f64(buf, base + w::ROTATION)?,
        lateral_patch_vel: read_f64(buf, base + w::LATERAL_PATCH_VEL)?,
        longitudinal_patch_vel: read_f64(buf, base + w::LONGITUDINAL_PATCH_VEL)?,
        lateral_ground_vel: read_f64(buf, base + w::LATERAL_GROUND_VEL)?,
        longitudinal_ground_vel: read_f64(buf, base + w::LONGITUDINAL_GROUND_VEL)?,
        lateral_force: read_f64(buf, base + w::LATERAL_FORCE)?,
        longitudinal_force: read_f64(buf, base + w::LONGITUDINAL_FORCE)?,
        tire_load: read_f64(buf, base + w::TIRE_LOAD)?,
        grip_fract: read_f64(buf, base + w::GRIP_FRACT)?,
        surface_type,
    })
}

/// Whether the writer finished its last update before this snapshot.
pub fn versions_consistent(buf: &[u8]) -> bool {
    matches!(
        (
            read_u32(buf, layout::VERSION_UPDATE_BEGIN),
            read_u32(buf, layout::VERSION_UPDATE_END),
        ),
        (Ok(begin), Ok(end)) if begin == end
    )
}

/// Decodes the player vehicle (first record) from a telemetry snapshot.
///
/// Returns `Ok(None)` when the plugin reports no vehicles.
///
/// # Errors
///
/// Returns [`TelemetryError::ShortBuffer`] when the buffer cannot hold the
/// header and one vehicle record.
pub fn decode_player_vehicle(buf: &[u8]) -> TelemetryResult<Option<RawVehicleSample>> {
    if buf.len() < layout::PLAYER_VEHICLE_END {
        return Err(TelemetryError::ShortBuffer {
            needed: layout::PLAYER_VEHICLE_END,
            actual: buf.len(),
        });
    }
    if read_i32(buf, layout::NUM_VEHICLES)? <= 0 {
        return Ok(None);
    }

    use layout::vehicle as v;
    let base = layout::VEHICLES;
    let wheel_base = base + v::WHEELS;
    let wheels = [
        read_wheel(buf, wheel_base)?,
        read_wheel(buf, wheel_base + layout::WHEEL_SIZE)?,
        read_wheel(buf, wheel_base + 2 * layout::WHEEL_SIZE)?,
        read_wheel(buf, wheel_base + 3 * layout::WHEEL_SIZE)?,
    ];

    Ok(Some(RawVehicleSample {
        delta_time: read_f64(buf, base + v::DELTA_TIME)?,
        elapsed_time: read_f64(buf, base + v::ELAPSED_TIME)?,
        local_vel: read_vec3(buf, base + v::LOCAL_VEL)?,
        local_accel: read_vec3(buf, base + v::LOCAL_ACCEL)?,
        local_rot: read_vec3(buf, base + v::LOCAL_ROT)?,
        local_rot_accel: read_vec3(buf, base + v::LOCAL_ROT_ACCEL)?,
        gear: read_i32(buf, base + v::GEAR)?,
        engine_rpm: read_f64(buf, base + v::ENGINE_RPM)?,
        engine_max_rpm: read_f64(buf, base + v::ENGINE_MAX_RPM)?,
        unfiltered_throttle: read_f64(buf, base + v::UNFILTERED_THROTTLE)?,
        unfiltered_brake: read_f64(buf, base + v::UNFILTERED_BRAKE)?,
        unfiltered_steering: read_f64(buf, base + v::UNFILTERED_STEERING)?,
        last_impact_et: read_f64(buf, base + v::LAST_IMPACT_ET)?,
        last_impact_magnitude: read_f64(buf, base + v::LAST_IMPACT_MAGNITUDE)?,
        wheels,
    }))
}

/// [`TelemetrySource`] over the rFactor 2 shared-memory map.
pub struct Rf2SharedMemorySource {
    mapping_name: String,
    shmem: Option<Shmem>,
    snapshot: Vec<u8>,
}

impl Default for Rf2SharedMemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl Rf2SharedMemorySource {
    pub fn new() -> Self {
        Self::with_mapping_name(RF2_TELEMETRY_MAPPING)
    }

    /// Source reading a differently named mapping.
    pub fn with_mapping_name(name: impl Into<String>) -> Self {
        Self {
            mapping_name: name.into(),
            shmem: None,
            snapshot: Vec::with_capacity(layout::PLAYER_VEHICLE_END),
        }
    }

    pub fn mapping_name(&self) -> &str {
        &self.mapping_name
    }

    fn open(&self) -> TelemetryResult<Shmem> {
        ShmemConf::new()
            .os_id(&self.mapping_name)
            .open()
            .map_err(|e| TelemetryError::Unavailable {
                name: self.mapping_name.clone(),
                reason: e.to_string(),
            })
    }

    /// Copies the header and player vehicle out of the mapping, retrying
    /// while the writer is mid-update.
    fn copy_snapshot(&mut self) -> bool {
        let Some(shmem) = self.shmem.as_ref() else {
            return false;
        };
        let view = mapped_bytes(shmem);
        let Some(head) = view.get(..layout::PLAYER_VEHICLE_END) else {
            warn!(
                mapping = %self.mapping_name,
                size = view.len(),
                "telemetry mapping smaller than one vehicle record"
            );
            return false;
        };

        for _ in 0..STABLE_READ_ATTEMPTS {
            self.snapshot.clear();
            self.snapshot.extend_from_slice(head);
            if versions_consistent(&self.snapshot) {
                break;
            }
        }
        true
    }
}

#[allow(
    unsafe_code,
    reason = "shared_memory exposes mapped views only through unsafe accessors"
)]
fn mapped_bytes(shmem: &Shmem) -> &[u8] {
    // SAFETY: the view is valid for `shmem.len()` bytes for as long as `shmem`
    // is borrowed. The simulator may write concurrently; torn snapshots are
    // detected through the version counters and re-read.
    unsafe { shmem.as_slice() }
}

impl TelemetrySource for Rf2SharedMemorySource {
    fn name(&self) -> &'static str {
        "rFactor 2"
    }

    fn try_connect(&mut self) -> bool {
        if self.shmem.is_some() {
            return true;
        }
        match self.open() {
            Ok(shmem) => {
                info!(mapping = %self.mapping_name, size = shmem.len(), "telemetry mapping opened");
                self.shmem = Some(shmem);
                true
            }
            Err(e) => {
                debug!(error = %e, "telemetry not available");
                false
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.shmem.is_some()
    }

    fn poll(&mut self) -> Option<RawVehicleSample> {
        if !self.copy_snapshot() {
            self.disconnect();
            return None;
        }
        match decode_player_vehicle(&self.snapshot) {
            Ok(sample) => sample,
            Err(e) => {
                warn!(error = %e, "failed to decode telemetry snapshot");
                self.disconnect();
                None
            }
        }
    }

    fn disconnect(&mut self) {
        if self.shmem.take().is_some() {
            debug!(mapping = %self.mapping_name, "telemetry mapping closed");
        }
    }
}
