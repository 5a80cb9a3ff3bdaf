//! Raw per-tick vehicle samples as published by the simulator.
//!
//! Values are taken verbatim from the source (SI units, simulator axes:
//! `x` lateral, `y` vertical, `z` longitudinal). The only processing applied
//! here is [`RawVehicleSample::sanitized`], which replaces non-finite values
//! so that downstream arithmetic never propagates NaN.

/// Three-component vector in simulator-local coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    fn sanitized(self) -> Self {
        Self {
            x: finite_or_zero(self.x),
            y: finite_or_zero(self.y),
            z: finite_or_zero(self.z),
        }
    }
}

/// Per-wheel raw values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawWheel {
    /// Suspension deflection in metres.
    pub suspension_deflection: f64,
    /// Suspension force in newtons.
    pub suspension_force: f64,
    /// Brake pressure, 0..1.
    pub brake_pressure: f64,
    /// Wheel rotation angle in radians.
    pub rotation: f64,
    pub lateral_patch_vel: f64,
    pub longitudinal_patch_vel: f64,
    pub lateral_ground_vel: f64,
    pub longitudinal_ground_vel: f64,
    /// Lateral tyre force in newtons.
    pub lateral_force: f64,
    /// Longitudinal tyre force in newtons.
    pub longitudinal_force: f64,
    /// Vertical tyre load in newtons.
    pub tire_load: f64,
    /// Fraction of the contact patch that is sliding, 0..1.
    pub grip_fract: f64,
    /// Surface type reported by the simulator (0 = dry, 5 = rumblestrip, ...).
    pub surface_type: u8,
}

impl RawWheel {
    fn sanitized(self) -> Self {
        Self {
            suspension_deflection: finite_or_zero(self.suspension_deflection),
            suspension_force: finite_or_zero(self.suspension_force),
            brake_pressure: finite_or_zero(self.brake_pressure),
            rotation: finite_or_zero(self.rotation),
            lateral_patch_vel: finite_or_zero(self.lateral_patch_vel),
            longitudinal_patch_vel: finite_or_zero(self.longitudinal_patch_vel),
            lateral_ground_vel: finite_or_zero(self.lateral_ground_vel),
            longitudinal_ground_vel: finite_or_zero(self.longitudinal_ground_vel),
            lateral_force: finite_or_zero(self.lateral_force),
            longitudinal_force: finite_or_zero(self.longitudinal_force),
            tire_load: finite_or_zero(self.tire_load),
            grip_fract: finite_or_zero(self.grip_fract),
            surface_type: self.surface_type,
        }
    }
}

/// One tick of raw vehicle state for the player vehicle.
///
/// Wheel order is front-left, front-right, rear-left, rear-right.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawVehicleSample {
    /// Seconds since the previous physics update.
    pub delta_time: f64,
    /// Session elapsed time in seconds.
    pub elapsed_time: f64,
    /// Velocity in vehicle-local coordinates, m/s.
    pub local_vel: Vec3,
    /// Acceleration in vehicle-local coordinates, m/s².
    pub local_accel: Vec3,
    /// Angular velocity in vehicle-local coordinates, rad/s.
    pub local_rot: Vec3,
    /// Angular acceleration in vehicle-local coordinates, rad/s².
    pub local_rot_accel: Vec3,
    /// -1 reverse, 0 neutral, 1.. forward gears.
    pub gear: i32,
    pub engine_rpm: f64,
    pub engine_max_rpm: f64,
    pub unfiltered_throttle: f64,
    pub unfiltered_brake: f64,
    pub unfiltered_steering: f64,
    /// Elapsed time of the most recent impact. A change marks a new impact.
    pub last_impact_et: f64,
    pub last_impact_magnitude: f64,
    pub wheels: [RawWheel; 4],
}

impl RawVehicleSample {
    /// Returns a copy with every non-finite float replaced by zero.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        Self {
            delta_time: finite_or_zero(self.delta_time),
            elapsed_time: finite_or_zero(self.elapsed_time),
            local_vel: self.local_vel.sanitized(),
            local_accel: self.local_accel.sanitized(),
            local_rot: self.local_rot.sanitized(),
            local_rot_accel: self.local_rot_accel.sanitized(),
            gear: self.gear,
            engine_rpm: finite_or_zero(self.engine_rpm),
            engine_max_rpm: finite_or_zero(self.engine_max_rpm),
            unfiltered_throttle: finite_or_zero(self.unfiltered_throttle),
            unfiltered_brake: finite_or_zero(self.unfiltered_brake),
            unfiltered_steering: finite_or_zero(self.unfiltered_steering),
            last_impact_et: finite_or_zero(self.last_impact_et),
            last_impact_magnitude: finite_or_zero(self.last_impact_magnitude),
            wheels: self.wheels.map(RawWheel::sanitized),
        }
    }
}

#[inline]
pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_replaces_non_finite_values() {
        let mut sample = RawVehicleSample {
            delta_time: f64::NAN,
            unfiltered_throttle: f64::INFINITY,
            local_accel: Vec3::new(f64::NEG_INFINITY, 1.0, 2.0),
            gear: 3,
            ..RawVehicleSample::default()
        };
        sample.wheels[2].tire_load = f64::NAN;
        sample.wheels[2].surface_type = 5;

        let clean = sample.sanitized();

        assert!(clean.delta_time.abs() < f64::EPSILON);
        assert!(clean.unfiltered_throttle.abs() < f64::EPSILON);
        assert!(clean.local_accel.x.abs() < f64::EPSILON);
        assert!((clean.local_accel.z - 2.0).abs() < f64::EPSILON);
        assert!(clean.wheels[2].tire_load.abs() < f64::EPSILON);
        assert_eq!(clean.wheels[2].surface_type, 5);
        assert_eq!(clean.gear, 3);
    }

    #[test]
    fn vec3_length() {
        let v = Vec3::new(3.0, 0.0, 4.0);
        assert!((v.length() - 5.0).abs() < 1e-12);
        assert!(Vec3::ZERO.length().abs() < f64::EPSILON);
    }
}
