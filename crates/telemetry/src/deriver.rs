//! Signal Deriver
//!
//! Turns one [`RawVehicleSample`] into a [`TelemetryFrame`]: clamps pedal
//! inputs, computes finite-difference wheel velocities against the previous
//! tick, detects new impacts, estimates axle grip and the oversteer angle.
//!
//! The deriver keeps one tick of raw history. The first call after
//! construction or [`SignalDeriver::reset`] yields zero for every
//! finite-difference quantity and never flags an impact.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{TelemetryError, TelemetryResult};
use crate::frame::{GripSource, MIN_DELTA_TIME_S, TelemetryFrame, WheelCorner};
use crate::raw::{RawVehicleSample, RawWheel};

/// Impact magnitude that must be exceeded to register an impact.
pub const IMPACT_MIN_MAGNITUDE: f64 = 0.5;

/// Speed below which no oversteer is computed, m/s.
pub const OVERSTEER_MIN_SPEED_MS: f64 = 3.0;

const GRIP_FRACT_EPSILON: f64 = 0.01;
const MIN_TIRE_LOAD_N: f64 = 100.0;
const TIRE_FORCE_LOAD_FACTOR: f64 = 1.5;
const ACCEL_GRIP_SCALE: f64 = 25.0;

/// Vehicle geometry used for the oversteer estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeriverConfig {
    /// Estimated wheelbase in metres.
    pub wheelbase_m: f64,
    /// Road-wheel steering angle at full lock, degrees.
    pub max_steer_angle_deg: f64,
}

impl Default for DeriverConfig {
    fn default() -> Self {
        Self {
            wheelbase_m: 2.6,
            max_steer_angle_deg: 20.0,
        }
    }
}

impl DeriverConfig {
    /// Checks that the geometry is usable.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::InvalidGeometry`] when the wheelbase is not
    /// strictly positive or the steering angle is outside `(0, 90]` degrees.
    pub fn validate(&self) -> TelemetryResult<()> {
        if !self.wheelbase_m.is_finite() || self.wheelbase_m <= 0.0 {
            return Err(TelemetryError::InvalidGeometry {
                field: "wheelbase_m",
                value: self.wheelbase_m,
            });
        }
        if !self.max_steer_angle_deg.is_finite()
            || self.max_steer_angle_deg <= 0.0
            || self.max_steer_angle_deg > 90.0
        {
            return Err(TelemetryError::InvalidGeometry {
                field: "max_steer_angle_deg",
                value: self.max_steer_angle_deg,
            });
        }
        Ok(())
    }
}

/// Axle grip estimate and the tier that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GripEstimate {
    pub front: f64,
    pub rear: f64,
    pub source: GripSource,
}

/// Finite-difference memory plus geometry; one instance per tick stream.
#[derive(Debug, Clone)]
pub struct SignalDeriver {
    config: DeriverConfig,
    prev_susp_deflection: [f64; 4],
    prev_rotation: [f64; 4],
    prev_impact_et: f64,
    initialized: bool,
}

impl Default for SignalDeriver {
    fn default() -> Self {
        Self::new(DeriverConfig::default())
    }
}

impl SignalDeriver {
    pub fn new(config: DeriverConfig) -> Self {
        Self {
            config,
            prev_susp_deflection: [0.0; 4],
            prev_rotation: [0.0; 4],
            prev_impact_et: 0.0,
            initialized: false,
        }
    }

    pub fn config(&self) -> &DeriverConfig {
        &self.config
    }

    /// Whether a previous tick is latched.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Forgets the previous tick so that the next frame starts fresh.
    pub fn reset(&mut self) {
        self.prev_susp_deflection = [0.0; 4];
        self.prev_rotation = [0.0; 4];
        self.prev_impact_et = 0.0;
        self.initialized = false;
    }

    /// Derives the frame for this tick and latches `raw` as the previous tick.
    pub fn derive(&mut self, raw: &RawVehicleSample) -> TelemetryFrame {
        let raw = raw.sanitized();
        let dt = raw.delta_time.max(MIN_DELTA_TIME_S);

        let brake = raw.unfiltered_brake.clamp(0.0, 1.0);
        let throttle = raw.unfiltered_throttle.clamp(0.0, 1.0);
        let steering = raw.unfiltered_steering.clamp(-1.0, 1.0);

        let impact_this_tick = self.initialized
            && (raw.last_impact_et - self.prev_impact_et).abs() > f64::EPSILON
            && raw.last_impact_magnitude > IMPACT_MIN_MAGNITUDE;
        if impact_this_tick {
            trace!(
                magnitude = raw.last_impact_magnitude,
                et = raw.last_impact_et,
                "impact registered"
            );
        }

        let mut wheels = [WheelCorner::default(); 4];
        let history = self
            .prev_susp_deflection
            .iter_mut()
            .zip(self.prev_rotation.iter_mut());
        for ((corner, src), (prev_defl, prev_rot)) in
            wheels.iter_mut().zip(raw.wheels.iter()).zip(history)
        {
            let (susp_vel, ang_vel) = if self.initialized {
                (
                    (src.suspension_deflection - *prev_defl) / dt,
                    (src.rotation - *prev_rot) / dt,
                )
            } else {
                (0.0, 0.0)
            };
            *prev_defl = src.suspension_deflection;
            *prev_rot = src.rotation;

            *corner = WheelCorner {
                suspension_deflection: src.suspension_deflection,
                suspension_velocity: susp_vel,
                suspension_force: src.suspension_force,
                brake_pressure: src.brake_pressure,
                tire_load: src.tire_load,
                grip_fract: src.grip_fract.clamp(0.0, 1.0),
                slip_ratio: src.longitudinal_patch_vel - src.longitudinal_ground_vel,
                lateral_slip_vel: src.lateral_patch_vel - src.lateral_ground_vel,
                rotation: src.rotation,
                angular_velocity: ang_vel,
                surface_type: src.surface_type,
            };
        }
        self.prev_impact_et = raw.last_impact_et;
        self.initialized = true;

        let speed_ms = raw.local_vel.length();
        let grip = estimate_grip(&raw, brake, throttle);

        let mut frame = TelemetryFrame {
            delta_time: dt,
            elapsed_time: raw.elapsed_time,
            brake,
            throttle,
            steering,
            speed_ms,
            long_accel: raw.local_accel.z,
            lat_accel: raw.local_accel.x,
            yaw_rate: raw.local_rot.y,
            yaw_accel: raw.local_rot_accel.y,
            engine_rpm: raw.engine_rpm,
            engine_max_rpm: raw.engine_max_rpm,
            gear: raw.gear,
            last_impact_et: raw.last_impact_et,
            last_impact_magnitude: raw.last_impact_magnitude,
            impact_this_tick,
            wheels,
            front_grip: grip.front,
            rear_grip: grip.rear,
            grip_source: grip.source,
            oversteer_angle_deg: oversteer_angle_deg(
                steering,
                speed_ms,
                raw.local_rot.y,
                &self.config,
            ),
            ..TelemetryFrame::default()
        };
        frame.refresh_aggregates();
        frame
    }
}

/// Three-tier grip estimate: raw grip fractions, then tyre force over load,
/// then an acceleration heuristic.
///
/// `brake` and `throttle` are the clamped pedal values.
pub fn estimate_grip(raw: &RawVehicleSample, brake: f64, throttle: f64) -> GripEstimate {
    let [fl, fr, rl, rr] = &raw.wheels;

    let fract_sum: f64 = raw.wheels.iter().map(|w| w.grip_fract).sum();
    if fract_sum > GRIP_FRACT_EPSILON {
        return GripEstimate {
            front: ((fl.grip_fract + fr.grip_fract) / 2.0).clamp(0.0, 1.0),
            rear: ((rl.grip_fract + rr.grip_fract) / 2.0).clamp(0.0, 1.0),
            source: GripSource::GripFraction,
        };
    }

    if fl.tire_load > MIN_TIRE_LOAD_N && rl.tire_load > MIN_TIRE_LOAD_N {
        let force_grip = |w: &RawWheel| {
            if w.tire_load < MIN_TIRE_LOAD_N {
                return 0.0;
            }
            let force = w.lateral_force.hypot(w.longitudinal_force);
            (force / (w.tire_load * TIRE_FORCE_LOAD_FACTOR)).clamp(0.0, 1.0)
        };
        return GripEstimate {
            front: (force_grip(fl) + force_grip(fr)) / 2.0,
            rear: (force_grip(rl) + force_grip(rr)) / 2.0,
            source: GripSource::TireForce,
        };
    }

    // Lateral and longitudinal only.
    let planar = raw.local_accel.x.hypot(raw.local_accel.z);
    let used = (planar / ACCEL_GRIP_SCALE).clamp(0.0, 1.0);
    let biased = |pressed: bool| {
        if pressed {
            (used * 1.2).min(1.0)
        } else {
            used * 0.8
        }
    };
    GripEstimate {
        front: biased(brake > 0.1),
        rear: biased(throttle > 0.3),
        source: GripSource::Acceleration,
    }
}

/// Yaw rate in excess of the Ackermann expectation, in degrees.
///
/// Zero below [`OVERSTEER_MIN_SPEED_MS`] or when the car yaws less than the
/// steering input implies.
pub fn oversteer_angle_deg(
    steering: f64,
    speed_ms: f64,
    yaw_rate: f64,
    geometry: &DeriverConfig,
) -> f64 {
    if speed_ms <= OVERSTEER_MIN_SPEED_MS || geometry.wheelbase_m <= 0.0 {
        return 0.0;
    }
    let steer_angle = steering * geometry.max_steer_angle_deg.to_radians();
    let expected_yaw = steer_angle * speed_ms / geometry.wheelbase_m;
    let excess = yaw_rate.abs() - expected_yaw.abs();
    if excess > 0.0 { excess.to_degrees() } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::Vec3;

    fn moving_sample(speed: f64) -> RawVehicleSample {
        RawVehicleSample {
            delta_time: 0.01,
            local_vel: Vec3::new(0.0, 0.0, speed),
            ..RawVehicleSample::default()
        }
    }

    #[test]
    fn first_tick_has_zero_derived_velocities() {
        let mut deriver = SignalDeriver::default();
        let mut raw = moving_sample(20.0);
        for wheel in &mut raw.wheels {
            wheel.suspension_deflection = 0.05;
            wheel.rotation = 3.0;
        }

        let frame = deriver.derive(&raw);

        assert!(deriver.is_initialized());
        for wheel in &frame.wheels {
            assert!(wheel.suspension_velocity.abs() < f64::EPSILON);
            assert!(wheel.angular_velocity.abs() < f64::EPSILON);
        }
    }

    #[test]
    fn second_tick_finite_differences() {
        let mut deriver = SignalDeriver::default();
        let mut raw = moving_sample(20.0);
        deriver.derive(&raw);

        let [_, front_right, _, rear_right] = &mut raw.wheels;
        front_right.suspension_deflection = 0.01;
        rear_right.rotation = 0.5;
        let frame = deriver.derive(&raw);

        let [_, fr, _, rr] = &frame.wheels;
        assert!((fr.suspension_velocity - 1.0).abs() < 1e-9);
        assert!((rr.angular_velocity - 50.0).abs() < 1e-9);
        assert!((frame.max_susp_velocity_right - 1.0).abs() < 1e-9);
    }

    #[test]
    fn delta_time_is_floored() {
        let mut deriver = SignalDeriver::default();
        let mut raw = moving_sample(10.0);
        raw.delta_time = 0.0;
        deriver.derive(&raw);

        raw.wheels[0].suspension_deflection = 0.001;
        let frame = deriver.derive(&raw);

        assert!((frame.delta_time - MIN_DELTA_TIME_S).abs() < f64::EPSILON);
        assert!((frame.wheels[0].suspension_velocity - 1.0).abs() < 1e-9);
    }

    #[test]
    fn pedals_and_steering_are_clamped() {
        let mut deriver = SignalDeriver::default();
        let raw = RawVehicleSample {
            unfiltered_brake: 1.7,
            unfiltered_throttle: -0.3,
            unfiltered_steering: -4.0,
            ..moving_sample(5.0)
        };

        let frame = deriver.derive(&raw);

        assert!((frame.brake - 1.0).abs() < f64::EPSILON);
        assert!(frame.throttle.abs() < f64::EPSILON);
        assert!((frame.steering + 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn impact_requires_change_and_magnitude() {
        let mut deriver = SignalDeriver::default();
        let mut raw = moving_sample(30.0);
        raw.last_impact_et = 1.0;
        raw.last_impact_magnitude = 40.0;

        // First tick never flags: there is nothing to compare against.
        assert!(!deriver.derive(&raw).impact_this_tick);
        // Unchanged timestamp.
        assert!(!deriver.derive(&raw).impact_this_tick);

        raw.last_impact_et = 2.0;
        assert!(deriver.derive(&raw).impact_this_tick);
        assert!(!deriver.derive(&raw).impact_this_tick);

        raw.last_impact_et = 3.0;
        raw.last_impact_magnitude = 0.4;
        assert!(!deriver.derive(&raw).impact_this_tick);
    }

    #[test]
    fn reset_discards_history() {
        let mut deriver = SignalDeriver::default();
        let mut raw = moving_sample(20.0);
        deriver.derive(&raw);

        deriver.reset();
        assert!(!deriver.is_initialized());

        raw.wheels[0].suspension_deflection = 0.5;
        let frame = deriver.derive(&raw);
        assert!(frame.wheels[0].suspension_velocity.abs() < f64::EPSILON);
    }

    #[test]
    fn grip_prefers_raw_fractions() {
        let mut raw = moving_sample(20.0);
        for (wheel, g) in raw.wheels.iter_mut().zip([0.9, 0.7, 0.5, 0.3]) {
            wheel.grip_fract = g;
            wheel.tire_load = 4000.0;
        }

        let grip = estimate_grip(&raw, 0.0, 0.0);

        assert_eq!(grip.source, GripSource::GripFraction);
        assert!((grip.front - 0.8).abs() < 1e-12);
        assert!((grip.rear - 0.4).abs() < 1e-12);
    }

    #[test]
    fn grip_falls_back_to_tire_force() {
        let mut raw = moving_sample(20.0);
        for wheel in &mut raw.wheels {
            wheel.tire_load = 4000.0;
            wheel.lateral_force = 3600.0;
            wheel.longitudinal_force = 4800.0;
        }
        raw.wheels[1].tire_load = 50.0;

        let grip = estimate_grip(&raw, 0.0, 0.0);

        assert_eq!(grip.source, GripSource::TireForce);
        // 6000 / (4000 * 1.5) = 1.0 on loaded wheels, 0 on the unloaded one.
        assert!((grip.front - 0.5).abs() < 1e-12);
        assert!((grip.rear - 1.0).abs() < 1e-12);
    }

    #[test]
    fn grip_falls_back_to_acceleration() {
        let raw = RawVehicleSample {
            local_accel: Vec3::new(0.0, 0.0, -12.5),
            ..moving_sample(20.0)
        };

        let braking = estimate_grip(&raw, 0.8, 0.0);
        assert_eq!(braking.source, GripSource::Acceleration);
        assert!((braking.front - 0.6).abs() < 1e-12);
        assert!((braking.rear - 0.4).abs() < 1e-12);

        let accelerating = estimate_grip(&raw, 0.0, 0.9);
        assert!((accelerating.front - 0.4).abs() < 1e-12);
        assert!((accelerating.rear - 0.6).abs() < 1e-12);
    }

    #[test]
    fn vertical_acceleration_does_not_count_as_grip() {
        let raw = RawVehicleSample {
            local_accel: Vec3::new(0.0, 9.81, 0.0),
            ..moving_sample(20.0)
        };

        let grip = estimate_grip(&raw, 0.0, 0.0);
        assert_eq!(grip.source, GripSource::Acceleration);
        assert!(grip.front.abs() < f64::EPSILON);
        assert!(grip.rear.abs() < f64::EPSILON);

        // Only the lateral and longitudinal axes contribute.
        let raw = RawVehicleSample {
            local_accel: Vec3::new(7.5, 30.0, -10.0),
            ..moving_sample(20.0)
        };
        let grip = estimate_grip(&raw, 0.0, 0.0);
        assert!((grip.front - 0.4).abs() < 1e-12);
    }

    #[test]
    fn oversteer_reports_excess_yaw_only() {
        let geometry = DeriverConfig::default();

        // Straight line, yawing at 0.2 rad/s.
        let angle = oversteer_angle_deg(0.0, 20.0, 0.2, &geometry);
        assert!((angle - 0.2_f64.to_degrees()).abs() < 1e-9);

        // Plenty of steering, little yaw: understeer reads as zero.
        assert!(oversteer_angle_deg(1.0, 20.0, 0.1, &geometry).abs() < f64::EPSILON);

        // Too slow.
        assert!(oversteer_angle_deg(0.0, 2.0, 1.0, &geometry).abs() < f64::EPSILON);
    }

    #[test]
    fn geometry_validation() {
        assert!(DeriverConfig::default().validate().is_ok());

        let bad = DeriverConfig {
            wheelbase_m: 0.0,
            ..DeriverConfig::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(TelemetryError::InvalidGeometry {
                field: "wheelbase_m",
                ..
            })
        ));

        let bad = DeriverConfig {
            max_steer_angle_deg: f64::NAN,
            ..DeriverConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn geometry_deserializes_with_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let cfg: DeriverConfig = serde_json::from_str(r#"{ "wheelbase_m": 3.1 }"#)?;
        assert!((cfg.wheelbase_m - 3.1).abs() < f64::EPSILON);
        assert!((cfg.max_steer_angle_deg - 20.0).abs() < f64::EPSILON);
        Ok(())
    }
}
