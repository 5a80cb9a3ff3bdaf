//! Fluent builders for raw samples and derived frames.

use padhaptics_telemetry::{RawVehicleSample, TelemetryFrame, Vec3};

/// Tick length of the default 120 Hz loop, seconds.
pub const TICK_120HZ: f64 = 1.0 / 120.0;

/// Builds [`RawVehicleSample`]s.
///
/// ```rust
/// use padhaptics_test_helpers::RawSampleBuilder;
///
/// let raw = RawSampleBuilder::new().speed(20.0).brake(1.0).gear(3).build();
/// assert_eq!(raw.gear, 3);
/// ```
#[derive(Debug, Clone)]
pub struct RawSampleBuilder {
    sample: RawVehicleSample,
}

impl Default for RawSampleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RawSampleBuilder {
    pub fn new() -> Self {
        Self {
            sample: RawVehicleSample {
                delta_time: TICK_120HZ,
                engine_max_rpm: 8000.0,
                ..RawVehicleSample::default()
            },
        }
    }

    pub fn delta_time(mut self, dt: f64) -> Self {
        self.sample.delta_time = dt;
        self
    }

    pub fn elapsed(mut self, et: f64) -> Self {
        self.sample.elapsed_time = et;
        self
    }

    /// Forward speed in m/s.
    pub fn speed(mut self, ms: f64) -> Self {
        self.sample.local_vel = Vec3::new(0.0, 0.0, ms);
        self
    }

    pub fn brake(mut self, v: f64) -> Self {
        self.sample.unfiltered_brake = v;
        self
    }

    pub fn throttle(mut self, v: f64) -> Self {
        self.sample.unfiltered_throttle = v;
        self
    }

    pub fn steering(mut self, v: f64) -> Self {
        self.sample.unfiltered_steering = v;
        self
    }

    pub fn gear(mut self, gear: i32) -> Self {
        self.sample.gear = gear;
        self
    }

    pub fn rpm(mut self, rpm: f64) -> Self {
        self.sample.engine_rpm = rpm;
        self
    }

    /// Longitudinal (z) and lateral (x) acceleration, m/s².
    pub fn accel(mut self, longitudinal: f64, lateral: f64) -> Self {
        self.sample.local_accel = Vec3::new(lateral, 0.0, longitudinal);
        self
    }

    pub fn yaw_rate(mut self, rad_s: f64) -> Self {
        self.sample.local_rot = Vec3::new(0.0, rad_s, 0.0);
        self
    }

    /// Impact timestamp and magnitude.
    pub fn impact(mut self, et: f64, magnitude: f64) -> Self {
        self.sample.last_impact_et = et;
        self.sample.last_impact_magnitude = magnitude;
        self
    }

    /// Suspension deflection per wheel (FL, FR, RL, RR), metres.
    pub fn suspension(mut self, deflections: [f64; 4]) -> Self {
        for (wheel, d) in self.sample.wheels.iter_mut().zip(deflections) {
            wheel.suspension_deflection = d;
        }
        self
    }

    /// Grip fraction per wheel.
    pub fn grip(mut self, fractions: [f64; 4]) -> Self {
        for (wheel, g) in self.sample.wheels.iter_mut().zip(fractions) {
            wheel.grip_fract = g;
        }
        self
    }

    /// Same tyre load and forces on every wheel.
    pub fn tire_forces(mut self, load: f64, lateral: f64, longitudinal: f64) -> Self {
        for wheel in &mut self.sample.wheels {
            wheel.tire_load = load;
            wheel.lateral_force = lateral;
            wheel.longitudinal_force = longitudinal;
        }
        self
    }

    pub fn build(self) -> RawVehicleSample {
        self.sample
    }
}

/// Builds [`TelemetryFrame`]s directly, bypassing the deriver.
///
/// Aggregates are refreshed in [`FrameBuilder::build`]; grips default to 1.0.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    frame: TelemetryFrame,
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self {
            frame: TelemetryFrame {
                delta_time: TICK_120HZ,
                front_grip: 1.0,
                rear_grip: 1.0,
                ..TelemetryFrame::default()
            },
        }
    }

    pub fn delta_time(mut self, dt: f64) -> Self {
        self.frame.delta_time = dt;
        self
    }

    pub fn speed(mut self, ms: f64) -> Self {
        self.frame.speed_ms = ms;
        self
    }

    pub fn brake(mut self, v: f64) -> Self {
        self.frame.brake = v;
        self
    }

    pub fn throttle(mut self, v: f64) -> Self {
        self.frame.throttle = v;
        self
    }

    pub fn gear(mut self, gear: i32) -> Self {
        self.frame.gear = gear;
        self
    }

    pub fn accel(mut self, longitudinal: f64, lateral: f64) -> Self {
        self.frame.long_accel = longitudinal;
        self.frame.lat_accel = lateral;
        self
    }

    pub fn grip(mut self, front: f64, rear: f64) -> Self {
        self.frame.front_grip = front;
        self.frame.rear_grip = rear;
        self
    }

    /// Suspension velocity per wheel (FL, FR, RL, RR), m/s.
    pub fn susp_velocity(mut self, velocities: [f64; 4]) -> Self {
        for (wheel, v) in self.frame.wheels.iter_mut().zip(velocities) {
            wheel.suspension_velocity = v;
        }
        self
    }

    pub fn oversteer(mut self, degrees: f64) -> Self {
        self.frame.oversteer_angle_deg = degrees;
        self
    }

    /// Flags an impact on this tick.
    pub fn impact(mut self, magnitude: f64) -> Self {
        self.frame.impact_this_tick = true;
        self.frame.last_impact_magnitude = magnitude;
        self
    }

    pub fn build(mut self) -> TelemetryFrame {
        self.frame.refresh_aggregates();
        self.frame
    }
}
