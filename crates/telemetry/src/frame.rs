//! Unit-normalized telemetry frame produced once per tick by the deriver.

/// Speed below which the vehicle counts as stationary, m/s.
pub const STATIONARY_SPEED_MS: f64 = 0.5;

/// Lower bound applied to the tick delta time, seconds.
pub const MIN_DELTA_TIME_S: f64 = 0.001;

const MS_TO_KPH: f64 = 3.6;

/// Wheel position, in the order wheels are stored in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::FrontLeft,
        Corner::FrontRight,
        Corner::RearLeft,
        Corner::RearRight,
    ];

    pub const fn is_front(self) -> bool {
        matches!(self, Corner::FrontLeft | Corner::FrontRight)
    }

    pub const fn is_left(self) -> bool {
        matches!(self, Corner::FrontLeft | Corner::RearLeft)
    }
}

/// Per-wheel state for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WheelCorner {
    pub suspension_deflection: f64,
    /// Finite-difference velocity of the suspension deflection, m/s.
    pub suspension_velocity: f64,
    pub suspension_force: f64,
    pub brake_pressure: f64,
    pub tire_load: f64,
    /// Grip fraction in `[0, 1]`.
    pub grip_fract: f64,
    /// Longitudinal patch velocity minus longitudinal ground velocity.
    pub slip_ratio: f64,
    /// Lateral patch velocity minus lateral ground velocity.
    pub lateral_slip_vel: f64,
    pub rotation: f64,
    /// Finite-difference velocity of the wheel rotation angle, rad/s.
    pub angular_velocity: f64,
    pub surface_type: u8,
}

/// Which grip estimator produced the axle grip values of a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GripSource {
    /// Raw grip fractions published by the simulator.
    #[default]
    GripFraction,
    /// Combined tyre force relative to tyre load.
    TireForce,
    /// Acceleration magnitude biased by pedal input.
    Acceleration,
}

/// Everything the effect engines read for one tick.
///
/// The frame is a plain value: the deriver fills it and the engines only
/// read it. Aggregates are kept consistent with the wheels through
/// [`TelemetryFrame::refresh_aggregates`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TelemetryFrame {
    /// Tick delta time in seconds, never below [`MIN_DELTA_TIME_S`].
    pub delta_time: f64,
    pub elapsed_time: f64,

    /// Brake pedal in `[0, 1]`.
    pub brake: f64,
    /// Throttle pedal in `[0, 1]`.
    pub throttle: f64,
    /// Steering in `[-1, 1]`.
    pub steering: f64,

    pub speed_ms: f64,
    pub speed_kph: f64,
    /// Longitudinal acceleration, m/s².
    pub long_accel: f64,
    /// Lateral acceleration, m/s².
    pub lat_accel: f64,
    pub yaw_rate: f64,
    pub yaw_accel: f64,

    pub engine_rpm: f64,
    pub engine_max_rpm: f64,
    /// Engine RPM relative to the limiter, `[0, 1]`.
    pub rpm_normalized: f64,
    pub gear: i32,

    pub last_impact_et: f64,
    pub last_impact_magnitude: f64,
    /// True only on the tick where a new impact was registered.
    pub impact_this_tick: bool,

    /// Front-left, front-right, rear-left, rear-right.
    pub wheels: [WheelCorner; 4],

    pub front_grip: f64,
    pub rear_grip: f64,
    pub grip_source: GripSource,
    pub front_slip_avg: f64,
    pub rear_slip_avg: f64,
    pub max_susp_velocity: f64,
    pub max_susp_velocity_left: f64,
    pub max_susp_velocity_right: f64,
    pub is_stationary: bool,
    /// Yaw in excess of the geometric expectation, degrees.
    pub oversteer_angle_deg: f64,
}

impl TelemetryFrame {
    pub fn wheel(&self, corner: Corner) -> &WheelCorner {
        let [fl, fr, rl, rr] = &self.wheels;
        match corner {
            Corner::FrontLeft => fl,
            Corner::FrontRight => fr,
            Corner::RearLeft => rl,
            Corner::RearRight => rr,
        }
    }

    pub fn wheel_mut(&mut self, corner: Corner) -> &mut WheelCorner {
        let [fl, fr, rl, rr] = &mut self.wheels;
        match corner {
            Corner::FrontLeft => fl,
            Corner::FrontRight => fr,
            Corner::RearLeft => rl,
            Corner::RearRight => rr,
        }
    }

    /// Mean absolute suspension velocity over the four wheels.
    pub fn avg_abs_susp_velocity(&self) -> f64 {
        self.wheels
            .iter()
            .map(|w| w.suspension_velocity.abs())
            .sum::<f64>()
            / 4.0
    }

    /// Recomputes the derived aggregates from the wheels, speed and engine
    /// fields. Grip estimates and the oversteer angle are left untouched.
    pub fn refresh_aggregates(&mut self) {
        let [fl, fr, rl, rr] = &self.wheels;

        self.front_slip_avg = (fl.slip_ratio.abs() + fr.slip_ratio.abs()) / 2.0;
        self.rear_slip_avg = (rl.slip_ratio.abs() + rr.slip_ratio.abs()) / 2.0;

        let mut max_all = 0.0_f64;
        let mut max_left = 0.0_f64;
        let mut max_right = 0.0_f64;
        for (corner, wheel) in Corner::ALL.iter().zip(self.wheels.iter()) {
            let v = wheel.suspension_velocity.abs();
            max_all = max_all.max(v);
            if corner.is_left() {
                max_left = max_left.max(v);
            } else {
                max_right = max_right.max(v);
            }
        }
        self.max_susp_velocity = max_all;
        self.max_susp_velocity_left = max_left;
        self.max_susp_velocity_right = max_right;

        self.speed_kph = self.speed_ms * MS_TO_KPH;
        self.is_stationary = self.speed_ms < STATIONARY_SPEED_MS;
        self.rpm_normalized = if self.engine_max_rpm > 0.0 {
            (self.engine_rpm / self.engine_max_rpm).clamp(0.0, 1.0)
        } else {
            0.0
        };
    }
}
