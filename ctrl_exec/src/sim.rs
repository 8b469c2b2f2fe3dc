//! # Vehicle simulation
//!
//! A kinematic bicycle model of the vehicle, used as a local plant for drive
//! control when no recorded telemetry is available. The model tracks the
//! vehicle's lateral offset from a straight path along the x axis, its
//! heading relative to the path and its forward speed.
//!
//! The model is integrated with a semi-implicit Euler step:
//!
//! ```text
//! cte'     = v sin(heading)
//! heading' = v tan(steer_angle) / wheelbase
//! v'       = max_accel * throttle - drag * v
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::drive_ctrl::DriveDems;
use crate::telemetry::TelemetrySample;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of meters per second in one mile per hour
pub const MS_PER_MPH: f64 = 0.44704;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the simulated vehicle
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct VehicleParams {
    /// Distance between the front and rear axles.
    ///
    /// Units: meters
    pub wheelbase_m: f64,

    /// Steering angle at a normalised steering demand of 1.
    ///
    /// Units: degrees
    pub max_steer_angle_deg: f64,

    /// Acceleration at full throttle.
    ///
    /// Units: meters/second^2
    pub max_accel_ms2: f64,

    /// Linear drag coefficient.
    ///
    /// Units: 1/second
    pub drag_per_s: f64
}

/// Initial conditions of the simulated vehicle
#[derive(Deserialize, Debug, Clone, Copy, Default)]
pub struct InitialConditions {
    /// Units: meters, positive right of the path
    pub cte_m: f64,

    /// Units: radians, positive turned right of the path
    pub heading_rad: f64,

    /// Units: miles per hour
    pub speed_mph: f64
}

/// Parameters of a simulation run
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct SimParams {
    pub vehicle: VehicleParams,

    pub initial: InitialConditions,

    /// Time between telemetry frames.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Length of the run.
    ///
    /// Units: seconds
    pub duration_s: f64
}

/// The simulated vehicle
#[derive(Debug, Clone)]
pub struct SimVehicle {
    params: VehicleParams,

    time_s: f64,
    cte_m: f64,
    heading_rad: f64,
    speed_ms: f64,
    steer_angle_rad: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            wheelbase_m: 2.67,
            max_steer_angle_deg: 25.0,
            max_accel_ms2: 5.0,
            drag_per_s: 0.1
        }
    }
}

impl SimVehicle {
    /// Create a new vehicle at time zero.
    pub fn new(params: VehicleParams, initial: InitialConditions) -> Self {
        Self {
            params,
            time_s: 0.0,
            cte_m: initial.cte_m,
            heading_rad: initial.heading_rad,
            speed_ms: initial.speed_mph * MS_PER_MPH,
            steer_angle_rad: 0.0
        }
    }

    /// Get the telemetry for the current state of the vehicle.
    pub fn telemetry(&self) -> TelemetrySample {
        TelemetrySample {
            time_s: self.time_s,
            cte_m: self.cte_m,
            speed_mph: self.speed_ms / MS_PER_MPH,
            steer_angle_deg: self.steer_angle_rad.to_degrees()
        }
    }

    /// Apply the demands for `dt_s` seconds.
    ///
    /// Demands are limited to the normalised range, the vehicle does not
    /// reverse.
    pub fn step(&mut self, dems: &DriveDems, dt_s: f64) {
        let steer_dem = dems.steer_dem.max(-1.0).min(1.0);
        let throttle_dem = dems.throttle_dem.max(-1.0).min(1.0);

        self.steer_angle_rad = steer_dem * self.params.max_steer_angle_deg.to_radians();

        self.cte_m += self.speed_ms * self.heading_rad.sin() * dt_s;
        self.heading_rad += self.speed_ms
            * self.steer_angle_rad.tan()
            / self.params.wheelbase_m
            * dt_s;

        let accel_ms2 = self.params.max_accel_ms2 * throttle_dem
            - self.params.drag_per_s * self.speed_ms;
        self.speed_ms = (self.speed_ms + accel_ms2 * dt_s).max(0.0);

        self.time_s += dt_s;
    }
}
