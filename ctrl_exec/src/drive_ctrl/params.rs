//! Drive control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use crate::pid::PidParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for drive control
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Params {

    /// Steering controller, acting on cross track error in meters. The output
    /// is the normalised steering demand.
    pub steer_ctrl: PidParams,

    /// Cruise controller, acting on speed error in miles per hour. The output
    /// is the normalised throttle demand.
    pub cruise_ctrl: PidParams,

    /// Speed the cruise controller holds.
    ///
    /// Units: miles per hour
    pub cruise_set_speed_mph: f64
}

impl Default for Params {
    fn default() -> Self {
        Self {
            steer_ctrl: PidParams {
                k_p: 1.0,
                k_i: 0.1,
                k_d: 0.5,
                output_limit: Some(1.0),
                int_authority: Some(0.25)
            },
            cruise_ctrl: PidParams {
                k_p: 0.1,
                k_i: 0.02,
                k_d: 0.0,
                output_limit: Some(1.0),
                int_authority: Some(0.5)
            },
            cruise_set_speed_mph: 20.0
        }
    }
}
