//! # PID control module
//!
//! A discrete-time PID controller with output saturation and integrator
//! anti-windup. The controller turns a scalar error (for example the
//! cross-track error of the vehicle) into a bounded scalar demand.
//!
//! The integrator is limited in the error domain, however the limit is
//! back-calculated from the share of the output the integral path is allowed
//! to use (the integrator authority), i.e.
//!
//! ```text
//! int_err_limit = output_limit * int_authority / k_i
//! ```
//!
//! so that the anti-windup threshold keeps its meaning whenever the gains are
//! retuned.
//!
//! Gains may optionally be scheduled on an auxiliary variable (such as speed)
//! by giving the controller a `GainScheduler`. By default no scheduling is
//! performed.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod controller;
mod params;
mod schedule;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use controller::*;
pub use params::*;
pub use schedule::*;
use util::lookup::LookupError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during PID operation.
///
/// A call which returns an error leaves the controller unchanged.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PidError {
    #[error("The controller's gains have not been initialised")]
    NotInitialised,

    #[error("Expected finite gains, found {0:?}")]
    NonFiniteGains(Gains),

    #[error(
        "Cannot limit the integrator with a zero integral gain, the integrator \
        limit would be infinite")]
    ZeroIntegralGain,

    #[error("Expected a strictly positive and finite output limit, found {0}")]
    InvalidOutputLimit(f64),

    #[error(
        "The integrator limit must be finite, found {0}. Use `reset_limits` \
        for an unlimited controller")]
    InvalidIntErrLimit(f64),

    #[error("Expected an integrator authority between 0 and 1, found {0}")]
    InvalidIntAuthority(f64),

    #[error("Expected a strictly positive and finite timestep, found {0} s")]
    InvalidTimestep(f64),

    #[error("Expected a finite error, found {0}")]
    NonFiniteError(f64),

    #[error("The {0} term would overflow with this update")]
    TermOverflow(&'static str),

    #[error("The controller output is not a number")]
    NonFiniteOutput,

    #[error("Could not schedule the gains: {0}")]
    ScheduleError(#[from] LookupError),
}
