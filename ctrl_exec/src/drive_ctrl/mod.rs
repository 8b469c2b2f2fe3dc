//! # Drive control module
//!
//! Drive control keeps the vehicle on the path and at the set speed using two
//! independent PID controllers:
//!
//! - The steering controller acts on the cross track error and produces a
//!   normalised steering demand.
//! - The cruise controller acts on the speed error (measured minus set speed)
//!   and produces a normalised throttle demand.
//!
//! A drive session begins on the first telemetry frame after the module is
//! created or after a manual frame. On that first frame the controllers are
//! reset onto the current errors, so that neither a derivative spike nor an
//! old integral carries into the new session. Every following frame updates
//! the controllers with the time elapsed since the previous frame.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;
use crate::pid::PidError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during DriveCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum DriveCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Steering controller error: {0}")]
    SteerCtrlError(PidError),

    #[error("Cruise controller error: {0}")]
    CruiseCtrlError(PidError),

    #[error("The cruise set speed must be finite, found {0} mph")]
    InvalidSetSpeed(f64),

    #[error("Could not initialise the archives: {0}")]
    ArchiveInitError(util::archive::ArchiveError),

    #[error(
        "Telemetry time must increase between frames, previous frame was at \
        {prev_time_s} s, current frame is at {time_s} s")]
    NonIncreasingTime {
        prev_time_s: f64,
        time_s: f64
    },

    #[error("Telemetry sample contains non-finite values: {0:?}")]
    InvalidSample(crate::telemetry::TelemetrySample),
}
