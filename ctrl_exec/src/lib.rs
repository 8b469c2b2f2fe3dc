//! # Track control library.
//!
//! This library allows other crates in the workspace, and the benchmarks, to
//! access items defined inside the control crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Drive control module - keeps the vehicle on the path and at the set speed
pub mod drive_ctrl;

/// PID controller with anti-windup
pub mod pid;

/// Vehicle simulation - a local plant to close the loop around drive control
pub mod sim;

/// Telemetry frames and recorded telemetry logs
pub mod telemetry;
