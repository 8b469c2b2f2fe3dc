//! Main track control executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging and drive control
//!     - Select the frame source:
//!         - A recorded telemetry log if a path is given on the command line
//!         - The vehicle simulation otherwise
//!     - Main loop:
//!         - Acquire the next frame
//!         - Drive control processing and archiving
//!         - Step the vehicle simulation with the demands, if simulating
//!     - Write the session summary
//!
//! # Usage
//!
//! ```text
//! ctrl_exec [telemetry.csv]
//! ```

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use ctrl_lib::{
    drive_ctrl::{DriveCtrl, StatusReport},
    sim::{SimParams, SimVehicle},
    telemetry::{Frame, TelemetryLog}
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{Report, eyre::{WrapErr, eyre}};
use log::{debug, info, warn};
use serde::Serialize;
use std::env;
use std::fs::File;

// Internal
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::{self, Session}
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Summary of the run, written to the session directory on exit.
#[derive(Serialize, Debug, Default)]
struct RunSummary {
    /// Name of the frame source
    source: String,

    num_frames: usize,
    num_manual_frames: usize,
    num_sessions: usize,

    /// Number of frames rejected by drive control
    num_errors: usize,

    /// Largest absolute cross track error seen
    max_abs_cte_m: f64,

    /// Root mean square of the cross track error over all telemetry frames
    rms_cte_m: f64,

    /// Root mean square of the speed error over all telemetry frames
    rms_speed_error_mph: f64,

    num_steer_int_saturated: usize,
    num_cruise_int_saturated: usize,

    #[serde(skip)]
    sum_sq_cte: f64,

    #[serde(skip)]
    sum_sq_speed_error: f64
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Source of the frames fed into drive control.
enum FrameSource {
    /// Replay of a recorded telemetry log
    Log(std::vec::IntoIter<Frame>),

    /// Simulated vehicle, closing the loop around drive control
    Sim {
        vehicle: SimVehicle,
        params: SimParams
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "ctrl_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Track Control Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- INITIALISE MODULES ----

    let mut drive_ctrl = DriveCtrl::default();
    drive_ctrl.init("drive_ctrl.toml", &session)
        .wrap_err("Failed to initialise DriveCtrl")?;
    info!("DriveCtrl init complete");

    // ---- INITIALISE FRAME SOURCE ----

    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let mut summary = RunSummary::default();

    let mut source = match args.len() {
        // A single argument is the telemetry log path
        2 => {
            info!("Loading telemetry log from \"{}\"", &args[1]);

            let log = TelemetryLog::load(&args[1])
                .wrap_err("Failed to load the telemetry log")?;

            info!(
                "Loaded {} frames covering {:.2} s",
                log.get_num_frames(),
                log.get_duration()
            );

            summary.source = log.path()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            FrameSource::Log(log.into_iter())
        },
        // No arguments runs the simulation
        1 => {
            let params: SimParams = util::params::load("sim.toml")
                .wrap_err("Could not load sim params")?;

            info!(
                "Simulating the vehicle for {:.1} s at {:.1} Hz",
                params.duration_s,
                1.0 / params.cycle_period_s
            );

            summary.source = String::from("sim");
            FrameSource::Sim {
                vehicle: SimVehicle::new(params.vehicle, params.initial),
                params
            }
        },
        _ => return Err(eyre!(
            "Expected at most one argument (the telemetry log path), found {}",
            args.len() - 1
        ))
    };

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get the next frame
        let frame = match source {
            FrameSource::Log(ref mut frames) => match frames.next() {
                Some(f) => f,
                None => {
                    info!("End of telemetry log reached");
                    break
                }
            },
            FrameSource::Sim { ref vehicle, ref params } => {
                if vehicle.telemetry().time_s >= params.duration_s {
                    info!("End of simulation reached");
                    break
                }
                Frame::Telemetry(vehicle.telemetry())
            }
        };

        // ---- DRIVE CONTROL ----

        let dems = match drive_ctrl.proc_archived(&frame) {
            Ok((dems, report)) => {
                summary.add(&report);
                dems
            },
            Err(e) => {
                warn!("Error during DriveCtrl processing, frame skipped: {}", e);
                summary.num_errors += 1;
                None
            }
        };

        // ---- SIMULATION ----

        if let FrameSource::Sim { ref mut vehicle, ref params } = source {
            vehicle.step(&dems.unwrap_or_default(), params.cycle_period_s);
        }
    }

    // ---- SHUTDOWN ----

    summary.finish();

    let summary_file = File::create(&session.summary_path)
        .wrap_err("Could not create the summary file")?;
    serde_json::to_writer_pretty(summary_file, &summary)
        .wrap_err("Could not write the summary")?;

    info!(
        "Processed {} frames ({} manual) in {} drive sessions, {} frames rejected",
        summary.num_frames,
        summary.num_manual_frames,
        summary.num_sessions,
        summary.num_errors
    );
    info!(
        "Cross track error: max {:.3} m, RMS {:.3} m. Speed error RMS {:.3} mph",
        summary.max_abs_cte_m,
        summary.rms_cte_m,
        summary.rms_speed_error_mph
    );
    info!(
        "Run took {:.2} s, summary written to {:?}",
        session::get_elapsed_seconds(),
        session.summary_path
    );

    Ok(())
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RunSummary {
    /// Add the report of a processed frame to the summary.
    fn add(&mut self, report: &StatusReport) {
        self.num_frames += 1;

        if report.manual {
            self.num_manual_frames += 1;
            return
        }

        if report.session_start {
            self.num_sessions += 1;
        }

        self.max_abs_cte_m = self.max_abs_cte_m.max(report.cte_m.abs());
        self.sum_sq_cte += report.cte_m.powi(2);
        self.sum_sq_speed_error += report.speed_error_mph.powi(2);

        if report.steer_int_saturated {
            self.num_steer_int_saturated += 1;
        }
        if report.cruise_int_saturated {
            self.num_cruise_int_saturated += 1;
        }
    }

    /// Compute the RMS values once all frames have been added.
    fn finish(&mut self) {
        let num_telem = self.num_frames - self.num_manual_frames;

        if num_telem > 0 {
            self.rms_cte_m = (self.sum_sq_cte / num_telem as f64).sqrt();
            self.rms_speed_error_mph = (self.sum_sq_speed_error / num_telem as f64).sqrt();
        }
    }
}
