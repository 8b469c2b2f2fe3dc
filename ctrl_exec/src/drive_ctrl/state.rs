//! Drive control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use serde::Serialize;

// Internal
use super::{DriveCtrlError, Params};
use crate::pid::PidController;
use crate::telemetry::{Frame, TelemetrySample};
use util::{
    archive::{Archived, ArchiveError, Archiver},
    module::State,
    params,
    session::Session
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive control module state
#[derive(Default)]
pub struct DriveCtrl {
    params: Params,

    /// Steering controller, acting on cross track error
    steer_ctrl: PidController,

    /// Cruise controller, acting on speed error
    cruise_ctrl: PidController,

    /// Phase of the current drive session
    phase: DrivePhase,

    report: StatusReport,

    /// Record of the last cycle, written out by the archiver
    cycle_record: Option<CycleRecord>,
    arch_cycle: Archiver
}

/// Demands produced by drive control.
#[derive(Clone, Copy, Serialize, Debug, Default, PartialEq)]
pub struct DriveDems {
    /// Steering demand, positive to the right.
    ///
    /// Units: normalised, between -1 and +1
    pub steer_dem: f64,

    /// Throttle demand, negative values brake.
    ///
    /// Units: normalised, between -1 and +1
    pub throttle_dem: f64
}

/// Status report for DriveCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if the frame was a manual frame and no demands were produced
    pub manual: bool,

    /// True if this frame started a new drive session
    pub session_start: bool,

    /// Cross track error of the frame
    pub cte_m: f64,

    /// Measured minus set speed
    pub speed_error_mph: f64,

    /// Time since the previous frame, zero at the start of a session
    pub dt_s: f64,

    /// Rate of the control cycle, zero at the start of a session
    pub cycle_rate_hz: f64,

    /// True if the steering controller's integrator is saturated
    pub steer_int_saturated: bool,

    /// True if the cruise controller's integrator is saturated
    pub cruise_int_saturated: bool
}

/// A single row of the drive control archive.
#[derive(Clone, Copy, Serialize, Debug)]
struct CycleRecord {
    time_s: Option<f64>,
    manual: bool,
    session_start: bool,
    cte_m: Option<f64>,
    speed_error_mph: Option<f64>,
    dt_s: Option<f64>,
    steer_dem: Option<f64>,
    throttle_dem: Option<f64>,
    steer_i_error: f64,
    cruise_i_error: f64,
    steer_int_saturated: bool,
    cruise_int_saturated: bool
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Phase of a drive session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrivePhase {
    /// No telemetry has been received since the last manual frame, the next
    /// telemetry frame starts a new session.
    AwaitingFirstSample,

    /// The session is running.
    Running {
        /// Time of the previous telemetry frame
        prev_time_s: f64
    }
}

impl Default for DrivePhase {
    fn default() -> Self {
        DrivePhase::AwaitingFirstSample
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for DriveCtrl {
    type InitData = &'static str;
    type InitError = DriveCtrlError;

    type InputData = Frame;
    type OutputData = Option<DriveDems>;
    type StatusReport = StatusReport;
    type ProcError = DriveCtrlError;

    /// Initialise the DriveCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        // Load the parameters
        let params = params::load(init_data)
            .map_err(DriveCtrlError::ParamLoadError)?;

        self.configure(params)?;

        self.arch_cycle = Archiver::from_path(session, "drive_ctrl/cycle.csv")
            .map_err(DriveCtrlError::ArchiveInitError)?;

        Ok(())
    }

    /// Perform cyclic processing of Drive Control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Nothing is archived for a rejected frame
        self.cycle_record = None;

        let sample = match input_data {
            Frame::Telemetry(s) => *s,
            Frame::Manual => return Ok((self.proc_manual(), self.report))
        };

        let dems = self.proc_telemetry(&sample)?;

        Ok((Some(dems), self.report))
    }
}

impl Archived for DriveCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        match self.cycle_record {
            Some(ref r) => self.arch_cycle.serialise(r),
            None => Ok(())
        }
    }
}

impl DriveCtrl {
    /// Create a new drive control module from the given parameters.
    ///
    /// The module will not archive any data.
    pub fn new(params: Params) -> Result<Self, DriveCtrlError> {
        let mut drive_ctrl = Self::default();
        drive_ctrl.configure(params)?;
        Ok(drive_ctrl)
    }

    /// Get the current drive session phase.
    pub fn phase(&self) -> DrivePhase {
        self.phase
    }

    /// Get the steering controller.
    pub fn steer_ctrl(&self) -> &PidController {
        &self.steer_ctrl
    }

    /// Get the cruise controller.
    pub fn cruise_ctrl(&self) -> &PidController {
        &self.cruise_ctrl
    }

    /// Build the controllers from the parameters.
    fn configure(&mut self, params: Params) -> Result<(), DriveCtrlError> {
        if !params.cruise_set_speed_mph.is_finite() {
            return Err(DriveCtrlError::InvalidSetSpeed(params.cruise_set_speed_mph))
        }

        self.steer_ctrl = params.steer_ctrl.build()
            .map_err(DriveCtrlError::SteerCtrlError)?;
        self.cruise_ctrl = params.cruise_ctrl.build()
            .map_err(DriveCtrlError::CruiseCtrlError)?;
        self.params = params;
        self.phase = DrivePhase::AwaitingFirstSample;

        Ok(())
    }

    /// Handle a manual frame.
    ///
    /// No demands are produced and the current session, if any, is ended.
    fn proc_manual(&mut self) -> Option<DriveDems> {
        if let DrivePhase::Running { .. } = self.phase {
            info!("Manual control, drive session ended");
        }

        self.phase = DrivePhase::AwaitingFirstSample;
        self.report = StatusReport {
            manual: true,
            ..Default::default()
        };
        self.cycle_record = Some(self.record(None, None));

        None
    }

    /// Handle a telemetry frame.
    fn proc_telemetry(&mut self, sample: &TelemetrySample) -> Result<DriveDems, DriveCtrlError> {
        let cte_m = sample.cte_m;
        let speed_error_mph = sample.speed_mph - self.params.cruise_set_speed_mph;

        if !sample.time_s.is_finite()
            || !cte_m.is_finite()
            || !speed_error_mph.is_finite()
        {
            return Err(DriveCtrlError::InvalidSample(*sample))
        }

        // Update copies of the controllers, committed once both succeed
        let mut steer_ctrl = self.steer_ctrl.clone();
        let mut cruise_ctrl = self.cruise_ctrl.clone();

        let mut report = StatusReport {
            cte_m,
            speed_error_mph,
            ..Default::default()
        };

        match self.phase {
            DrivePhase::AwaitingFirstSample => {
                // Synchronise the controllers onto the current errors
                steer_ctrl.reset(cte_m)
                    .map_err(DriveCtrlError::SteerCtrlError)?;
                cruise_ctrl.reset(speed_error_mph)
                    .map_err(DriveCtrlError::CruiseCtrlError)?;

                report.session_start = true;

                info!("Drive session started at {:.3} s", sample.time_s);
            },
            DrivePhase::Running { prev_time_s } => {
                let dt_s = sample.time_s - prev_time_s;

                if !(dt_s > 0.0) {
                    return Err(DriveCtrlError::NonIncreasingTime {
                        prev_time_s,
                        time_s: sample.time_s
                    })
                }

                steer_ctrl.update_error(dt_s, cte_m)
                    .map_err(DriveCtrlError::SteerCtrlError)?;
                cruise_ctrl.update_error(dt_s, speed_error_mph)
                    .map_err(DriveCtrlError::CruiseCtrlError)?;

                report.dt_s = dt_s;
                report.cycle_rate_hz = 1.0 / dt_s;
            }
        }

        let dems = DriveDems {
            steer_dem: steer_ctrl.total_error()
                .map_err(DriveCtrlError::SteerCtrlError)?,
            throttle_dem: cruise_ctrl.total_error()
                .map_err(DriveCtrlError::CruiseCtrlError)?
        };

        self.steer_ctrl = steer_ctrl;
        self.cruise_ctrl = cruise_ctrl;
        self.phase = DrivePhase::Running { prev_time_s: sample.time_s };

        report.steer_int_saturated = self.steer_ctrl.is_int_saturated();
        report.cruise_int_saturated = self.cruise_ctrl.is_int_saturated();
        self.report = report;
        self.cycle_record = Some(self.record(Some(sample.time_s), Some(dems)));

        debug!(
            "Hz {:.1} | Speed: {:.2} Throttle: {:.3} CTE: {:.3} Steering: {:.3}{}",
            report.cycle_rate_hz,
            sample.speed_mph,
            dems.throttle_dem,
            cte_m,
            dems.steer_dem,
            if report.steer_int_saturated { " i-saturated" } else { "" }
        );

        Ok(dems)
    }

    /// Build the archive record for the current cycle.
    fn record(&self, time_s: Option<f64>, dems: Option<DriveDems>) -> CycleRecord {
        let telem = !self.report.manual;

        CycleRecord {
            time_s,
            manual: self.report.manual,
            session_start: self.report.session_start,
            cte_m: Some(self.report.cte_m).filter(|_| telem),
            speed_error_mph: Some(self.report.speed_error_mph).filter(|_| telem),
            dt_s: Some(self.report.dt_s).filter(|_| telem),
            steer_dem: dems.map(|d| d.steer_dem),
            throttle_dem: dems.map(|d| d.throttle_dem),
            steer_i_error: self.steer_ctrl.i_error(),
            cruise_i_error: self.cruise_ctrl.i_error(),
            steer_int_saturated: self.report.steer_int_saturated,
            cruise_int_saturated: self.report.cruise_int_saturated
        }
    }
}
