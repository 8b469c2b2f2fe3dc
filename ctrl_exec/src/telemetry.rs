//! # Telemetry
//!
//! Telemetry frames are the input to drive control. Each frame either carries
//! a telemetry sample from the vehicle, or indicates that the vehicle is under
//! manual control and no telemetry is available.
//!
//! Recorded telemetry can be replayed from a CSV log with the header
//!
//! ```text
//! time_s,cte_m,speed_mph,steer_angle_deg
//! ```
//!
//! Rows with empty `cte_m` and `speed_mph` columns are manual frames.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single sample of vehicle telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TelemetrySample {
    /// Time the sample was taken at.
    ///
    /// Units: seconds
    pub time_s: f64,

    /// Cross track error, positive to the right of the path.
    ///
    /// Units: meters
    pub cte_m: f64,

    /// Forward speed of the vehicle.
    ///
    /// Units: miles per hour
    pub speed_mph: f64,

    /// Measured steering angle, positive to the right.
    ///
    /// Units: degrees
    pub steer_angle_deg: f64,
}

/// A telemetry log loaded from a CSV file.
#[derive(Debug, Clone)]
pub struct TelemetryLog {
    /// File the log was loaded from, `None` if read from another source
    path: Option<PathBuf>,
    frames: Vec<Frame>,
}

/// A row of the CSV telemetry log.
#[derive(Debug, Deserialize)]
struct Row {
    time_s: f64,
    cte_m: Option<f64>,
    speed_mph: Option<f64>,
    steer_angle_deg: Option<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A frame of input to drive control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Frame {
    /// Telemetry is available and the vehicle is under automatic control.
    Telemetry(TelemetrySample),

    /// No telemetry is available, the vehicle is being driven manually.
    Manual,
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Could not find the telemetry log at {0:?}")]
    LogNotFound(PathBuf),

    #[error("Could not open the telemetry log: {0}")]
    LogOpenError(std::io::Error),

    #[error("Could not parse row {0} of the telemetry log: {1}")]
    RowParseError(usize, csv::Error),

    #[error(
        "Row {0} of the telemetry log has only one of cte_m and speed_mph, \
        both or neither must be given")]
    IncompleteRow(usize),

    #[error("The telemetry log is empty")]
    LogEmpty,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TelemetryLog {
    /// Load a telemetry log from the given path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TelemetryError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return Err(TelemetryError::LogNotFound(path))
        }

        let file = File::open(&path).map_err(TelemetryError::LogOpenError)?;

        let mut log = Self::from_reader(file)?;
        log.path = Some(path);

        Ok(log)
    }

    /// Read a telemetry log from any CSV source.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TelemetryError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut frames = Vec::new();

        for (i, result) in csv_reader.deserialize::<Row>().enumerate() {
            // Row numbers count the header as row 1
            let row_num = i + 2;
            let row = result.map_err(|e| TelemetryError::RowParseError(row_num, e))?;

            let frame = match (row.cte_m, row.speed_mph) {
                (Some(cte_m), Some(speed_mph)) => Frame::Telemetry(TelemetrySample {
                    time_s: row.time_s,
                    cte_m,
                    speed_mph,
                    steer_angle_deg: row.steer_angle_deg.unwrap_or(0.0),
                }),
                (None, None) => Frame::Manual,
                _ => return Err(TelemetryError::IncompleteRow(row_num))
            };

            frames.push(frame);
        }

        if frames.is_empty() {
            return Err(TelemetryError::LogEmpty)
        }

        Ok(Self {
            path: None,
            frames,
        })
    }

    /// Get the file the log was loaded from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Get the frames of the log.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Get the number of frames in the log
    pub fn get_num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Get the time of the last telemetry sample in the log, or zero if the
    /// log only contains manual frames.
    pub fn get_duration(&self) -> f64 {
        self.frames
            .iter()
            .rev()
            .find_map(|f| match f {
                Frame::Telemetry(s) => Some(s.time_s),
                Frame::Manual => None
            })
            .unwrap_or(0f64)
    }
}

impl IntoIterator for TelemetryLog {
    type Item = Frame;
    type IntoIter = std::vec::IntoIter<Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.into_iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_read_log() {
        let csv = "\
            time_s,cte_m,speed_mph,steer_angle_deg\n\
            0.00,0.76,0.4,0.0\n\
            0.05,0.75,1.1,-3.5\n\
            0.10,,,\n\
            0.15,0.70,2.0,\n";

        let log = TelemetryLog::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(log.get_num_frames(), 4);
        assert_eq!(log.get_duration(), 0.15);
        assert_eq!(
            log.frames()[1],
            Frame::Telemetry(TelemetrySample {
                time_s: 0.05,
                cte_m: 0.75,
                speed_mph: 1.1,
                steer_angle_deg: -3.5
            })
        );
        assert_eq!(log.frames()[2], Frame::Manual);
        assert!(matches!(
            log.frames()[3],
            Frame::Telemetry(TelemetrySample { steer_angle_deg, .. }) if steer_angle_deg == 0.0
        ));
    }

    #[test]
    fn test_bad_logs() {
        assert!(matches!(
            TelemetryLog::from_reader("time_s,cte_m,speed_mph,steer_angle_deg\n".as_bytes()),
            Err(TelemetryError::LogEmpty)
        ));

        assert!(matches!(
            TelemetryLog::from_reader(
                "time_s,cte_m,speed_mph,steer_angle_deg\n0.0,0.1,,\n".as_bytes()
            ),
            Err(TelemetryError::IncompleteRow(2))
        ));

        assert!(matches!(
            TelemetryLog::from_reader(
                "time_s,cte_m,speed_mph,steer_angle_deg\n0.0,0.1,1.0,0.0\nabc,0.1,1.0,0.0\n"
                    .as_bytes()
            ),
            Err(TelemetryError::RowParseError(3, _))
        ));

        assert!(matches!(
            TelemetryLog::load("/does/not/exist.csv"),
            Err(TelemetryError::LogNotFound(_))
        ));
    }
}
