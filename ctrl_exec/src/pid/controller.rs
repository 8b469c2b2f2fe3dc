//! PID controller implementation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::{Deserialize, Serialize};

// Internal
use super::{GainScheduler, NoSchedule, PidError};
use util::maths::saturate;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The gains of a PID controller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gains {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,
}

/// A PID controller with output and integrator saturation.
///
/// The controller must have its gains initialised with `init` before it can
/// be updated. `reset` should be called whenever the control loop becomes
/// active so that the derivative and integral terms start from a clean state.
///
/// The output sign follows the negative feedback convention: a positive error
/// produces a negative demand.
#[derive(Debug, Clone)]
pub struct PidController<S = NoSchedule> {
    /// Controller gains, `None` until initialised
    gains: Option<Gains>,

    /// Proportional error, the last error passed to the controller
    p_error: f64,

    /// Integral of the error
    i_error: f64,

    /// Rate of change of the error over the last update
    d_error: f64,

    /// Magnitude limit on the output
    output_limit: f64,

    /// Magnitude limit on the integral of the error
    int_err_limit: f64,

    /// Share of the output the integral term may use, `None` when unlimited
    int_authority: Option<f64>,

    /// True if the integral was limited on the last update
    int_saturated: bool,

    /// Gain scheduling strategy
    scheduler: S,
}

/// Snapshot of the dynamic state of a controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PidState {
    pub p_error: f64,
    pub i_error: f64,
    pub d_error: f64,
    pub int_saturated: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Gains {
    /// Create a new set of gains.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self { k_p, k_i, k_d }
    }

    /// True if all gains are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.k_p.is_finite() && self.k_i.is_finite() && self.k_d.is_finite()
    }
}

impl PidController<NoSchedule> {
    /// Create a new unlimited controller without gains.
    pub fn new() -> Self {
        Self::with_scheduler(NoSchedule)
    }

    /// Create a new unlimited controller with the given gains.
    pub fn with_gains(gains: Gains) -> Result<Self, PidError> {
        let mut ctrl = Self::new();
        ctrl.init(gains)?;
        Ok(ctrl)
    }
}

impl Default for PidController<NoSchedule> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> PidController<S>
where
    S: GainScheduler
{
    /// Create a new unlimited controller without gains which will use the
    /// given gain scheduler.
    pub fn with_scheduler(scheduler: S) -> Self {
        Self {
            gains: None,
            p_error: 0.0,
            i_error: 0.0,
            d_error: 0.0,
            output_limit: std::f64::INFINITY,
            int_err_limit: std::f64::INFINITY,
            int_authority: None,
            int_saturated: false,
            scheduler,
        }
    }

    /// Set the gains of the controller.
    ///
    /// The error state is kept. If limits have been set the integrator limit
    /// is recalculated for the new integral gain.
    pub fn init(&mut self, gains: Gains) -> Result<(), PidError> {
        if !gains.is_finite() {
            return Err(PidError::NonFiniteGains(gains))
        }

        if let Some(authority) = self.int_authority {
            self.int_err_limit = calc_int_err_limit(
                self.output_limit, authority, gains.k_i
            )?;
        }

        self.gains = Some(gains);

        Ok(())
    }

    /// Limit the output of the controller to `[-output_limit, output_limit]`
    /// and the integral term to `int_authority` of that output.
    ///
    /// `output_limit` must be strictly positive and `int_authority` must be
    /// between 0 and 1. The integral gain must not be zero.
    pub fn set_limits(
        &mut self,
        output_limit: f64,
        int_authority: f64
    ) -> Result<(), PidError> {
        let gains = self.gains.ok_or(PidError::NotInitialised)?;

        if !(output_limit > 0.0) || !output_limit.is_finite() {
            return Err(PidError::InvalidOutputLimit(output_limit))
        }

        if !(0.0..=1.0).contains(&int_authority) {
            return Err(PidError::InvalidIntAuthority(int_authority))
        }

        self.int_err_limit = calc_int_err_limit(output_limit, int_authority, gains.k_i)?;
        self.output_limit = output_limit;
        self.int_authority = Some(int_authority);

        trace!(
            "PID limits set: output {}, integrator authority {} (error limit {})",
            self.output_limit, int_authority, self.int_err_limit
        );

        Ok(())
    }

    /// Remove the output and integrator limits.
    pub fn reset_limits(&mut self) {
        self.output_limit = std::f64::INFINITY;
        self.int_err_limit = std::f64::INFINITY;
        self.int_authority = None;
    }

    /// Reset the dynamic state of the controller.
    ///
    /// The integral and derivative are zeroed and the proportional error is
    /// set to `initial_error`, so that the first update after the reset does
    /// not see a derivative spike.
    pub fn reset(&mut self, initial_error: f64) -> Result<(), PidError> {
        if !initial_error.is_finite() {
            return Err(PidError::NonFiniteError(initial_error))
        }

        self.p_error = initial_error;
        self.i_error = 0.0;
        self.d_error = 0.0;
        self.int_saturated = false;

        Ok(())
    }

    /// Update the error terms with a new error measured `dt` seconds after
    /// the previous one.
    pub fn update_error(&mut self, dt: f64, error: f64) -> Result<(), PidError> {
        if self.gains.is_none() {
            return Err(PidError::NotInitialised)
        }

        if !(dt > 0.0) || !dt.is_finite() {
            return Err(PidError::InvalidTimestep(dt))
        }

        if !error.is_finite() {
            return Err(PidError::NonFiniteError(error))
        }

        // A tiny timestep or huge error can overflow either term
        let d_error = (error - self.p_error) / dt;
        if !d_error.is_finite() {
            return Err(PidError::TermOverflow("derivative"))
        }

        let i_error = self.i_error + error * dt;
        if !i_error.is_finite() {
            return Err(PidError::TermOverflow("integral"))
        }

        // Limit the integrator
        let (i_error, int_saturated) = saturate(i_error, self.int_err_limit);

        self.d_error = d_error;
        self.p_error = error;
        self.i_error = i_error;
        self.int_saturated = int_saturated;

        Ok(())
    }

    /// Get the output of the controller for the current error state.
    ///
    /// The output is always within `[-output_limit, output_limit]`.
    pub fn total_error(&self) -> Result<f64, PidError> {
        let gains = self.gains.ok_or(PidError::NotInitialised)?;

        let output = -(
            gains.k_p * self.p_error
            + gains.k_i * self.i_error
            + gains.k_d * self.d_error
        );

        // Opposing infinite terms give NaN, which no limit can clamp
        if output.is_nan() {
            return Err(PidError::NonFiniteOutput)
        }

        Ok(saturate(output, self.output_limit).0)
    }

    /// Ask the gain scheduler for the gains at the given value of the
    /// scheduling variable, and initialise the controller with them.
    ///
    /// Returns `true` if the gains were changed.
    pub fn schedule(&mut self, variable: f64) -> Result<bool, PidError> {
        match self.scheduler.gains(variable)? {
            Some(gains) => {
                self.init(gains)?;
                Ok(true)
            },
            None => Ok(false)
        }
    }

    /// The gains of the controller, or `None` if not initialised.
    pub fn gains(&self) -> Option<Gains> {
        self.gains
    }

    pub fn p_error(&self) -> f64 {
        self.p_error
    }

    pub fn i_error(&self) -> f64 {
        self.i_error
    }

    pub fn d_error(&self) -> f64 {
        self.d_error
    }

    pub fn output_limit(&self) -> f64 {
        self.output_limit
    }

    pub fn int_err_limit(&self) -> f64 {
        self.int_err_limit
    }

    /// True if the integrator was limited on the last update.
    pub fn is_int_saturated(&self) -> bool {
        self.int_saturated
    }

    /// Get a snapshot of the dynamic state of the controller.
    pub fn state(&self) -> PidState {
        PidState {
            p_error: self.p_error,
            i_error: self.i_error,
            d_error: self.d_error,
            int_saturated: self.int_saturated,
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Back-calculate the integrator limit in the error domain.
///
/// The magnitude is taken so that a negative integral gain still produces a
/// usable limit.
fn calc_int_err_limit(
    output_limit: f64,
    int_authority: f64,
    k_i: f64
) -> Result<f64, PidError> {
    if k_i == 0.0 {
        return Err(PidError::ZeroIntegralGain)
    }

    let int_err_limit = (output_limit * int_authority / k_i).abs();

    // A tiny integral gain overflows the limit
    if !int_err_limit.is_finite() {
        return Err(PidError::InvalidIntErrLimit(int_err_limit))
    }

    Ok(int_err_limit)
}
