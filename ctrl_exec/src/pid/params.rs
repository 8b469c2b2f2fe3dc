//! PID controller parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::{Gains, PidController, PidError};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Integrator authority used when an output limit is given without one.
pub const DEFAULT_INT_AUTHORITY: f64 = 1.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for a single PID controller
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PidParams {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,

    /// Limit on the magnitude of the controller output. If not given the
    /// output is unlimited.
    #[serde(default)]
    pub output_limit: Option<f64>,

    /// Fraction of the output limit the integral term may use, between 0 and
    /// 1. Only used if `output_limit` is given.
    #[serde(default)]
    pub int_authority: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidParams {
    /// The gains in these parameters.
    pub fn gains(&self) -> Gains {
        Gains::new(self.k_p, self.k_i, self.k_d)
    }

    /// Build an initialised controller from these parameters.
    pub fn build(&self) -> Result<PidController, PidError> {
        let mut ctrl = PidController::with_gains(self.gains())?;

        if let Some(output_limit) = self.output_limit {
            ctrl.set_limits(
                output_limit,
                self.int_authority.unwrap_or(DEFAULT_INT_AUTHORITY)
            )?;
        }

        Ok(ctrl)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_build() {
        let params: PidParams = util::params::from_str(
            "k_p = 0.1\nk_i = 0.02\nk_d = 0.0\noutput_limit = 1.0\nint_authority = 0.5\n"
        ).unwrap();

        let ctrl = params.build().unwrap();
        assert_eq!(ctrl.gains(), Some(Gains::new(0.1, 0.02, 0.0)));
        assert_eq!(ctrl.output_limit(), 1.0);
        assert!((ctrl.int_err_limit() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_build_unlimited() {
        let params: PidParams = util::params::from_str(
            "k_p = 1.0\nk_i = 0.0\nk_d = 0.5\n"
        ).unwrap();

        let ctrl = params.build().unwrap();
        assert_eq!(ctrl.output_limit(), std::f64::INFINITY);
        assert_eq!(ctrl.int_err_limit(), std::f64::INFINITY);
    }

    #[test]
    fn test_build_default_authority() {
        let params = PidParams {
            k_p: 1.0,
            k_i: 0.5,
            k_d: 0.0,
            output_limit: Some(2.0),
            int_authority: None,
        };

        assert!((params.build().unwrap().int_err_limit() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_build_zero_ki_with_limit() {
        let params = PidParams {
            k_p: 1.0,
            k_i: 0.0,
            k_d: 0.0,
            output_limit: Some(1.0),
            int_authority: Some(0.25),
        };

        assert!(matches!(params.build(), Err(PidError::ZeroIntegralGain)));
    }
}
