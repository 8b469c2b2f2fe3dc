//! Gain scheduling strategies

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::{Gains, PidError};
use util::lookup::{LookupError, LookupTable};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A strategy for choosing a controller's gains from a scheduling variable.
pub trait GainScheduler {
    /// Get the gains to use at the given value of the scheduling variable, or
    /// `None` if the gains should not change.
    fn gains(&self, variable: f64) -> Result<Option<Gains>, PidError>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The default scheduler, which never changes the gains.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSchedule;

/// Schedules each gain with its own lookup table.
#[derive(Debug, Clone, Deserialize)]
pub struct TableScheduler {
    /// Proportional gain against the scheduling variable
    k_p: LookupTable<f64>,

    /// Integral gain against the scheduling variable
    k_i: LookupTable<f64>,

    /// Derivative gain against the scheduling variable
    k_d: LookupTable<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GainScheduler for NoSchedule {
    fn gains(&self, _variable: f64) -> Result<Option<Gains>, PidError> {
        Ok(None)
    }
}

impl TableScheduler {
    /// Create a new scheduler from three tables, which must be sorted and
    /// not empty.
    pub fn new(
        k_p: LookupTable<f64>,
        k_i: LookupTable<f64>,
        k_d: LookupTable<f64>
    ) -> Result<Self, PidError> {
        for table in [&k_p, &k_i, &k_d].iter() {
            if table.is_empty() {
                return Err(LookupError::Empty.into())
            }
            if !table.is_sorted() {
                return Err(LookupError::NotSorted.into())
            }
        }

        Ok(Self { k_p, k_i, k_d })
    }
}

impl GainScheduler for TableScheduler {
    fn gains(&self, variable: f64) -> Result<Option<Gains>, PidError> {
        Ok(Some(Gains {
            k_p: self.k_p.query(variable)?,
            k_i: self.k_i.query(variable)?,
            k_d: self.k_d.query(variable)?,
        }))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pid::PidController;

    fn speed_scheduler() -> TableScheduler {
        TableScheduler::new(
            LookupTable::from_points(vec![(0.0, 1.0), (40.0, 0.5)]).unwrap(),
            LookupTable::from_points(vec![(0.0, 0.1), (40.0, 0.2)]).unwrap(),
            LookupTable::from_points(vec![(10.0, 0.5)]).unwrap(),
        ).unwrap()
    }

    #[test]
    fn test_no_schedule() {
        let mut ctrl = PidController::with_gains(Gains::new(1.0, 0.1, 0.5)).unwrap();

        assert_eq!(ctrl.schedule(25.0), Ok(false));
        assert_eq!(ctrl.gains(), Some(Gains::new(1.0, 0.1, 0.5)));
    }

    #[test]
    fn test_table_schedule() {
        let mut ctrl = PidController::with_scheduler(speed_scheduler());
        ctrl.schedule(20.0).unwrap();
        ctrl.set_limits(1.0, 0.25).unwrap();

        let gains = ctrl.gains().unwrap();
        assert!((gains.k_p - 0.75).abs() < 1e-12);
        assert!((gains.k_i - 0.15).abs() < 1e-12);
        assert_eq!(gains.k_d, 0.5);
        assert!((ctrl.int_err_limit() - 0.25 / 0.15).abs() < 1e-12);

        // Above the table the end gains are held, and the integrator limit
        // follows the new integral gain
        assert_eq!(ctrl.schedule(60.0), Ok(true));
        assert_eq!(ctrl.gains(), Some(Gains::new(0.5, 0.2, 0.5)));
        assert!((ctrl.int_err_limit() - 1.25).abs() < 1e-12);

        assert_eq!(
            ctrl.schedule(std::f64::NAN),
            Err(PidError::ScheduleError(LookupError::NanQuery))
        );
        assert_eq!(ctrl.gains(), Some(Gains::new(0.5, 0.2, 0.5)));
    }

    #[test]
    fn test_invalid_tables() {
        let good = LookupTable::from_points(vec![(0.0, 1.0)]).unwrap();

        let mut unsorted = LookupTable::new();
        unsorted.add(0.0, 1.0).unwrap();

        assert!(matches!(
            TableScheduler::new(good.clone(), LookupTable::new(), good.clone()),
            Err(PidError::ScheduleError(LookupError::Empty))
        ));
        assert!(matches!(
            TableScheduler::new(good.clone(), good.clone(), unsorted),
            Err(PidError::ScheduleError(LookupError::NotSorted))
        ));
    }

    #[test]
    fn test_deserialise() {
        let sched: TableScheduler = util::params::from_str(
            "k_p = [[40.0, 0.5], [0.0, 1.0]]\n\
             k_i = [[0.0, 0.1]]\n\
             k_d = [[0.0, 0.0]]\n"
        ).unwrap();

        assert_eq!(sched.gains(20.0), Ok(Some(Gains::new(0.75, 0.1, 0.0))));
    }
}
