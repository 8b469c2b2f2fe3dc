//! Cyclic module interface
//!
//! Control modules are built once, initialised from a parameter file and a
//! session, then called once per frame with that frame's input. Each call
//! either produces an output and a status report or rejects the frame with an
//! error.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::warn;

// Internal imports
use crate::archive::Archived;
use crate::session::Session;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A cyclic control module.
pub trait State {
    /// Data needed to initialise the module, usually a parameter file name
    type InitData;
    type InitError;

    /// Input of one cycle
    type InputData;
    /// Output of one cycle
    type OutputData;
    /// Diagnostics of one cycle
    type StatusReport;
    type ProcError;

    /// Initialise the module, setting up any archives inside `session`.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Process one cycle.
    ///
    /// A rejected input shall leave the module as it was before the call.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;

    /// Process one cycle then write the module's archives.
    ///
    /// Archive failures are logged, they never stop the cycle.
    fn proc_archived(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    where
        Self: Archived
    {
        let out = self.proc(input_data)?;

        if let Err(e) = self.write() {
            warn!("Could not write archives: {}", e);
        }

        Ok(out)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::archive::ArchiveError;

    /// Sums its inputs, rejecting negative ones
    #[derive(Default)]
    struct Accumulator {
        total: i64,
        writes: usize
    }

    impl State for Accumulator {
        type InitData = i64;
        type InitError = ();
        type InputData = i64;
        type OutputData = i64;
        type StatusReport = ();
        type ProcError = i64;

        fn init(&mut self, init_data: i64, _session: &Session) -> Result<(), ()> {
            self.total = init_data;
            Ok(())
        }

        fn proc(&mut self, input_data: &i64) -> Result<(i64, ()), i64> {
            if *input_data < 0 {
                return Err(*input_data)
            }
            self.total += input_data;
            Ok((self.total, ()))
        }
    }

    impl Archived for Accumulator {
        fn write(&mut self) -> Result<(), ArchiveError> {
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_proc_archived() {
        let mut acc = Accumulator::default();

        assert_eq!(acc.proc_archived(&2), Ok((2, ())));
        assert_eq!(acc.proc_archived(&3), Ok((5, ())));
        assert_eq!(acc.writes, 2);

        // Rejected cycles aren't archived
        assert_eq!(acc.proc_archived(&-1), Err(-1));
        assert_eq!(acc.writes, 2);
        assert_eq!(acc.total, 5);
    }
}
