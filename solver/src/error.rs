use std::{error::Error, fmt, io};

/// The solver crate's result type.
pub type Result<T> = std::result::Result<T, SolverErr>;

/// Fatal solver failures.
///
/// Running out of iterations is deliberately not in here: a run that stops
/// at the budget is a reported outcome, not a failure. See
/// [`crate::convergence::Termination`].
#[derive(Debug)]
pub enum SolverErr {
    Io(io::Error),
    /// The grid cannot be split evenly over the group.
    IndivisibleGrid {
        global_size: usize,
        workers: usize,
    },
    /// A launch parameter failed validation.
    InvalidConfig(String),
    /// A frame arrived out of protocol order.
    UnexpectedMessage {
        iteration: usize,
        expected: &'static str,
        got: &'static str,
    },
    /// A gather contribution had the wrong length.
    GatherSizeMismatch {
        rank: usize,
        got: usize,
        expected: usize,
    },
}

impl fmt::Display for SolverErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverErr::Io(e) => write!(f, "io error: {e}"),
            SolverErr::IndivisibleGrid {
                global_size,
                workers,
            } => write!(
                f,
                "grid of {global_size} points does not divide evenly over {workers} workers"
            ),
            SolverErr::InvalidConfig(detail) => write!(f, "invalid configuration: {detail}"),
            SolverErr::UnexpectedMessage {
                iteration,
                expected,
                got,
            } => write!(
                f,
                "unexpected message at iteration {iteration}: expected {expected}, got {got}"
            ),
            SolverErr::GatherSizeMismatch {
                rank,
                got,
                expected,
            } => write!(
                f,
                "gather contribution from rank {rank} had {got} values, expected {expected}"
            ),
        }
    }
}

impl Error for SolverErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SolverErr::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SolverErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<SolverErr> for io::Error {
    fn from(value: SolverErr) -> Self {
        match value {
            SolverErr::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
