use std::fmt;

use solver::SolverErr;

/// All errors that can end a run.
#[derive(Debug)]
pub enum RunError {
    /// Invalid launch parameters, caught before any worker task starts.
    InvalidConfig(String),
    /// A worker hit an unrecoverable failure mid-run.
    Worker { rank: usize, source: SolverErr },
    /// A worker task panicked or was cancelled instead of returning.
    TaskFailed(tokio::task::JoinError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Worker { rank, source } => write!(f, "worker {rank} failed: {source}"),
            Self::TaskFailed(e) => write!(f, "worker task failed: {e}"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Worker { source, .. } => Some(source),
            Self::TaskFailed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<tokio::task::JoinError> for RunError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::TaskFailed(e)
    }
}
