//! Group-wide residual agreement and the stopping rule.

use std::num::NonZeroUsize;

use comms::Collective;
use log::debug;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::Result;

/// How a run ended. Both cases are successful completions; only the caller
/// decides whether an exhausted budget is worth complaining about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Converged,
    IterationBudgetExhausted,
}

/// Per-worker iteration accounting.
///
/// Every worker ends a run with the bitwise same state: the residual comes
/// out of the all-reduce and the count advances in lockstep with it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IterationState {
    /// Completed relaxation sweeps.
    pub iterations: usize,
    pub converged: bool,
    /// The last agreed group-wide residual.
    pub global_residual: f64,
}

/// Folds local residuals into the group-wide value and decides when the
/// iteration stops.
pub struct ConvergenceReducer {
    threshold: f64,
    max_iterations: usize,
    state: IterationState,
}

impl ConvergenceReducer {
    pub fn new(threshold: f64, max_iterations: NonZeroUsize) -> Self {
        Self {
            threshold,
            max_iterations: max_iterations.get(),
            state: IterationState::default(),
        }
    }

    /// All-reduces `local` and advances this worker's iteration state.
    ///
    /// Called exactly once per iteration by every worker. The embedded
    /// all-reduce doubles as a barrier, so when this returns, the whole
    /// group has finished the same sweep.
    ///
    /// The convergence rule compares square roots,
    /// `sqrt(residual) < sqrt(threshold)`, applied by every worker to the
    /// bitwise same reduced value: either all workers see convergence or
    /// none does.
    pub async fn reduce<R, W>(
        &mut self,
        collective: &mut Collective<R, W>,
        local: f64,
    ) -> Result<f64>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let global = collective.all_reduce_sum(local).await?;

        self.state.iterations += 1;
        self.state.global_residual = global;
        self.state.converged = global.sqrt() < self.threshold.sqrt();

        debug!(iteration = self.state.iterations, residual = global; "reduced residual");

        Ok(global)
    }

    /// Whether another sweep should run.
    pub fn should_continue(&self) -> bool {
        !self.state.converged && self.state.iterations < self.max_iterations
    }

    pub fn termination(&self) -> Termination {
        if self.state.converged {
            Termination::Converged
        } else {
            Termination::IterationBudgetExhausted
        }
    }

    pub fn state(&self) -> IterationState {
        self.state
    }
}
