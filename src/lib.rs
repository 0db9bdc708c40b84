//! Runs a distributed Poisson relaxation over an in-process worker group.
//!
//! [`run`] wires one task per rank, lets the group iterate to convergence
//! and returns the coordinator's view of the result. The solve itself lives
//! in the `solver` crate; the transport in `comms`.

mod config;
mod error;

use comms::topology::wire_group;
use log::{debug, info};
use tokio::task::JoinSet;

use solver::{Worker, WorkerContext, WorkerOutcome};

pub use config::RunConfig;
pub use error::RunError;
pub use solver::{SolverErr, Termination};

/// The coordinator's view of a finished run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// The assembled field, `global_size` values in grid order.
    pub field: Vec<f32>,
    /// Completed relaxation sweeps.
    pub iterations: usize,
    /// The final group-wide residual.
    pub global_residual: f64,
    pub termination: Termination,
}

/// Runs the whole group to completion.
///
/// Workers are spawned only after every rank's configuration and partition
/// have been validated, so a rejected launch never starts a partial group.
/// Once running, the granularity is all-or-nothing: the first worker
/// failure aborts every other task and becomes the returned error.
///
/// # Errors
/// `InvalidConfig` for rejected launches, `Worker` for mid-run failures,
/// `TaskFailed` if a worker task panics.
pub async fn run(config: &RunConfig) -> Result<RunReport, RunError> {
    let group = config.group_size()?;
    let solver_config = config.solver_config()?;

    let mut workers = Vec::with_capacity(group.get());
    for rank in 0..group.get() {
        let ctx = WorkerContext::new(rank, group);
        let worker = Worker::new(ctx, solver_config.clone())
            .map_err(|e| RunError::InvalidConfig(e.to_string()))?;
        workers.push(worker);
    }

    info!(workers = group.get(), global_size = config.global_size; "starting run");

    let mut tasks = JoinSet::new();
    for (worker, seat) in workers.into_iter().zip(wire_group(group)) {
        debug_assert_eq!(worker.rank(), seat.rank);
        tasks.spawn(async move {
            let rank = seat.rank;
            worker
                .run(seat.left, seat.right, seat.collective)
                .await
                .map_err(|source| RunError::Worker { rank, source })
        });
    }

    let mut report = None;
    while let Some(joined) = tasks.join_next().await {
        let outcome: WorkerOutcome = match joined {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                // A partial group cannot make progress; tear the rest down.
                tasks.abort_all();
                return Err(e);
            }
            Err(e) => {
                tasks.abort_all();
                return Err(e.into());
            }
        };

        debug!(rank = outcome.rank, iterations = outcome.iterations; "worker joined");

        if let Some(field) = outcome.field {
            report = Some(RunReport {
                field,
                iterations: outcome.iterations,
                global_residual: outcome.global_residual,
                termination: outcome.termination,
            });
        }
    }

    match report {
        Some(report) => Ok(report),
        // Every worker joined cleanly yet none carried the field, meaning
        // no seat was wired as coordinator.
        None => unreachable!("run finished without a coordinator outcome"),
    }
}
