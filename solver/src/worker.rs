//! The per-rank solve: one worker owning one segment, run to completion.

use comms::{Collective, Link};
use log::{debug, info};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::collect::ResultCollector;
use crate::config::SolverConfig;
use crate::context::WorkerContext;
use crate::convergence::{ConvergenceReducer, Termination};
use crate::error::Result;
use crate::halo::HaloExchanger;
use crate::partition::Partition;
use crate::segment::{Scratch, Segment};
use crate::stencil::StencilUpdater;

/// What one worker hands back when its run ends.
#[derive(Debug)]
pub struct WorkerOutcome {
    pub rank: usize,
    /// Completed relaxation sweeps.
    pub iterations: usize,
    /// The last agreed group-wide residual.
    pub global_residual: f64,
    pub termination: Termination,
    /// The assembled field, `Some` only at the coordinator.
    pub field: Option<Vec<f32>>,
}

/// One participant of a distributed solve.
#[derive(Debug)]
pub struct Worker {
    ctx: WorkerContext,
    cfg: SolverConfig,
    partition: Partition,
}

impl Worker {
    /// Builds a worker for `ctx`, validating the configuration and claiming
    /// its partition. Nothing here touches a link: every way a launch can
    /// be rejected fires before the group starts.
    ///
    /// # Errors
    /// `InvalidConfig` for bad parameters, `IndivisibleGrid` when the grid
    /// does not divide evenly over the group.
    pub fn new(ctx: WorkerContext, cfg: SolverConfig) -> Result<Self> {
        cfg.validate()?;
        let partition = Partition::for_worker(cfg.global_size, ctx)?;

        Ok(Self {
            ctx,
            cfg,
            partition,
        })
    }

    pub fn rank(&self) -> usize {
        self.ctx.rank()
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Runs the solve against the group and gathers the result.
    ///
    /// Each iteration is strictly: stencil sweep, residual all-reduce,
    /// commit of the new field, halo exchange, then the stop check. The
    /// exchange runs even on the final iteration so every worker performs
    /// the same number of sends and receives no matter where the stop
    /// decision lands.
    ///
    /// # Errors
    /// Any link failure or protocol violation. Hitting the iteration budget
    /// is not an error; it comes back as
    /// [`Termination::IterationBudgetExhausted`].
    pub async fn run<R, W>(
        self,
        left: Option<Link<R, W>>,
        right: Option<Link<R, W>>,
        mut collective: Collective<R, W>,
    ) -> Result<WorkerOutcome>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut segment = Segment::new(&self.partition, &self.cfg);
        let mut scratch = Scratch::for_segment(&segment);
        let updater = StencilUpdater::new(self.cfg.grid_spacing);
        let mut exchanger = HaloExchanger::new(&self.ctx, left, right);
        let mut reducer =
            ConvergenceReducer::new(self.cfg.residual_threshold, self.cfg.max_iterations);

        info!(rank = self.ctx.rank(), points = self.partition.interior_size(); "worker started");

        loop {
            let local = updater.step(&segment, &mut scratch);
            reducer.reduce(&mut collective, local).await?;
            updater.commit(&mut segment, &scratch);
            exchanger
                .exchange(reducer.state().iterations, &mut segment)
                .await?;

            if !reducer.should_continue() {
                break;
            }
        }

        let state = reducer.state();
        debug!(rank = self.ctx.rank(), iterations = state.iterations; "iteration loop done");

        let field = ResultCollector::new(self.cfg.global_size, self.partition)
            .collect(&mut collective, &segment)
            .await?;

        info!(
            rank = self.ctx.rank(),
            iterations = state.iterations,
            residual = state.global_residual;
            "worker finished"
        );

        Ok(WorkerOutcome {
            rank: self.ctx.rank(),
            iterations: state.iterations,
            global_residual: state.global_residual,
            termination: reducer.termination(),
            field,
        })
    }
}
