//! Neighbor boundary exchange.
//!
//! Each iteration every worker refreshes its halo cells with the edge values
//! of its neighbors. All sends are rendezvous-like, so the order of sends
//! and receives decides whether the group runs or deadlocks: if two adjacent
//! workers both sent first, both would park forever.
//!
//! The rule is parity. Odd ranks open every pairing by sending, even ranks
//! answer by receiving first, and within one worker the left pairing always
//! completes before the right one starts. Every adjacent pair is odd-even,
//! so each send faces a worker that is already receiving.
//!
//! The ordering is derived once, as data, in [`ExchangePlan`]. The
//! [`HaloExchanger`] just walks the plan; it contains no parity logic of
//! its own.

use comms::Link;
use comms::msg::{HaloTag, Msg};
use log::trace;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::context::WorkerContext;
use crate::error::{Result, SolverErr};
use crate::segment::Segment;

/// Which neighbor an action talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// One step of the exchange protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaloAction {
    /// Push this side's outermost owned value to the neighbor.
    Send { side: Side, tag: HaloTag },
    /// Pull the neighbor's edge value into this side's halo cell.
    Recv { side: Side, tag: HaloTag },
}

/// The full, ordered exchange sequence for one worker.
///
/// A plan only mentions sides that actually have a neighbor; the ends of
/// the line get shorter plans and a lone worker gets an empty one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangePlan {
    actions: Vec<HaloAction>,
}

impl ExchangePlan {
    /// Derives the action sequence for the worker in `ctx`.
    pub fn for_worker(ctx: &WorkerContext) -> Self {
        use HaloAction::{Recv, Send};
        use HaloTag::{BoundaryDown, BoundaryUp};

        let mut actions = Vec::with_capacity(4);

        if ctx.is_odd() {
            // Odd ranks talk left first. The left neighbor of an odd rank
            // always exists.
            actions.push(Send {
                side: Side::Left,
                tag: BoundaryDown,
            });
            actions.push(Recv {
                side: Side::Left,
                tag: BoundaryUp,
            });

            if ctx.right_neighbor().is_some() {
                actions.push(Send {
                    side: Side::Right,
                    tag: BoundaryDown,
                });
                actions.push(Recv {
                    side: Side::Right,
                    tag: BoundaryUp,
                });
            }
        } else {
            if ctx.left_neighbor().is_some() {
                actions.push(Recv {
                    side: Side::Left,
                    tag: BoundaryDown,
                });
                actions.push(Send {
                    side: Side::Left,
                    tag: BoundaryUp,
                });
            }

            if ctx.right_neighbor().is_some() {
                actions.push(Recv {
                    side: Side::Right,
                    tag: BoundaryDown,
                });
                actions.push(Send {
                    side: Side::Right,
                    tag: BoundaryUp,
                });
            }
        }

        Self { actions }
    }

    pub fn actions(&self) -> &[HaloAction] {
        &self.actions
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Executes an [`ExchangePlan`] against the neighbor links.
pub struct HaloExchanger<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    plan: ExchangePlan,
    left: Option<Link<R, W>>,
    right: Option<Link<R, W>>,
}

impl<R: AsyncRead + Unpin, W: AsyncWrite + Unpin> HaloExchanger<R, W> {
    /// Pairs the worker's plan with its neighbor links.
    ///
    /// # Panics
    /// If a link is present on a side the context has no neighbor for, or
    /// missing on a side that has one. Links come from the same wiring pass
    /// that assigns ranks, so a mismatch is a wiring bug.
    pub fn new(ctx: &WorkerContext, left: Option<Link<R, W>>, right: Option<Link<R, W>>) -> Self {
        assert_eq!(
            left.is_some(),
            ctx.left_neighbor().is_some(),
            "left link does not match the context of rank {}",
            ctx.rank()
        );
        assert_eq!(
            right.is_some(),
            ctx.right_neighbor().is_some(),
            "right link does not match the context of rank {}",
            ctx.rank()
        );

        Self {
            plan: ExchangePlan::for_worker(ctx),
            left,
            right,
        }
    }

    pub fn plan(&self) -> &ExchangePlan {
        &self.plan
    }

    /// Runs one full exchange round, updating `segment`'s halo cells.
    ///
    /// `iteration` is only used to annotate protocol errors.
    pub async fn exchange(&mut self, iteration: usize, segment: &mut Segment) -> Result<()> {
        for action in self.plan.actions().iter().copied() {
            match action {
                HaloAction::Send { side, tag } => {
                    let value = match side {
                        Side::Left => segment.leftmost(),
                        Side::Right => segment.rightmost(),
                    };
                    let link = match side {
                        Side::Left => self.left.as_mut(),
                        Side::Right => self.right.as_mut(),
                    };
                    let Some(link) = link else {
                        unreachable!("plan references a side with no link")
                    };

                    link.send(&Msg::Halo { tag, value }).await?;
                }
                HaloAction::Recv { side, tag } => {
                    let link = match side {
                        Side::Left => self.left.as_mut(),
                        Side::Right => self.right.as_mut(),
                    };
                    let Some(link) = link else {
                        unreachable!("plan references a side with no link")
                    };

                    let value = match link.recv().await? {
                        Msg::Halo { tag: got, value } if got == tag => value,
                        other => {
                            return Err(SolverErr::UnexpectedMessage {
                                iteration,
                                expected: tag.name(),
                                got: other.kind_name(),
                            });
                        }
                    };

                    match side {
                        Side::Left => segment.set_left_halo(value),
                        Side::Right => segment.set_right_halo(value),
                    }
                }
            }
        }

        if !self.plan.is_empty() {
            trace!(iteration = iteration; "halo exchange complete");
        }

        Ok(())
    }
}
