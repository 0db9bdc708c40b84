use std::ops::Range;

use crate::context::WorkerContext;
use crate::error::{Result, SolverErr};

/// Where a worker's slice sits in the rank line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Leftmost of several: owns the left physical boundary.
    First,
    /// Somewhere in the middle: both sides face a neighbor.
    Interior,
    /// Rightmost of several: owns the right physical boundary.
    Last,
    /// The whole grid at once: both physical boundaries, no neighbors.
    Only,
}

/// One worker's share of the global grid.
///
/// The split is strictly even. An uneven split would give ranks different
/// message and work counts, so it is rejected up front instead of padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    interior_size: usize,
    start: usize,
    position: Position,
}

impl Partition {
    /// Assigns `global_size` grid points to the worker in `ctx`.
    ///
    /// # Errors
    /// `IndivisibleGrid` when the grid does not divide evenly over the
    /// group. This fires before any link or task exists, so a bad launch
    /// never starts a partial run.
    pub fn for_worker(global_size: usize, ctx: WorkerContext) -> Result<Self> {
        let workers = ctx.workers();
        if global_size % workers != 0 {
            return Err(SolverErr::IndivisibleGrid {
                global_size,
                workers,
            });
        }

        let interior_size = global_size / workers;
        let position = match (ctx.left_neighbor(), ctx.right_neighbor()) {
            (None, None) => Position::Only,
            (None, Some(_)) => Position::First,
            (Some(_), None) => Position::Last,
            (Some(_), Some(_)) => Position::Interior,
        };

        Ok(Self {
            interior_size,
            start: ctx.rank() * interior_size,
            position,
        })
    }

    /// Number of grid points this worker owns.
    pub fn interior_size(&self) -> usize {
        self.interior_size
    }

    /// Global index of this worker's first owned point.
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Global indices owned by this worker.
    pub fn global_range(&self) -> Range<usize> {
        self.start..self.start + self.interior_size
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;

    fn ctx(rank: usize, workers: usize) -> WorkerContext {
        WorkerContext::new(rank, NonZeroUsize::new(workers).unwrap())
    }

    #[test]
    fn twelve_points_over_three_workers() {
        let parts: Vec<_> = (0..3)
            .map(|rank| Partition::for_worker(12, ctx(rank, 3)).unwrap())
            .collect();

        assert!(parts.iter().all(|p| p.interior_size() == 4));
        assert_eq!(parts[0].global_range(), 0..4);
        assert_eq!(parts[1].global_range(), 4..8);
        assert_eq!(parts[2].global_range(), 8..12);

        assert_eq!(parts[0].position(), Position::First);
        assert_eq!(parts[1].position(), Position::Interior);
        assert_eq!(parts[2].position(), Position::Last);
    }

    #[test]
    fn indivisible_grid_is_rejected_for_every_rank() {
        for rank in 0..3 {
            let err = Partition::for_worker(10, ctx(rank, 3)).unwrap_err();
            assert!(matches!(
                err,
                SolverErr::IndivisibleGrid {
                    global_size: 10,
                    workers: 3
                }
            ));
        }
    }

    #[test]
    fn a_lone_worker_owns_everything() {
        let part = Partition::for_worker(8, ctx(0, 1)).unwrap();
        assert_eq!(part.interior_size(), 8);
        assert_eq!(part.start(), 0);
        assert_eq!(part.position(), Position::Only);
    }

    #[test]
    fn single_point_slices_are_allowed() {
        let part = Partition::for_worker(4, ctx(2, 4)).unwrap();
        assert_eq!(part.interior_size(), 1);
        assert_eq!(part.global_range(), 2..3);
    }
}
