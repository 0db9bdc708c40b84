use std::num::NonZeroUsize;

/// Identity of one worker within the group.
///
/// Carries the rank and group size every component derives its behavior
/// from: partition placement, neighbor existence and the send/receive
/// ordering class of the halo protocol. Passed by value; there is no ambient
/// rank state anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerContext {
    rank: usize,
    workers: NonZeroUsize,
}

impl WorkerContext {
    /// Creates the context for `rank` in a group of `workers`.
    ///
    /// # Panics
    /// If `rank` is outside the group. Ranks are produced by the runner
    /// enumerating the group, so an out-of-range rank is a wiring bug.
    pub fn new(rank: usize, workers: NonZeroUsize) -> Self {
        assert!(
            rank < workers.get(),
            "rank {rank} out of range for a group of {workers}"
        );
        Self { rank, workers }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn workers(&self) -> usize {
        self.workers.get()
    }

    /// Rank 0 coordinates the collectives and assembles the final field.
    pub fn is_coordinator(&self) -> bool {
        self.rank == 0
    }

    /// Whether this rank belongs to the send-first class of the halo
    /// protocol. Odd ranks open every pairing; even ranks answer.
    pub fn is_odd(&self) -> bool {
        self.rank % 2 == 1
    }

    pub fn left_neighbor(&self) -> Option<usize> {
        self.rank.checked_sub(1)
    }

    pub fn right_neighbor(&self) -> Option<usize> {
        let right = self.rank + 1;
        (right < self.workers.get()).then_some(right)
    }
}
