//! In-process group wiring: one seat per rank, ready to hand to a task.

use std::num::NonZeroUsize;

use crate::collective::{Collective, MemCollective};
use crate::link::{MemLink, pair};

/// Everything one worker needs to join the group.
///
/// Neighbor links exist exactly where the rank line has a neighbor, so the
/// ends of the line get `None` on their open side.
pub struct Seat {
    pub rank: usize,
    pub left: Option<MemLink>,
    pub right: Option<MemLink>,
    pub collective: MemCollective,
}

/// Builds the full link topology for `workers` ranks.
///
/// Adjacent ranks share one duplex link for halo traffic; every rank except 0
/// also gets a link to rank 0 for the collectives. All links come from
/// [`pair`], so their buffers are smaller than a frame and sends stay
/// rendezvous-like.
pub fn wire_group(workers: NonZeroUsize) -> Vec<Seat> {
    let n = workers.get();

    let mut lefts: Vec<Option<MemLink>> = std::iter::repeat_with(|| None).take(n).collect();
    let mut rights: Vec<Option<MemLink>> = std::iter::repeat_with(|| None).take(n).collect();
    for rank in 0..n - 1 {
        let (right_end, left_end) = pair();
        rights[rank] = Some(right_end);
        lefts[rank + 1] = Some(left_end);
    }

    let mut hub_peers = Vec::with_capacity(n - 1);
    let mut to_hub: Vec<Option<MemLink>> = std::iter::repeat_with(|| None).take(n).collect();
    for rank in 1..n {
        let (hub_end, member_end) = pair();
        hub_peers.push(hub_end);
        to_hub[rank] = Some(member_end);
    }

    let mut seats = Vec::with_capacity(n);
    let ends = lefts.into_iter().zip(rights).zip(to_hub);
    for (rank, ((left, right), hub)) in ends.enumerate() {
        let collective = match hub {
            None => Collective::Coordinator {
                peers: std::mem::take(&mut hub_peers),
            },
            Some(link) => Collective::Member { coordinator: link },
        };
        seats.push(Seat {
            rank,
            left,
            right,
            collective,
        });
    }

    seats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(n: usize) -> Vec<Seat> {
        wire_group(NonZeroUsize::new(n).unwrap())
    }

    #[test]
    fn single_rank_has_no_links() {
        let seats = group(1);
        assert_eq!(seats.len(), 1);

        let seat = &seats[0];
        assert!(seat.left.is_none());
        assert!(seat.right.is_none());
        assert_eq!(seat.collective.group_size(), 1);
    }

    #[test]
    fn chain_links_exist_exactly_between_neighbors() {
        let seats = group(4);

        assert!(seats[0].left.is_none());
        assert!(seats[3].right.is_none());
        for seat in &seats[..3] {
            assert!(seat.right.is_some());
        }
        for seat in &seats[1..] {
            assert!(seat.left.is_some());
        }
    }

    #[test]
    fn rank_zero_coordinates_everyone_else() {
        let seats = group(3);

        assert!(matches!(
            &seats[0].collective,
            Collective::Coordinator { peers } if peers.len() == 2
        ));
        for seat in &seats[1..] {
            assert!(matches!(seat.collective, Collective::Member { .. }));
        }
    }
}
