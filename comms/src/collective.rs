//! Group-wide operations over a star of links centered on the coordinator.

use std::io;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::link::{Link, MemReader, MemWriter};
use crate::msg::Msg;

/// A [`Collective`] over in-memory links, as produced by
/// [`crate::topology::wire_group`].
pub type MemCollective = Collective<MemReader, MemWriter>;

/// One worker's handle on the group channel.
///
/// Every non-coordinator worker holds a single link to the coordinator. The
/// coordinator folds contributions in ascending rank order, its own first,
/// so float accumulation is deterministic and every participant observes the
/// bitwise same combined value.
pub enum Collective<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Rank 0. `peers[i]` is the link to rank `i + 1`.
    Coordinator { peers: Vec<Link<R, W>> },
    /// Any other rank, holding its link to the coordinator.
    Member { coordinator: Link<R, W> },
}

impl<R: AsyncRead + Unpin, W: AsyncWrite + Unpin> Collective<R, W> {
    /// Number of workers participating, this one included.
    pub fn group_size(&self) -> usize {
        match self {
            Collective::Coordinator { peers } => peers.len() + 1,
            // Members cannot see past the coordinator; they only know the
            // group is at least a pair.
            Collective::Member { .. } => 2,
        }
    }

    /// Sums `local` across the group and hands every caller the same total.
    ///
    /// Blocks until the whole group has contributed: the call doubles as an
    /// iteration barrier, which is what keeps all workers in lockstep.
    pub async fn all_reduce_sum(&mut self, local: f64) -> io::Result<f64> {
        match self {
            Collective::Coordinator { peers } => {
                let mut total = local;
                for peer in peers.iter_mut() {
                    match peer.recv().await? {
                        Msg::ResidualShare(share) => total += share,
                        other => return Err(unexpected("residual share", &other)),
                    }
                }

                for peer in peers.iter_mut() {
                    peer.send(&Msg::ResidualTotal(total)).await?;
                }

                Ok(total)
            }
            Collective::Member { coordinator } => {
                coordinator.send(&Msg::ResidualShare(local)).await?;

                match coordinator.recv().await? {
                    Msg::ResidualTotal(total) => Ok(total),
                    other => Err(unexpected("residual total", &other)),
                }
            }
        }
    }

    /// Collects every worker's slice at the coordinator.
    ///
    /// The coordinator gets `Some(chunks)` with one entry per rank in
    /// ascending order, its own slice at index 0. Members contribute theirs
    /// and get `None`.
    pub async fn gather(&mut self, local: &[f32]) -> io::Result<Option<Vec<Vec<f32>>>> {
        match self {
            Collective::Coordinator { peers } => {
                let mut chunks = Vec::with_capacity(peers.len() + 1);
                chunks.push(local.to_vec());

                for peer in peers.iter_mut() {
                    match peer.recv().await? {
                        Msg::FieldSlice(values) => chunks.push(values.to_vec()),
                        other => return Err(unexpected("field slice", &other)),
                    }
                }

                Ok(Some(chunks))
            }
            Collective::Member { coordinator } => {
                coordinator.send(&Msg::FieldSlice(local)).await?;
                Ok(None)
            }
        }
    }
}

fn unexpected(expected: &str, got: &Msg<'_>) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("Expected a {expected} frame, got {}", got.kind_name()),
    )
}
