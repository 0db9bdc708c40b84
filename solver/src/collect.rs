//! Final gather of the distributed field at the coordinator.

use comms::Collective;
use log::debug;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::{Result, SolverErr};
use crate::partition::Partition;
use crate::segment::Segment;

/// Assembles the finished field in global index order at the coordinator.
pub struct ResultCollector {
    global_size: usize,
    partition: Partition,
}

impl ResultCollector {
    pub fn new(global_size: usize, partition: Partition) -> Self {
        Self {
            global_size,
            partition,
        }
    }

    /// Contributes this worker's owned points to the group gather.
    ///
    /// The coordinator returns `Some(field)` with all `global_size` values
    /// in rank order; everyone else gets `None`. Since the split is even,
    /// the coordinator checks each contribution against its own slice
    /// length and rejects anything else.
    pub async fn collect<R, W>(
        &self,
        collective: &mut Collective<R, W>,
        segment: &Segment,
    ) -> Result<Option<Vec<f32>>>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let Some(chunks) = collective.gather(segment.interior()).await? else {
            return Ok(None);
        };

        let expected = self.partition.interior_size();
        let mut field = Vec::with_capacity(self.global_size);
        for (rank, chunk) in chunks.iter().enumerate() {
            if chunk.len() != expected {
                return Err(SolverErr::GatherSizeMismatch {
                    rank,
                    got: chunk.len(),
                    expected,
                });
            }
            field.extend_from_slice(chunk);
        }

        debug_assert_eq!(field.len(), self.global_size);
        debug!(points = field.len(); "assembled the final field");

        Ok(Some(field))
    }
}
