//! Field storage for one worker: owned points plus one halo cell per side.

use crate::config::SolverConfig;
use crate::partition::{Partition, Position};

/// A worker's slice of the field.
///
/// `values[1..=interior]` are the owned points; `values[0]` and
/// `values[interior + 1]` are the halo cells. A halo facing a neighbor
/// caches that neighbor's latest edge value, while a halo on an open side
/// holds the fixed physical boundary for the whole run.
#[derive(Debug, Clone)]
pub struct Segment {
    values: Vec<f32>,
    source: Vec<f32>,
    interior: usize,
}

impl Segment {
    /// Builds the initial segment: a zero field with the physical boundary
    /// conditions pre-seeded into the open-side halos and the worker's slice
    /// of the source table in place.
    pub fn new(partition: &Partition, cfg: &SolverConfig) -> Self {
        let interior = partition.interior_size();
        let mut values = vec![0.0; interior + 2];
        let mut source = vec![0.0; interior + 2];

        if let Some(table) = &cfg.source_term {
            source[1..=interior].copy_from_slice(&table[partition.global_range()]);
        }

        match partition.position() {
            Position::First => values[0] = cfg.left_boundary,
            Position::Last => values[interior + 1] = cfg.right_boundary,
            Position::Only => {
                values[0] = cfg.left_boundary;
                values[interior + 1] = cfg.right_boundary;
            }
            Position::Interior => {}
        }

        Self {
            values,
            source,
            interior,
        }
    }

    pub fn interior_size(&self) -> usize {
        self.interior
    }

    /// Full storage including halos, indexed `0..interior + 2`.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Source table aligned with `values`, halo slots zero.
    pub fn source(&self) -> &[f32] {
        &self.source
    }

    /// The owned points only.
    pub fn interior(&self) -> &[f32] {
        &self.values[1..=self.interior]
    }

    pub(crate) fn interior_mut(&mut self) -> &mut [f32] {
        &mut self.values[1..=self.interior]
    }

    /// Leftmost owned value, what the left neighbor mirrors in its halo.
    pub fn leftmost(&self) -> f32 {
        self.values[1]
    }

    /// Rightmost owned value, what the right neighbor mirrors in its halo.
    pub fn rightmost(&self) -> f32 {
        self.values[self.interior]
    }

    pub fn left_halo(&self) -> f32 {
        self.values[0]
    }

    pub fn right_halo(&self) -> f32 {
        self.values[self.interior + 1]
    }

    pub fn set_left_halo(&mut self, value: f32) {
        self.values[0] = value;
    }

    pub fn set_right_halo(&mut self, value: f32) {
        self.values[self.interior + 1] = value;
    }
}

/// Next-iteration buffer, shaped like the segment it shadows so the stencil
/// can use the same indices for both.
#[derive(Debug)]
pub struct Scratch {
    next: Vec<f32>,
}

impl Scratch {
    pub fn for_segment(segment: &Segment) -> Self {
        Self {
            next: vec![0.0; segment.values().len()],
        }
    }

    pub(crate) fn values_mut(&mut self) -> &mut [f32] {
        &mut self.next
    }

    /// The freshly computed owned points. Halo slots are never written by
    /// the stencil and stay zero.
    pub(crate) fn interior(&self) -> &[f32] {
        &self.next[1..self.next.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::context::WorkerContext;

    fn segment_for(rank: usize, workers: usize, cfg: &SolverConfig) -> Segment {
        let ctx = WorkerContext::new(rank, NonZeroUsize::new(workers).unwrap());
        let partition = Partition::for_worker(cfg.global_size, ctx).unwrap();
        Segment::new(&partition, cfg)
    }

    #[test]
    fn open_halos_hold_the_boundary_conditions() {
        let cfg = SolverConfig::default();

        let first = segment_for(0, 3, &cfg);
        assert_eq!(first.left_halo(), 10.0);
        assert_eq!(first.right_halo(), 0.0);
        assert!(first.interior().iter().all(|v| *v == 0.0));

        let middle = segment_for(1, 3, &cfg);
        assert_eq!(middle.left_halo(), 0.0);
        assert_eq!(middle.right_halo(), 0.0);

        let last = segment_for(2, 3, &cfg);
        assert_eq!(last.left_halo(), 0.0);
        assert_eq!(last.right_halo(), 0.0);
    }

    #[test]
    fn a_lone_segment_gets_both_boundaries() {
        let cfg = SolverConfig::default();
        let only = segment_for(0, 1, &cfg);

        assert_eq!(only.left_halo(), 10.0);
        assert_eq!(only.right_halo(), 0.0);
        assert_eq!(only.interior_size(), 12);
    }

    #[test]
    fn source_table_is_sliced_per_rank() {
        let cfg = SolverConfig {
            global_size: 6,
            source_term: Some(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]),
            ..Default::default()
        };

        let right = segment_for(1, 2, &cfg);
        assert_eq!(right.source(), [0.0, 4.0, 5.0, 6.0, 0.0]);
    }
}
