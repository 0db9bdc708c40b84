//! The relaxation sweep: one Jacobi step over a segment.

use crate::segment::{Scratch, Segment};

/// Applies the three-point relaxation step and measures how much the field
/// moved.
///
/// The update for every owned point `i` is
/// `next[i] = 0.5 * (values[i-1] + values[i+1] - h^2 * source[i])`,
/// reading only the previous iteration's values. Edge points read their
/// halo cell like any other neighbor, which is the whole point of keeping
/// halos inline with the owned data.
pub struct StencilUpdater {
    hsq: f32,
}

impl StencilUpdater {
    pub fn new(grid_spacing: f32) -> Self {
        Self {
            hsq: grid_spacing * grid_spacing,
        }
    }

    /// Computes the next field into `scratch` and returns the local
    /// residual: the sum of squared per-point changes.
    ///
    /// The squares are taken in `f32`, the accumulation in `f64`. Late in a
    /// run the per-point changes are tiny and a single-precision sum would
    /// round them away before the threshold comparison sees them.
    pub fn step(&self, segment: &Segment, scratch: &mut Scratch) -> f64 {
        let values = segment.values();
        let source = segment.source();
        let next = scratch.values_mut();

        let mut residual = 0.0_f64;
        for i in 1..=segment.interior_size() {
            next[i] = 0.5 * (values[i - 1] + values[i + 1] - self.hsq * source[i]);

            let diff = next[i] - values[i];
            residual += f64::from(diff * diff);
        }

        residual
    }

    /// Copies the scratch interior over the segment's owned values.
    ///
    /// Split from [`StencilUpdater::step`] so the caller controls when the
    /// new iteration becomes visible: the residual must be agreed on before
    /// any neighbor sees a new boundary value.
    pub fn commit(&self, segment: &mut Segment, scratch: &Scratch) {
        segment.interior_mut().copy_from_slice(scratch.interior());
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::config::SolverConfig;
    use crate::context::WorkerContext;
    use crate::partition::Partition;

    fn lone_segment(cfg: &SolverConfig) -> Segment {
        let ctx = WorkerContext::new(0, NonZeroUsize::new(1).unwrap());
        let partition = Partition::for_worker(cfg.global_size, ctx).unwrap();
        Segment::new(&partition, cfg)
    }

    #[test]
    fn first_sweep_pulls_the_boundary_inward() {
        let cfg = SolverConfig {
            global_size: 4,
            ..Default::default()
        };
        let mut segment = lone_segment(&cfg);
        let mut scratch = Scratch::for_segment(&segment);
        let updater = StencilUpdater::new(cfg.grid_spacing);

        let residual = updater.step(&segment, &mut scratch);
        updater.commit(&mut segment, &scratch);

        // Only the point next to the left boundary moves: 0.5 * (10 + 0).
        assert_eq!(segment.interior(), [5.0, 0.0, 0.0, 0.0]);
        assert_eq!(residual, 25.0);

        // Halos are untouched by a commit.
        assert_eq!(segment.left_halo(), 10.0);
        assert_eq!(segment.right_halo(), 0.0);
    }

    #[test]
    fn source_term_enters_scaled_by_spacing_squared() {
        let cfg = SolverConfig {
            global_size: 2,
            left_boundary: 0.0,
            right_boundary: 0.0,
            grid_spacing: 0.5,
            source_term: Some(vec![8.0, -4.0]),
            ..Default::default()
        };
        let segment = lone_segment(&cfg);
        let mut scratch = Scratch::for_segment(&segment);
        let updater = StencilUpdater::new(cfg.grid_spacing);

        updater.step(&segment, &mut scratch);

        // next[i] = 0.5 * (0 + 0 - 0.25 * rho[i])
        assert_eq!(scratch.interior(), [-1.0, 0.5]);
    }

    #[test]
    fn converged_field_reports_zero_residual() {
        let cfg = SolverConfig {
            global_size: 3,
            left_boundary: 4.0,
            right_boundary: 4.0,
            ..Default::default()
        };
        let mut segment = lone_segment(&cfg);
        // A constant field equal to both boundaries is a fixed point.
        segment.interior_mut().fill(4.0);
        let mut scratch = Scratch::for_segment(&segment);

        let residual = StencilUpdater::new(cfg.grid_spacing).step(&segment, &mut scratch);
        assert_eq!(residual, 0.0);
    }

    #[test]
    fn step_reads_only_the_previous_iteration() {
        let cfg = SolverConfig {
            global_size: 3,
            left_boundary: 6.0,
            right_boundary: 6.0,
            ..Default::default()
        };
        let mut segment = lone_segment(&cfg);
        segment.interior_mut().copy_from_slice(&[0.0, 6.0, 0.0]);
        let mut scratch = Scratch::for_segment(&segment);

        StencilUpdater::new(cfg.grid_spacing).step(&segment, &mut scratch);

        // A Gauss-Seidel style in-place sweep would see 3.0 at the middle
        // point instead of 6.0 on both sides.
        assert_eq!(scratch.interior(), [6.0, 0.0, 6.0]);
    }
}
