use std::num::NonZeroUsize;

use crate::error::{Result, SolverErr};

const DEFAULT_MAX_ITERATIONS: NonZeroUsize = NonZeroUsize::new(25_000).unwrap();

/// Immutable launch parameters of a solve, shared by every worker.
///
/// Defaults reproduce the canonical test problem: a 12 point grid with a
/// fixed potential of 10 on the left edge and 0 on the right, no source
/// term, relaxed until the residual drops under `1e-5`.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Total interior grid points, split evenly over the group.
    pub global_size: usize,
    /// Hard cap on relaxation sweeps before the run gives up.
    pub max_iterations: NonZeroUsize,
    /// Convergence threshold compared against the global residual.
    pub residual_threshold: f64,
    /// Distance between neighboring grid points.
    pub grid_spacing: f32,
    /// Fixed potential at the left edge of the global grid.
    pub left_boundary: f32,
    /// Fixed potential at the right edge of the global grid.
    pub right_boundary: f32,
    /// Per-point source density, `global_size` entries; `None` means zero
    /// everywhere.
    pub source_term: Option<Vec<f32>>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            global_size: 12,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            residual_threshold: 1e-5,
            grid_spacing: 0.1,
            left_boundary: 10.0,
            right_boundary: 0.0,
            source_term: None,
        }
    }
}

impl SolverConfig {
    /// Checks every parameter that can be judged without knowing the group
    /// size. Divisibility is checked later, at partition time.
    pub fn validate(&self) -> Result<()> {
        if self.global_size == 0 {
            return Err(SolverErr::InvalidConfig(
                "global_size must be at least 1".into(),
            ));
        }

        if !(self.grid_spacing > 0.0) {
            return Err(SolverErr::InvalidConfig(format!(
                "grid_spacing must be positive, got {}",
                self.grid_spacing
            )));
        }

        if !(self.residual_threshold > 0.0) {
            return Err(SolverErr::InvalidConfig(format!(
                "residual_threshold must be positive, got {}",
                self.residual_threshold
            )));
        }

        if let Some(source) = &self.source_term {
            if source.len() != self.global_size {
                return Err(SolverErr::InvalidConfig(format!(
                    "source_term has {} entries for a grid of {}",
                    source.len(),
                    self.global_size
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(SolverConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_sized_grid_is_rejected() {
        let cfg = SolverConfig {
            global_size: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(SolverErr::InvalidConfig(_))));
    }

    #[test]
    fn non_positive_spacing_is_rejected() {
        for spacing in [0.0, -0.1, f32::NAN] {
            let cfg = SolverConfig {
                grid_spacing: spacing,
                ..Default::default()
            };
            assert!(cfg.validate().is_err(), "accepted spacing {spacing}");
        }
    }

    #[test]
    fn source_term_must_cover_the_grid() {
        let cfg = SolverConfig {
            source_term: Some(vec![1.0; 5]),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = SolverConfig {
            source_term: Some(vec![1.0; 12]),
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());
    }
}
