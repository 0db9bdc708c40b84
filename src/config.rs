use std::num::NonZeroUsize;

use serde::Deserialize;
use solver::SolverConfig;

use crate::error::RunError;

/// Launch parameters for a full run, as read from a JSON config file.
///
/// Every field has a default, so an empty object `{}` launches the
/// canonical problem: 12 grid points over 3 workers, boundaries 10 and 0,
/// up to 25000 sweeps against a `1e-5` threshold.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub workers: usize,
    pub global_size: usize,
    pub max_iterations: usize,
    pub residual_threshold: f64,
    pub grid_spacing: f32,
    pub left_boundary: f32,
    pub right_boundary: f32,
    pub source_term: Option<Vec<f32>>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: 3,
            global_size: 12,
            max_iterations: 25_000,
            residual_threshold: 1e-5,
            grid_spacing: 0.1,
            left_boundary: 10.0,
            right_boundary: 0.0,
            source_term: None,
        }
    }
}

impl RunConfig {
    /// Loads a config from a JSON file.
    ///
    /// # Errors
    /// `InvalidConfig` with a human-readable message if the file cannot be
    /// read or parsed.
    pub fn from_file(path: &str) -> Result<Self, RunError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RunError::InvalidConfig(format!("cannot read '{path}': {e}")))?;

        serde_json::from_str(&content)
            .map_err(|e| RunError::InvalidConfig(format!("invalid JSON in '{path}': {e}")))
    }

    /// The group size as a checked non-zero count.
    pub(crate) fn group_size(&self) -> Result<NonZeroUsize, RunError> {
        NonZeroUsize::new(self.workers)
            .ok_or_else(|| RunError::InvalidConfig("workers must be at least 1".into()))
    }

    /// The per-worker solver parameters carried by this launch.
    pub(crate) fn solver_config(&self) -> Result<SolverConfig, RunError> {
        let max_iterations = NonZeroUsize::new(self.max_iterations)
            .ok_or_else(|| RunError::InvalidConfig("max_iterations must be at least 1".into()))?;

        Ok(SolverConfig {
            global_size: self.global_size,
            max_iterations,
            residual_threshold: self.residual_threshold,
            grid_spacing: self.grid_spacing,
            left_boundary: self.left_boundary,
            right_boundary: self.right_boundary,
            source_term: self.source_term.clone(),
        })
    }
}
