//! Distributed relaxation of the one-dimensional Poisson equation.
//!
//! The global grid is split evenly over a line of workers. Each iteration
//! every worker sweeps the three-point stencil over its slice, the group
//! agrees on the total residual through an all-reduce, and neighbors swap
//! edge values over rendezvous links using a parity-ordered protocol that
//! cannot deadlock. When the residual drops under the threshold or the
//! iteration budget runs out, the coordinator gathers the slices back into
//! one field.

pub mod collect;
pub mod config;
pub mod context;
pub mod convergence;
pub mod error;
pub mod halo;
pub mod partition;
pub mod segment;
pub mod stencil;
pub mod worker;

pub use config::SolverConfig;
pub use context::WorkerContext;
pub use convergence::{IterationState, Termination};
pub use error::{Result, SolverErr};
pub use partition::{Partition, Position};
pub use segment::{Scratch, Segment};
pub use stencil::StencilUpdater;
pub use worker::{Worker, WorkerOutcome};
