//! Beamline - a light-ray puzzle solver
//!
//! Core modules:
//! - `sim`: Deterministic solver (geometry, beam tracing, puzzle state)
//! - `level`: Item descriptors supplied by a level loader or editor
//! - `settings`: Solver tuning
//! - `error`: Construction and operation errors

pub mod error;
pub mod level;
pub mod settings;
pub mod sim;

pub use error::{ConstructionError, OperationError};
pub use level::{ItemDescriptor, ItemKind, PuzzleDescriptor};
pub use settings::SolverSettings;

/// Solver configuration constants
pub mod consts {
    /// Upper bound on reflections per beam (guards against mirror cycles)
    pub const MAX_TRACE_STEPS: usize = 64;
    /// Tolerance for axis classification and segment contact
    pub const GEOMETRY_EPSILON: f32 = 1e-3;

    /// Player defaults
    pub const PLAYER_MAX_SPEED: f32 = 240.0;
}

/// Approximate float equality within `eps`
#[inline]
pub fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}
