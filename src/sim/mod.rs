//! Deterministic puzzle solver
//!
//! All beam logic lives here. This module must be pure and deterministic:
//! - No rendering, input, or platform dependencies
//! - Stable iteration order (lasers/targets/exits by key, surfaces by index)
//! - One solve pass per call, nothing carried over except the last snapshot

pub mod color;
pub mod direction;
pub mod geometry;
pub mod item;
pub mod puzzle;
pub mod solver;
pub mod trace;
pub mod trim;

pub use color::{Color, blend};
pub use direction::{Axis, Direction, Rotation};
pub use geometry::{
    Dimensions, Extrema, Segment, collision_point, extrema, path_segments, segment_intersects_box,
    segments_overlap,
};
pub use item::{
    Body, Exit, ItemHandle, Laser, Panel, Placement, Player, Surface, SurfaceKind, Target,
};
pub use puzzle::Puzzle;
pub use solver::{PuzzleState, Solver, StateDiff, TargetDiff, ValidDiff, solve_pass};
pub use trace::{Trace, TraceOutcome, trace_all, trace_laser};
pub use trim::{paths_cross, trim_crossings};
