//! Error types
//!
//! Structural problems with puzzle data are `ConstructionError`s and are
//! surfaced when the puzzle is built. Calls that are illegal for the current
//! item (rotating something with no facing, reading a path before a solve)
//! are `OperationError`s. An unsolved puzzle is never an error.

use thiserror::Error;

use crate::level::ItemKind;
use crate::sim::ItemHandle;

/// Errors raised while building or wiring up a puzzle
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstructionError {
    #[error("{item:?} is missing required field `{field}`")]
    MissingField { item: ItemKind, field: &'static str },

    #[error("Invalid direction ordinal: {0} (expected 0-3)")]
    InvalidDirection(u8),

    #[error("{item:?} has invalid dimensions {width}x{height}")]
    InvalidDimensions {
        item: ItemKind,
        width: f32,
        height: f32,
    },

    #[error("Expected a {expected:?} descriptor, got {found:?}")]
    WrongKind { expected: ItemKind, found: ItemKind },

    #[error("Duplicate {kind:?} key: {key}")]
    DuplicateKey { kind: ItemKind, key: String },

    #[error("Unknown laser key: {0}")]
    UnknownLaser(String),

    #[error("Unknown target key: {0}")]
    UnknownTarget(String),
}

/// Errors raised by a call that is illegal for the item it targets
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OperationError {
    #[error("Item has no direction to rotate: {0:?}")]
    NoDirection(ItemHandle),

    #[error("Item is not rotatable: {0:?}")]
    NotRotatable(ItemHandle),

    #[error("Item is not movable: {0:?}")]
    NotMovable(ItemHandle),

    #[error("Item not found: {0:?}")]
    UnknownItem(ItemHandle),

    #[error("Item cannot be removed: {0:?}")]
    NotRemovable(ItemHandle),

    #[error("Laser {0} has no path yet (solve has not run)")]
    NotSolved(String),
}

pub type ConstructionResult<T> = std::result::Result<T, ConstructionError>;
pub type OperationResult<T> = std::result::Result<T, OperationError>;
