//! Compass directions for lasers, mirrors, and exits
//!
//! Ordinals increase clockwise in screen space (+x is EAST, +y is SOUTH).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConstructionError;

/// One of the four facings an item can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    East = 0,
    South = 1,
    West = 2,
    North = 3,
}

/// Orientation of a direction or beam segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A quarter turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    /// +90 degrees
    Clockwise,
    /// -90 degrees
    CounterClockwise,
}

impl Rotation {
    #[inline]
    fn steps(self) -> u8 {
        match self {
            Rotation::Clockwise => 1,
            Rotation::CounterClockwise => 3,
        }
    }

    pub fn inverse(self) -> Self {
        match self {
            Rotation::Clockwise => Rotation::CounterClockwise,
            Rotation::CounterClockwise => Rotation::Clockwise,
        }
    }
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::North,
    ];

    /// Build from a 0-3 ordinal; anything else is a construction error
    pub fn from_ordinal(ordinal: u8) -> Result<Self, ConstructionError> {
        match ordinal {
            0 => Ok(Direction::East),
            1 => Ok(Direction::South),
            2 => Ok(Direction::West),
            3 => Ok(Direction::North),
            other => Err(ConstructionError::InvalidDirection(other)),
        }
    }

    #[inline]
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Rotate a quarter turn (ordinal shifts mod 4)
    pub fn rotated(self, rotation: Rotation) -> Self {
        Self::ALL[((self.ordinal() + rotation.steps()) % 4) as usize]
    }

    pub fn opposite(self) -> Self {
        Self::ALL[((self.ordinal() + 2) % 4) as usize]
    }

    pub fn axis(self) -> Axis {
        match self {
            Direction::East | Direction::West => Axis::Horizontal,
            Direction::South | Direction::North => Axis::Vertical,
        }
    }

    /// Unit step in screen coordinates
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::East => Vec2::X,
            Direction::South => Vec2::Y,
            Direction::West => Vec2::NEG_X,
            Direction::North => Vec2::NEG_Y,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::East => "EAST",
            Direction::South => "SOUTH",
            Direction::West => "WEST",
            Direction::North => "NORTH",
        }
    }
}
