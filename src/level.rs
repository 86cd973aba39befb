//! Item descriptors handed to the solver by a level loader or editor
//!
//! These are plain data. Turning them into live items (and rejecting
//! malformed ones) happens in [`crate::sim::Puzzle::add_item`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::{Color, Dimensions, Direction, SurfaceKind};

/// Item type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Laser,
    Surface,
    Target,
    Exit,
    Panel,
    Player,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Laser => "laser",
            ItemKind::Surface => "surface",
            ItemKind::Target => "target",
            ItemKind::Exit => "exit",
            ItemKind::Panel => "panel",
            ItemKind::Player => "player",
        }
    }
}

/// Position as persisted (`{x, y}`)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Self {
        Vec2::new(p.x, p.y)
    }
}

impl From<Vec2> for Point {
    fn from(v: Vec2) -> Self {
        Point { x: v.x, y: v.y }
    }
}

/// One item as described by level data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    pub item: ItemKind,
    #[serde(default)]
    pub key: Option<String>,
    pub position: Point,
    pub dimensions: Dimensions,
    #[serde(default)]
    pub direction: Option<Direction>,
    #[serde(default)]
    pub color: Option<Color>,
    /// OPAQUE / REFLECTIVE (surfaces only)
    #[serde(default, rename = "type")]
    pub surface_type: Option<SurfaceKind>,
    /// Overrides the mirror's default reflective direction
    #[serde(default)]
    pub reflective_direction: Option<Direction>,
    #[serde(default)]
    pub movable: bool,
    #[serde(default)]
    pub rotatable: bool,
}

impl ItemDescriptor {
    /// Bare descriptor; fill in the rest with the builder methods
    pub fn new(item: ItemKind, position: Vec2, dimensions: Dimensions) -> Self {
        Self {
            item,
            key: None,
            position: position.into(),
            dimensions,
            direction: None,
            color: None,
            surface_type: None,
            reflective_direction: None,
            movable: false,
            rotatable: false,
        }
    }

    pub fn laser(
        key: &str,
        color: Color,
        direction: Direction,
        position: Vec2,
        dimensions: Dimensions,
    ) -> Self {
        Self::new(ItemKind::Laser, position, dimensions)
            .with_key(key)
            .with_color(color)
            .with_direction(direction)
    }

    pub fn mirror(direction: Direction, position: Vec2, dimensions: Dimensions) -> Self {
        let mut desc = Self::new(ItemKind::Surface, position, dimensions).with_direction(direction);
        desc.surface_type = Some(SurfaceKind::Reflective);
        desc
    }

    pub fn wall(position: Vec2, dimensions: Dimensions) -> Self {
        let mut desc = Self::new(ItemKind::Surface, position, dimensions);
        desc.surface_type = Some(SurfaceKind::Opaque);
        desc
    }

    pub fn target(key: &str, position: Vec2, dimensions: Dimensions) -> Self {
        Self::new(ItemKind::Target, position, dimensions).with_key(key)
    }

    pub fn exit(
        key: &str,
        color: Color,
        direction: Direction,
        position: Vec2,
        dimensions: Dimensions,
    ) -> Self {
        Self::new(ItemKind::Exit, position, dimensions)
            .with_key(key)
            .with_color(color)
            .with_direction(direction)
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn movable(mut self) -> Self {
        self.movable = true;
        self
    }

    pub fn rotatable(mut self) -> Self {
        self.rotatable = true;
        self
    }
}

/// A whole puzzle as described by level data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleDescriptor {
    pub key: String,
    /// Room this puzzle belongs to
    #[serde(default)]
    pub room_key: String,
    pub dimensions: Dimensions,
    pub player: ItemDescriptor,
    #[serde(default)]
    pub items: Vec<ItemDescriptor>,
}
