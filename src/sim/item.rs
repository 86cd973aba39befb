//! Puzzle items: lasers, surfaces, targets, exits, panels, and the player
//!
//! Every item is a box (centre position + dimensions). What differs is how
//! a beam treats it: surfaces and targets stop or redirect beams; lasers,
//! exits, panels, and the player are invisible to the tracer.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::color::{Color, blend};
use super::direction::{Direction, Rotation};
use super::geometry::{Dimensions, Extrema, collision_point, extrema};
use crate::consts::PLAYER_MAX_SPEED;
use crate::error::OperationError;

/// Explicit identity of an item inside its puzzle
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemHandle {
    Laser(String),
    /// Index into the puzzle's surface list
    Surface(usize),
    Target(String),
    Exit(String),
    /// Index into the puzzle's panel list
    Panel(usize),
    Player,
}

/// Why an item refused a rotate/move request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    NoDirection,
    NotRotatable,
    NotMovable,
}

impl Refusal {
    pub fn into_error(self, handle: ItemHandle) -> OperationError {
        match self {
            Refusal::NoDirection => OperationError::NoDirection(handle),
            Refusal::NotRotatable => OperationError::NotRotatable(handle),
            Refusal::NotMovable => OperationError::NotMovable(handle),
        }
    }
}

/// Shared positional state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Box centre
    pub position: Vec2,
    pub dimensions: Dimensions,
    pub movable: bool,
    pub rotatable: bool,
}

impl Placement {
    pub fn new(position: Vec2, dimensions: Dimensions) -> Self {
        Self {
            position,
            dimensions,
            movable: false,
            rotatable: false,
        }
    }

    pub fn movable(mut self, movable: bool) -> Self {
        self.movable = movable;
        self
    }

    pub fn rotatable(mut self, rotatable: bool) -> Self {
        self.rotatable = rotatable;
        self
    }

    /// Move to a new centre, honouring the movable flag
    pub fn move_to(&mut self, position: Vec2) -> Result<(), Refusal> {
        if !self.movable {
            return Err(Refusal::NotMovable);
        }
        self.position = position;
        Ok(())
    }

    fn check_rotatable(&self) -> Result<(), Refusal> {
        if self.rotatable {
            Ok(())
        } else {
            Err(Refusal::NotRotatable)
        }
    }
}

/// Geometry shared by all items
pub trait Body {
    fn placement(&self) -> &Placement;

    fn position(&self) -> Vec2 {
        self.placement().position
    }

    fn dimensions(&self) -> Dimensions {
        self.placement().dimensions
    }

    fn extrema(&self) -> Extrema {
        extrema(self.position(), self.dimensions())
    }

    /// Whether the tracer considers this item at all
    fn laser_interactable(&self) -> bool {
        false
    }

    /// Near-edge hit point for a beam, or None if the beam misses/ignores it
    fn collision_point(&self, origin: Vec2, approach: Direction) -> Option<Vec2> {
        if !self.laser_interactable() {
            return None;
        }
        collision_point(&self.extrema(), origin, approach)
    }
}

/// A light emitter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Laser {
    pub key: String,
    pub color: Color,
    pub direction: Direction,
    pub placement: Placement,
    /// Beam polyline from the latest solve
    #[serde(skip)]
    path: Option<Vec<Vec2>>,
}

impl Laser {
    pub fn new(
        key: impl Into<String>,
        color: Color,
        direction: Direction,
        placement: Placement,
    ) -> Self {
        Self {
            key: key.into(),
            color,
            direction,
            placement,
            path: None,
        }
    }

    /// Midpoint of the edge the beam leaves from
    pub fn emission_point(&self) -> Vec2 {
        self.extrema().edge_midpoint(self.direction)
    }

    /// Beam polyline from the latest solve
    pub fn path(&self) -> Result<&[Vec2], OperationError> {
        self.path
            .as_deref()
            .ok_or_else(|| OperationError::NotSolved(self.key.clone()))
    }

    pub(crate) fn set_path(&mut self, points: Vec<Vec2>) {
        self.path = Some(points);
    }

    pub fn rotate(&mut self, rotation: Rotation) -> Result<Direction, Refusal> {
        self.placement.check_rotatable()?;
        self.direction = self.direction.rotated(rotation);
        Ok(self.direction)
    }

    pub fn reset_striking_state(&mut self) {
        self.path = None;
    }
}

impl Body for Laser {
    fn placement(&self) -> &Placement {
        &self.placement
    }
}

/// Surface material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SurfaceKind {
    Opaque,
    Reflective,
}

/// A wall or mirror
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Surface {
    pub kind: SurfaceKind,
    pub direction: Option<Direction>,
    /// Axis a mirror bounces onto; only set for reflective surfaces
    pub reflective_direction: Option<Direction>,
    pub placement: Placement,
}

impl Surface {
    pub fn opaque(placement: Placement) -> Self {
        Self {
            kind: SurfaceKind::Opaque,
            direction: None,
            reflective_direction: None,
            placement,
        }
    }

    /// A mirror facing `direction`; it reflects onto the clockwise neighbour
    pub fn reflective(direction: Direction, placement: Placement) -> Self {
        Self {
            kind: SurfaceKind::Reflective,
            direction: Some(direction),
            reflective_direction: Some(direction.rotated(Rotation::Clockwise)),
            placement,
        }
    }

    /// Outgoing direction for a beam arriving along `approach`
    ///
    /// Only approaches orthogonal to the reflective axis bounce, and they
    /// always turn clockwise. The other two approaches are absorbed.
    pub fn reflect(&self, approach: Direction) -> Option<Direction> {
        match (self.kind, self.reflective_direction) {
            (SurfaceKind::Reflective, Some(reflective))
                if approach.axis() != reflective.axis() =>
            {
                Some(approach.rotated(Rotation::Clockwise))
            }
            _ => None,
        }
    }

    pub fn is_reflective(&self) -> bool {
        self.kind == SurfaceKind::Reflective
    }

    /// Rotates the facing and the reflective direction together
    pub fn rotate(&mut self, rotation: Rotation) -> Result<Direction, Refusal> {
        let direction = self.direction.ok_or(Refusal::NoDirection)?;
        self.placement.check_rotatable()?;
        let turned = direction.rotated(rotation);
        self.direction = Some(turned);
        self.reflective_direction = self.reflective_direction.map(|r| r.rotated(rotation));
        Ok(turned)
    }
}

impl Body for Surface {
    fn placement(&self) -> &Placement {
        &self.placement
    }

    fn laser_interactable(&self) -> bool {
        true
    }
}

/// A pressure plate lit by beams
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub key: String,
    pub direction: Option<Direction>,
    pub placement: Placement,
    /// Colors of the beams currently landing here
    pub lasers_struck: BTreeSet<Color>,
    /// Keys of the lasers currently landing here
    pub striking_lasers: BTreeSet<String>,
}

impl Target {
    pub fn new(key: impl Into<String>, placement: Placement) -> Self {
        Self {
            key: key.into(),
            direction: None,
            placement,
            lasers_struck: BTreeSet::new(),
            striking_lasers: BTreeSet::new(),
        }
    }

    pub fn is_lit(&self) -> bool {
        !self.lasers_struck.is_empty()
    }

    /// Blend of every color striking the target
    pub fn display_color(&self) -> Option<Color> {
        blend(self.lasers_struck.iter().copied())
    }

    pub(crate) fn strike(&mut self, laser_key: &str, color: Color) {
        self.lasers_struck.insert(color);
        self.striking_lasers.insert(laser_key.to_string());
    }

    /// Drop strikes from one laser (colors are recomputed from the rest)
    pub(crate) fn forget_laser(&mut self, laser_key: &str, remaining: impl Iterator<Item = Color>) {
        if self.striking_lasers.remove(laser_key) {
            self.lasers_struck = remaining.collect();
        }
    }

    pub fn rotate(&mut self, rotation: Rotation) -> Result<Direction, Refusal> {
        let direction = self.direction.ok_or(Refusal::NoDirection)?;
        self.placement.check_rotatable()?;
        let turned = direction.rotated(rotation);
        self.direction = Some(turned);
        Ok(turned)
    }

    pub fn reset_striking_state(&mut self) {
        self.lasers_struck.clear();
        self.striking_lasers.clear();
    }
}

impl Body for Target {
    fn placement(&self) -> &Placement {
        &self.placement
    }

    fn laser_interactable(&self) -> bool {
        true
    }
}

/// A colored door that opens when its color lights a target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exit {
    pub key: String,
    pub color: Color,
    pub direction: Direction,
    pub placement: Placement,
    pub is_open: bool,
}

impl Exit {
    pub fn new(
        key: impl Into<String>,
        color: Color,
        direction: Direction,
        placement: Placement,
    ) -> Self {
        Self {
            key: key.into(),
            color,
            direction,
            placement,
            is_open: false,
        }
    }

    pub fn rotate(&mut self, rotation: Rotation) -> Result<Direction, Refusal> {
        self.placement.check_rotatable()?;
        self.direction = self.direction.rotated(rotation);
        Ok(self.direction)
    }

    pub fn reset_striking_state(&mut self) {
        self.is_open = false;
    }
}

impl Body for Exit {
    fn placement(&self) -> &Placement {
        &self.placement
    }
}

/// A player-manipulable control with no beam interaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Panel {
    pub direction: Option<Direction>,
    pub placement: Placement,
}

impl Panel {
    pub fn new(placement: Placement) -> Self {
        Self {
            direction: None,
            placement,
        }
    }

    pub fn rotate(&mut self, rotation: Rotation) -> Result<Direction, Refusal> {
        let direction = self.direction.ok_or(Refusal::NoDirection)?;
        self.placement.check_rotatable()?;
        let turned = direction.rotated(rotation);
        self.direction = Some(turned);
        Ok(turned)
    }
}

impl Body for Panel {
    fn placement(&self) -> &Placement {
        &self.placement
    }
}

/// The avatar; a beam crossing its box invalidates the puzzle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub placement: Placement,
    pub velocity: Vec2,
    pub max_speed: f32,
}

impl Player {
    pub fn new(position: Vec2, dimensions: Dimensions) -> Self {
        Self {
            placement: Placement::new(position, dimensions).movable(true),
            velocity: Vec2::ZERO,
            max_speed: PLAYER_MAX_SPEED,
        }
    }

    /// Set velocity, clamped to `max_speed`
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity.clamp_length_max(self.max_speed);
    }

    /// Integrate position over `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        self.placement.position += self.velocity * dt;
    }
}

impl Body for Player {
    fn placement(&self) -> &Placement {
        &self.placement
    }
}
