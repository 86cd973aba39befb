//! Puzzle aggregate
//!
//! Owns every item of one puzzle. Lasers, targets, and exits are keyed by
//! string and kept in `BTreeMap`s so iteration order is stable between
//! solves; surfaces and panels are plain lists addressed by index.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::color::Color;
use super::direction::Rotation;
use super::geometry::{Dimensions, Extrema};
use super::item::{
    Body, Exit, ItemHandle, Laser, Panel, Placement, Player, Surface, SurfaceKind, Target,
};
use crate::error::{ConstructionError, ConstructionResult, OperationError, OperationResult};
use crate::level::{ItemDescriptor, ItemKind, PuzzleDescriptor};

/// A single puzzle and everything in it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Puzzle {
    pub key: String,
    pub room_key: String,
    pub dimensions: Dimensions,
    lasers: BTreeMap<String, Laser>,
    surfaces: Vec<Surface>,
    targets: BTreeMap<String, Target>,
    exits: BTreeMap<String, Exit>,
    panels: Vec<Panel>,
    player: Player,
    /// Outcome of the latest solve
    valid: bool,
}

impl Puzzle {
    /// Create an empty puzzle
    pub fn new(
        key: impl Into<String>,
        room_key: impl Into<String>,
        dimensions: Dimensions,
        player: Player,
    ) -> Self {
        Self {
            key: key.into(),
            room_key: room_key.into(),
            dimensions,
            lasers: BTreeMap::new(),
            surfaces: Vec::new(),
            targets: BTreeMap::new(),
            exits: BTreeMap::new(),
            panels: Vec::new(),
            player,
            valid: false,
        }
    }

    /// Build a puzzle from level data, failing on the first bad item
    pub fn from_descriptor(desc: &PuzzleDescriptor) -> ConstructionResult<Self> {
        if desc.player.item != ItemKind::Player {
            return Err(ConstructionError::WrongKind {
                expected: ItemKind::Player,
                found: desc.player.item,
            });
        }
        check_dimensions(ItemKind::Player, desc.player.dimensions)?;
        let player = Player::new(desc.player.position.into(), desc.player.dimensions);
        let mut puzzle = Self::new(&desc.key, &desc.room_key, desc.dimensions, player);

        for item in &desc.items {
            puzzle.add_item(item)?;
        }

        log::debug!(
            "Built puzzle {}: {} lasers, {} surfaces, {} targets, {} exits",
            puzzle.key,
            puzzle.lasers.len(),
            puzzle.surfaces.len(),
            puzzle.targets.len(),
            puzzle.exits.len()
        );
        Ok(puzzle)
    }

    /// Arena bounds (origin at the top-left corner)
    pub fn arena(&self) -> Extrema {
        Extrema {
            x_min: 0.0,
            x_max: self.dimensions.width,
            y_min: 0.0,
            y_max: self.dimensions.height,
        }
    }

    // === Construction ===

    /// Construct and insert one item from its descriptor
    pub fn add_item(&mut self, desc: &ItemDescriptor) -> ConstructionResult<ItemHandle> {
        check_dimensions(desc.item, desc.dimensions)?;
        let placement = Placement::new(desc.position.into(), desc.dimensions)
            .movable(desc.movable)
            .rotatable(desc.rotatable);
        let missing = |field| ConstructionError::MissingField {
            item: desc.item,
            field,
        };

        match desc.item {
            ItemKind::Laser => {
                let key = desc.key.as_deref().ok_or_else(|| missing("key"))?;
                let color = desc.color.ok_or_else(|| missing("color"))?;
                let direction = desc.direction.ok_or_else(|| missing("direction"))?;
                self.add_laser(Laser::new(key, color, direction, placement))
            }
            ItemKind::Surface => {
                let kind = desc.surface_type.ok_or_else(|| missing("type"))?;
                let surface = match kind {
                    SurfaceKind::Opaque => {
                        let mut surface = Surface::opaque(placement);
                        surface.direction = desc.direction;
                        surface
                    }
                    SurfaceKind::Reflective => {
                        let direction = desc.direction.ok_or_else(|| missing("direction"))?;
                        let mut surface = Surface::reflective(direction, placement);
                        if let Some(reflective) = desc.reflective_direction {
                            surface.reflective_direction = Some(reflective);
                        }
                        surface
                    }
                };
                Ok(self.add_surface(surface))
            }
            ItemKind::Target => {
                let key = desc.key.as_deref().ok_or_else(|| missing("key"))?;
                let mut target = Target::new(key, placement);
                target.direction = desc.direction;
                self.add_target(target)
            }
            ItemKind::Exit => {
                let key = desc.key.as_deref().ok_or_else(|| missing("key"))?;
                let color = desc.color.ok_or_else(|| missing("color"))?;
                let direction = desc.direction.ok_or_else(|| missing("direction"))?;
                self.add_exit(Exit::new(key, color, direction, placement))
            }
            ItemKind::Panel => {
                let mut panel = Panel::new(placement);
                panel.direction = desc.direction;
                Ok(self.add_panel(panel))
            }
            ItemKind::Player => {
                self.player.placement.position = desc.position.into();
                self.player.placement.dimensions = desc.dimensions;
                Ok(ItemHandle::Player)
            }
        }
    }

    pub fn add_laser(&mut self, laser: Laser) -> ConstructionResult<ItemHandle> {
        if self.lasers.contains_key(&laser.key) {
            return Err(ConstructionError::DuplicateKey {
                kind: ItemKind::Laser,
                key: laser.key,
            });
        }
        let handle = ItemHandle::Laser(laser.key.clone());
        self.lasers.insert(laser.key.clone(), laser);
        Ok(handle)
    }

    pub fn add_surface(&mut self, surface: Surface) -> ItemHandle {
        self.surfaces.push(surface);
        ItemHandle::Surface(self.surfaces.len() - 1)
    }

    pub fn add_target(&mut self, target: Target) -> ConstructionResult<ItemHandle> {
        if self.targets.contains_key(&target.key) {
            return Err(ConstructionError::DuplicateKey {
                kind: ItemKind::Target,
                key: target.key,
            });
        }
        let handle = ItemHandle::Target(target.key.clone());
        self.targets.insert(target.key.clone(), target);
        Ok(handle)
    }

    pub fn add_exit(&mut self, exit: Exit) -> ConstructionResult<ItemHandle> {
        if self.exits.contains_key(&exit.key) {
            return Err(ConstructionError::DuplicateKey {
                kind: ItemKind::Exit,
                key: exit.key,
            });
        }
        let handle = ItemHandle::Exit(exit.key.clone());
        self.exits.insert(exit.key.clone(), exit);
        Ok(handle)
    }

    pub fn add_panel(&mut self, panel: Panel) -> ItemHandle {
        self.panels.push(panel);
        ItemHandle::Panel(self.panels.len() - 1)
    }

    // === Mutation ===

    /// Remove an item; later surface/panel indices shift down by one
    pub fn remove_item(&mut self, handle: &ItemHandle) -> OperationResult<()> {
        let unknown = || OperationError::UnknownItem(handle.clone());
        match handle {
            ItemHandle::Laser(key) => {
                self.lasers.remove(key).ok_or_else(unknown)?;
                for target in self.targets.values_mut() {
                    let remaining: Vec<_> = target
                        .striking_lasers
                        .iter()
                        .filter(|k| *k != key)
                        .filter_map(|k| self.lasers.get(k).map(|l| l.color))
                        .collect();
                    target.forget_laser(key, remaining.into_iter());
                }
            }
            ItemHandle::Surface(index) => {
                if *index >= self.surfaces.len() {
                    return Err(unknown());
                }
                self.surfaces.remove(*index);
            }
            ItemHandle::Target(key) => {
                self.targets.remove(key).ok_or_else(unknown)?;
            }
            ItemHandle::Exit(key) => {
                self.exits.remove(key).ok_or_else(unknown)?;
            }
            ItemHandle::Panel(index) => {
                if *index >= self.panels.len() {
                    return Err(unknown());
                }
                self.panels.remove(*index);
            }
            ItemHandle::Player => return Err(OperationError::NotRemovable(ItemHandle::Player)),
        }
        Ok(())
    }

    /// Move an item's centre to `position`
    pub fn move_item(&mut self, handle: &ItemHandle, position: Vec2) -> OperationResult<()> {
        let placement = self
            .placement_mut(handle)
            .ok_or_else(|| OperationError::UnknownItem(handle.clone()))?;
        placement
            .move_to(position)
            .map_err(|refusal| refusal.into_error(handle.clone()))
    }

    /// Turn an item a quarter turn
    pub fn rotate_item(&mut self, handle: &ItemHandle, rotation: Rotation) -> OperationResult<()> {
        let unknown = || OperationError::UnknownItem(handle.clone());
        let turned = match handle {
            ItemHandle::Laser(key) => {
                self.lasers.get_mut(key).ok_or_else(unknown)?.rotate(rotation)
            }
            ItemHandle::Surface(i) => {
                self.surfaces.get_mut(*i).ok_or_else(unknown)?.rotate(rotation)
            }
            ItemHandle::Target(key) => {
                self.targets.get_mut(key).ok_or_else(unknown)?.rotate(rotation)
            }
            ItemHandle::Exit(key) => self.exits.get_mut(key).ok_or_else(unknown)?.rotate(rotation),
            ItemHandle::Panel(i) => self.panels.get_mut(*i).ok_or_else(unknown)?.rotate(rotation),
            ItemHandle::Player => return Err(OperationError::NoDirection(ItemHandle::Player)),
        };
        let direction = turned.map_err(|refusal| refusal.into_error(handle.clone()))?;
        log::debug!("Rotated {:?} to {}", handle, direction.as_str());
        Ok(())
    }

    /// Swap a laser's beam color
    pub fn recolor_laser(&mut self, key: &str, color: Color) -> OperationResult<()> {
        let laser = self
            .lasers
            .get_mut(key)
            .ok_or_else(|| OperationError::UnknownItem(ItemHandle::Laser(key.to_string())))?;
        laser.color = color;
        Ok(())
    }

    /// Record that `laser_key`'s beam lands on `target_key`
    pub fn strike_target(&mut self, target_key: &str, laser_key: &str) -> ConstructionResult<()> {
        let color = self
            .lasers
            .get(laser_key)
            .map(|l| l.color)
            .ok_or_else(|| ConstructionError::UnknownLaser(laser_key.to_string()))?;
        let target = self
            .targets
            .get_mut(target_key)
            .ok_or_else(|| ConstructionError::UnknownTarget(target_key.to_string()))?;
        target.strike(laser_key, color);
        Ok(())
    }

    /// Clear every derived value (paths, strikes, open flags, validity)
    pub fn reset(&mut self) {
        for laser in self.lasers.values_mut() {
            laser.reset_striking_state();
        }
        for target in self.targets.values_mut() {
            target.reset_striking_state();
        }
        for exit in self.exits.values_mut() {
            exit.reset_striking_state();
        }
        self.valid = false;
    }

    /// Integrate the player's velocity, keeping its box inside the arena
    pub fn advance_player(&mut self, dt: f32) {
        self.player.advance(dt);
        let half = self.player.dimensions().half();
        let max = Vec2::new(self.dimensions.width, self.dimensions.height) - half;
        let clamped = self.player.position().clamp(half, max.max(half));
        self.player.placement.position = clamped;
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub(crate) fn set_laser_path(&mut self, key: &str, points: Vec<Vec2>) {
        if let Some(laser) = self.lasers.get_mut(key) {
            laser.set_path(points);
        }
    }

    pub(crate) fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    pub(crate) fn exits_mut(&mut self) -> impl Iterator<Item = &mut Exit> {
        self.exits.values_mut()
    }

    fn placement_mut(&mut self, handle: &ItemHandle) -> Option<&mut Placement> {
        match handle {
            ItemHandle::Laser(key) => self.lasers.get_mut(key).map(|i| &mut i.placement),
            ItemHandle::Surface(i) => self.surfaces.get_mut(*i).map(|i| &mut i.placement),
            ItemHandle::Target(key) => self.targets.get_mut(key).map(|i| &mut i.placement),
            ItemHandle::Exit(key) => self.exits.get_mut(key).map(|i| &mut i.placement),
            ItemHandle::Panel(i) => self.panels.get_mut(*i).map(|i| &mut i.placement),
            ItemHandle::Player => Some(&mut self.player.placement),
        }
    }

    // === Queries ===

    pub fn laser(&self, key: &str) -> Option<&Laser> {
        self.lasers.get(key)
    }

    pub fn target(&self, key: &str) -> Option<&Target> {
        self.targets.get(key)
    }

    pub fn exit(&self, key: &str) -> Option<&Exit> {
        self.exits.get(key)
    }

    pub fn surface(&self, index: usize) -> Option<&Surface> {
        self.surfaces.get(index)
    }

    pub fn lasers(&self) -> impl Iterator<Item = &Laser> {
        self.lasers.values()
    }

    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.values()
    }

    pub fn exits(&self) -> impl Iterator<Item = &Exit> {
        self.exits.values()
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn lit_targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.values().filter(|t| t.is_lit())
    }

    pub fn open_exits(&self) -> impl Iterator<Item = &Exit> {
        self.exits.values().filter(|e| e.is_open)
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Valid, and every exit is open
    pub fn is_solved(&self) -> bool {
        self.valid && !self.exits.is_empty() && self.exits.values().all(|e| e.is_open)
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        self.arena().contains(point)
    }

    /// First item whose box contains `point` (lasers, surfaces, targets,
    /// exits, panels, then the player)
    pub fn item_at(&self, point: Vec2) -> Option<ItemHandle> {
        let hit = |body: &dyn Body| body.extrema().contains(point);

        self.lasers
            .values()
            .find(|l| hit(*l))
            .map(|l| ItemHandle::Laser(l.key.clone()))
            .or_else(|| {
                self.surfaces
                    .iter()
                    .position(|s| hit(s))
                    .map(ItemHandle::Surface)
            })
            .or_else(|| {
                self.targets
                    .values()
                    .find(|t| hit(*t))
                    .map(|t| ItemHandle::Target(t.key.clone()))
            })
            .or_else(|| {
                self.exits
                    .values()
                    .find(|e| hit(*e))
                    .map(|e| ItemHandle::Exit(e.key.clone()))
            })
            .or_else(|| self.panels.iter().position(|p| hit(p)).map(ItemHandle::Panel))
            .or_else(|| hit(&self.player).then_some(ItemHandle::Player))
    }

    /// Bounding box of any item
    pub fn extrema_of(&self, handle: &ItemHandle) -> Option<Extrema> {
        let body: &dyn Body = match handle {
            ItemHandle::Laser(key) => self.lasers.get(key)?,
            ItemHandle::Surface(i) => self.surfaces.get(*i)?,
            ItemHandle::Target(key) => self.targets.get(key)?,
            ItemHandle::Exit(key) => self.exits.get(key)?,
            ItemHandle::Panel(i) => self.panels.get(*i)?,
            ItemHandle::Player => &self.player,
        };
        Some(body.extrema())
    }
}

fn check_dimensions(item: ItemKind, dimensions: Dimensions) -> ConstructionResult<()> {
    if dimensions.is_valid() {
        Ok(())
    } else {
        Err(ConstructionError::InvalidDimensions {
            item,
            width: dimensions.width,
            height: dimensions.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Direction;

    fn size(w: f32) -> Dimensions {
        Dimensions::new(w, w)
    }

    fn laser_at(key: &str, color: Color, x: f32, y: f32) -> ItemDescriptor {
        ItemDescriptor::laser(key, color, Direction::East, Vec2::new(x, y), size(10.0))
    }

    fn exit_at(key: &str, x: f32, y: f32) -> ItemDescriptor {
        ItemDescriptor::exit(key, Color::Red, Direction::East, Vec2::new(x, y), size(10.0))
    }

    fn empty() -> Puzzle {
        Puzzle::new(
            "p1",
            "room",
            Dimensions::new(200.0, 200.0),
            Player::new(Vec2::new(180.0, 180.0), size(10.0)),
        )
    }

    #[test]
    fn test_add_item_builds_each_kind() {
        let mut p = empty();
        let laser = laser_at("l1", Color::Red, 10.0, 10.0);
        assert_eq!(p.add_item(&laser), Ok(ItemHandle::Laser("l1".into())));
        let mirror = ItemDescriptor::mirror(Direction::West, Vec2::new(100.0, 10.0), size(20.0));
        assert_eq!(p.add_item(&mirror), Ok(ItemHandle::Surface(0)));
        let target = ItemDescriptor::target("t1", Vec2::new(90.0, 100.0), size(20.0));
        assert_eq!(p.add_item(&target), Ok(ItemHandle::Target("t1".into())));
        let exit = exit_at("e1", 190.0, 50.0);
        assert_eq!(p.add_item(&exit), Ok(ItemHandle::Exit("e1".into())));
        assert_eq!(
            p.surface(0).and_then(|s| s.reflective_direction),
            Some(Direction::North)
        );
    }

    #[test]
    fn test_missing_fields_are_construction_errors() {
        let mut p = empty();
        let mut laser = laser_at("l1", Color::Red, 0.0, 0.0);
        laser.color = None;
        assert_eq!(
            p.add_item(&laser),
            Err(ConstructionError::MissingField {
                item: ItemKind::Laser,
                field: "color"
            })
        );

        let mut exit = exit_at("e1", 0.0, 0.0);
        exit.direction = None;
        assert!(matches!(
            p.add_item(&exit),
            Err(ConstructionError::MissingField { field: "direction", .. })
        ));

        let keyless = ItemDescriptor::new(ItemKind::Target, Vec2::ZERO, size(10.0));
        assert!(matches!(
            p.add_item(&keyless),
            Err(ConstructionError::MissingField { field: "key", .. })
        ));
    }

    #[test]
    fn test_duplicate_and_bad_dimensions() {
        let mut p = empty();
        let target = ItemDescriptor::target("t1", Vec2::ZERO, size(10.0));
        p.add_item(&target).unwrap();
        assert!(matches!(
            p.add_item(&target),
            Err(ConstructionError::DuplicateKey { kind: ItemKind::Target, .. })
        ));

        let bad = ItemDescriptor::target("t2", Vec2::ZERO, Dimensions::new(-1.0, 5.0));
        assert!(matches!(
            p.add_item(&bad),
            Err(ConstructionError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_strike_target_checks_keys() {
        let mut p = empty();
        p.add_item(&laser_at("l1", Color::Green, 0.0, 0.0)).unwrap();
        p.add_item(&ItemDescriptor::target("t1", Vec2::new(50.0, 0.0), size(10.0)))
            .unwrap();

        assert_eq!(
            p.strike_target("t1", "ghost"),
            Err(ConstructionError::UnknownLaser("ghost".into()))
        );
        assert_eq!(
            p.strike_target("nope", "l1"),
            Err(ConstructionError::UnknownTarget("nope".into()))
        );
        p.strike_target("t1", "l1").unwrap();
        assert_eq!(p.target("t1").and_then(|t| t.display_color()), Some(Color::Green));

        p.reset();
        assert!(!p.target("t1").unwrap().is_lit());
    }

    #[test]
    fn test_removing_laser_drops_its_strikes() {
        let mut p = empty();
        p.add_item(&laser_at("r", Color::Red, 0.0, 0.0)).unwrap();
        p.add_item(&laser_at("b", Color::Blue, 0.0, 50.0)).unwrap();
        p.add_item(&ItemDescriptor::target("t1", Vec2::new(50.0, 0.0), size(10.0)))
            .unwrap();
        p.strike_target("t1", "r").unwrap();
        p.strike_target("t1", "b").unwrap();
        assert_eq!(p.target("t1").and_then(|t| t.display_color()), Some(Color::Purple));

        p.remove_item(&ItemHandle::Laser("b".into())).unwrap();
        assert_eq!(p.target("t1").and_then(|t| t.display_color()), Some(Color::Red));
        assert_eq!(
            p.remove_item(&ItemHandle::Laser("b".into())),
            Err(OperationError::UnknownItem(ItemHandle::Laser("b".into())))
        );
        assert_eq!(
            p.remove_item(&ItemHandle::Player),
            Err(OperationError::NotRemovable(ItemHandle::Player))
        );
    }

    #[test]
    fn test_move_and_rotate_errors() {
        let mut p = empty();
        let fixed = p
            .add_item(&ItemDescriptor::wall(Vec2::new(50.0, 50.0), size(10.0)))
            .unwrap();
        assert_eq!(
            p.move_item(&fixed, Vec2::ONE),
            Err(OperationError::NotMovable(fixed.clone()))
        );
        assert_eq!(
            p.rotate_item(&fixed, Rotation::Clockwise),
            Err(OperationError::NoDirection(fixed.clone()))
        );

        let mirror = ItemDescriptor::mirror(Direction::West, Vec2::new(80.0, 80.0), size(10.0))
            .movable()
            .rotatable();
        let mirror = p.add_item(&mirror).unwrap();
        p.move_item(&mirror, Vec2::new(20.0, 30.0)).unwrap();
        p.rotate_item(&mirror, Rotation::CounterClockwise).unwrap();
        let surface = p.surface(1).unwrap();
        assert_eq!(surface.position(), Vec2::new(20.0, 30.0));
        assert_eq!(surface.direction, Some(Direction::South));
        assert_eq!(surface.reflective_direction, Some(Direction::West));
    }

    #[test]
    fn test_item_at_and_player_clamp() {
        let mut p = empty();
        p.add_item(&ItemDescriptor::target("t1", Vec2::new(50.0, 50.0), size(20.0)))
            .unwrap();
        let hit = p.item_at(Vec2::new(55.0, 45.0));
        assert_eq!(hit, Some(ItemHandle::Target("t1".into())));
        assert_eq!(p.item_at(Vec2::new(180.0, 180.0)), Some(ItemHandle::Player));
        assert_eq!(p.item_at(Vec2::new(120.0, 20.0)), None);

        p.player_mut().set_velocity(Vec2::new(100.0, 100.0));
        p.advance_player(10.0);
        assert_eq!(p.player().position(), Vec2::new(195.0, 195.0));
    }

    #[test]
    fn test_from_descriptor() {
        let desc = PuzzleDescriptor {
            key: "level-1".into(),
            room_key: "atrium".into(),
            dimensions: Dimensions::new(300.0, 200.0),
            player: ItemDescriptor::new(ItemKind::Player, Vec2::new(280.0, 180.0), size(10.0)),
            items: vec![
                laser_at("l1", Color::Red, 10.0, 10.0),
                ItemDescriptor::target("t1", Vec2::new(90.0, 100.0), size(20.0)),
            ],
        };
        let p = Puzzle::from_descriptor(&desc).unwrap();
        assert_eq!(p.room_key, "atrium");
        assert_eq!(p.lasers().count(), 1);
        assert!(!p.is_valid());
        assert!(!p.is_solved());
    }

    #[test]
    fn test_from_descriptor_rejects_mistagged_player() {
        let desc = PuzzleDescriptor {
            key: "level-2".into(),
            room_key: "atrium".into(),
            dimensions: Dimensions::new(300.0, 200.0),
            player: ItemDescriptor::target("t1", Vec2::new(280.0, 180.0), size(10.0)),
            items: Vec::new(),
        };
        assert_eq!(
            Puzzle::from_descriptor(&desc).err(),
            Some(ConstructionError::WrongKind {
                expected: ItemKind::Player,
                found: ItemKind::Target,
            })
        );
    }
}
