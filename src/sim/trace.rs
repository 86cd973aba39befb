//! Laser path tracing
//!
//! A beam marches from its emitter along one axis, stopping at the nearest
//! surface or target in its way. Mirrors turn it and the march continues;
//! anything else ends it. With nothing in the way it runs into the arena
//! wall.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::color::Color;
use super::direction::Direction;
use super::geometry::Extrema;
use super::item::{Body, ItemHandle, Laser};
use super::puzzle::Puzzle;
use crate::settings::SolverSettings;

/// How a trace ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceOutcome {
    /// Landed on a target
    HitTarget(String),
    /// Stopped by an opaque surface or a mirror at the wrong angle
    Absorbed(usize),
    /// Ran into the arena boundary
    Wall,
    /// Gave up after too many reflections
    StepLimit,
}

/// Result of tracing one laser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub laser_key: String,
    pub color: Color,
    /// Beam polyline, always at least two points
    pub points: Vec<Vec2>,
    pub outcome: TraceOutcome,
}

impl Trace {
    /// Target this beam landed on, if any
    pub fn struck_target(&self) -> Option<&str> {
        match &self.outcome {
            TraceOutcome::HitTarget(key) => Some(key),
            _ => None,
        }
    }
}

/// Closest thing a beam runs into
enum Hit<'a> {
    Surface(usize),
    Target(&'a str),
}

impl Hit<'_> {
    fn handle(&self) -> ItemHandle {
        match self {
            Hit::Surface(index) => ItemHandle::Surface(*index),
            Hit::Target(key) => ItemHandle::Target(key.to_string()),
        }
    }
}

/// Trace one laser through the puzzle's current geometry
///
/// The beam may bounce off up to `settings.max_trace_steps` mirrors. After
/// the last allowed bounce it still travels one more leg; if that leg ends
/// on yet another mirror the trace stops there with `StepLimit`.
pub fn trace_laser(puzzle: &Puzzle, laser: &Laser, settings: &SolverSettings) -> Trace {
    let mut origin = laser.emission_point();
    let mut direction = laser.direction;
    let mut points = vec![origin];
    let mut last_hit: Option<ItemHandle> = None;
    let mut reflections = 0;

    let finish = |points: Vec<Vec2>, outcome: TraceOutcome| Trace {
        laser_key: laser.key.clone(),
        color: laser.color,
        points,
        outcome,
    };

    loop {
        let nearest = nearest_hit(puzzle, origin, direction, last_hit.as_ref(), settings.epsilon);
        let Some((hit, point)) = nearest else {
            points.push(wall_point(&puzzle.arena(), origin, direction));
            log::debug!("Laser {} ran into the wall after {} points", laser.key, points.len());
            return finish(points, TraceOutcome::Wall);
        };
        points.push(point);

        let index = match hit {
            Hit::Target(key) => {
                log::debug!("Laser {} struck target {}", laser.key, key);
                return finish(points, TraceOutcome::HitTarget(key.to_string()));
            }
            Hit::Surface(index) => index,
        };

        let reflected = puzzle.surface(index).and_then(|s| s.reflect(direction));
        let Some(next) = reflected else {
            log::debug!("Laser {} absorbed by surface {}", laser.key, index);
            return finish(points, TraceOutcome::Absorbed(index));
        };

        if reflections == settings.max_trace_steps {
            log::warn!(
                "Laser {} exceeded {} reflections; cutting the beam short",
                laser.key,
                settings.max_trace_steps
            );
            return finish(points, TraceOutcome::StepLimit);
        }
        reflections += 1;

        origin = point;
        direction = next;
        last_hit = Some(hit.handle());
    }
}

/// Trace every laser, in key order
pub fn trace_all(puzzle: &Puzzle, settings: &SolverSettings) -> Vec<Trace> {
    puzzle
        .lasers()
        .map(|laser| trace_laser(puzzle, laser, settings))
        .collect()
}

/// Nearest interactable item along the beam, skipping `exclude`
///
/// Ties (within `eps`) go to the first candidate: surfaces in list order,
/// then targets in key order.
fn nearest_hit<'a>(
    puzzle: &'a Puzzle,
    origin: Vec2,
    direction: Direction,
    exclude: Option<&ItemHandle>,
    eps: f32,
) -> Option<(Hit<'a>, Vec2)> {
    let surfaces = puzzle
        .surfaces()
        .iter()
        .enumerate()
        .map(|(i, s)| (Hit::Surface(i), s as &dyn Body));
    let targets = puzzle
        .targets()
        .map(|t| (Hit::Target(t.key.as_str()), t as &dyn Body));

    let mut best: Option<(Hit<'a>, Vec2, f32)> = None;
    for (hit, body) in surfaces.chain(targets) {
        if exclude.is_some_and(|ex| *ex == hit.handle()) {
            continue;
        }
        let Some(point) = body.collision_point(origin, direction) else {
            continue;
        };
        let dist = origin.distance(point);
        let closer = best.as_ref().is_none_or(|(_, _, d)| dist < *d - eps);
        if closer {
            best = Some((hit, point, dist));
        }
    }
    best.map(|(hit, point, _)| (hit, point))
}

/// Where a beam meets the arena boundary
fn wall_point(arena: &Extrema, origin: Vec2, direction: Direction) -> Vec2 {
    match direction {
        Direction::East => Vec2::new(arena.x_max, origin.y),
        Direction::West => Vec2::new(arena.x_min, origin.y),
        Direction::South => Vec2::new(origin.x, arena.y_max),
        Direction::North => Vec2::new(origin.x, arena.y_min),
    }
}
