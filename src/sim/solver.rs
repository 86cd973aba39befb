//! Solve pass and state tracking
//!
//! One call to [`Solver::solve`] traces every beam, trims conflicting
//! crossings, lights targets, opens exits, and checks the player. The
//! previous pass is kept so callers can react to what changed.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::color::Color;
use super::geometry::{path_segments, segment_intersects_box};
use super::item::Body;
use super::puzzle::Puzzle;
use super::trace::{Trace, trace_all};
use super::trim::trim_crossings;
use crate::settings::SolverSettings;

/// Snapshot of everything a solve pass derived
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PuzzleState {
    pub laser_paths: BTreeMap<String, Vec<Vec2>>,
    /// Target key -> keys of lasers landing on it
    pub striking_lasers: BTreeMap<String, BTreeSet<String>>,
    /// Target key -> colors landing on it
    pub struck_colors: BTreeMap<String, BTreeSet<Color>>,
    pub valid: bool,
}

impl PuzzleState {
    fn capture(puzzle: &Puzzle, traces: &[Trace]) -> Self {
        Self {
            laser_paths: traces
                .iter()
                .map(|t| (t.laser_key.clone(), t.points.clone()))
                .collect(),
            striking_lasers: puzzle
                .targets()
                .map(|t| (t.key.clone(), t.striking_lasers.clone()))
                .collect(),
            struck_colors: puzzle
                .targets()
                .map(|t| (t.key.clone(), t.lasers_struck.clone()))
                .collect(),
            valid: puzzle.is_valid(),
        }
    }

    fn colors_of(&self, target: &str) -> BTreeSet<Color> {
        self.struck_colors.get(target).cloned().unwrap_or_default()
    }
}

/// Struck-color sets for targets that changed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetDiff {
    pub previous: BTreeMap<String, Vec<Color>>,
    pub current: BTreeMap<String, Vec<Color>>,
}

/// Validity before and after (None before the first solve)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidDiff {
    pub previous: Option<bool>,
    pub current: bool,
}

/// What changed between two solve passes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateDiff {
    pub targets: TargetDiff,
    pub valid: ValidDiff,
}

impl StateDiff {
    /// Diff two snapshots; a missing `previous` counts as all targets dark
    pub fn between(previous: Option<&PuzzleState>, current: &PuzzleState) -> Self {
        let empty = PuzzleState::default();
        let before = previous.unwrap_or(&empty);

        let keys: BTreeSet<&String> = before
            .struck_colors
            .keys()
            .chain(current.struck_colors.keys())
            .collect();

        let mut targets = TargetDiff::default();
        for key in keys {
            let old = before.colors_of(key);
            let new = current.colors_of(key);
            if old != new {
                targets.previous.insert(key.clone(), old.into_iter().collect());
                targets.current.insert(key.clone(), new.into_iter().collect());
            }
        }

        Self {
            targets,
            valid: ValidDiff {
                previous: previous.map(|p| p.valid),
                current: current.valid,
            },
        }
    }

    pub fn validity_changed(&self) -> bool {
        self.valid.previous != Some(self.valid.current)
    }

    /// No target changed and validity held
    pub fn is_empty(&self) -> bool {
        self.targets.current.is_empty() && !self.validity_changed()
    }
}

/// Run one full solve pass over the puzzle
///
/// Mutates the puzzle in place (paths, strikes, exits, validity) and
/// returns a snapshot of the result. Never fails: an unsolved puzzle is
/// just an outcome.
pub fn solve_pass(puzzle: &mut Puzzle, settings: &SolverSettings) -> PuzzleState {
    puzzle.reset();

    let traces = trace_all(puzzle, settings);
    let voided = trim_crossings(&traces);

    for trace in &traces {
        puzzle.set_laser_path(&trace.laser_key, trace.points.clone());

        let Some(target) = trace.struck_target() else {
            continue;
        };
        if voided.contains(&trace.laser_key) {
            log::debug!("Strike on {} by {} voided by a crossing", target, trace.laser_key);
            continue;
        }
        if let Err(e) = puzzle.strike_target(target, &trace.laser_key) {
            log::error!("Dropping strike from {}: {}", trace.laser_key, e);
        }
    }

    let player_box = puzzle.player().extrema();
    let blocked = traces.iter().find(|t| {
        path_segments(&t.points)
            .iter()
            .any(|s| segment_intersects_box(s, &player_box))
    });
    if let Some(trace) = blocked {
        log::debug!("Laser {} passes through the player", trace.laser_key);
    }
    let valid = blocked.is_none();
    puzzle.set_valid(valid);

    update_exits(puzzle, valid || !settings.require_valid_for_exits);

    PuzzleState::capture(puzzle, &traces)
}

/// Open exits whose color reached a target (only when `allowed`)
fn update_exits(puzzle: &mut Puzzle, allowed: bool) {
    let lit: Vec<(BTreeSet<Color>, Option<Color>)> = puzzle
        .lit_targets()
        .map(|t| (t.lasers_struck.clone(), t.display_color()))
        .collect();

    for exit in puzzle.exits_mut() {
        exit.is_open = allowed
            && lit
                .iter()
                .any(|(struck, blended)| {
                    struck.contains(&exit.color) || *blended == Some(exit.color)
                });
    }
}

/// Owns a puzzle and the last two solve snapshots
#[derive(Debug, Clone)]
pub struct Solver {
    puzzle: Puzzle,
    settings: SolverSettings,
    previous: Option<PuzzleState>,
    current: Option<PuzzleState>,
}

impl Solver {
    pub fn new(puzzle: Puzzle, settings: SolverSettings) -> Self {
        Self {
            puzzle,
            settings,
            previous: None,
            current: None,
        }
    }

    /// Solve the puzzle as it stands and report what changed
    pub fn solve(&mut self) -> StateDiff {
        self.previous = self.current.take();
        let current = solve_pass(&mut self.puzzle, &self.settings);
        let diff = StateDiff::between(self.previous.as_ref(), &current);

        if diff.validity_changed() {
            log::info!(
                "Puzzle {} is now {}",
                self.puzzle.key,
                if current.valid { "valid" } else { "invalid" }
            );
        }
        log::info!(
            "Solved {}: {} lit targets, {} open exits, {} changed",
            self.puzzle.key,
            self.puzzle.lit_targets().count(),
            self.puzzle.open_exits().count(),
            diff.targets.current.len()
        );

        self.current = Some(current);
        diff
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    /// Mutable access for moves/rotations between solves
    pub fn puzzle_mut(&mut self) -> &mut Puzzle {
        &mut self.puzzle
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    pub fn previous(&self) -> Option<&PuzzleState> {
        self.previous.as_ref()
    }

    pub fn current(&self) -> Option<&PuzzleState> {
        self.current.as_ref()
    }

    pub fn into_puzzle(self) -> Puzzle {
        self.puzzle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OperationError;
    use crate::level::ItemDescriptor;
    use crate::sim::{Dimensions, Direction, ItemHandle, Player};

    fn size(w: f32) -> Dimensions {
        Dimensions::new(w, w)
    }

    fn laser_at(key: &str, color: Color, direction: Direction, x: f32, y: f32) -> ItemDescriptor {
        ItemDescriptor::laser(key, color, direction, Vec2::new(x, y), size(10.0))
    }

    fn exit_at(key: &str, color: Color, direction: Direction, x: f32, y: f32) -> ItemDescriptor {
        ItemDescriptor::exit(key, color, direction, Vec2::new(x, y), size(10.0))
    }

    fn arena() -> Puzzle {
        Puzzle::new(
            "test",
            "room",
            Dimensions::new(200.0, 200.0),
            Player::new(Vec2::new(190.0, 190.0), size(10.0)),
        )
    }

    /// Laser east into a west-facing mirror that drops the beam onto a target
    fn scenario_a(mirror_at: Vec2) -> Solver {
        let mut p = arena();
        p.add_item(&laser_at("red", Color::Red, Direction::East, 10.0, 10.0)).unwrap();
        p.add_item(&ItemDescriptor::mirror(Direction::West, mirror_at, size(20.0)).movable())
            .unwrap();
        p.add_item(&ItemDescriptor::target("t", Vec2::new(90.0, 100.0), size(20.0)))
            .unwrap();
        p.add_item(&exit_at("door", Color::Red, Direction::East, 195.0, 100.0)).unwrap();
        Solver::new(p, SolverSettings::default())
    }

    #[test]
    fn test_scenario_a_mirror_lights_target() {
        let mut solver = scenario_a(Vec2::new(100.0, 15.0));
        solver.solve();
        let p = solver.puzzle();

        let path = p.laser("red").unwrap().path().unwrap();
        assert!(path.len() > 2);
        let target = p.target("t").unwrap();
        assert!(target.is_lit());
        assert!(target.lasers_struck.contains(&Color::Red));
        assert!(p.exit("door").unwrap().is_open);
        assert!(p.is_valid());
        assert!(p.is_solved());
    }

    #[test]
    fn test_scenario_b_moving_mirror_in_and_out() {
        let mut solver = scenario_a(Vec2::new(10.0, 60.0));
        solver.solve();
        assert!(!solver.puzzle().target("t").unwrap().is_lit());
        assert!(!solver.puzzle().exit("door").unwrap().is_open);

        solver
            .puzzle_mut()
            .move_item(&ItemHandle::Surface(0), Vec2::new(100.0, 10.0))
            .unwrap();
        let diff = solver.solve();

        assert!(solver.puzzle().target("t").unwrap().is_lit());
        assert!(solver.puzzle().exit("door").unwrap().is_open);
        assert_eq!(diff.targets.previous.get("t"), Some(&vec![]));
        assert_eq!(diff.targets.current.get("t"), Some(&vec![Color::Red]));
        assert!(!diff.validity_changed());
    }

    /// Two lasers whose beams touch at (75, 10), each feeding its own target
    fn scenario_c() -> Solver {
        let mut p = arena();
        p.add_item(&laser_at("a", Color::Red, Direction::East, 10.0, 10.0)).unwrap();
        p.add_item(&laser_at("b", Color::Red, Direction::South, 75.0, 5.0)).unwrap();
        p.add_item(&ItemDescriptor::target("east", Vec2::new(180.0, 10.0), size(20.0)))
            .unwrap();
        p.add_item(&ItemDescriptor::target("south", Vec2::new(75.0, 150.0), size(20.0)))
            .unwrap();
        Solver::new(p, SolverSettings::default())
    }

    #[test]
    fn test_scenario_c_same_color_crossing_keeps_strikes() {
        let mut solver = scenario_c();
        solver.solve();
        let p = solver.puzzle();
        assert!(p.target("east").unwrap().is_lit());
        assert!(p.target("south").unwrap().is_lit());
    }

    #[test]
    fn test_scenario_c_conflicting_colors_void_both() {
        let mut solver = scenario_c();
        solver.puzzle_mut().recolor_laser("b", Color::Green).unwrap();
        solver.solve();
        let p = solver.puzzle();
        assert!(!p.target("east").unwrap().is_lit());
        assert!(!p.target("south").unwrap().is_lit());
        // Beams are still traced; only the strikes are voided
        assert!(p.laser("b").unwrap().path().is_ok());
    }

    #[test]
    fn test_scenario_d_beam_through_player() {
        let mut p = arena();
        p.add_item(&laser_at("down", Color::Blue, Direction::South, 10.0, 10.0)).unwrap();
        p.move_item(&ItemHandle::Player, Vec2::new(10.0, 100.0)).unwrap();
        let mut solver = Solver::new(p, SolverSettings::default());

        let first = solver.solve();
        assert!(!solver.puzzle().is_valid());
        assert_eq!(first.valid.previous, None);
        assert!(!first.valid.current);

        solver
            .puzzle_mut()
            .move_item(&ItemHandle::Player, Vec2::new(100.0, 100.0))
            .unwrap();
        let second = solver.solve();
        assert!(solver.puzzle().is_valid());
        assert_eq!(second.valid.previous, Some(false));
        assert!(second.valid.current);
        assert!(second.validity_changed());
    }

    #[test]
    fn test_invalid_puzzle_keeps_exits_shut() {
        let mut solver = scenario_a(Vec2::new(100.0, 15.0));
        solver
            .puzzle_mut()
            .move_item(&ItemHandle::Player, Vec2::new(90.0, 50.0))
            .unwrap();
        solver.solve();
        let p = solver.puzzle();
        assert!(!p.is_valid());
        assert!(p.target("t").unwrap().is_lit());
        assert!(!p.exit("door").unwrap().is_open);

        let mut lenient = Solver::new(
            p.clone(),
            SolverSettings {
                require_valid_for_exits: false,
                ..Default::default()
            },
        );
        lenient.solve();
        assert!(lenient.puzzle().exit("door").unwrap().is_open);
    }

    #[test]
    fn test_two_colors_blend_on_one_target() {
        let mut p = arena();
        p.add_item(&laser_at("r", Color::Red, Direction::East, 10.0, 100.0)).unwrap();
        p.add_item(&laser_at("b", Color::Blue, Direction::South, 100.0, 10.0)).unwrap();
        p.add_item(&ItemDescriptor::target("t", Vec2::new(100.0, 100.0), size(20.0)))
            .unwrap();
        p.add_item(&exit_at("purple", Color::Purple, Direction::North, 150.0, 5.0)).unwrap();
        p.add_item(&exit_at("green", Color::Green, Direction::North, 170.0, 5.0)).unwrap();
        let mut solver = Solver::new(p, SolverSettings::default());
        solver.solve();

        let p = solver.puzzle();
        assert_eq!(p.target("t").unwrap().display_color(), Some(Color::Purple));
        assert!(p.exit("purple").unwrap().is_open);
        assert!(!p.exit("green").unwrap().is_open);
        assert!(!p.is_solved());
        let state = solver.current().unwrap();
        assert_eq!(state.striking_lasers["t"].len(), 2);
    }

    #[test]
    fn test_resolving_unchanged_puzzle_gives_empty_diff() {
        let mut solver = scenario_a(Vec2::new(100.0, 15.0));
        let first = solver.solve();
        assert!(!first.is_empty());
        let second = solver.solve();
        assert!(second.is_empty());
        assert_eq!(solver.previous(), solver.current());
    }

    #[test]
    fn test_no_stale_exit_after_beam_leaves() {
        let mut solver = scenario_a(Vec2::new(100.0, 15.0));
        solver.solve();
        assert!(solver.puzzle().exit("door").unwrap().is_open);

        solver
            .puzzle_mut()
            .move_item(&ItemHandle::Surface(0), Vec2::new(10.0, 60.0))
            .unwrap();
        let diff = solver.solve();
        assert!(!solver.puzzle().exit("door").unwrap().is_open);
        assert_eq!(diff.targets.previous.get("t"), Some(&vec![Color::Red]));
        assert_eq!(diff.targets.current.get("t"), Some(&vec![]));
    }

    #[test]
    fn test_path_before_solve_is_an_error() {
        let solver = scenario_a(Vec2::new(100.0, 15.0));
        assert_eq!(
            solver.puzzle().laser("red").unwrap().path(),
            Err(OperationError::NotSolved("red".into()))
        );
    }

    #[test]
    fn test_diff_serializes_for_presentation() {
        let mut solver = scenario_a(Vec2::new(100.0, 15.0));
        let diff = solver.solve();
        let json = serde_json::to_value(&diff).unwrap();
        assert_eq!(json["targets"]["current"]["t"][0], "l-red");
        assert_eq!(json["valid"]["current"], true);
    }
}
