//! Beamline demo entry point
//!
//! Builds a small sample puzzle, solves it, nudges the mirror out of the
//! beam, and solves again so the state diff can be inspected.

use std::path::PathBuf;

use beamline::level::{ItemDescriptor, ItemKind, PuzzleDescriptor};
use beamline::sim::{Color, Dimensions, Direction, ItemHandle, Puzzle, Solver};
use beamline::SolverSettings;
use glam::Vec2;

fn sample_level() -> PuzzleDescriptor {
    let square = |w: f32| Dimensions::new(w, w);
    PuzzleDescriptor {
        key: "sample".to_string(),
        room_key: "lobby".to_string(),
        dimensions: Dimensions::new(200.0, 200.0),
        player: ItemDescriptor::new(ItemKind::Player, Vec2::new(180.0, 180.0), square(10.0)),
        items: vec![
            ItemDescriptor::laser(
                "red",
                Color::Red,
                Direction::East,
                Vec2::new(10.0, 10.0),
                square(10.0),
            ),
            ItemDescriptor::mirror(Direction::West, Vec2::new(100.0, 15.0), square(20.0))
                .movable()
                .rotatable(),
            ItemDescriptor::target("plate", Vec2::new(90.0, 100.0), square(20.0)),
            ItemDescriptor::exit(
                "door",
                Color::Red,
                Direction::East,
                Vec2::new(195.0, 100.0),
                square(10.0),
            ),
        ],
    }
}

fn main() {
    env_logger::init();
    log::info!("Beamline (native) starting...");

    // Optional settings file as the first argument
    let settings = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .map(|path| SolverSettings::load(&path))
        .unwrap_or_default();

    let puzzle = match Puzzle::from_descriptor(&sample_level()) {
        Ok(puzzle) => puzzle,
        Err(e) => {
            log::error!("Sample level is malformed: {}", e);
            std::process::exit(1);
        }
    };

    let mut solver = Solver::new(puzzle, settings);
    report(&mut solver);

    if let Err(e) = solver
        .puzzle_mut()
        .move_item(&ItemHandle::Surface(0), Vec2::new(10.0, 60.0))
    {
        log::error!("Could not move mirror: {}", e);
        return;
    }
    report(&mut solver);
}

fn report(solver: &mut Solver) {
    let diff = solver.solve();
    let puzzle = solver.puzzle();

    for laser in puzzle.lasers() {
        if let Ok(path) = laser.path() {
            println!("laser {} ({}): {:?}", laser.key, laser.color.as_str(), path);
        }
    }
    for target in puzzle.targets() {
        println!(
            "target {}: lit={} color={:?}",
            target.key,
            target.is_lit(),
            target.display_color().map(|c| c.as_str())
        );
    }
    for exit in puzzle.exits() {
        println!("exit {}: open={}", exit.key, exit.is_open);
    }
    println!("valid={} solved={}", puzzle.is_valid(), puzzle.is_solved());

    match serde_json::to_string_pretty(&diff) {
        Ok(json) => println!("diff: {}", json),
        Err(e) => log::warn!("Could not serialize diff: {}", e),
    }
}
