//! Cross-beam trimming
//!
//! Beams of different colors that touch cancel each other: every target
//! strike from either laser is voided for the pass. Same-colored beams may
//! cross freely.

use std::collections::BTreeSet;

use glam::Vec2;

use super::geometry::{path_segments, segments_overlap};
use super::trace::Trace;

/// First point where two polylines touch
pub fn paths_cross(a: &[Vec2], b: &[Vec2]) -> Option<Vec2> {
    let segs_a = path_segments(a);
    let segs_b = path_segments(b);
    segs_a
        .iter()
        .find_map(|sa| segs_b.iter().find_map(|sb| segments_overlap(sa, sb)))
}

/// Keys of lasers whose strikes are voided by a conflicting crossing
pub fn trim_crossings(traces: &[Trace]) -> BTreeSet<String> {
    let mut voided = BTreeSet::new();

    for (i, a) in traces.iter().enumerate() {
        for b in &traces[i + 1..] {
            if a.color == b.color {
                continue;
            }
            if let Some(point) = paths_cross(&a.points, &b.points) {
                log::debug!(
                    "Lasers {} ({}) and {} ({}) cross at ({:.1}, {:.1}); voiding both",
                    a.laser_key,
                    a.color.as_str(),
                    b.laser_key,
                    b.color.as_str(),
                    point.x,
                    point.y
                );
                voided.insert(a.laser_key.clone());
                voided.insert(b.laser_key.clone());
            }
        }
    }
    voided
}
