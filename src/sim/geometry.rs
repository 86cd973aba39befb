//! Axis-aligned geometry for beam tracing
//!
//! Items are boxes centred on their position. Beams only ever travel along
//! the x or y axis, so every test here is a handful of comparisons rather
//! than a general line intersection.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::direction::{Axis, Direction};
use crate::approx_eq;
use crate::consts::GEOMETRY_EPSILON;

/// Width/height of an item's box
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

impl Dimensions {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn half(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }
}

/// Bounding box of an item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extrema {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl Extrema {
    /// Inclusive containment
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x_min && p.x <= self.x_max && p.y >= self.y_min && p.y <= self.y_max
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    /// Midpoint of the edge facing `direction`
    pub fn edge_midpoint(&self, direction: Direction) -> Vec2 {
        let c = self.center();
        match direction {
            Direction::East => Vec2::new(self.x_max, c.y),
            Direction::South => Vec2::new(c.x, self.y_max),
            Direction::West => Vec2::new(self.x_min, c.y),
            Direction::North => Vec2::new(c.x, self.y_min),
        }
    }
}

/// Box spanned by a centre position and dimensions
pub fn extrema(position: Vec2, dimensions: Dimensions) -> Extrema {
    let half = dimensions.half();
    Extrema {
        x_min: position.x - half.x,
        x_max: position.x + half.x,
        y_min: position.y - half.y,
        y_max: position.y + half.y,
    }
}

/// Where a beam leaving `origin` along `approach` first touches the box
///
/// The origin must be strictly outside the box on the approach axis (on the
/// near side) and within the box's span on the other axis.
pub fn collision_point(bounds: &Extrema, origin: Vec2, approach: Direction) -> Option<Vec2> {
    let in_x_span = origin.x >= bounds.x_min && origin.x <= bounds.x_max;
    let in_y_span = origin.y >= bounds.y_min && origin.y <= bounds.y_max;

    match approach {
        Direction::East if in_y_span && origin.x < bounds.x_min => {
            Some(Vec2::new(bounds.x_min, origin.y))
        }
        Direction::West if in_y_span && origin.x > bounds.x_max => {
            Some(Vec2::new(bounds.x_max, origin.y))
        }
        Direction::South if in_x_span && origin.y < bounds.y_min => {
            Some(Vec2::new(origin.x, bounds.y_min))
        }
        Direction::North if in_x_span && origin.y > bounds.y_max => {
            Some(Vec2::new(origin.x, bounds.y_max))
        }
        _ => None,
    }
}

/// One straight piece of a beam
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
}

impl Segment {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    /// Orientation, or None for a zero-length or diagonal segment
    pub fn axis(&self) -> Option<Axis> {
        let flat_y = approx_eq(self.start.y, self.end.y, GEOMETRY_EPSILON);
        let flat_x = approx_eq(self.start.x, self.end.x, GEOMETRY_EPSILON);
        match (flat_x, flat_y) {
            (true, true) => None,
            (false, true) => Some(Axis::Horizontal),
            (true, false) => Some(Axis::Vertical),
            (false, false) => None,
        }
    }

    #[inline]
    fn x_range(&self) -> (f32, f32) {
        (self.start.x.min(self.end.x), self.start.x.max(self.end.x))
    }

    #[inline]
    fn y_range(&self) -> (f32, f32) {
        (self.start.y.min(self.end.y), self.start.y.max(self.end.y))
    }

    pub fn length(&self) -> f32 {
        (self.end - self.start).length()
    }
}

/// Split a polyline into consecutive segments
pub fn path_segments(points: &[Vec2]) -> Vec<Segment> {
    points
        .windows(2)
        .map(|w| Segment::new(w[0], w[1]))
        .collect()
}

/// Representative intersection point of two axis-aligned segments
///
/// Collinear segments that overlap return the midpoint of the shared span;
/// perpendicular segments return their crossing point. Endpoints count as
/// touching.
pub fn segments_overlap(a: &Segment, b: &Segment) -> Option<Vec2> {
    let (axis_a, axis_b) = (a.axis()?, b.axis()?);
    let eps = GEOMETRY_EPSILON;

    match (axis_a, axis_b) {
        (Axis::Horizontal, Axis::Horizontal) => {
            if !approx_eq(a.start.y, b.start.y, eps) {
                return None;
            }
            let ((a_min, a_max), (b_min, b_max)) = (a.x_range(), b.x_range());
            let lo = a_min.max(b_min);
            let hi = a_max.min(b_max);
            (lo <= hi + eps).then(|| Vec2::new((lo + hi) / 2.0, a.start.y))
        }
        (Axis::Vertical, Axis::Vertical) => {
            if !approx_eq(a.start.x, b.start.x, eps) {
                return None;
            }
            let ((a_min, a_max), (b_min, b_max)) = (a.y_range(), b.y_range());
            let lo = a_min.max(b_min);
            let hi = a_max.min(b_max);
            (lo <= hi + eps).then(|| Vec2::new(a.start.x, (lo + hi) / 2.0))
        }
        (Axis::Horizontal, Axis::Vertical) => perpendicular_crossing(a, b),
        (Axis::Vertical, Axis::Horizontal) => perpendicular_crossing(b, a),
    }
}

fn perpendicular_crossing(horizontal: &Segment, vertical: &Segment) -> Option<Vec2> {
    let eps = GEOMETRY_EPSILON;
    let (x_min, x_max) = horizontal.x_range();
    let (y_min, y_max) = vertical.y_range();
    let x = vertical.start.x;
    let y = horizontal.start.y;

    let crosses =
        x >= x_min - eps && x <= x_max + eps && y >= y_min - eps && y <= y_max + eps;
    crosses.then(|| Vec2::new(x, y))
}

/// True if an axis-aligned segment passes through or touches the box
pub fn segment_intersects_box(segment: &Segment, bounds: &Extrema) -> bool {
    let (x_min, x_max) = segment.x_range();
    let (y_min, y_max) = segment.y_range();
    x_max >= bounds.x_min && x_min <= bounds.x_max && y_max >= bounds.y_min && y_min <= bounds.y_max
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Extrema {
        extrema(Vec2::new(100.0, 100.0), Dimensions::new(20.0, 20.0))
    }

    #[test]
    fn test_extrema_from_center() {
        let e = unit_box();
        assert_eq!(e.x_min, 90.0);
        assert_eq!(e.x_max, 110.0);
        assert_eq!(e.y_min, 90.0);
        assert_eq!(e.y_max, 110.0);
        assert_eq!(e.edge_midpoint(Direction::North), Vec2::new(100.0, 90.0));
    }

    #[test]
    fn test_collision_point_each_approach() {
        let e = unit_box();
        assert_eq!(
            collision_point(&e, Vec2::new(0.0, 95.0), Direction::East),
            Some(Vec2::new(90.0, 95.0))
        );
        assert_eq!(
            collision_point(&e, Vec2::new(200.0, 95.0), Direction::West),
            Some(Vec2::new(110.0, 95.0))
        );
        assert_eq!(
            collision_point(&e, Vec2::new(105.0, 0.0), Direction::South),
            Some(Vec2::new(105.0, 90.0))
        );
        assert_eq!(
            collision_point(&e, Vec2::new(105.0, 300.0), Direction::North),
            Some(Vec2::new(105.0, 110.0))
        );
    }

    #[test]
    fn test_collision_point_wrong_side_or_span() {
        let e = unit_box();
        // Behind the box
        assert_eq!(collision_point(&e, Vec2::new(200.0, 95.0), Direction::East), None);
        // Outside the perpendicular span
        assert_eq!(collision_point(&e, Vec2::new(0.0, 150.0), Direction::East), None);
        // Origin on the near edge is not strictly outside
        assert_eq!(collision_point(&e, Vec2::new(90.0, 95.0), Direction::East), None);
        // Inside the box
        assert_eq!(collision_point(&e, Vec2::new(100.0, 100.0), Direction::South), None);
    }

    #[test]
    fn test_collision_point_edge_of_span_counts() {
        let e = unit_box();
        assert_eq!(
            collision_point(&e, Vec2::new(0.0, 110.0), Direction::East),
            Some(Vec2::new(90.0, 110.0))
        );
    }

    #[test]
    fn test_perpendicular_crossing() {
        let h = Segment::new(Vec2::new(0.0, 10.0), Vec2::new(100.0, 10.0));
        let v = Segment::new(Vec2::new(50.0, 0.0), Vec2::new(50.0, 80.0));
        assert_eq!(segments_overlap(&h, &v), Some(Vec2::new(50.0, 10.0)));
        assert_eq!(segments_overlap(&v, &h), Some(Vec2::new(50.0, 10.0)));
    }

    #[test]
    fn test_perpendicular_miss() {
        let h = Segment::new(Vec2::new(0.0, 10.0), Vec2::new(40.0, 10.0));
        let v = Segment::new(Vec2::new(50.0, 0.0), Vec2::new(50.0, 80.0));
        assert_eq!(segments_overlap(&h, &v), None);
    }

    #[test]
    fn test_touching_endpoint_counts() {
        let h = Segment::new(Vec2::new(0.0, 10.0), Vec2::new(100.0, 10.0));
        let v = Segment::new(Vec2::new(75.0, 10.0), Vec2::new(75.0, 200.0));
        assert_eq!(segments_overlap(&h, &v), Some(Vec2::new(75.0, 10.0)));
    }

    #[test]
    fn test_collinear_overlap_midpoint() {
        let a = Segment::new(Vec2::new(0.0, 5.0), Vec2::new(60.0, 5.0));
        let b = Segment::new(Vec2::new(100.0, 5.0), Vec2::new(40.0, 5.0));
        assert_eq!(segments_overlap(&a, &b), Some(Vec2::new(50.0, 5.0)));

        let c = Segment::new(Vec2::new(7.0, 0.0), Vec2::new(7.0, 30.0));
        let d = Segment::new(Vec2::new(7.0, 20.0), Vec2::new(7.0, 90.0));
        assert_eq!(segments_overlap(&c, &d), Some(Vec2::new(7.0, 25.0)));
    }

    #[test]
    fn test_parallel_disjoint() {
        let a = Segment::new(Vec2::new(0.0, 5.0), Vec2::new(60.0, 5.0));
        let b = Segment::new(Vec2::new(0.0, 6.0), Vec2::new(60.0, 6.0));
        assert_eq!(segments_overlap(&a, &b), None);

        let c = Segment::new(Vec2::new(70.0, 5.0), Vec2::new(90.0, 5.0));
        assert_eq!(segments_overlap(&a, &c), None);
    }

    #[test]
    fn test_degenerate_segment() {
        let point = Segment::new(Vec2::new(5.0, 5.0), Vec2::new(5.0, 5.0));
        let h = Segment::new(Vec2::new(0.0, 5.0), Vec2::new(10.0, 5.0));
        assert_eq!(point.axis(), None);
        assert_eq!(segments_overlap(&point, &h), None);
    }

    #[test]
    fn test_segment_intersects_box() {
        let e = unit_box();
        let through = Segment::new(Vec2::new(100.0, 0.0), Vec2::new(100.0, 300.0));
        let beside = Segment::new(Vec2::new(120.0, 0.0), Vec2::new(120.0, 300.0));
        let short = Segment::new(Vec2::new(100.0, 0.0), Vec2::new(100.0, 50.0));
        assert!(segment_intersects_box(&through, &e));
        assert!(!segment_intersects_box(&beside, &e));
        assert!(!segment_intersects_box(&short, &e));
    }

    #[test]
    fn test_path_segments() {
        let pts = [Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)];
        let segs = path_segments(&pts);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[1].axis(), Some(Axis::Vertical));
    }
}
