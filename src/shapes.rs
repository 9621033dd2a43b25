//! Point lists for the primitive drawing tools.
//!
//! Every generator takes two control points in world space and returns the vertices
//! of a closed polygon. Degenerate input (both points equal) gives a valid list with
//! zero area.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::geometry::Point;

/// Rectangles and triangles stay inline; circles spill to the heap.
pub type ShapePoints = SmallVec<[Point; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Triangle,
}

impl ShapeKind {
    /// Builds the shape spanned by the gesture anchor and the current pointer position.
    pub fn generate(self, anchor: Point, current: Point, circle_segments: usize) -> ShapePoints {
        match self {
            ShapeKind::Rectangle => rectangle(anchor, current),
            ShapeKind::Circle => circle(anchor, anchor.distance(current), circle_segments),
            ShapeKind::Triangle => triangle(anchor, current),
        }
    }
}

pub fn rectangle(start: Point, end: Point) -> ShapePoints {
    SmallVec::from_buf([
        start,
        Point::new(end.x, start.y),
        end,
        Point::new(start.x, end.y),
    ])
}

pub fn circle(center: Point, radius: f64, segments: usize) -> ShapePoints {
    (0..segments)
        .map(|i| {
            let angle = TAU * i as f64 / segments as f64;
            Point::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
        .collect()
}

/// Isosceles triangle inscribed in the bounding box of the two points.
///
/// The base runs along the larger-y edge of the box (the bottom of the screen), and
/// the apex sits in the middle of the opposite edge.
pub fn triangle(start: Point, end: Point) -> ShapePoints {
    let (left, right) = (start.x.min(end.x), start.x.max(end.x));
    let (top, bottom) = (start.y.min(end.y), start.y.max(end.y));

    let mut points = ShapePoints::new();
    points.push(Point::new(left, bottom));
    points.push(Point::new(right, bottom));
    points.push(Point::new((left + right) / 2., top));
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::polygon_area;

    #[test]
    fn rectangle_winds_from_start() {
        let r = rectangle(Point::new(0., 0.), Point::new(10., 5.));
        assert_eq!(
            r.as_slice(),
            &[
                Point::new(0., 0.),
                Point::new(10., 0.),
                Point::new(10., 5.),
                Point::new(0., 5.),
            ]
        );
        assert!(!r.spilled());
    }

    #[test]
    fn circle_points_lie_on_radius() {
        let center = Point::new(-3., 8.);
        for segments in [3, 24, 32] {
            let c = circle(center, 12.5, segments);
            assert_eq!(c.len(), segments);
            for p in &c {
                assert!((p.distance(center) - 12.5).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn circle_area_approaches_pi_r_squared() {
        let c = circle(Point::new(0., 0.), 10., 32);
        let exact = std::f64::consts::PI * 100.;
        let area = polygon_area(&c);
        assert!(area < exact);
        assert!(area > 0.98 * exact);
    }

    #[test]
    fn triangle_is_isosceles_in_any_drag_direction() {
        let a = triangle(Point::new(0., 0.), Point::new(6., 4.));
        let b = triangle(Point::new(6., 4.), Point::new(0., 0.));
        assert_eq!(a, b);
        assert_eq!(a[2], Point::new(3., 0.));
        assert!((a[0].distance(a[2]) - a[1].distance(a[2])).abs() < 1e-12);
        assert_eq!(polygon_area(&a), 12.);
    }

    #[test]
    fn degenerate_gestures_have_zero_area() {
        let p = Point::new(4., 4.);
        for kind in [ShapeKind::Rectangle, ShapeKind::Circle, ShapeKind::Triangle] {
            let shape = kind.generate(p, p, 32);
            assert!(shape.len() >= 3);
            assert_eq!(polygon_area(&shape), 0.);
        }
    }

    #[test]
    fn circle_radius_comes_from_drag_distance() {
        let shape = ShapeKind::Circle.generate(Point::new(0., 0.), Point::new(3., 4.), 24);
        assert_eq!(shape.len(), 24);
        assert!((shape[0].x - 5.).abs() < 1e-12);
    }
}
