//! Planar geometry in world space: points, polygon area and containment.

use serde::{Deserialize, Serialize};

/// A position on the map plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// Unsigned area enclosed by `points`, read as a closed polygon (shoelace formula).
///
/// Fewer than three points enclose nothing. The winding direction does not matter.
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.;
    }

    let twice_signed: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();

    0.5 * twice_signed.abs()
}

/// Ray-casting containment test.
///
/// Counts crossings of the horizontal ray from `point` towards `+x` with each edge
/// `(polygon[i], polygon[i - 1])`. Points exactly on an edge land on a fixed side,
/// so the answer is deterministic but not symmetric.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for (i, pi) in polygon.iter().enumerate() {
        let pj = polygon[j];

        // The first condition guarantees `pj.y != pi.y`, so the division is safe.
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Vertex average. Used to place labels, not a true area centroid.
pub fn vertex_average(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0., 0.), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point::new(sx / n, sy / n))
}

/// Axis-aligned bounds as `(min, max)` corners.
pub fn bounds(points: &[Point]) -> Option<(Point, Point)> {
    let first = *points.first()?;
    Some(points.iter().fold((first, first), |(lo, hi), p| {
        (
            Point::new(lo.x.min(p.x), lo.y.min(p.y)),
            Point::new(hi.x.max(p.x), hi.y.max(p.y)),
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[[f64; 2]]) -> Vec<Point> {
        raw.iter().copied().map(Point::from).collect()
    }

    #[test]
    fn shoelace_matches_known_areas() {
        assert_eq!(polygon_area(&pts(&[[0., 0.], [4., 0.], [4., 3.], [0., 3.]])), 12.);
        assert_eq!(polygon_area(&pts(&[[0., 0.], [1., 0.], [0., 1.]])), 0.5);
    }

    #[test]
    fn degenerate_inputs_have_no_area() {
        assert_eq!(polygon_area(&[]), 0.);
        assert_eq!(polygon_area(&pts(&[[0., 0.]])), 0.);
        assert_eq!(polygon_area(&pts(&[[0., 0.], [1., 1.]])), 0.);
    }

    #[test]
    fn area_ignores_winding_and_translation() {
        let shape = pts(&[[1., 1.], [7., 2.], [6., 8.], [2., 5.]]);
        let area = polygon_area(&shape);

        let reversed: Vec<Point> = shape.iter().rev().copied().collect();
        assert!((polygon_area(&reversed) - area).abs() < 1e-9);

        let moved: Vec<Point> = shape.iter().map(|p| p.offset(-350.5, 1e4)).collect();
        assert!((polygon_area(&moved) - area).abs() < 1e-6);
    }

    #[test]
    fn unit_square_containment() {
        let square = pts(&[[0., 0.], [1., 0.], [1., 1.], [0., 1.]]);
        assert!(point_in_polygon(Point::new(0.5, 0.5), &square));
        assert!(!point_in_polygon(Point::new(2., 2.), &square));
        assert!(!point_in_polygon(Point::new(-0.1, 0.5), &square));
    }

    #[test]
    fn edge_points_are_stable() {
        let square = pts(&[[0., 0.], [1., 0.], [1., 1.], [0., 1.]]);
        let on_edge = Point::new(1., 0.5);
        let first = point_in_polygon(on_edge, &square);
        for _ in 0..10 {
            assert_eq!(point_in_polygon(on_edge, &square), first);
        }
    }

    #[test]
    fn concave_notch_is_outside() {
        // A "U" shape; the notch between the arms is not part of the polygon.
        let u = pts(&[
            [0., 0.],
            [3., 0.],
            [3., 3.],
            [2., 3.],
            [2., 1.],
            [1., 1.],
            [1., 3.],
            [0., 3.],
        ]);
        assert!(!point_in_polygon(Point::new(1.5, 2.), &u));
        assert!(point_in_polygon(Point::new(0.5, 2.), &u));
        assert!(point_in_polygon(Point::new(1.5, 0.5), &u));
    }

    #[test]
    fn too_few_vertices_never_contain() {
        let line = pts(&[[0., 0.], [10., 10.]]);
        assert!(!point_in_polygon(Point::new(5., 5.), &line));
    }

    #[test]
    fn bounds_and_average() {
        let tri = pts(&[[0., 0.], [6., 0.], [3., -3.]]);
        assert_eq!(bounds(&tri), Some((Point::new(0., -3.), Point::new(6., 0.))));
        assert_eq!(vertex_average(&tri), Some(Point::new(3., -1.)));
        assert_eq!(bounds(&[]), None);
    }
}
