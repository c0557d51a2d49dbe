//! Distance, point location, and polyline surgery.
//!
//! Point-to-point distance goes through the geometry kernel's euclidean
//! metric. Point-to-segment projection is computed here; the kernel has no
//! polyline-split operation, so splitting and joining are done on the
//! vertex lists directly.

use geo::{Distance, Euclidean};

use crate::error::CoreError;

use super::{Line, Point};

/// Tolerance for on-line containment tests.
pub const EPSILON: f64 = 1e-9;

/// Planar distance between two points.
#[must_use]
pub fn distance_2d(a: &Point, b: &Point) -> f64 {
    Euclidean.distance(a.to_geo(), b.to_geo())
}

/// Planar distance between a point and a polyline.
#[must_use]
pub fn point_line_distance_2d(p: &Point, line: &Line) -> f64 {
    let mut min = f64::INFINITY;
    for w in line.points().windows(2) {
        let (_, d) = segment_projection(p, &w[0], &w[1]);
        min = min.min(d);
    }
    min
}

/// A location on a polyline: the segment index, the normalized position
/// along that segment, and the snapped coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinePosition {
    /// Index of the segment (0-based, over `len() - 1` segments).
    pub segment: usize,
    /// Normalized position along the segment, in `[0, 1]`.
    pub t: f64,
    /// The snapped point on the polyline.
    pub location: Point,
}

/// Locate a point on a polyline.
///
/// Returns the closest on-line position if the point lies within
/// `tolerance` of the polyline, `None` otherwise. The returned location is
/// snapped onto the segment; its third dimension is interpolated when the
/// polyline carries one.
#[must_use]
pub fn locate_point(line: &Line, p: &Point, tolerance: f64) -> Option<LinePosition> {
    let mut best: Option<(f64, LinePosition)> = None;
    for (i, w) in line.points().windows(2).enumerate() {
        let (a, b) = (&w[0], &w[1]);
        let (t, d) = segment_projection(p, a, b);
        if d > tolerance {
            continue;
        }
        if best.map_or(false, |(bd, _)| d >= bd) {
            continue;
        }
        // A projection landing exactly on a segment end must snap to the
        // vertex; interpolating can drift by an ulp.
        let location = if t == 0.0 {
            *a
        } else if t == 1.0 {
            *b
        } else {
            let z = match (a.z, b.z) {
                (Some(za), Some(zb)) => Some(za + t * (zb - za)),
                _ => None,
            };
            Point { x: a.x + t * (b.x - a.x), y: a.y + t * (b.y - a.y), z }
        };
        best = Some((d, LinePosition { segment: i, t, location }));
    }
    best.map(|(_, pos)| pos)
}

/// Cut a polyline in two at a point lying on it.
///
/// Returns `None` if the point is not on the polyline (within [`EPSILON`])
/// or if the cut would produce a degenerate part (the point sits on the
/// first or last vertex). The first part ends and the second part begins at
/// the snapped cut point.
#[must_use]
pub fn split_line(line: &Line, p: &Point) -> Option<(Line, Line)> {
    let pos = locate_point(line, p, EPSILON)?;
    let cut = pos.location;
    if cut.coincides(line.first()) || cut.coincides(line.last()) {
        return None;
    }

    let mut first: Vec<Point> = line.points()[..=pos.segment].to_vec();
    if !cut.coincides(&first[first.len() - 1]) {
        first.push(cut);
    }

    let mut second: Vec<Point> = vec![cut];
    for q in &line.points()[pos.segment + 1..] {
        if second.len() == 1 && cut.coincides(q) {
            continue;
        }
        second.push(*q);
    }

    match (Line::new(first), Line::new(second)) {
        (Ok(a), Ok(b)) => Some((a, b)),
        _ => None,
    }
}

/// Concatenate two polylines sharing an endpoint.
///
/// `a` must end where `b` begins; the shared vertex appears once in the
/// result.
///
/// # Errors
///
/// Returns [`CoreError::Validation`] if the polylines do not share the
/// joint vertex.
pub fn join_lines(a: &Line, b: &Line) -> Result<Line, CoreError> {
    if !a.last().coincides(b.first()) {
        return Err(CoreError::Validation(
            "polylines do not share an endpoint vertex".to_owned(),
        ));
    }
    let mut points = a.points().to_vec();
    points.extend_from_slice(&b.points()[1..]);
    Line::new(points)
}

/// Clamped projection of `p` onto the segment `a`-`b`.
///
/// Returns the normalized position along the segment and the distance from
/// `p` to the closest point on it.
fn segment_projection(p: &Point, a: &Point, b: &Point) -> (f64, f64) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;

    // Degenerate segment
    if dx == 0.0 && dy == 0.0 {
        return (0.0, distance_2d(p, a));
    }

    let t = ((p.x - a.x) * dx + (p.y - a.y) * dy) / (dx * dx + dy * dy);
    let t = t.clamp(0.0, 1.0);
    let closest = Point::new(a.x + t * dx, a.y + t * dy);
    (t, distance_2d(p, &closest))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(coords: &[(f64, f64)]) -> Line {
        Line::new(coords.iter().map(|&(x, y)| Point::new(x, y)).collect()).expect("valid line")
    }

    #[test]
    fn point_distance() {
        assert_eq!(distance_2d(&Point::new(0.0, 0.0), &Point::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn distance_to_segment_interior() {
        let l = line(&[(0.0, 0.0), (10.0, 0.0)]);
        assert_eq!(point_line_distance_2d(&Point::new(5.0, 2.0), &l), 2.0);
    }

    #[test]
    fn distance_beyond_segment_end_uses_vertex() {
        let l = line(&[(0.0, 0.0), (10.0, 0.0)]);
        assert_eq!(point_line_distance_2d(&Point::new(13.0, 4.0), &l), 5.0);
    }

    #[test]
    fn locate_finds_midpoint() {
        let l = line(&[(0.0, 0.0), (10.0, 0.0)]);
        let pos = locate_point(&l, &Point::new(4.0, 0.0), EPSILON).expect("on line");
        assert_eq!(pos.segment, 0);
        assert!((pos.t - 0.4).abs() < 1e-12);
        assert!(pos.location.coincides(&Point::new(4.0, 0.0)));
    }

    #[test]
    fn locate_misses_far_point() {
        let l = line(&[(0.0, 0.0), (10.0, 0.0)]);
        assert!(locate_point(&l, &Point::new(4.0, 1.0), EPSILON).is_none());
    }

    #[test]
    fn split_at_interior_point() {
        let l = line(&[(0.0, 0.0), (10.0, 0.0)]);
        let (a, b) = split_line(&l, &Point::new(4.0, 0.0)).expect("splittable");
        assert_eq!(a.points(), &[Point::new(0.0, 0.0), Point::new(4.0, 0.0)]);
        assert_eq!(b.points(), &[Point::new(4.0, 0.0), Point::new(10.0, 0.0)]);
    }

    #[test]
    fn split_at_interior_vertex_keeps_vertex_once_per_part() {
        let l = line(&[(0.0, 0.0), (5.0, 5.0), (10.0, 0.0)]);
        let (a, b) = split_line(&l, &Point::new(5.0, 5.0)).expect("splittable");
        assert_eq!(a.points(), &[Point::new(0.0, 0.0), Point::new(5.0, 5.0)]);
        assert_eq!(b.points(), &[Point::new(5.0, 5.0), Point::new(10.0, 0.0)]);
    }

    #[test]
    fn split_rejects_endpoints_and_off_line_points() {
        let l = line(&[(0.0, 0.0), (10.0, 0.0)]);
        assert!(split_line(&l, &Point::new(0.0, 0.0)).is_none());
        assert!(split_line(&l, &Point::new(10.0, 0.0)).is_none());
        assert!(split_line(&l, &Point::new(5.0, 3.0)).is_none());
    }

    #[test]
    fn split_interpolates_z() {
        let l = Line::new(vec![Point::new_z(0.0, 0.0, 0.0), Point::new_z(10.0, 0.0, 10.0)])
            .expect("valid line");
        let (a, _) = split_line(&l, &Point::new_z(4.0, 0.0, 0.0)).expect("splittable");
        let cut = a.last();
        assert_eq!(cut.z, Some(4.0));
    }

    #[test]
    fn join_requires_shared_vertex() {
        let a = line(&[(0.0, 0.0), (1.0, 0.0)]);
        let b = line(&[(1.0, 0.0), (2.0, 0.0)]);
        let joined = join_lines(&a, &b).expect("joinable");
        assert_eq!(
            joined.points(),
            &[Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, 0.0)]
        );

        let c = line(&[(5.0, 5.0), (6.0, 6.0)]);
        assert!(join_lines(&a, &c).is_err());
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            // Splitting at an interior vertex and joining back restores the
            // original vertex sequence.
            #[test]
            fn split_then_join_restores_line(
                xs in proptest::collection::vec(-1000.0f64..1000.0, 3..12),
            ) {
                let mut points = Vec::new();
                for (i, x) in xs.iter().enumerate() {
                    // Strictly increasing Y keeps vertices distinct.
                    points.push(Point::new(*x, i as f64));
                }
                let line = Line::new(points.clone()).expect("valid line");
                let mid = points[points.len() / 2];
                if let Some((a, b)) = split_line(&line, &mid) {
                    let joined = join_lines(&a, &b).expect("parts share the cut point");
                    prop_assert_eq!(joined.points(), line.points());
                }
            }
        }
    }
}
