//! Geometry value types.
//!
//! Netgrid accepts exactly two geometry shapes: a single point (node
//! locations) and a single open polyline (link geometries). Rather than a
//! generic geometry collection probed with ad hoc field checks, the input
//! type is a sum type, [`Shape`], validated once at construction, so
//! downstream code only ever sees well-formed values.
//!
//! Coordinates are planar; the optional third dimension is carried verbatim
//! and must be uniform across a polyline's vertices.
//!
//! Bounding boxes ([`BBox`]) support index prefiltering; the [`measure`]
//! module provides distance, point location, and polyline surgery.

mod bbox;
pub mod measure;

pub use bbox::BBox;

use geo::Intersects;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A single 2D/3D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X (easting / longitude).
    pub x: f64,
    /// Y (northing / latitude).
    pub y: f64,
    /// Optional third dimension.
    pub z: Option<f64>,
}

impl Point {
    /// Create a 2D point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    /// Create a 3D point.
    #[inline]
    #[must_use]
    pub const fn new_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    /// Whether the point carries a third dimension.
    #[inline]
    #[must_use]
    pub const fn has_z(&self) -> bool {
        self.z.is_some()
    }

    /// Exact coincidence test.
    ///
    /// The planar comparison is delegated to the geometry kernel's
    /// intersection predicate; the third dimension is compared only when
    /// both points carry one.
    #[must_use]
    pub fn coincides(&self, other: &Self) -> bool {
        if !self.to_geo().intersects(&other.to_geo()) {
            return false;
        }
        match (self.z, other.z) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }

    /// Convert to the kernel's planar point type.
    #[inline]
    #[must_use]
    pub fn to_geo(&self) -> geo_types::Point<f64> {
        geo_types::Point::new(self.x, self.y)
    }
}

/// A single open polyline with at least two vertices.
///
/// Construction enforces the vertex-count and uniform-dimensionality
/// constraints, so a `Line` in hand is always well-formed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    points: Vec<Point>,
}

impl Line {
    /// Create a polyline.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidGeometry`] if fewer than two vertices are
    /// given or the vertices mix 2D and 3D coordinates.
    pub fn new(points: Vec<Point>) -> Result<Self, CoreError> {
        if points.len() < 2 {
            return Err(CoreError::invalid_geometry("a polyline needs at least two vertices"));
        }
        let has_z = points[0].has_z();
        if points.iter().any(|p| p.has_z() != has_z) {
            return Err(CoreError::invalid_geometry("mixed 2D and 3D vertices in one polyline"));
        }
        Ok(Self { points })
    }

    /// The vertices, in order.
    #[inline]
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; a polyline has at least two vertices.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// First vertex.
    #[inline]
    #[must_use]
    pub fn first(&self) -> &Point {
        &self.points[0]
    }

    /// Last vertex.
    #[inline]
    #[must_use]
    pub fn last(&self) -> &Point {
        &self.points[self.points.len() - 1]
    }

    /// Whether the vertices carry a third dimension.
    #[inline]
    #[must_use]
    pub fn has_z(&self) -> bool {
        self.points[0].has_z()
    }

    /// The polyline with vertex order reversed.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Self { points }
    }

    /// Convert to the kernel's planar linestring type.
    #[must_use]
    pub fn to_geo(&self) -> geo_types::LineString<f64> {
        geo_types::LineString::from(
            self.points.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>(),
        )
    }
}

/// The shape of a geometry value: one point or one polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// A single point.
    Point(Point),
    /// A single open polyline.
    Line(Line),
}

/// A geometry value as supplied by callers: a shape tagged with the SRID it
/// is expressed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Coordinate reference id.
    pub srid: i32,
    /// Point or polyline.
    pub shape: Shape,
}

impl Geometry {
    /// A 2D point geometry.
    #[must_use]
    pub const fn point(srid: i32, x: f64, y: f64) -> Self {
        Self { srid, shape: Shape::Point(Point::new(x, y)) }
    }

    /// A 3D point geometry.
    #[must_use]
    pub const fn point_z(srid: i32, x: f64, y: f64, z: f64) -> Self {
        Self { srid, shape: Shape::Point(Point::new_z(x, y, z)) }
    }

    /// A polyline geometry.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidGeometry`] on a malformed vertex list.
    pub fn line(srid: i32, points: Vec<Point>) -> Result<Self, CoreError> {
        Ok(Self { srid, shape: Shape::Line(Line::new(points)?) })
    }

    /// A polyline geometry from 2D coordinate pairs.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidGeometry`] on a malformed vertex list.
    pub fn line_from_coords(srid: i32, coords: &[(f64, f64)]) -> Result<Self, CoreError> {
        Self::line(srid, coords.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    /// Whether the geometry carries a third dimension.
    #[must_use]
    pub fn has_z(&self) -> bool {
        match &self.shape {
            Shape::Point(p) => p.has_z(),
            Shape::Line(l) => l.has_z(),
        }
    }

    /// The point, if this is a point geometry.
    #[must_use]
    pub fn as_point(&self) -> Option<&Point> {
        match &self.shape {
            Shape::Point(p) => Some(p),
            Shape::Line(_) => None,
        }
    }

    /// The polyline, if this is a polyline geometry.
    #[must_use]
    pub fn as_line(&self) -> Option<&Line> {
        match &self.shape {
            Shape::Point(_) => None,
            Shape::Line(l) => Some(l),
        }
    }

    /// Short shape name for diagnostics.
    #[must_use]
    pub fn shape_name(&self) -> &'static str {
        match &self.shape {
            Shape::Point(_) => "point",
            Shape::Line(_) => "polyline",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_rejects_single_vertex() {
        assert!(Line::new(vec![Point::new(0.0, 0.0)]).is_err());
    }

    #[test]
    fn line_rejects_mixed_dimensions() {
        let result = Line::new(vec![Point::new(0.0, 0.0), Point::new_z(1.0, 1.0, 2.0)]);
        assert!(matches!(result, Err(CoreError::InvalidGeometry(_))));
    }

    #[test]
    fn coincidence_is_exact() {
        let a = Point::new(1.5, 2.5);
        assert!(a.coincides(&Point::new(1.5, 2.5)));
        assert!(!a.coincides(&Point::new(1.5, 2.5000001)));
    }

    #[test]
    fn coincidence_compares_z_when_both_present() {
        let a = Point::new_z(1.0, 2.0, 3.0);
        assert!(a.coincides(&Point::new_z(1.0, 2.0, 3.0)));
        assert!(!a.coincides(&Point::new_z(1.0, 2.0, 4.0)));
        // A 2D point matches regardless of the other's Z.
        assert!(a.coincides(&Point::new(1.0, 2.0)));
    }

    #[test]
    fn geometry_accessors() {
        let p = Geometry::point(4326, 1.0, 2.0);
        assert!(p.as_point().is_some());
        assert!(p.as_line().is_none());
        assert_eq!(p.shape_name(), "point");

        let l = Geometry::line_from_coords(4326, &[(0.0, 0.0), (1.0, 1.0)]).expect("valid line");
        assert!(l.as_line().is_some());
        assert_eq!(l.shape_name(), "polyline");
    }

    #[test]
    fn reversed_flips_vertex_order() {
        let line = Line::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ])
        .expect("valid line");
        let rev = line.reversed();
        assert_eq!(rev.first(), &Point::new(2.0, 0.0));
        assert_eq!(rev.last(), &Point::new(0.0, 0.0));
    }
}
