//! Axis-aligned bounding boxes.
//!
//! Boxes are stored in the geometry index tables and used to prefilter
//! candidates before the exact distance test.

use serde::{Deserialize, Serialize};

use super::{Line, Point};

/// Axis-aligned planar bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Minimum X.
    pub min_x: f64,
    /// Minimum Y.
    pub min_y: f64,
    /// Maximum X.
    pub max_x: f64,
    /// Maximum Y.
    pub max_y: f64,
}

impl BBox {
    /// Create a bounding box from explicit bounds.
    #[must_use]
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// The degenerate box covering a single point.
    #[must_use]
    pub const fn from_point(p: &Point) -> Self {
        Self { min_x: p.x, min_y: p.y, max_x: p.x, max_y: p.y }
    }

    /// The box covering every vertex of a polyline.
    #[must_use]
    pub fn from_line(line: &Line) -> Self {
        let mut bbox = Self::from_point(line.first());
        for p in &line.points()[1..] {
            bbox.min_x = bbox.min_x.min(p.x);
            bbox.min_y = bbox.min_y.min(p.y);
            bbox.max_x = bbox.max_x.max(p.x);
            bbox.max_y = bbox.max_y.max(p.y);
        }
        bbox
    }

    /// The box grown by `margin` on every side.
    #[must_use]
    pub fn expand(&self, margin: f64) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    /// Check if this box intersects another.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Check if this box contains a point.
    #[must_use]
    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_line_covers_all_vertices() {
        let line = Line::new(vec![
            Point::new(2.0, -1.0),
            Point::new(0.0, 3.0),
            Point::new(5.0, 1.0),
        ])
        .expect("valid line");
        let bbox = BBox::from_line(&line);
        assert_eq!(bbox, BBox::new(0.0, -1.0, 5.0, 3.0));
    }

    #[test]
    fn expand_grows_every_side() {
        let bbox = BBox::from_point(&Point::new(1.0, 1.0)).expand(0.5);
        assert!(bbox.contains_point(&Point::new(1.4, 0.6)));
        assert!(!bbox.contains_point(&Point::new(1.6, 1.0)));
    }

    #[test]
    fn disjoint_boxes_do_not_intersect() {
        let a = BBox::new(0.0, 0.0, 1.0, 1.0);
        let b = BBox::new(2.0, 2.0, 3.0, 3.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&BBox::new(0.5, 0.5, 2.0, 2.0)));
    }
}
