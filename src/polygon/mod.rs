mod build_polygons;

pub use build_polygons::BuildPolygons;

use crate::error::{GeometryError, Result};
use crate::math::polygon_2d::{bounds_2d, point_in_ring, signed_area_2d};
use crate::math::{Point2, TOLERANCE};

/// A closed polygon ring with cached signed area and bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    points: Vec<Point2>,
    signed_area: f64,
    min: Point2,
    max: Point2,
}

impl Ring {
    /// Builds a ring from its vertices (last point not repeated).
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::TooFewPoints`] for fewer than 3 vertices and
    /// [`GeometryError::Degenerate`] for a ring with no area.
    pub fn new(points: Vec<Point2>) -> Result<Self> {
        if points.len() < 3 {
            return Err(GeometryError::TooFewPoints(points.len()).into());
        }
        let signed_area = signed_area_2d(&points);
        if signed_area.abs() < TOLERANCE || !signed_area.is_finite() {
            return Err(GeometryError::Degenerate("ring has zero area".into()).into());
        }
        let (min, max) = bounds_2d(&points);
        Ok(Self {
            points,
            signed_area,
            min,
            max,
        })
    }

    /// The ring vertices.
    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Signed area (positive for counter-clockwise).
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        self.signed_area
    }

    /// Absolute area.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.signed_area.abs()
    }

    /// Lower-left corner of the bounding box.
    #[must_use]
    pub fn min(&self) -> Point2 {
        self.min
    }

    /// Upper-right corner of the bounding box.
    #[must_use]
    pub fn max(&self) -> Point2 {
        self.max
    }

    /// Returns the ring with counter-clockwise winding.
    #[must_use]
    pub fn into_ccw(self) -> Self {
        if self.signed_area < 0.0 {
            self.reversed()
        } else {
            self
        }
    }

    /// Returns the ring with clockwise winding.
    #[must_use]
    pub fn into_cw(self) -> Self {
        if self.signed_area > 0.0 {
            self.reversed()
        } else {
            self
        }
    }

    fn reversed(mut self) -> Self {
        self.points.reverse();
        self.signed_area = -self.signed_area;
        self
    }

    /// Returns `true` if `p` lies strictly inside the ring (even-odd rule).
    #[must_use]
    pub fn contains_point(&self, p: &Point2) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && point_in_ring(p, &self.points)
    }

    /// Returns `true` if `other` lies entirely inside this ring.
    ///
    /// Both rings are assumed not to cross each other, which holds for
    /// contours traced from one scalar field.
    #[must_use]
    pub fn contains_ring(&self, other: &Ring) -> bool {
        other.area() < self.area()
            && other.min.x >= self.min.x
            && other.min.y >= self.min.y
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
            && other.points.iter().all(|p| point_in_ring(p, &self.points))
    }
}

/// One outer ring (counter-clockwise) plus contained hole rings (clockwise).
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonWithHoles {
    outer: Ring,
    holes: Vec<Ring>,
}

impl PolygonWithHoles {
    /// Creates a polygon, normalizing ring orientations.
    #[must_use]
    pub fn new(outer: Ring, holes: Vec<Ring>) -> Self {
        Self {
            outer: outer.into_ccw(),
            holes: holes.into_iter().map(Ring::into_cw).collect(),
        }
    }

    /// The outer boundary (counter-clockwise).
    #[must_use]
    pub fn outer(&self) -> &Ring {
        &self.outer
    }

    /// The hole boundaries (clockwise).
    #[must_use]
    pub fn holes(&self) -> &[Ring] {
        &self.holes
    }

    /// All rings, outer first.
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    /// Material area: outer area minus hole areas.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.outer.area() - self.holes.iter().map(Ring::area).sum::<f64>()
    }

    /// Returns `true` if `p` is inside the outer ring and outside every hole.
    #[must_use]
    pub fn contains_point(&self, p: &Point2) -> bool {
        self.outer.contains_point(p) && !self.holes.iter().any(|h| h.contains_point(p))
    }

    /// Returns `true` if the region of `other` is a subset of the region of
    /// `self`. Rings are assumed not to cross.
    #[must_use]
    pub fn contains_polygon(&self, other: &PolygonWithHoles) -> bool {
        if !self.outer.contains_ring(&other.outer) {
            return false;
        }
        // Every hole of `self` must sit inside one of `other`'s holes or
        // outside `other` altogether.
        self.holes.iter().all(|hole| {
            let probe = hole.points()[0];
            !other.outer.contains_point(&probe) || other.holes.iter().any(|h| h.contains_ring(hole))
        })
    }
}
