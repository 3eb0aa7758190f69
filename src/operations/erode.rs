use tracing::debug;

use crate::contour::{ContourParams, FindContours, ScalarGrid};
use crate::error::{OperationError, Result};
use crate::math::distance_2d::SegmentIndex;
use crate::math::polygon_2d::{inside_by_crossings, scanline_crossings};
use crate::math::Point2;
use crate::polygon::{BuildPolygons, PolygonWithHoles, Ring};

/// Smallest eroded ring worth keeping, in traced vertices.
const MIN_ERODED_POINTS: usize = 4;

/// Shrinks a polygon inward by a fixed distance (negative buffer).
///
/// The signed distance to the polygon boundary (positive inside) is sampled on
/// a regular grid and the iso-line at `distance` is traced back into
/// polygons. Thin strokes therefore vanish and necks split into separate
/// parts instead of producing self-intersecting outlines. The traced rings
/// never cross the input boundary, which keeps the later cap triangulation
/// well-formed.
#[derive(Debug)]
pub struct Erode<'a> {
    polygon: &'a PolygonWithHoles,
    distance: f64,
    step: f64,
}

impl<'a> Erode<'a> {
    /// Creates a new `Erode` operation sampling at one unit per grid step.
    #[must_use]
    pub fn new(polygon: &'a PolygonWithHoles, distance: f64) -> Self {
        Self {
            polygon,
            distance,
            step: 1.0,
        }
    }

    /// Sets the sampling step of the distance grid.
    #[must_use]
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Executes the erosion, returning the surviving parts from the largest
    /// area down. An empty result means the polygon eroded away.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the distance or the step is
    /// not a positive finite number.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn execute(&self) -> Result<Vec<PolygonWithHoles>> {
        let (distance, step) = (self.distance, self.step);
        if !distance.is_finite() || distance <= 0.0 {
            return Err(OperationError::InvalidInput(format!(
                "erosion distance must be positive, got {distance}"
            ))
            .into());
        }
        if !step.is_finite() || step <= 0.0 {
            return Err(OperationError::InvalidInput(format!(
                "erosion grid step must be positive, got {step}"
            ))
            .into());
        }

        let outer = self.polygon.outer();
        let (min, max) = (outer.min(), outer.max());
        let origin = Point2::new(min.x - step, min.y - step);
        let nx = ((max.x - min.x) / step).ceil() as usize + 3;
        let ny = ((max.y - min.y) / step).ceil() as usize + 3;

        // The distance field is 1-Lipschitz, so a sample at least
        // `distance + 2 * step` deep has every neighbour of its cells above
        // the level and its exact value no longer matters.
        let cap = distance + 2.0 * step;
        let index = SegmentIndex::new(self.polygon.rings().map(Ring::points), cap);
        let rows: Vec<Vec<f64>> = (0..ny)
            .map(|j| {
                let mut crossings = Vec::new();
                let y = origin.y + j as f64 * step;
                scanline_crossings(self.polygon.rings().map(Ring::points), y, &mut crossings);
                crossings
            })
            .collect();
        let mut sample = 0usize;
        let grid = ScalarGrid::from_fn(nx, ny, origin, step, |p| {
            let row = &rows[sample / nx];
            sample += 1;
            if inside_by_crossings(row, p.x) {
                index.distance_within(&p, cap)
            } else {
                -step
            }
        });

        let contours = FindContours::new(&grid)
            .with_params(ContourParams {
                level: distance,
                min_points: MIN_ERODED_POINTS,
            })
            .execute()?;
        let mut parts = BuildPolygons::new(contours).execute()?;
        parts.sort_by(|a, b| b.area().total_cmp(&a.area()));

        debug!(
            parts = parts.len(),
            grid_nx = nx,
            grid_ny = ny,
            "eroded polygon by {distance}"
        );
        Ok(parts)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rect(x0: f64, y0: f64, w: f64, h: f64) -> Ring {
        Ring::new(vec![
            Point2::new(x0, y0),
            Point2::new(x0 + w, y0),
            Point2::new(x0 + w, y0 + h),
            Point2::new(x0, y0 + h),
        ])
        .unwrap()
    }

    #[test]
    fn square_shrinks_by_distance() {
        let poly = PolygonWithHoles::new(rect(0.0, 0.0, 20.0, 20.0), vec![]);
        let parts = Erode::new(&poly, 2.0).with_step(0.5).execute().unwrap();
        assert_eq!(parts.len(), 1);
        let inner = &parts[0];
        assert!(poly.contains_polygon(inner));
        assert!((inner.outer().min().x - 2.0).abs() < 0.3);
        assert!((inner.outer().max().y - 18.0).abs() < 0.3);
        // 16x16 square, corners are sharp for an inward offset.
        assert!((inner.area() - 256.0).abs() < 8.0, "area {}", inner.area());
    }

    #[test]
    fn thin_stroke_erodes_away() {
        // 3 units wide, eroding by 2 needs at least 4.
        let poly = PolygonWithHoles::new(rect(0.0, 0.0, 3.0, 40.0), vec![]);
        let parts = Erode::new(&poly, 2.0).execute().unwrap();
        assert!(parts.is_empty());
    }

    #[test]
    fn hole_grows_while_outer_shrinks() {
        let poly = PolygonWithHoles::new(rect(0.0, 0.0, 30.0, 30.0), vec![rect(10.0, 10.0, 10.0, 10.0)]);
        let parts = Erode::new(&poly, 2.0).with_step(0.5).execute().unwrap();
        assert_eq!(parts.len(), 1);
        let inner = &parts[0];
        assert_eq!(inner.holes().len(), 1);
        let hole = &inner.holes()[0];
        assert!(hole.min().x < 8.5 && hole.max().x > 21.5);
        assert!(poly.contains_polygon(inner));
    }

    #[test]
    fn dumbbell_splits_into_two_parts() {
        // Two 12x12 blocks joined by a 2-unit neck.
        let ring = Ring::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(12.0, 0.0),
            Point2::new(12.0, 5.0),
            Point2::new(20.0, 5.0),
            Point2::new(20.0, 0.0),
            Point2::new(32.0, 0.0),
            Point2::new(32.0, 12.0),
            Point2::new(20.0, 12.0),
            Point2::new(20.0, 7.0),
            Point2::new(12.0, 7.0),
            Point2::new(12.0, 12.0),
            Point2::new(0.0, 12.0),
        ])
        .unwrap();
        let poly = PolygonWithHoles::new(ring, vec![]);
        let parts = Erode::new(&poly, 2.0).with_step(0.5).execute().unwrap();
        assert_eq!(parts.len(), 2);
        assert!(parts[0].area() >= parts[1].area());
    }

    #[test]
    fn non_positive_distance_is_rejected() {
        let poly = PolygonWithHoles::new(rect(0.0, 0.0, 10.0, 10.0), vec![]);
        assert!(Erode::new(&poly, 0.0).execute().is_err());
        assert!(Erode::new(&poly, -1.0).execute().is_err());
        assert!(Erode::new(&poly, 1.0).with_step(0.0).execute().is_err());
    }

    #[test]
    fn large_finely_segmented_disc_erodes_to_smaller_disc() {
        let n: u32 = 2000;
        let radius = 300.0;
        let points = (0..n)
            .map(|k| {
                let a = std::f64::consts::TAU * f64::from(k) / f64::from(n);
                Point2::new(radius * a.cos(), radius * a.sin())
            })
            .collect();
        let poly = PolygonWithHoles::new(Ring::new(points).unwrap(), vec![]);
        let parts = Erode::new(&poly, 5.0).execute().unwrap();
        assert_eq!(parts.len(), 1);
        let expected = std::f64::consts::PI * 295.0 * 295.0;
        assert!((parts[0].area() - expected).abs() / expected < 0.01, "area {}", parts[0].area());
    }
}
