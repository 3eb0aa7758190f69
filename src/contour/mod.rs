mod find_contours;

pub use find_contours::FindContours;

use crate::math::{polygon_2d::signed_area_2d, Point2};
use crate::raster::GlyphImage;

/// Parameters controlling contour extraction.
#[derive(Debug, Clone, Copy)]
pub struct ContourParams {
    /// Iso level separating background from ink.
    pub level: f64,
    /// Contours with fewer vertices than this are dropped as noise.
    pub min_points: usize,
}

impl Default for ContourParams {
    fn default() -> Self {
        Self {
            level: 0.5,
            min_points: 8,
        }
    }
}

/// A closed polyline traced at an iso level. The last point is not repeated.
///
/// The region above the level lies to the left of the walking direction,
/// so outer boundaries run counter-clockwise and holes clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    /// The ordered vertices.
    pub points: Vec<Point2>,
}

impl Contour {
    /// Signed area (positive for counter-clockwise).
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        signed_area_2d(&self.points)
    }
}

/// A regular grid of scalar samples with y growing upward.
///
/// Sample `(i, j)` sits at `origin + (i * spacing, j * spacing)`.
#[derive(Debug, Clone)]
pub struct ScalarGrid {
    nx: usize,
    ny: usize,
    origin: Point2,
    spacing: f64,
    values: Vec<f64>,
}

impl ScalarGrid {
    /// Creates a grid by evaluating `f` at every sample position.
    ///
    /// Samples are visited row by row, `i` varying fastest.
    pub fn from_fn(
        nx: usize,
        ny: usize,
        origin: Point2,
        spacing: f64,
        mut f: impl FnMut(Point2) -> f64,
    ) -> Self {
        let mut values = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                values.push(f(sample_position(origin, spacing, i, j)));
            }
        }
        Self {
            nx,
            ny,
            origin,
            spacing,
            values,
        }
    }

    /// Converts an image into a grid in pixel units.
    ///
    /// Rows are flipped so y grows upward, and a one-sample background border
    /// is added on every side so every traced contour closes. Pixel `(x, row)`
    /// of the image lands at world position `(x, height - 1 - row)`.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_image(image: &GlyphImage) -> Self {
        let (w, h) = (image.width(), image.height());
        let nx = w + 2;
        let ny = h + 2;
        let mut values = vec![0.0; nx * ny];
        for row in 0..h {
            let j = h - row;
            for x in 0..w {
                values[j * nx + x + 1] = f64::from(image.get(x, row));
            }
        }
        Self {
            nx,
            ny,
            origin: Point2::new(-1.0, -1.0),
            spacing: 1.0,
            values,
        }
    }

    /// Number of samples along x.
    #[must_use]
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Number of samples along y.
    #[must_use]
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Sample value at `(i, j)`.
    #[must_use]
    pub fn value(&self, i: usize, j: usize) -> f64 {
        self.values[j * self.nx + i]
    }

    /// World position of sample `(i, j)`.
    #[must_use]
    pub fn position(&self, i: usize, j: usize) -> Point2 {
        sample_position(self.origin, self.spacing, i, j)
    }
}

#[allow(clippy::cast_precision_loss)]
fn sample_position(origin: Point2, spacing: f64, i: usize, j: usize) -> Point2 {
    Point2::new(
        origin.x + i as f64 * spacing,
        origin.y + j as f64 * spacing,
    )
}
