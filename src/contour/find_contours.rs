use std::collections::HashMap;

use tracing::debug;

use crate::error::{OperationError, Result};
use crate::math::polygon_2d::{dedup_closed, merge_collinear_closed, rotate_to_canonical_start};
use crate::math::Point2;

use super::{Contour, ContourParams, ScalarGrid};

/// Keeps interpolated crossings off the grid samples so that two different
/// edges never produce the same point.
const EDGE_T_MARGIN: f64 = 1e-6;

/// A grid edge carrying a level crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum EdgeKey {
    /// Between samples `(i, j)` and `(i + 1, j)`.
    Horizontal(usize, usize),
    /// Between samples `(i, j)` and `(i, j + 1)`.
    Vertical(usize, usize),
}

/// Traces closed iso-level contours on a [`ScalarGrid`] with marching squares.
///
/// Crossings are linearly interpolated along cell edges. Saddle cells are
/// resolved with the average of the four corners. Output contours keep the
/// region above the level on their left.
pub struct FindContours<'a> {
    grid: &'a ScalarGrid,
    params: ContourParams,
}

impl<'a> FindContours<'a> {
    /// Creates a new `FindContours` operation with default parameters.
    #[must_use]
    pub fn new(grid: &'a ScalarGrid) -> Self {
        Self {
            grid,
            params: ContourParams::default(),
        }
    }

    /// Sets custom contour parameters.
    #[must_use]
    pub fn with_params(mut self, params: ContourParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the trace.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the level is not finite.
    pub fn execute(&self) -> Result<Vec<Contour>> {
        let level = self.params.level;
        if !level.is_finite() {
            return Err(OperationError::InvalidInput(format!(
                "contour level must be finite, got {level}"
            ))
            .into());
        }

        let grid = self.grid;
        if grid.nx() < 2 || grid.ny() < 2 {
            return Ok(Vec::new());
        }

        let mut next_edge: HashMap<EdgeKey, EdgeKey> = HashMap::new();
        let mut starts: Vec<EdgeKey> = Vec::new();

        for j in 0..grid.ny() - 1 {
            for i in 0..grid.nx() - 1 {
                for (from, to) in cell_segments(grid, i, j, level) {
                    next_edge.insert(from, to);
                    starts.push(from);
                }
            }
        }

        let mut contours = Vec::new();
        let mut open = 0usize;
        let mut noise = 0usize;

        for start in starts {
            if !next_edge.contains_key(&start) {
                continue;
            }
            let mut points = Vec::new();
            let mut current = start;
            let mut closed = false;
            while let Some(next) = next_edge.remove(&current) {
                points.push(edge_point(grid, current, level));
                current = next;
                if current == start {
                    closed = true;
                    break;
                }
            }
            if !closed {
                open += 1;
                continue;
            }

            let points = dedup_closed(&points, grid.spacing * 1e-9);
            if points.len() < self.params.min_points.max(3) {
                noise += 1;
                continue;
            }
            let points = merge_collinear_closed(&points, grid.spacing * grid.spacing * 1e-9);
            contours.push(Contour {
                points: rotate_to_canonical_start(&points),
            });
        }

        debug!(
            contours = contours.len(),
            noise, open, "traced contours at level {level}"
        );
        Ok(contours)
    }
}

/// Returns the directed segments crossing cell `(i, j)`.
///
/// Corners are visited counter-clockwise; each segment runs from an edge
/// leaving the inside region to an edge entering it.
fn cell_segments(
    grid: &ScalarGrid,
    i: usize,
    j: usize,
    level: f64,
) -> impl Iterator<Item = (EdgeKey, EdgeKey)> {
    let corners = [
        grid.value(i, j),
        grid.value(i + 1, j),
        grid.value(i + 1, j + 1),
        grid.value(i, j + 1),
    ];
    let edges = [
        EdgeKey::Horizontal(i, j),
        EdgeKey::Vertical(i + 1, j),
        EdgeKey::Horizontal(i, j + 1),
        EdgeKey::Vertical(i, j),
    ];
    let inside = corners.map(|v| v > level);

    let leaving: Vec<usize> = (0..4).filter(|&k| inside[k] && !inside[(k + 1) % 4]).collect();
    let entering: Vec<usize> = (0..4).filter(|&k| !inside[k] && inside[(k + 1) % 4]).collect();

    let mut segments = Vec::with_capacity(2);
    match (leaving.as_slice(), entering.as_slice()) {
        ([from], [to]) => segments.push((edges[*from], edges[*to])),
        ([a, b], [_, _]) => {
            let center = corners.iter().sum::<f64>() * 0.25;
            // Connected center: cut off the outside corners. Otherwise cut
            // off the inside corners.
            let step = if center > level { 1 } else { 3 };
            for &from in &[*a, *b] {
                segments.push((edges[from], edges[(from + step) % 4]));
            }
        }
        _ => {}
    }
    segments.into_iter()
}

/// Interpolated crossing point on a grid edge.
fn edge_point(grid: &ScalarGrid, edge: EdgeKey, level: f64) -> Point2 {
    let (a_idx, b_idx) = match edge {
        EdgeKey::Horizontal(i, j) => ((i, j), (i + 1, j)),
        EdgeKey::Vertical(i, j) => ((i, j), (i, j + 1)),
    };
    let a = grid.value(a_idx.0, a_idx.1);
    let b = grid.value(b_idx.0, b_idx.1);
    let t = ((level - a) / (b - a)).clamp(EDGE_T_MARGIN, 1.0 - EDGE_T_MARGIN);
    let pa = grid.position(a_idx.0, a_idx.1);
    let pb = grid.position(b_idx.0, b_idx.1);
    pa + (pb - pa) * t
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::raster::GlyphImage;

    fn trace(rows: &[&str], min_points: usize) -> Vec<Contour> {
        let grid = ScalarGrid::from_image(&GlyphImage::from_ascii(rows));
        FindContours::new(&grid)
            .with_params(ContourParams {
                level: 0.5,
                min_points,
            })
            .execute()
            .unwrap()
    }

    #[test]
    fn single_block_gives_one_ccw_contour() {
        let contours = trace(&["....", ".##.", ".##.", "...."], 3);
        assert_eq!(contours.len(), 1);
        let area = contours[0].signed_area();
        assert!(area > 0.0, "outer boundary should be counter-clockwise");
        // Half-pixel octagon: 2x2 box minus four corner triangles.
        assert!((area - 3.5).abs() < 1e-9, "area was {area}");
    }

    #[test]
    fn ring_gives_outer_and_hole() {
        let contours = trace(
            &[
                ".......",
                ".#####.",
                ".#...#.",
                ".#...#.",
                ".#...#.",
                ".#####.",
                ".......",
            ],
            3,
        );
        assert_eq!(contours.len(), 2);
        let positive = contours.iter().filter(|c| c.signed_area() > 0.0).count();
        let negative = contours.iter().filter(|c| c.signed_area() < 0.0).count();
        assert_eq!((positive, negative), (1, 1));
    }

    #[test]
    fn two_blocks_give_two_contours() {
        let contours = trace(&["##..##", "##..##"], 3);
        assert_eq!(contours.len(), 2);
        assert!(contours.iter().all(|c| c.signed_area() > 0.0));
    }

    #[test]
    fn small_specks_are_dropped_as_noise() {
        // A lone pixel traces a 4-point diamond.
        let contours = trace(&["#....", ".....", "..###", "..###", "..###"], 8);
        assert_eq!(contours.len(), 1);
        assert!(contours[0].signed_area() > 4.0);
    }

    #[test]
    fn blank_image_has_no_contours() {
        assert!(trace(&["....", "...."], 3).is_empty());
    }

    #[test]
    fn diagonal_saddle_keeps_pixels_separate() {
        // Center average 0.5 is not above the level, so the pixels stay apart.
        let contours = trace(&["#.", ".#"], 3);
        assert_eq!(contours.len(), 2);
    }

    #[test]
    fn non_finite_level_is_rejected() {
        let grid = ScalarGrid::from_image(&GlyphImage::from_ascii(&["#"]));
        let result = FindContours::new(&grid)
            .with_params(ContourParams {
                level: f64::NAN,
                min_points: 3,
            })
            .execute();
        assert!(result.is_err());
    }

    #[test]
    fn contours_on_sampled_field_follow_level_set() {
        let grid = ScalarGrid::from_fn(41, 41, Point2::new(-10.0, -10.0), 0.5, |p| {
            5.0 - p.coords.norm()
        });
        let contours = FindContours::new(&grid)
            .with_params(ContourParams {
                level: 1.0,
                min_points: 8,
            })
            .execute()
            .unwrap();
        assert_eq!(contours.len(), 1);
        for p in &contours[0].points {
            assert!((p.coords.norm() - 4.0).abs() < 0.05);
        }
    }
}
