use slotmap::{new_key_type, SlotMap};
use tracing::debug;

use crate::contour::Contour;
use crate::error::Result;

use super::{PolygonWithHoles, Ring};

new_key_type! {
    /// Key of a contour waiting to be assigned to a polygon.
    struct RingId;
}

/// Groups traced contours into polygons with holes.
///
/// Each contour is consumed at most once: either as the outer ring of a
/// polygon or as a hole of one. Candidates are visited from the largest area
/// down so an outer boundary is always seen before the holes it encloses.
/// The remaining rings directly inside the current outer ring become its
/// holes. A ring nested inside one of those holes (an island, like the letter
/// inside "®") is left for a later pass and becomes an outer ring itself.
pub struct BuildPolygons {
    contours: Vec<Contour>,
}

impl BuildPolygons {
    /// Creates a new `BuildPolygons` operation.
    #[must_use]
    pub fn new(contours: Vec<Contour>) -> Self {
        Self { contours }
    }

    /// Executes the grouping.
    ///
    /// Degenerate contours (fewer than 3 points, zero area) are dropped.
    ///
    /// # Errors
    ///
    /// Currently infallible; kept fallible to match the other operations.
    pub fn execute(self) -> Result<Vec<PolygonWithHoles>> {
        let mut pending: SlotMap<RingId, Ring> = SlotMap::with_key();
        let mut dropped = 0usize;
        for contour in self.contours {
            match Ring::new(contour.points) {
                Ok(ring) => {
                    pending.insert(ring);
                }
                Err(_) => dropped += 1,
            }
        }

        let mut order: Vec<RingId> = pending.keys().collect();
        order.sort_by(|a, b| pending[*b].area().total_cmp(&pending[*a].area()));

        let mut polygons = Vec::new();
        for id in order {
            let Some(outer) = pending.remove(id) else {
                // Already taken as a hole.
                continue;
            };
            let inside: Vec<RingId> = pending
                .iter()
                .filter(|(_, ring)| outer.contains_ring(ring))
                .map(|(ring_id, _)| ring_id)
                .collect();
            let hole_ids: Vec<RingId> = inside
                .iter()
                .copied()
                .filter(|&candidate| {
                    !inside.iter().any(|&other| {
                        other != candidate && pending[other].contains_ring(&pending[candidate])
                    })
                })
                .collect();
            let holes = hole_ids
                .into_iter()
                .filter_map(|hole_id| pending.remove(hole_id))
                .collect();
            polygons.push(PolygonWithHoles::new(outer, holes));
        }

        debug!(
            polygons = polygons.len(),
            dropped, "grouped contours into polygons"
        );
        Ok(polygons)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::contour::{FindContours, ScalarGrid};
    use crate::math::Point2;
    use crate::raster::GlyphImage;

    fn rect(x0: f64, y0: f64, w: f64, h: f64, ccw: bool) -> Contour {
        let mut points = vec![
            Point2::new(x0, y0),
            Point2::new(x0 + w, y0),
            Point2::new(x0 + w, y0 + h),
            Point2::new(x0, y0 + h),
        ];
        if !ccw {
            points.reverse();
        }
        Contour { points }
    }

    fn polygons_from(rows: &[&str]) -> Vec<PolygonWithHoles> {
        let grid = ScalarGrid::from_image(&GlyphImage::from_ascii(rows));
        let contours = FindContours::new(&grid).execute().unwrap();
        BuildPolygons::new(contours).execute().unwrap()
    }

    #[test]
    fn letter_o_has_one_outer_and_one_hole() {
        let polygons = polygons_from(&[
            "..........",
            "..######..",
            ".########.",
            ".##....##.",
            ".##....##.",
            ".##....##.",
            ".########.",
            "..######..",
            "..........",
        ]);
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].holes().len(), 1);
        assert!(polygons[0].outer().area() > polygons[0].holes()[0].area());
    }

    #[test]
    fn letter_b_like_shape_has_two_holes() {
        let polygons = polygons_from(&[
            "..........",
            ".#######..",
            ".##...##..",
            ".##...##..",
            ".#######..",
            ".##....##.",
            ".##....##.",
            ".########.",
            "..........",
        ]);
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].holes().len(), 2);
    }

    #[test]
    fn separate_glyphs_become_separate_polygons() {
        let polygons = polygons_from(&[
            "...........",
            ".###..###..",
            ".###..###..",
            ".###..###..",
            ".###..###..",
            "...........",
        ]);
        assert_eq!(polygons.len(), 2);
        assert!(polygons.iter().all(|p| p.holes().is_empty()));
    }

    #[test]
    fn hole_listed_before_outer_is_still_a_hole() {
        let contours = vec![rect(2.0, 2.0, 2.0, 2.0, false), rect(0.0, 0.0, 10.0, 10.0, true)];
        let polygons = BuildPolygons::new(contours).execute().unwrap();
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].holes().len(), 1);
    }

    #[test]
    fn island_inside_hole_becomes_its_own_polygon() {
        let contours = vec![
            rect(0.0, 0.0, 10.0, 10.0, true),
            rect(2.0, 2.0, 6.0, 6.0, false),
            rect(4.0, 4.0, 2.0, 2.0, true),
        ];
        let polygons = BuildPolygons::new(contours).execute().unwrap();
        assert_eq!(polygons.len(), 2);
        assert_eq!(polygons[0].holes().len(), 1);
        assert!((polygons[0].area() - 64.0).abs() < 1e-9);
        assert!(polygons[1].holes().is_empty());
        assert!((polygons[1].area() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn four_levels_give_two_rings_with_holes() {
        let contours = vec![
            rect(0.0, 0.0, 20.0, 20.0, true),
            rect(2.0, 2.0, 16.0, 16.0, false),
            rect(4.0, 4.0, 12.0, 12.0, true),
            rect(6.0, 6.0, 8.0, 8.0, false),
        ];
        let polygons = BuildPolygons::new(contours).execute().unwrap();
        assert_eq!(polygons.len(), 2);
        assert!(polygons.iter().all(|p| p.holes().len() == 1));
        assert!((polygons[1].area() - (144.0 - 64.0)).abs() < 1e-9);
    }

    #[test]
    fn degenerate_contours_are_dropped() {
        let contours = vec![
            Contour {
                points: vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)],
            },
            rect(0.0, 0.0, 1.0, 1.0, true),
        ];
        let polygons = BuildPolygons::new(contours).execute().unwrap();
        assert_eq!(polygons.len(), 1);
    }
}
