use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::FixedFaceHandle;
use spade::{
    ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation,
};

use crate::error::{Result, TessellationError};
use crate::math::polygon_2d::signed_area_2d;
use crate::math::Point2;

/// Triangulates the even-odd region bounded by a set of closed rings.
///
/// Rings must not cross each other. A point belongs to the region when it is
/// enclosed by an odd number of rings, so an outer ring with holes, or a
/// polygon minus a smaller polygon nested inside it, both come out right
/// without knowing which ring is which.
pub struct TriangulateRegion<'a> {
    rings: Vec<&'a [Point2]>,
}

impl<'a> TriangulateRegion<'a> {
    /// Creates a new `TriangulateRegion` operation.
    #[must_use]
    pub fn new(rings: Vec<&'a [Point2]>) -> Self {
        Self { rings }
    }

    /// Executes the triangulation, returning counter-clockwise triangles.
    ///
    /// # Errors
    ///
    /// Returns [`TessellationError::Failed`] if a ring has fewer than three
    /// points, a point cannot be inserted, or two ring edges cross.
    pub fn execute(&self) -> Result<Vec<[Point2; 3]>> {
        let mut cdt = ConstrainedDelaunayTriangulation::<SpadePoint2<f64>>::new();
        for ring in &self.rings {
            insert_constraint_loop(&mut cdt, ring)?;
        }

        let interior = classify_interior_faces(&cdt);

        let mut triangles = Vec::with_capacity(interior.len());
        for face in cdt.inner_faces() {
            if !interior.contains(&face.fix().index()) {
                continue;
            }
            let [a, b, c] = face.vertices().map(|v| {
                let pos = v.position();
                Point2::new(pos.x, pos.y)
            });
            let area = signed_area_2d(&[a, b, c]);
            if area > 0.0 {
                triangles.push([a, b, c]);
            } else if area < 0.0 {
                triangles.push([a, c, b]);
            }
        }

        Ok(triangles)
    }
}

fn insert_constraint_loop(
    cdt: &mut ConstrainedDelaunayTriangulation<SpadePoint2<f64>>,
    points: &[Point2],
) -> Result<()> {
    if points.len() < 3 {
        return Err(
            TessellationError::Failed("constraint loop needs at least 3 points".into()).into(),
        );
    }

    let mut handles = Vec::with_capacity(points.len());
    for pt in points {
        let h = cdt
            .insert(SpadePoint2::new(pt.x, pt.y))
            .map_err(|e: InsertionError| TessellationError::Failed(format!("CDT insert: {e}")))?;
        handles.push(h);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from == to {
            continue;
        }
        if !cdt.can_add_constraint(from, to) {
            return Err(TessellationError::Failed(format!(
                "ring edge at ({}, {}) crosses another ring",
                points[i].x, points[i].y
            ))
            .into());
        }
        cdt.add_constraint(from, to);
    }

    Ok(())
}

/// Classifies which inner faces of the CDT are inside the region using flood-fill.
///
/// Starts from faces adjacent to the outer (infinite) face at depth 0. Each time
/// a constraint edge is crossed, depth increments. Odd depth = interior.
fn classify_interior_faces(
    cdt: &ConstrainedDelaunayTriangulation<SpadePoint2<f64>>,
) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut depth_map: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<spade::handles::InnerTag>, u32)> = VecDeque::new();

    let outer_fix = cdt.outer_face().fix();

    for edge in cdt.directed_edges() {
        if edge.face().fix() == outer_fix {
            let rev_face = edge.rev().face();
            if let Some(inner) = rev_face.as_inner() {
                let idx = inner.fix().index();
                if depth_map.contains_key(&idx) {
                    continue;
                }
                let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
                depth_map.insert(idx, depth);
                if depth % 2 == 1 {
                    interior.insert(idx);
                }
                queue.push_back((inner.fix(), depth));
            }
        }
    }

    while let Some((face_fix, depth)) = queue.pop_front() {
        let face = cdt.face(face_fix);
        for edge in face.adjacent_edges() {
            let neighbor = edge.rev().face();
            if let Some(inner_neighbor) = neighbor.as_inner() {
                let n_idx = inner_neighbor.fix().index();
                if depth_map.contains_key(&n_idx) {
                    continue;
                }
                let new_depth = if cdt.is_constraint_edge(edge.as_undirected().fix()) {
                    depth + 1
                } else {
                    depth
                };
                depth_map.insert(n_idx, new_depth);
                if new_depth % 2 == 1 {
                    interior.insert(n_idx);
                }
                queue.push_back((inner_neighbor.fix(), new_depth));
            }
        }
    }

    interior
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Point2> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x0 + size, y0),
            Point2::new(x0 + size, y0 + size),
            Point2::new(x0, y0 + size),
        ]
    }

    fn total_area(triangles: &[[Point2; 3]]) -> f64 {
        triangles.iter().map(|t| signed_area_2d(t.as_slice())).sum()
    }

    #[test]
    fn square_gives_two_ccw_triangles() {
        let sq = square(0.0, 0.0, 2.0);
        let tris = TriangulateRegion::new(vec![sq.as_slice()]).execute().unwrap();
        assert_eq!(tris.len(), 2);
        assert!(tris.iter().all(|t| signed_area_2d(t) > 0.0));
        assert!((total_area(&tris) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn hole_is_excluded() {
        let outer = square(0.0, 0.0, 10.0);
        let hole = square(3.0, 3.0, 4.0);
        let tris = TriangulateRegion::new(vec![outer.as_slice(), hole.as_slice()]).execute().unwrap();
        assert!((total_area(&tris) - 84.0).abs() < 1e-9);
    }

    #[test]
    fn orientation_of_rings_does_not_matter() {
        let outer = square(0.0, 0.0, 10.0);
        let mut hole = square(3.0, 3.0, 4.0);
        hole.reverse();
        let tris = TriangulateRegion::new(vec![outer.as_slice(), hole.as_slice()]).execute().unwrap();
        assert!((total_area(&tris) - 84.0).abs() < 1e-9);
    }

    #[test]
    fn three_nested_rings_alternate() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(2.0, 2.0, 6.0);
        let c = square(4.0, 4.0, 2.0);
        let tris = TriangulateRegion::new(vec![a.as_slice(), b.as_slice(), c.as_slice()]).execute().unwrap();
        assert!((total_area(&tris) - (100.0 - 36.0 + 4.0)).abs() < 1e-9);
    }

    #[test]
    fn crossing_rings_are_rejected() {
        let a = square(0.0, 0.0, 4.0);
        let b = square(2.0, 2.0, 4.0);
        assert!(TriangulateRegion::new(vec![a.as_slice(), b.as_slice()]).execute().is_err());
    }

    #[test]
    fn short_ring_is_rejected() {
        let pts = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        assert!(TriangulateRegion::new(vec![pts.as_slice()]).execute().is_err());
    }
}
