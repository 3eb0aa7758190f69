mod triangulate_region;

pub use triangulate_region::TriangulateRegion;

use std::collections::HashSet;

use crate::math::{Point3, Vector3};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Returns `true` if `other` lies strictly inside this box on every axis.
    #[must_use]
    pub fn strictly_contains(&self, other: &Aabb) -> bool {
        (0..3).all(|k| other.min[k] > self.min[k] && other.max[k] < self.max[k])
    }
}

/// A triangle soup: vertex positions plus index triples.
///
/// Counter-clockwise winding (seen from outside) marks the outward side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Returns `true` if the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Appends a triangle given by its corner positions.
    #[allow(clippy::cast_possible_truncation)]
    pub fn push_triangle(&mut self, a: Point3, b: Point3, c: Point3) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&[a, b, c]);
        self.indices.push([base, base + 1, base + 2]);
    }

    /// Appends all triangles of `other`. Shared vertices are not merged.
    #[allow(clippy::cast_possible_truncation)]
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices
            .extend(other.indices.iter().map(|t| [t[0] + offset, t[1] + offset, t[2] + offset]));
    }

    /// Concatenates meshes into one, keeping every vertex.
    #[must_use]
    pub fn concatenate(meshes: impl IntoIterator<Item = TriangleMesh>) -> TriangleMesh {
        meshes.into_iter().fold(TriangleMesh::default(), |mut acc, mesh| {
            acc.merge(&mesh);
            acc
        })
    }

    /// Returns the corner positions of triangle `i`.
    #[must_use]
    pub fn triangle(&self, i: usize) -> [Point3; 3] {
        let [a, b, c] = self.indices[i];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    /// Unit normal of triangle `i` from its winding, zero if degenerate.
    #[must_use]
    pub fn face_normal(&self, i: usize) -> Vector3 {
        let [a, b, c] = self.triangle(i);
        (b - a).cross(&(c - a)).try_normalize(1e-30).unwrap_or_else(Vector3::zeros)
    }

    /// Axis-aligned bounds of the vertices, `None` for a mesh without vertices.
    #[must_use]
    pub fn bounds(&self) -> Option<Aabb> {
        let first = *self.vertices.first()?;
        let (min, max) = self.vertices.iter().fold((first, first), |(lo, hi), p| {
            (lo.inf(p), hi.sup(p))
        });
        Some(Aabb { min, max })
    }

    /// Signed enclosed volume using the signed tetrahedron method.
    ///
    /// Positive when the triangles face outward.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        (0..self.indices.len())
            .map(|i| {
                let [v0, v1, v2] = self.triangle(i);
                v0.coords.dot(&v1.coords.cross(&v2.coords))
            })
            .sum::<f64>()
            / 6.0
    }

    /// Returns the mesh with every triangle's winding reversed.
    #[must_use]
    pub fn reversed(mut self) -> Self {
        for tri in &mut self.indices {
            tri.swap(1, 2);
        }
        self
    }

    /// Returns the mesh with every vertex moved by `f`.
    #[must_use]
    pub fn map_vertices(mut self, f: impl Fn(&Point3) -> Point3) -> Self {
        for v in &mut self.vertices {
            *v = f(v);
        }
        self
    }

    /// Number of distinct referenced vertex positions at single precision,
    /// which is what an STL reader recovers after welding.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn unique_vertex_count(&self) -> usize {
        self.indices
            .iter()
            .flatten()
            .map(|&i| {
                let v = self.vertices[i as usize];
                // Adding zero folds -0.0 into 0.0.
                [
                    (v.x as f32 + 0.0).to_bits(),
                    (v.y as f32 + 0.0).to_bits(),
                    (v.z as f32 + 0.0).to_bits(),
                ]
            })
            .collect::<HashSet<_>>()
            .len()
    }
}
