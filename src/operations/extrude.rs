use crate::error::{OperationError, Result};
use crate::math::{Point2, Point3};
use crate::polygon::PolygonWithHoles;
use crate::tessellation::{TriangleMesh, TriangulateRegion};

/// A polygon with holes swept along +Z between two heights.
#[derive(Debug, Clone, PartialEq)]
pub struct Prism {
    /// The cross-section.
    pub profile: PolygonWithHoles,
    /// Height of the bottom cap.
    pub z_min: f64,
    /// Height of the top cap.
    pub z_max: f64,
}

impl Prism {
    /// Height of the prism.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.z_max - self.z_min
    }

    /// Exact enclosed volume.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.profile.area() * self.height()
    }

    /// Tessellates the closed prism with outward-facing triangles.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be triangulated.
    pub fn tessellate(&self) -> Result<TriangleMesh> {
        let mut mesh = TriangleMesh::default();
        let rings = profile_rings(&self.profile);
        push_cap(&mut mesh, &rings, self.z_max, true)?;
        push_cap(&mut mesh, &rings, self.z_min, false)?;
        push_walls(&mut mesh, &self.profile, self.z_min, self.z_max, true);
        Ok(mesh)
    }
}

/// Extrudes a polygon with holes from `z = 0` up to a given height.
pub struct ExtrudePolygon {
    polygon: PolygonWithHoles,
    height: f64,
}

impl ExtrudePolygon {
    /// Creates a new `ExtrudePolygon` operation.
    #[must_use]
    pub fn new(polygon: PolygonWithHoles, height: f64) -> Self {
        Self { polygon, height }
    }

    /// Executes the extrusion.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the height is not a
    /// positive finite number.
    pub fn execute(self) -> Result<Prism> {
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(OperationError::InvalidInput(format!(
                "extrusion height must be positive, got {}",
                self.height
            ))
            .into());
        }
        Ok(Prism {
            profile: self.polygon,
            z_min: 0.0,
            z_max: self.height,
        })
    }
}

pub(crate) fn profile_rings(profile: &PolygonWithHoles) -> Vec<&[Point2]> {
    profile.rings().map(crate::polygon::Ring::points).collect()
}

/// Appends a horizontal cap covering the even-odd region of `rings` at
/// height `z`, facing +Z when `up` and -Z otherwise.
pub(crate) fn push_cap(mesh: &mut TriangleMesh, rings: &[&[Point2]], z: f64, up: bool) -> Result<()> {
    let triangles = TriangulateRegion::new(rings.to_vec()).execute()?;
    for [a, b, c] in triangles {
        let (a, b, c) = (lift(a, z), lift(b, z), lift(c, z));
        if up {
            mesh.push_triangle(a, b, c);
        } else {
            mesh.push_triangle(a, c, b);
        }
    }
    Ok(())
}

/// Appends the vertical walls of every ring of `profile` between `z0` and
/// `z1`. With `outward` the normals point away from the material, otherwise
/// into it (cavity walls).
pub(crate) fn push_walls(
    mesh: &mut TriangleMesh,
    profile: &PolygonWithHoles,
    z0: f64,
    z1: f64,
    outward: bool,
) {
    // Outer rings run counter-clockwise and holes clockwise, so the material
    // is always on the left and the outward side on the right.
    for ring in profile.rings() {
        let pts = ring.points();
        let n = pts.len();
        for i in 0..n {
            let (p, q) = (pts[i], pts[(i + 1) % n]);
            let (a0, b0) = (lift(p, z0), lift(q, z0));
            let (a1, b1) = (lift(p, z1), lift(q, z1));
            if outward {
                mesh.push_triangle(a0, b0, b1);
                mesh.push_triangle(a0, b1, a1);
            } else {
                mesh.push_triangle(a0, b1, b0);
                mesh.push_triangle(a0, a1, b1);
            }
        }
    }
}

fn lift(p: Point2, z: f64) -> Point3 {
    Point3::new(p.x, p.y, z)
}
