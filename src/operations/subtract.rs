use crate::error::{OperationError, Result};
use crate::tessellation::TriangleMesh;

use super::extrude::{profile_rings, push_cap, push_walls, Prism};

/// Heights closer than this are treated as the same plane.
const Z_TOLERANCE: f64 = 1e-9;

/// The solid left after carving an inner prism out of an outer prism.
#[derive(Debug, Clone, PartialEq)]
pub struct HollowShell {
    outer: Prism,
    inner: Prism,
    open_bottom: bool,
}

impl HollowShell {
    /// The prism the material was carved from.
    #[must_use]
    pub fn outer(&self) -> &Prism {
        &self.outer
    }

    /// The carved-out cavity.
    #[must_use]
    pub fn inner(&self) -> &Prism {
        &self.inner
    }

    /// `true` when the cavity opens through the bottom cap.
    #[must_use]
    pub fn is_open_bottom(&self) -> bool {
        self.open_bottom
    }

    /// Exact material volume.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.outer.volume() - self.inner.volume()
    }

    /// Tessellates the shell with normals facing out of the material.
    ///
    /// # Errors
    ///
    /// Returns an error if a cap cannot be triangulated.
    pub fn tessellate(&self) -> Result<TriangleMesh> {
        let (outer, inner) = (&self.outer, &self.inner);
        let outer_rings = profile_rings(&outer.profile);
        let inner_rings = profile_rings(&inner.profile);

        let mut mesh = TriangleMesh::default();
        push_cap(&mut mesh, &outer_rings, outer.z_max, true)?;
        push_walls(&mut mesh, &outer.profile, outer.z_min, outer.z_max, true);

        if self.open_bottom {
            // Bottom is a frame: outer footprint minus the cavity mouth.
            let mut frame = outer_rings.clone();
            frame.extend_from_slice(&inner_rings);
            push_cap(&mut mesh, &frame, outer.z_min, false)?;
        } else {
            push_cap(&mut mesh, &outer_rings, outer.z_min, false)?;
            push_cap(&mut mesh, &inner_rings, inner.z_min, true)?;
        }

        // Cavity surfaces face into the void.
        push_walls(&mut mesh, &inner.profile, inner.z_min, inner.z_max, false);
        push_cap(&mut mesh, &inner_rings, inner.z_max, false)?;

        Ok(mesh)
    }
}

/// Subtracts an inner prism from an outer prism (outer − inner).
///
/// The inner prism must sit inside the outer one: its profile inside the
/// outer profile and its height range inside the outer range, strictly below
/// the top cap. When both share the bottom plane the cavity opens downward.
pub struct Subtract {
    outer: Prism,
    inner: Prism,
}

impl Subtract {
    /// Creates a new `Subtract` operation (outer − inner).
    #[must_use]
    pub fn new(outer: Prism, inner: Prism) -> Self {
        Self { outer, inner }
    }

    /// Executes the subtraction.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::Failed`] if the inner prism is not contained
    /// in the outer prism as described above.
    pub fn execute(self) -> Result<HollowShell> {
        let Self { outer, inner } = self;

        if inner.z_min < outer.z_min - Z_TOLERANCE {
            return Err(OperationError::Failed(
                "cavity extends below the outer solid".into(),
            )
            .into());
        }
        if inner.z_max >= outer.z_max - Z_TOLERANCE {
            return Err(OperationError::Failed(
                "cavity reaches the top cap of the outer solid".into(),
            )
            .into());
        }
        if inner.height() <= Z_TOLERANCE {
            return Err(OperationError::Failed("cavity has no height".into()).into());
        }
        if !outer.profile.contains_polygon(&inner.profile) {
            return Err(OperationError::Failed(
                "cavity profile is not inside the outer profile".into(),
            )
            .into());
        }

        let open_bottom = (inner.z_min - outer.z_min).abs() <= Z_TOLERANCE;
        Ok(HollowShell {
            outer,
            inner,
            open_bottom,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point2;
    use crate::polygon::{PolygonWithHoles, Ring};
    use approx::assert_relative_eq;

    fn rect(x0: f64, y0: f64, w: f64, h: f64) -> Ring {
        Ring::new(vec![
            Point2::new(x0, y0),
            Point2::new(x0 + w, y0),
            Point2::new(x0 + w, y0 + h),
            Point2::new(x0, y0 + h),
        ])
        .unwrap()
    }

    fn prism(ring: Ring, holes: Vec<Ring>, z_min: f64, z_max: f64) -> Prism {
        Prism {
            profile: PolygonWithHoles::new(ring, holes),
            z_min,
            z_max,
        }
    }

    #[test]
    fn open_bottom_cup_volume_matches() {
        let outer = prism(rect(0.0, 0.0, 10.0, 10.0), vec![], 0.0, 5.0);
        let inner = prism(rect(2.0, 2.0, 6.0, 6.0), vec![], 0.0, 3.0);
        let shell = Subtract::new(outer, inner).execute().unwrap();
        assert!(shell.is_open_bottom());
        let mesh = shell.tessellate().unwrap();
        assert_relative_eq!(shell.volume(), 500.0 - 108.0, epsilon = 1e-9);
        assert_relative_eq!(mesh.signed_volume(), shell.volume(), epsilon = 1e-6);
    }

    #[test]
    fn closed_cavity_volume_matches() {
        let outer = prism(rect(0.0, 0.0, 10.0, 10.0), vec![], 0.0, 5.0);
        let inner = prism(rect(2.0, 2.0, 6.0, 6.0), vec![], 1.0, 4.0);
        let shell = Subtract::new(outer, inner).execute().unwrap();
        assert!(!shell.is_open_bottom());
        let mesh = shell.tessellate().unwrap();
        assert_relative_eq!(mesh.signed_volume(), 500.0 - 108.0, epsilon = 1e-6);
    }

    #[test]
    fn shell_with_holes_in_both_profiles() {
        let outer = prism(rect(0.0, 0.0, 20.0, 20.0), vec![rect(8.0, 8.0, 4.0, 4.0)], 0.0, 4.0);
        let inner = prism(rect(2.0, 2.0, 16.0, 16.0), vec![rect(6.0, 6.0, 8.0, 8.0)], 0.0, 2.0);
        let shell = Subtract::new(outer, inner).execute().unwrap();
        let mesh = shell.tessellate().unwrap();
        let expected = (400.0 - 16.0) * 4.0 - (256.0 - 64.0) * 2.0;
        assert_relative_eq!(mesh.signed_volume(), expected, epsilon = 1e-6);
    }

    #[test]
    fn cavity_through_top_is_rejected() {
        let outer = prism(rect(0.0, 0.0, 10.0, 10.0), vec![], 0.0, 5.0);
        let inner = prism(rect(2.0, 2.0, 6.0, 6.0), vec![], 0.0, 5.0);
        assert!(Subtract::new(outer, inner).execute().is_err());
    }

    #[test]
    fn cavity_outside_profile_is_rejected() {
        let outer = prism(rect(0.0, 0.0, 10.0, 10.0), vec![], 0.0, 5.0);
        let inner = prism(rect(8.0, 2.0, 6.0, 6.0), vec![], 0.0, 3.0);
        assert!(Subtract::new(outer, inner).execute().is_err());
    }

    #[test]
    fn cavity_below_outer_is_rejected() {
        let outer = prism(rect(0.0, 0.0, 10.0, 10.0), vec![], 1.0, 5.0);
        let inner = prism(rect(2.0, 2.0, 6.0, 6.0), vec![], 0.0, 3.0);
        assert!(Subtract::new(outer, inner).execute().is_err());
    }
}
