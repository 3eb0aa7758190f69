//! Per-vertex deformations of the assembled mesh.
//!
//! Every function takes the mesh by value and returns the moved mesh; no
//! vertex depends on any other, so the order of vertices is irrelevant.

use crate::error::{OperationError, Result};
use crate::math::Point3;
use crate::tessellation::TriangleMesh;

/// Vertices this close to the lowest height count as lying on the base plane.
const BASE_TOLERANCE: f64 = 1e-9;

/// The deformation applied to the whole model, at most one per run.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Deformation {
    /// Leave the mesh as built.
    #[default]
    None,
    /// Quadratic bend of the top surface along the text direction.
    Bend {
        /// Height added at the far (minimum x) end.
        strength: f64,
    },
    /// Sinusoidal ripple of x along the extrusion axis.
    Wave {
        /// Peak displacement along x.
        amplitude: f64,
        /// Angular frequency per unit of z.
        frequency: f64,
    },
}

impl Deformation {
    /// Checks that all coefficients are finite.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] for NaN or infinite values.
    pub fn validate(&self) -> Result<()> {
        let finite = match *self {
            Self::None => true,
            Self::Bend { strength } => strength.is_finite(),
            Self::Wave {
                amplitude,
                frequency,
            } => amplitude.is_finite() && frequency.is_finite(),
        };
        if finite {
            Ok(())
        } else {
            Err(OperationError::InvalidInput(format!("non-finite deformation {self:?}")).into())
        }
    }

    /// Applies the deformation.
    #[must_use]
    pub fn apply(self, mesh: TriangleMesh) -> TriangleMesh {
        match self {
            Self::None => mesh,
            Self::Bend { strength } => bend(mesh, strength),
            Self::Wave {
                amplitude,
                frequency,
            } => wave(mesh, amplitude, frequency),
        }
    }
}

/// Lifts every vertex above the base plane by `strength * n²`, where
/// `n = (x_max - x) / (x_max - x_min)`.
///
/// Vertices on the base plane stay put so the printed bottom remains flat.
/// A zero strength or a mesh without horizontal extent is returned unchanged.
#[must_use]
pub fn bend(mesh: TriangleMesh, strength: f64) -> TriangleMesh {
    let Some(bounds) = mesh.bounds() else {
        return mesh;
    };
    let x_range = bounds.max.x - bounds.min.x;
    if strength == 0.0 || x_range <= 0.0 {
        return mesh;
    }
    let (x_max, z_base) = (bounds.max.x, bounds.min.z);
    mesh.map_vertices(|v| {
        if (v.z - z_base).abs() <= BASE_TOLERANCE {
            return *v;
        }
        let n = (x_max - v.x) / x_range;
        Point3::new(v.x, v.y, v.z + strength * n * n)
    })
}

/// Shifts every vertex along x by `amplitude * sin(frequency * z)`.
#[must_use]
pub fn wave(mesh: TriangleMesh, amplitude: f64, frequency: f64) -> TriangleMesh {
    if amplitude == 0.0 {
        return mesh;
    }
    mesh.map_vertices(|v| Point3::new(v.x + amplitude * (frequency * v.z).sin(), v.y, v.z))
}

/// Translates the mesh so its lowest vertex sits at `z = 0`.
#[must_use]
pub fn align_base(mesh: TriangleMesh) -> TriangleMesh {
    let Some(bounds) = mesh.bounds() else {
        return mesh;
    };
    let dz = bounds.min.z;
    if dz == 0.0 {
        return mesh;
    }
    mesh.map_vertices(|v| Point3::new(v.x, v.y, v.z - dz))
}
