use tracing::{debug, warn};

use crate::deform::align_base;
use crate::error::{OperationError, Result};
use crate::polygon::PolygonWithHoles;
use crate::tessellation::TriangleMesh;

use super::{Erode, ExtrudePolygon, Subtract};

/// Relative difference allowed between the tessellated and exact volume.
const VOLUME_TOLERANCE: f64 = 1e-6;

/// Parameters of the hollow extrusion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HollowParams {
    /// Full height of each glyph solid.
    pub depth: f64,
    /// Wall and ceiling thickness.
    pub thickness: f64,
    /// Sampling step of the erosion distance grid.
    pub erosion_step: f64,
}

impl Default for HollowParams {
    fn default() -> Self {
        Self {
            depth: 100.0,
            thickness: 2.0,
            erosion_step: 1.0,
        }
    }
}

impl HollowParams {
    /// Checks that the parameters describe a printable shell.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] unless
    /// `0 < thickness < depth` and the erosion step is positive, all finite.
    pub fn validate(&self) -> Result<()> {
        let Self {
            depth,
            thickness,
            erosion_step,
        } = *self;
        if !depth.is_finite() || depth <= 0.0 {
            return Err(OperationError::InvalidInput(format!("depth must be positive, got {depth}")).into());
        }
        if !thickness.is_finite() || thickness <= 0.0 || thickness >= depth {
            return Err(OperationError::InvalidInput(format!(
                "thickness must be in (0, {depth}), got {thickness}"
            ))
            .into());
        }
        if !erosion_step.is_finite() || erosion_step <= 0.0 {
            return Err(OperationError::InvalidInput(format!(
                "erosion step must be positive, got {erosion_step}"
            ))
            .into());
        }
        Ok(())
    }
}

/// Result of turning one glyph region into a hollow shell.
#[derive(Debug, Clone, PartialEq)]
pub enum GlyphOutcome {
    /// The shell was built.
    Built(TriangleMesh),
    /// The region was left out of the model.
    Skipped {
        /// Position of the region in the polygon list.
        index: usize,
        /// Why it was left out.
        reason: String,
    },
}

/// Extrudes one polygon into a shell that is hollow from below.
///
/// The polygon is extruded to `depth`, an inward erosion by `thickness` is
/// extruded to `depth - thickness`, and the second solid is subtracted from
/// the first. Every failure turns into [`GlyphOutcome::Skipped`] so one bad
/// glyph never aborts the run.
pub struct HollowExtrude<'a> {
    polygon: &'a PolygonWithHoles,
    index: usize,
    params: HollowParams,
}

impl<'a> HollowExtrude<'a> {
    /// Creates a new `HollowExtrude` operation for the `index`-th region.
    #[must_use]
    pub fn new(polygon: &'a PolygonWithHoles, index: usize, params: HollowParams) -> Self {
        Self {
            polygon,
            index,
            params,
        }
    }

    /// Executes the extrusion.
    #[must_use]
    pub fn execute(&self) -> GlyphOutcome {
        match self.build() {
            Ok(Some(mesh)) => {
                debug!(
                    index = self.index,
                    triangles = mesh.triangle_count(),
                    "built hollow shell"
                );
                GlyphOutcome::Built(mesh)
            }
            Ok(None) => self.skip("wall thickness erodes the glyph away".into()),
            Err(e) => self.skip(e.to_string()),
        }
    }

    fn skip(&self, reason: String) -> GlyphOutcome {
        warn!(index = self.index, %reason, "skipping glyph region");
        GlyphOutcome::Skipped {
            index: self.index,
            reason,
        }
    }

    fn build(&self) -> Result<Option<TriangleMesh>> {
        let HollowParams {
            depth,
            thickness,
            erosion_step,
        } = self.params;
        self.params.validate()?;

        let parts = Erode::new(self.polygon, thickness)
            .with_step(erosion_step)
            .execute()?;
        if parts.len() > 1 {
            debug!(
                index = self.index,
                parts = parts.len(),
                "erosion split the glyph, keeping the largest part"
            );
        }
        // Parts come sorted by area, largest first.
        let Some(eroded) = parts.into_iter().next() else {
            return Ok(None);
        };

        let outer = ExtrudePolygon::new(self.polygon.clone(), depth).execute()?;
        let inner = ExtrudePolygon::new(eroded, depth - thickness).execute()?;
        let shell = Subtract::new(outer, inner).execute()?;
        let mesh = shell.tessellate()?;
        check_outward(&mesh, shell.volume())?;
        Ok(Some(align_base(mesh)))
    }
}

/// Rejects a shell whose triangles enclose a different volume than its
/// profiles describe, which happens when the rings were grouped wrongly and
/// some faces point into the material.
fn check_outward(mesh: &TriangleMesh, expected: f64) -> Result<()> {
    let volume = mesh.signed_volume();
    let tolerance = VOLUME_TOLERANCE * expected.abs().max(1.0);
    if volume > 0.0 && expected > 0.0 && (volume - expected).abs() <= tolerance {
        Ok(())
    } else {
        Err(OperationError::Failed(format!(
            "shell is not a closed outward surface (volume {volume:.3}, expected {expected:.3})"
        ))
        .into())
    }
}
