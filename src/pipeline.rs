//! The full text → hollow STL pipeline.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::contour::{ContourParams, FindContours, ScalarGrid};
use crate::deform::Deformation;
use crate::error::Result;
use crate::export::{StlFormat, WriteStl};
use crate::operations::{GlyphOutcome, HollowExtrude, HollowParams};
use crate::polygon::BuildPolygons;
use crate::raster::{load_font, GlyphImage, RasterParams, RasterizeText};
use crate::tessellation::TriangleMesh;

/// All knobs of a run, grouped by stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextToStlParams {
    /// Rasterization.
    pub raster: RasterParams,
    /// Contour extraction.
    pub contour: ContourParams,
    /// Hollow extrusion.
    pub hollow: HollowParams,
    /// Deformation of the assembled model.
    pub deformation: Deformation,
    /// Output format.
    pub format: StlFormat,
}

/// A glyph region that was left out of the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedGlyph {
    /// Position of the region in the polygon list.
    pub index: usize,
    /// Why it was left out.
    pub reason: String,
}

/// What a run produced.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// The assembled and deformed model.
    pub mesh: TriangleMesh,
    /// Number of glyph regions turned into shells.
    pub built: usize,
    /// Regions that were skipped.
    pub skipped: Vec<SkippedGlyph>,
}

impl BuildReport {
    /// Number of glyph regions found in the image.
    #[must_use]
    pub fn regions(&self) -> usize {
        self.built + self.skipped.len()
    }
}

/// Rasterizes `text`, builds one hollow shell per glyph region and writes
/// the assembled model as STL.
pub struct TextToStl {
    params: TextToStlParams,
}

impl TextToStl {
    /// Creates a new pipeline run.
    #[must_use]
    pub fn new(params: TextToStlParams) -> Self {
        Self { params }
    }

    /// Executes the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`FontError`](crate::error::FontError) if the font cannot be
    /// loaded, [`OperationError::InvalidInput`](crate::error::OperationError)
    /// for bad parameters and [`ExportError`](crate::error::ExportError) if the
    /// file cannot be written. Failures of single glyphs are reported in the
    /// returned [`BuildReport`] instead.
    pub fn execute(&self, text: &str, font_path: &Path, output: &Path) -> Result<BuildReport> {
        self.params.hollow.validate()?;
        self.params.deformation.validate()?;

        let font = load_font(font_path)?;
        let image = RasterizeText::new(text, &font)
            .with_params(self.params.raster)
            .execute()?;
        if image.is_blank() {
            warn!(text, "text has no visible glyphs, writing an empty model");
        }

        let report = build_from_image(&image, &self.params)?;
        WriteStl::new(&report.mesh)
            .with_format(self.params.format)
            .with_name(text)
            .execute(output)?;
        Ok(report)
    }
}

/// Runs contour extraction, polygon building, hollow extrusion and
/// deformation on an already rasterized image.
///
/// # Errors
///
/// Returns [`OperationError::InvalidInput`](crate::error::OperationError) for
/// invalid parameters.
pub fn build_from_image(image: &GlyphImage, params: &TextToStlParams) -> Result<BuildReport> {
    params.hollow.validate()?;
    params.deformation.validate()?;

    let grid = ScalarGrid::from_image(image);
    let contours = FindContours::new(&grid)
        .with_params(params.contour)
        .execute()?;
    debug!(contours = contours.len(), "traced contours");

    let polygons = BuildPolygons::new(contours).execute()?;
    debug!(polygons = polygons.len(), "built glyph polygons");
    if polygons.is_empty() {
        warn!("no glyph regions found, the model is empty");
    }

    let mut report = BuildReport::default();
    let mut shells = Vec::with_capacity(polygons.len());
    for (index, polygon) in polygons.iter().enumerate() {
        match HollowExtrude::new(polygon, index, params.hollow).execute() {
            GlyphOutcome::Built(mesh) => shells.push(mesh),
            GlyphOutcome::Skipped { index, reason } => {
                report.skipped.push(SkippedGlyph { index, reason });
            }
        }
    }
    report.built = shells.len();

    let mesh = TriangleMesh::concatenate(shells);
    report.mesh = params.deformation.apply(mesh);

    info!(
        built = report.built,
        skipped = report.skipped.len(),
        triangles = report.mesh.triangle_count(),
        "assembled model"
    );
    Ok(report)
}
