use std::path::Path;

use rusttype::{point, Font, Rect, Scale};
use tracing::debug;

use crate::error::{FontError, OperationError, Result};

use super::{GlyphImage, RasterParams};

/// Loads a TrueType/OpenType font from disk.
///
/// # Errors
///
/// Returns [`FontError::Read`] if the file cannot be read and
/// [`FontError::Parse`] if its contents are not a usable font.
pub fn load_font(path: &Path) -> Result<Font<'static>> {
    let bytes = std::fs::read(path).map_err(|source| FontError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Font::try_from_vec(bytes).ok_or_else(|| FontError::Parse.into())
}

/// Renders a text string into a [`GlyphImage`], centered on a fixed canvas.
///
/// The text is laid out on one line with control characters removed. Glyphs
/// extending past the canvas are clipped silently.
pub struct RasterizeText<'a> {
    text: &'a str,
    font: &'a Font<'static>,
    params: RasterParams,
}

impl<'a> RasterizeText<'a> {
    /// Creates a new `RasterizeText` operation with default parameters.
    #[must_use]
    pub fn new(text: &'a str, font: &'a Font<'static>) -> Self {
        Self {
            text,
            font,
            params: RasterParams::default(),
        }
    }

    /// Sets custom raster parameters.
    #[must_use]
    pub fn with_params(mut self, params: RasterParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the rasterization.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the font size is not a
    /// positive finite number or the canvas is empty.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    pub fn execute(&self) -> Result<GlyphImage> {
        let size = self.params.font_size;
        if !size.is_finite() || size <= 0.0 {
            return Err(OperationError::InvalidInput(format!(
                "font size must be positive, got {size}"
            ))
            .into());
        }
        let (width, height) = (self.params.canvas_width, self.params.canvas_height);
        if width == 0 || height == 0 {
            return Err(OperationError::InvalidInput("canvas must not be empty".into()).into());
        }

        let mut image = GlyphImage::new(width as usize, height as usize);

        let scale = Scale::uniform(size);
        let ascent = self.font.v_metrics(scale).ascent;
        // Layout is a single line; control characters would render as
        // missing-glyph boxes.
        let line: String = self.text.chars().filter(|c| !c.is_control()).collect();
        let glyphs: Vec<_> = self.font.layout(&line, scale, point(0.0, ascent)).collect();

        let Some(bbox) = glyphs
            .iter()
            .filter_map(rusttype::PositionedGlyph::pixel_bounding_box)
            .reduce(union_rect)
        else {
            debug!(text = self.text, "no glyph outlines to rasterize");
            return Ok(image);
        };

        let text_w = bbox.max.x - bbox.min.x;
        let text_h = bbox.max.y - bbox.min.y;
        let off_x = (width as i32 - text_w) / 2 - bbox.min.x;
        let off_y = (height as i32 - text_h) / 2 - bbox.min.y;

        for glyph in &glyphs {
            let Some(gb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|x, y, coverage| {
                let px = gb.min.x + x as i32 + off_x;
                let py = gb.min.y + y as i32 + off_y;
                if px < 0 || py < 0 {
                    return;
                }
                let (px, py) = (px as usize, py as usize);
                // Overlapping glyphs (kerned pairs) keep the stronger coverage.
                let current = image.get(px, py);
                image.set(px, py, current.max(coverage));
            });
        }

        debug!(
            text = self.text,
            text_w,
            text_h,
            "rasterized text onto {width}x{height} canvas"
        );
        Ok(image)
    }
}

fn union_rect(a: Rect<i32>, b: Rect<i32>) -> Rect<i32> {
    Rect {
        min: point(a.min.x.min(b.min.x), a.min.y.min(b.min.y)),
        max: point(a.max.x.max(b.max.x), a.max.y.max(b.max.y)),
    }
}
