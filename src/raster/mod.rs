mod rasterize_text;

pub use rasterize_text::{load_font, RasterizeText};

/// Parameters controlling text rasterization.
#[derive(Debug, Clone, Copy)]
pub struct RasterParams {
    /// Font size in pixels per em.
    pub font_size: f32,
    /// Canvas width in pixels.
    pub canvas_width: u32,
    /// Canvas height in pixels.
    pub canvas_height: u32,
}

impl Default for RasterParams {
    fn default() -> Self {
        Self {
            font_size: 300.0,
            canvas_width: 5000,
            canvas_height: 1000,
        }
    }
}

/// A monochrome intensity image, row 0 at the top.
///
/// Intensities are in `[0, 1]`: 0 is background, 1 is fully covered by ink.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphImage {
    width: usize,
    height: usize,
    pixels: Vec<f32>,
}

impl GlyphImage {
    /// Creates a blank (all background) image.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0.0; width * height],
        }
    }

    /// Builds an image from ASCII art, `#` is ink and anything else background.
    ///
    /// Rows shorter than the longest one are padded with background.
    #[must_use]
    pub fn from_ascii(rows: &[&str]) -> Self {
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut image = Self::new(width, rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '#' {
                    image.set(x, y, 1.0);
                }
            }
        }
        image
    }

    /// Image width in pixels.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the intensity at `(x, y)`, or 0 outside the image.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            0.0
        }
    }

    /// Sets the intensity at `(x, y)`. Writes outside the image are dropped.
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = value.clamp(0.0, 1.0);
        }
    }

    /// Paints an axis-aligned filled rectangle `[x0, x1) × [y0, y1)`.
    pub fn fill_rect(&mut self, x0: usize, y0: usize, x1: usize, y1: usize, value: f32) {
        for y in y0..y1.min(self.height) {
            for x in x0..x1.min(self.width) {
                self.set(x, y, value);
            }
        }
    }

    /// Returns `true` if no pixel carries ink.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|&v| v <= 0.0)
    }
}
