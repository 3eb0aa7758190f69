use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use hollowtext::deform::Deformation;
use hollowtext::export::StlFormat;
use hollowtext::operations::HollowParams;
use hollowtext::pipeline::TextToStlParams;
use hollowtext::raster::RasterParams;

/// Turns a text string into a hollow, print-ready STL model.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the model in-process.
    Generate(GenerateArgs),
    /// Hand the text to an external generator program.
    Launch(LaunchArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Text to convert.
    pub text: String,

    /// TrueType/OpenType font file.
    #[arg(short, long)]
    pub font: PathBuf,

    /// Output STL path, defaults to `<TEXT>.stl`.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Font size in pixels per em.
    #[arg(long, default_value_t = 300.0)]
    pub font_size: f32,

    /// Canvas width in pixels.
    #[arg(long, default_value_t = 5000)]
    pub canvas_width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 1000)]
    pub canvas_height: u32,

    /// Extrusion depth.
    #[arg(long, default_value_t = 100.0)]
    pub depth: f64,

    /// Wall and ceiling thickness.
    #[arg(long, default_value_t = 2.0)]
    pub thickness: f64,

    /// Quadratic bend strength, 0 disables it.
    #[arg(long, default_value_t = 200.0, conflicts_with_all = ["wave_amplitude", "wave_frequency"])]
    pub bend: f64,

    /// Wave amplitude along x, replaces the bend.
    #[arg(long, requires = "wave_frequency")]
    pub wave_amplitude: Option<f64>,

    /// Wave angular frequency per unit of z.
    #[arg(long, requires = "wave_amplitude")]
    pub wave_frequency: Option<f64>,

    /// Write ASCII instead of binary STL.
    #[arg(long)]
    pub ascii: bool,
}

impl GenerateArgs {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.stl", self.text)))
    }

    pub fn params(&self) -> TextToStlParams {
        let deformation = match (self.wave_amplitude, self.wave_frequency) {
            (Some(amplitude), Some(frequency)) => Deformation::Wave {
                amplitude,
                frequency,
            },
            _ if self.bend == 0.0 => Deformation::None,
            _ => Deformation::Bend {
                strength: self.bend,
            },
        };
        TextToStlParams {
            raster: RasterParams {
                font_size: self.font_size,
                canvas_width: self.canvas_width,
                canvas_height: self.canvas_height,
            },
            hollow: HollowParams {
                depth: self.depth,
                thickness: self.thickness,
                ..HollowParams::default()
            },
            deformation,
            format: if self.ascii {
                StlFormat::Ascii
            } else {
                StlFormat::Binary
            },
            ..TextToStlParams::default()
        }
    }
}

#[derive(Args, Debug)]
pub struct LaunchArgs {
    /// Text to convert.
    pub text: String,

    /// Font file handed to the generator.
    #[arg(short, long)]
    pub font: Option<PathBuf>,

    /// Number of glyphs, passed after the font.
    #[arg(long)]
    pub glyph_count: Option<usize>,

    /// Generator executable.
    #[arg(long, default_value = "blender")]
    pub program: String,

    /// Script run by the generator.
    #[arg(long, default_value = "generate_stl.py")]
    pub script: PathBuf,
}
