mod erode;
mod extrude;
mod hollow_extrude;
mod subtract;

pub use erode::Erode;
pub use extrude::{ExtrudePolygon, Prism};
pub use hollow_extrude::{GlyphOutcome, HollowExtrude, HollowParams};
pub use subtract::{HollowShell, Subtract};
