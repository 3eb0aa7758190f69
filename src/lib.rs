pub mod contour;
pub mod deform;
pub mod error;
pub mod export;
pub mod launch;
pub mod math;
pub mod operations;
pub mod pipeline;
pub mod polygon;
pub mod raster;
pub mod tessellation;

pub use error::{HollowTextError, Result};
