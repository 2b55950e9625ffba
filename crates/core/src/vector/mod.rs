//! Vector die line extraction.
//!
//! The die cut exists twice in the outputs: as a raster mask from the
//! separator and as an SVG path extracted here. Extraction failures are
//! never job-fatal; the pipeline downgrades them to diagnostics and
//! ships the raster mask alone.

mod config;
mod error;
mod svg;
mod traits;

pub use config::VectorConfig;
pub use error::VectorError;
pub use svg::{check_alignment, parse_view_box, SvgDieExtractor};
pub use traits::{ExtractedDie, VectorExtractor};
