//! Raster separation of flattened PDFs.
//!
//! One PDF per side goes in, one grayscale TIFF per ink comes out. The
//! four process inks are composited into an albedo preview; every spot
//! ink is classified by name into a finish channel and converted to a
//! PNG mask.

mod classify;
mod config;
mod error;
mod ghostscript;
mod traits;
mod types;

pub use classify::TokenTable;
pub use config::SeparatorConfig;
pub use error::SeparatorError;
pub use ghostscript::GhostscriptSeparator;
pub use traits::Separator;
pub use types::{MergeRecord, SeparationSet};
