//! Compositor module: drives the external GUI design application.
//!
//! The application cannot be scripted in-process. The adapter drops a job
//! description file, launches the executable against an export script, and
//! infers completion from sentinel files the script writes. The process
//! exit code is never trusted; GUI applications exit 0 on cancel and hang
//! invisibly.

mod config;
mod error;
mod illustrator;
mod traits;
mod types;

pub use config::CompositorConfig;
pub use error::CompositorError;
pub use illustrator::IllustratorCompositor;
pub use traits::Compositor;
pub use types::{load_scratch, Artboard, CompositorInfo, ExportOutcome, ScratchMetadata, ScratchNote, ScratchSide};
