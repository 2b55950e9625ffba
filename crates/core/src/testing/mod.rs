//! Scripted test doubles for the pipeline's external seams.
//!
//! Each mock records the calls it receives and returns whatever it was
//! scripted with, so tests can drive failure paths no real tool setup
//! could produce on demand.

mod mock_compositor;
mod mock_raster;
mod mock_separator;
mod mock_vector;

pub use mock_compositor::MockCompositor;
pub use mock_raster::MockRasterOps;
pub use mock_separator::MockSeparator;
pub use mock_vector::MockVectorExtractor;
