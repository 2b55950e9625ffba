//! Job orchestration.
//!
//! One job at a time: the compositor flattens the design into per-side
//! PDFs, the separator splits each PDF into finish plates, the vector
//! extractor pulls the die line, and the report ties it together.
//! Sides fail independently; the job fails only when the compositor
//! fails or no side survives.

mod admission;
mod error;
mod runner;
mod types;

pub use admission::{AdmissionLock, AdmissionPermit};
pub use error::PipelineError;
pub use runner::JobPipeline;
pub use types::{JobOutcome, JobPhase};
