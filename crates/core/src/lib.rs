pub mod assets;
pub mod compositor;
pub mod config;
pub mod metrics;
pub mod pipeline;
pub mod plate;
pub mod raster;
pub mod report;
pub mod sentinel;
pub mod separator;
pub mod testing;
pub mod vector;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use pipeline::{AdmissionLock, JobOutcome, JobPipeline, PipelineError};
pub use plate::{Finish, Side};
pub use report::{Report, ReportBuilder};
