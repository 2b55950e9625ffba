use crate::report::Report;
use std::path::PathBuf;
use std::time::Duration;

/// Pipeline phases, used as metric and log labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Compositing,
    Separating,
    ExtractingDie,
    Assembling,
}

impl JobPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobPhase::Compositing => "compositing",
            JobPhase::Separating => "separating",
            JobPhase::ExtractingDie => "extracting_die",
            JobPhase::Assembling => "assembling",
        }
    }
}

/// A finished job: the persisted report and where its plates live.
#[derive(Debug)]
pub struct JobOutcome {
    pub job_id: String,
    pub report: Report,
    pub results_dir: PathBuf,
    pub report_path: PathBuf,
    pub elapsed: Duration,
}
