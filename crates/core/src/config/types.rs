use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::compositor::CompositorConfig;
use crate::separator::SeparatorConfig;
use crate::vector::VectorConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
    #[serde(default)]
    pub compositor: CompositorConfig,
    #[serde(default)]
    pub separator: SeparatorConfig,
    #[serde(default)]
    pub vector: VectorConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    5001
}

/// Shared-secret authentication for the parse and internal asset endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default = "default_shared_key")]
    pub shared_key: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            shared_key: default_shared_key(),
        }
    }
}

fn default_shared_key() -> String {
    "change-me-long-random".to_string()
}

/// Job directory layout and upload limits.
///
/// Exactly one of `working`/`results`/`failed` holds a job's live
/// artifacts at any time; the pipeline owns the moves between them.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JobsConfig {
    /// Root directory under which incoming/working/results/failed live.
    #[serde(default = "default_jobs_root")]
    pub root: PathBuf,

    /// Maximum accepted upload size in megabytes.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            root: default_jobs_root(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

fn default_jobs_root() -> PathBuf {
    PathBuf::from("jobs")
}

fn default_max_upload_mb() -> u64 {
    150
}

impl JobsConfig {
    pub fn incoming(&self) -> PathBuf {
        self.root.join("incoming")
    }

    pub fn working(&self) -> PathBuf {
        self.root.join("working")
    }

    pub fn results(&self) -> PathBuf {
        self.root.join("results")
    }

    pub fn failed(&self) -> PathBuf {
        self.root.join("failed")
    }

    /// Creates all job directories if they do not exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for dir in [
            self.incoming(),
            self.working(),
            self.results(),
            self.failed(),
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub auth: SanitizedAuthConfig,
    pub jobs: JobsConfig,
    pub compositor: CompositorConfig,
    pub separator: SeparatorConfig,
    pub vector: VectorConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub shared_key: String,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            auth: SanitizedAuthConfig {
                shared_key: "***".to_string(),
            },
            jobs: config.jobs.clone(),
            compositor: config.compositor.clone(),
            separator: config.separator.clone(),
            vector: config.vector.clone(),
        }
    }
}
