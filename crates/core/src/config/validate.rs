use super::{Config, ConfigError};

/// Validates configuration values that serde defaults cannot catch.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.auth.shared_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "auth.shared_key must not be empty".to_string(),
        ));
    }

    if config.jobs.max_upload_mb == 0 {
        return Err(ConfigError::ValidationError(
            "jobs.max_upload_mb must be greater than zero".to_string(),
        ));
    }

    if config.compositor.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "compositor.timeout_secs must be greater than zero".to_string(),
        ));
    }

    if config.separator.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "separator.timeout_secs must be greater than zero".to_string(),
        ));
    }

    if !(72..=2400).contains(&config.separator.plate_dpi) {
        return Err(ConfigError::ValidationError(format!(
            "separator.plate_dpi must be within 72..=2400, got {}",
            config.separator.plate_dpi
        )));
    }

    Ok(())
}
