use super::classify::TokenTable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparatorConfig {
    /// Ghostscript executable.
    pub executable: String,

    /// Rendering resolution for all separations.
    pub plate_dpi: u32,

    /// Ghostscript output device. tiffsep emits one grayscale TIFF per
    /// ink plus a composite we discard.
    pub device: String,

    /// Hard ceiling on a single separation run.
    pub timeout_secs: u64,

    /// Spot ink name classification.
    pub tokens: TokenTable,

    /// Plates with fewer inked pixels than this are dropped as empty.
    pub min_plate_pixels: u64,
}

impl Default for SeparatorConfig {
    fn default() -> Self {
        Self {
            executable: "gs".to_string(),
            plate_dpi: 600,
            device: "tiffsep".to_string(),
            timeout_secs: 300,
            tokens: TokenTable::default(),
            min_plate_pixels: 10,
        }
    }
}

impl SeparatorConfig {
    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SeparatorConfig::default();
        assert_eq!(config.executable, "gs");
        assert_eq!(config.plate_dpi, 600);
        assert_eq!(config.device, "tiffsep");
        assert_eq!(config.timeout_secs, 300);
        assert_eq!(config.min_plate_pixels, 10);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: SeparatorConfig = toml::from_str("plate_dpi = 300").unwrap();
        assert_eq!(config.plate_dpi, 300);
        assert_eq!(config.device, "tiffsep");
    }
}
