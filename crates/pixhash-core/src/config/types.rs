//! Sub-configuration structs and their defaults.

use serde::{Deserialize, Serialize};

/// Where converted images are moved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Destination directory (used when `--out` is not given)
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "./".to_string(),
        }
    }
}

/// External tagging program settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggerConfig {
    /// Run the tagger on every converted image, as if `--wpg` were passed
    pub enabled: bool,

    /// Program name, looked up on `$PATH`
    pub program: String,

    /// Arguments placed before the image path
    pub args: Vec<String>,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            program: "wpg".to_string(),
            args: vec!["-a".to_string()],
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
