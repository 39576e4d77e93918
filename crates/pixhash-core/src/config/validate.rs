//! Configuration validation.

use crate::error::ConfigError;

use super::Config;

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];
const LOG_FORMATS: &[&str] = &["pretty", "json"];

impl Config {
    /// Validate configuration values.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.output.directory.is_empty() {
            return Err(ConfigError::ValidationError(
                "output.directory must not be empty".into(),
            ));
        }
        if self.tagger.program.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "tagger.program must not be empty".into(),
            ));
        }
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {}, got {:?}",
                LOG_LEVELS.join(", "),
                self.logging.level
            )));
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.format must be one of {}, got {:?}",
                LOG_FORMATS.join(", "),
                self.logging.format
            )));
        }
        Ok(())
    }
}
