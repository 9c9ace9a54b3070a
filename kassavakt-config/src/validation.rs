//! Custom validation functions for configuration.

use validator::ValidationError;

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate that a log level is one `tracing` understands.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    if LEVELS.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}
