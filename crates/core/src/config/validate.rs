use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Queue size limit is positive
/// - Converter reports at least one progress step
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.queue.max_file_size_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "queue.max_file_size_bytes must be greater than 0".to_string(),
        ));
    }

    if config.converter.progress_steps == 0 {
        return Err(ConfigError::ValidationError(
            "converter.progress_steps must be greater than 0".to_string(),
        ));
    }

    Ok(())
}
