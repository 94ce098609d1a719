//! Configuration for the conversion queue.

use serde::{Deserialize, Serialize};

/// Configuration for queue intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Largest accepted file in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
}

fn default_max_file_size() -> u64 {
    100 * 1024 * 1024
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size(),
        }
    }
}

impl QueueConfig {
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size_bytes = bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limit_is_100_mib() {
        assert_eq!(QueueConfig::default().max_file_size_bytes, 104_857_600);
    }

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: QueueConfig = toml::from_str("").unwrap();
        assert_eq!(config, QueueConfig::default());
    }
}
