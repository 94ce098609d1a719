//! Configuration for the converter module.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the simulated converter's pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Number of progress steps reported per file.
    #[serde(default = "default_progress_steps")]
    pub progress_steps: u32,

    /// Base duration of a simulated conversion in milliseconds.
    #[serde(default = "default_base_duration")]
    pub base_duration_ms: u64,

    /// Extra duration per MiB of input in milliseconds.
    #[serde(default = "default_per_mib_duration")]
    pub per_mib_duration_ms: u64,

    /// Input size (in MiB) beyond which no extra duration is added.
    #[serde(default = "default_max_size_bonus")]
    pub max_size_bonus_mib: u64,
}

fn default_progress_steps() -> u32 {
    20
}

fn default_base_duration() -> u64 {
    2000
}

fn default_per_mib_duration() -> u64 {
    1000
}

fn default_max_size_bonus() -> u64 {
    5
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            progress_steps: default_progress_steps(),
            base_duration_ms: default_base_duration(),
            per_mib_duration_ms: default_per_mib_duration(),
            max_size_bonus_mib: default_max_size_bonus(),
        }
    }
}

impl ConverterConfig {
    /// A config with no artificial delay, useful in tests.
    pub fn instant() -> Self {
        Self {
            base_duration_ms: 0,
            per_mib_duration_ms: 0,
            ..Default::default()
        }
    }

    /// Sets the number of progress steps.
    pub fn with_progress_steps(mut self, steps: u32) -> Self {
        self.progress_steps = steps;
        self
    }

    /// Sets the base duration.
    pub fn with_base_duration(mut self, duration: Duration) -> Self {
        self.base_duration_ms = duration.as_millis() as u64;
        self
    }

    /// Total simulated duration for an input of `size_bytes`.
    pub fn simulated_duration(&self, size_bytes: u64) -> Duration {
        let size_mib = size_bytes as f64 / (1024.0 * 1024.0);
        let bonus = size_mib.min(self.max_size_bonus_mib as f64) * self.per_mib_duration_ms as f64;
        Duration::from_millis(self.base_duration_ms) + Duration::from_secs_f64(bonus / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConverterConfig::default();
        assert_eq!(config.progress_steps, 20);
        assert_eq!(config.base_duration_ms, 2000);
        assert_eq!(config.per_mib_duration_ms, 1000);
    }

    #[test]
    fn test_simulated_duration_caps_size_bonus() {
        let config = ConverterConfig::default();
        assert_eq!(config.simulated_duration(0), Duration::from_millis(2000));
        assert_eq!(
            config.simulated_duration(2 * 1024 * 1024),
            Duration::from_millis(4000)
        );
        assert_eq!(
            config.simulated_duration(50 * 1024 * 1024),
            Duration::from_millis(7000)
        );
    }

    #[test]
    fn test_config_builder() {
        let config = ConverterConfig::instant()
            .with_progress_steps(4)
            .with_base_duration(Duration::from_millis(40));
        assert_eq!(config.progress_steps, 4);
        assert_eq!(config.base_duration_ms, 40);
        assert_eq!(config.per_mib_duration_ms, 0);
    }

    #[test]
    fn test_config_serialization() {
        let config = ConverterConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ConverterConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
