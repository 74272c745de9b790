//! Configuration errors.

use super::error_code::{self, SleuthErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid threshold {name}: {value} (expected {expected})")]
    InvalidThreshold {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

impl SleuthErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_ERROR
    }
}
