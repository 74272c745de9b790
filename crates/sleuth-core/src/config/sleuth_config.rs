//! Top-level configuration.

use serde::{Deserialize, Serialize};

use super::{AnalysisConfig, DiffConfig};
use crate::errors::ConfigError;

/// Aggregate configuration for a sqlsleuth run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SleuthConfig {
    pub analysis: AnalysisConfig,
    pub diff: DiffConfig,
    /// Exit with code 4 when the health score falls below this value.
    pub fail_under: Option<u8>,
}

impl SleuthConfig {
    /// Validate cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            (
                "naming_consistency_threshold",
                self.analysis.effective_naming_consistency_threshold(),
            ),
            (
                "fk_coverage_threshold",
                self.analysis.effective_fk_coverage_threshold(),
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidThreshold {
                    name,
                    value,
                    expected: "a ratio in [0, 1]",
                });
            }
        }
        if let Some(fail_under) = self.fail_under {
            if fail_under > 100 {
                return Err(ConfigError::InvalidThreshold {
                    name: "fail_under",
                    value: f64::from(fail_under),
                    expected: "a score in [0, 100]",
                });
            }
        }
        Ok(())
    }
}
