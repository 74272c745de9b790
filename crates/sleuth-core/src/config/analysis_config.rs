//! Analysis configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Configuration for the analysis pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Table-name prefixes treated as staging/scratch tables and excluded
    /// from the missing-primary-key check. Default: staging, temp, tmp, etl.
    pub staging_prefixes: Option<Vec<String>>,
    /// Extra singular -> plural pairs for the naming heuristic, merged over
    /// the built-in irregular-plural map.
    #[serde(default)]
    pub extra_plurals: HashMap<String, String>,
    /// Share of FK-candidate columns that must follow the dominant naming
    /// style for the consistency bonus. Default: 0.90.
    pub naming_consistency_threshold: Option<f64>,
    /// FK coverage ratio (defined / expected-from-naming) that earns the
    /// coverage bonus. Default: 0.80.
    pub fk_coverage_threshold: Option<f64>,
    /// Complexity score above which a routine is flagged. Default: 50.
    pub complex_routine_threshold: Option<u32>,
    /// Number of hotspot tables to report. Default: 10.
    pub hotspot_top_n: Option<usize>,
}

impl AnalysisConfig {
    pub fn effective_staging_prefixes(&self) -> Vec<String> {
        self.staging_prefixes.clone().unwrap_or_else(|| {
            ["staging", "temp", "tmp", "etl"]
                .iter()
                .map(|s| s.to_string())
                .collect()
        })
    }

    pub fn effective_naming_consistency_threshold(&self) -> f64 {
        self.naming_consistency_threshold.unwrap_or(0.90)
    }

    pub fn effective_fk_coverage_threshold(&self) -> f64 {
        self.fk_coverage_threshold.unwrap_or(0.80)
    }

    pub fn effective_complex_routine_threshold(&self) -> u32 {
        self.complex_routine_threshold.unwrap_or(50)
    }

    pub fn effective_hotspot_top_n(&self) -> usize {
        self.hotspot_top_n.unwrap_or(10)
    }
}
