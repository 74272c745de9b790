//! Configuration for analysis and diff behavior.

pub mod analysis_config;
pub mod diff_config;
pub mod sleuth_config;

pub use analysis_config::AnalysisConfig;
pub use diff_config::DiffConfig;
pub use sleuth_config::SleuthConfig;
