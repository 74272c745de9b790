//! Reporters: output formats over the stable report models.
//!
//! Console, markdown, and JSON. Migration SQL for diffs is emitted by
//! `diff::migration`, not a reporter, because it needs both catalogs.

pub mod console;
pub mod json;
pub mod markdown;

use sleuth_core::errors::ReportError;

use crate::report::types::{DiffReport, Report};

/// Renders a full analysis report.
pub trait Reporter: Send + Sync {
    fn name(&self) -> &'static str;
    fn generate(&self, report: &Report) -> Result<String, ReportError>;
}

/// Renders a diff report.
pub trait DiffReporter: Send + Sync {
    fn name(&self) -> &'static str;
    fn generate(&self, report: &DiffReport) -> Result<String, ReportError>;
}

/// Create a reporter by format name.
pub fn create_reporter(format: &str) -> Result<Box<dyn Reporter>, ReportError> {
    match format {
        "console" => Ok(Box::new(console::ConsoleReporter::default())),
        "json" => Ok(Box::new(json::JsonReporter)),
        "markdown" => Ok(Box::new(markdown::MarkdownReporter)),
        other => Err(ReportError::UnsupportedFormat(other.to_string())),
    }
}

/// Create a diff reporter by format name.
pub fn create_diff_reporter(format: &str) -> Result<Box<dyn DiffReporter>, ReportError> {
    match format {
        "console" => Ok(Box::new(console::DiffConsoleReporter::default())),
        "json" => Ok(Box::new(json::JsonReporter)),
        "markdown" => Ok(Box::new(markdown::MarkdownReporter)),
        other => Err(ReportError::UnsupportedFormat(other.to_string())),
    }
}

/// All analysis report formats.
pub fn available_formats() -> &'static [&'static str] {
    &["console", "json", "markdown"]
}
