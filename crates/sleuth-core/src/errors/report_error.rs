//! Reporter errors.

use super::error_code::{self, SleuthErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to serialize report: {0}")]
    Serialize(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}

impl SleuthErrorCode for ReportError {
    fn error_code(&self) -> &'static str {
        error_code::REPORT_ERROR
    }
}
