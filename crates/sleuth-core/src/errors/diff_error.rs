//! Diff engine errors.

use super::error_code::{self, SleuthErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    #[error("Cannot diff catalogs from different providers: {source_provider} vs {target_provider}")]
    ProviderMismatch {
        source_provider: String,
        target_provider: String,
    },
}

impl SleuthErrorCode for DiffError {
    fn error_code(&self) -> &'static str {
        error_code::DIFF_ERROR
    }
}
