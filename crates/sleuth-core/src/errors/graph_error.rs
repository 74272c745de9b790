//! Dependency graph errors.

use super::error_code::{self, SleuthErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Unknown object {name}: not present in the dependency graph")]
    UnknownObject { name: String },
}

impl SleuthErrorCode for GraphError {
    fn error_code(&self) -> &'static str {
        error_code::GRAPH_ERROR
    }
}
