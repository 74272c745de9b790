//! Pipeline errors and non-fatal warning collection.

use super::error_code::{self, SleuthErrorCode};
use super::{
    AnalysisWarning, CatalogError, ConfigError, ConnectError, DiffError, GraphError, ReportError,
};

/// Errors that can occur during pipeline execution.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Connection error: {0}")]
    Connect(#[from] ConnectError),

    #[error("Catalog integrity error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Diff error: {0}")]
    Diff(#[from] DiffError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Analysis cancelled")]
    Cancelled,
}

impl SleuthErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Connect(e) => e.error_code(),
            Self::Catalog(e) => e.error_code(),
            Self::Graph(e) => e.error_code(),
            Self::Diff(e) => e.error_code(),
            Self::Report(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}

/// Result of a pipeline stage that accumulates non-fatal warnings.
/// Fatal errors abort the stage; warnings ride along with the data.
#[derive(Debug, Default)]
pub struct PipelineResult<T: Default = ()> {
    /// The successful result data.
    pub data: T,
    /// Non-fatal warnings collected during the stage.
    pub warnings: Vec<AnalysisWarning>,
}

impl<T: Default> PipelineResult<T> {
    /// Create a result with no warnings.
    pub fn new(data: T) -> Self {
        Self {
            data,
            warnings: Vec::new(),
        }
    }

    /// Add a non-fatal warning.
    pub fn warn(&mut self, warning: AnalysisWarning) {
        self.warnings.push(warning);
    }

    /// Returns true if there are no warnings.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
