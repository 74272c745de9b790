//! Connector boundary errors.
//!
//! The core never originates connection failures; it re-emits them unchanged
//! from whatever supplied the raw catalog (a live connector or a snapshot
//! file).

use super::error_code::{self, SleuthErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Failed to read snapshot {path}: {source}")]
    SnapshotRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed snapshot {path}: {detail}")]
    SnapshotParse { path: String, detail: String },

    #[error("Connection failed: {0}")]
    Connection(String),
}

impl SleuthErrorCode for ConnectError {
    fn error_code(&self) -> &'static str {
        error_code::CONNECT_ERROR
    }
}
