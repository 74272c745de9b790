//! Snapshot loading: JSON files in the raw connector schema.

use std::path::Path;

use sleuth_core::catalog::{Catalog, RawCatalog};
use sleuth_core::errors::ConnectError;

use crate::{EXIT_ANALYSIS, EXIT_CONNECT};

/// Load and freeze a catalog snapshot.
///
/// I/O and parse failures map to the connection exit code; integrity
/// violations are analysis errors.
pub fn load_catalog(path: &Path) -> Result<Catalog, (u8, String)> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        let err = ConnectError::SnapshotRead {
            path: path.display().to_string(),
            source: e,
        };
        (EXIT_CONNECT, err.to_string())
    })?;

    let raw: RawCatalog = serde_json::from_str(&text).map_err(|e| {
        let err = ConnectError::SnapshotParse {
            path: path.display().to_string(),
            detail: e.to_string(),
        };
        (EXIT_CONNECT, err.to_string())
    })?;

    Catalog::from_raw(raw).map_err(|e| (EXIT_ANALYSIS, e.to_string()))
}
