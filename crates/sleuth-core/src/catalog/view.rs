//! View metadata.

use serde::{Deserialize, Serialize};

use super::name::Fqn;

/// A view: name plus definition text. The resolved underlying table
/// references are computed by the extractor, not stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub name: Fqn,
    pub body: String,
}
