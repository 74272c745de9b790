//! Database provider identification and quoting rules.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Supported catalog providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    SqlServer,
    Postgres,
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SqlServer => "sqlserver",
            Self::Postgres => "postgres",
        }
    }

    /// Quote an identifier per the provider's convention.
    pub fn quote(&self, identifier: &str) -> String {
        match self {
            Self::SqlServer => format!("[{identifier}]"),
            Self::Postgres => format!("\"{identifier}\""),
        }
    }

    /// Quote a schema-qualified name.
    pub fn quote_qualified(&self, schema: &str, name: &str) -> String {
        format!("{}.{}", self.quote(schema), self.quote(name))
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
