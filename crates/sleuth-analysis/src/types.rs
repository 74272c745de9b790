//! Shared analysis primitives: severities, risk levels, issues.

use std::fmt;

use serde::{Deserialize, Serialize};
use sleuth_core::catalog::ObjectRef;

/// Issue severity, ordered ascending.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordinal risk assigned to a change or hotspot:
/// None < Low < Medium < High < Critical.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Issue category, for grouping in reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Schema,
    Indexes,
    DeadCode,
    Dependencies,
    Complexity,
    AntiPatterns,
    Naming,
}

impl IssueCategory {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Indexes => "indexes",
            Self::DeadCode => "dead_code",
            Self::Dependencies => "dependencies",
            Self::Complexity => "complexity",
            Self::AntiPatterns => "anti_patterns",
            Self::Naming => "naming",
        }
    }
}

/// A detected quality issue.
///
/// `id` is stable across runs: `<detector>:<primary affected object>`,
/// so reports are diffable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub severity: Severity,
    pub category: IssueCategory,
    pub message: String,
    pub affected: Vec<ObjectRef>,
    /// Ready-to-run remediation SQL, where one exists.
    pub remediation: Option<String>,
}

impl Issue {
    /// Build the stable issue id from detector name and primary object.
    pub fn make_id(detector: &str, primary: &ObjectRef) -> String {
        format!("{detector}:{primary}")
    }
}
