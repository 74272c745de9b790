//! Non-fatal warnings accumulated during analysis.

use serde::{Deserialize, Serialize};

/// A non-fatal condition observed during analysis.
///
/// Warnings never abort a run; they are collected and surfaced in the
/// report footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AnalysisWarning {
    /// An unqualified identifier matched tables in more than one schema.
    /// The reference is dropped rather than guessed.
    AmbiguousReference {
        object: String,
        identifier: String,
        candidates: Vec<String>,
    },

    /// A body segment could not be scanned; it contributed nothing.
    UnreadableSegment { object: String, detail: String },

    /// A column type changed in a way the diff engine could not classify
    /// as widening or narrowing. The change is still emitted, flagged for
    /// manual review.
    DiffMismatch {
        object: String,
        column: String,
        detail: String,
    },
}

impl std::fmt::Display for AnalysisWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AmbiguousReference {
                object,
                identifier,
                candidates,
            } => write!(
                f,
                "{object}: identifier '{identifier}' is ambiguous across schemas ({})",
                candidates.join(", ")
            ),
            Self::UnreadableSegment { object, detail } => {
                write!(f, "{object}: unreadable segment skipped ({detail})")
            }
            Self::DiffMismatch {
                object,
                column,
                detail,
            } => write!(
                f,
                "{object}.{column}: unclassifiable type change, manual review required ({detail})"
            ),
        }
    }
}
