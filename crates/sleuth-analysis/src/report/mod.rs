//! The immutable report models consumed by reporters.

pub mod types;

pub use types::{
    CatalogSummary, DiffReport, GraphModel, GraphNode, Report, RoutineStats,
};
