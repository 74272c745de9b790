//! The dependency graph: a directed multigraph over schema objects.
//!
//! Backed by a petgraph `StableDiGraph` whose arena owns every
//! `ObjectRef`; traversals hand out references. Supports reverse
//! reachability (impact), Tarjan SCC cycle detection, and hotspot
//! ranking.

pub mod builder;
pub mod cycles;
pub mod hotspots;
pub mod impact;
pub mod types;

pub use builder::build_graph;
pub use cycles::find_cycles;
pub use hotspots::{find_hotspots, Hotspot};
pub use impact::{compute_impact, ImpactCounts, ImpactResult};
pub use types::DependencyGraph;
