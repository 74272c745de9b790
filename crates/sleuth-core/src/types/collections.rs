//! Hash collections used throughout the pipeline.
//!
//! FxHash is a fast, non-cryptographic hasher; the analysis pipeline never
//! hashes attacker-controlled keys.

pub use rustc_hash::{FxHashMap, FxHashSet};
