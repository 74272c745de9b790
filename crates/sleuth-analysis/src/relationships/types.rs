//! Typed dependency edges.

use serde::{Deserialize, Serialize};
use sleuth_core::catalog::{Fqn, ObjectRef};

/// What an edge asserts about its endpoints.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    ForeignKey,
    Joins,
    /// Column/table usage inside a body.
    References,
    Calls,
    NamingImplied,
}

impl EdgeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ForeignKey => "foreign_key",
            Self::Joins => "joins",
            Self::References => "references",
            Self::Calls => "calls",
            Self::NamingImplied => "naming_implied",
        }
    }
}

/// Where an edge came from. Confidence is fixed by origin.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EdgeOrigin {
    CatalogFk,
    BodyJoin,
    BodyReference,
    BodyCall,
    NamingHeuristic,
}

impl EdgeOrigin {
    /// Base confidence for this origin. The naming heuristic may override
    /// its 60 with 95 on a strong name match.
    pub fn confidence(&self) -> u8 {
        match self {
            Self::CatalogFk => 100,
            Self::BodyJoin => 80,
            Self::BodyReference => 70,
            Self::BodyCall => 90,
            Self::NamingHeuristic => 60,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::CatalogFk => "catalog_fk",
            Self::BodyJoin => "body_join",
            Self::BodyReference => "body_reference",
            Self::BodyCall => "body_call",
            Self::NamingHeuristic => "naming_heuristic",
        }
    }
}

/// A directed, typed dependency edge with a confidence in [0, 100].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub source: ObjectRef,
    pub target: ObjectRef,
    pub kind: EdgeKind,
    pub origin: EdgeOrigin,
    pub confidence: u8,
    /// The routine whose body produced this edge, where applicable.
    pub via: Option<Fqn>,
}

impl Edge {
    pub fn new(source: ObjectRef, target: ObjectRef, kind: EdgeKind, origin: EdgeOrigin) -> Self {
        Self {
            source,
            target,
            kind,
            origin,
            confidence: origin.confidence(),
            via: None,
        }
    }

    pub fn via(mut self, routine: Fqn) -> Self {
        self.via = Some(routine);
        self
    }

    pub fn with_confidence(mut self, confidence: u8) -> Self {
        self.confidence = confidence;
        self
    }
}
