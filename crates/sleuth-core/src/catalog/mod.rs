//! The frozen catalog model and the raw connector-boundary model.
//!
//! A `Catalog` is an immutable snapshot of a database's structural metadata.
//! Connectors produce the serializable `Raw*` form; `Catalog::from_raw`
//! validates structural invariants and freezes it. Everything downstream
//! (graph, issues, diff) is a pure function of one or two frozen catalogs.

pub mod catalog;
pub mod column;
pub mod name;
pub mod provider;
pub mod raw;
pub mod routine;
pub mod table;
pub mod typeinfo;
pub mod view;

pub use catalog::Catalog;
pub use column::Column;
pub use name::{Fqn, ObjectKind, ObjectRef};
pub use provider::Provider;
pub use raw::{
    RawCatalog, RawColumn, RawForeignKey, RawIndex, RawIndexUsage, RawRoutine, RawTable,
    RawUniqueConstraint, RawView,
};
pub use routine::{ParamDirection, Routine, RoutineKind, RoutineParameter};
pub use table::{CascadeAction, ForeignKey, Index, IndexColumn, IndexUsage, Table, UniqueConstraint};
pub use typeinfo::{TypeInfo, TypeKind};
pub use view::View;
