//! bookrec-store
//!
//! The in-memory metadata table the engine joins candidates against. Built
//! once from a CSV snapshot and read-only afterwards; see `loader` for the
//! accepted columns and `lineage` for how the snapshot file is chosen.

pub mod lineage;
pub mod loader;
pub mod store;

pub use lineage::{DataLineage, DataTier};
pub use loader::LoadReport;
pub use store::MetadataStore;
