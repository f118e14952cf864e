//! bookrec-core
//!
//! Shared vocabulary for the recommender: book and candidate types, the
//! collaborator traits (`Embedder`, `SimilarityIndex`), identifier
//! normalization, the error taxonomy and the layered configuration loader.

pub mod config;
pub mod error;
pub mod ident;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use ident::normalize_isbn;
pub use traits::{Embedder, SimilarityIndex};
pub use types::{BookRecord, IndexHit, IndexedDocument, MatchReason, Recommendation};
