//! bookrec-hybrid
//!
//! Ranks books for a natural-language query by blending similarity from a
//! `SimilarityIndex` with the average rating stored in the metadata table.

pub mod batch;
pub mod engine;
pub mod filter;
pub mod scorer;

pub use batch::QueryOutcome;
pub use engine::{QueryStats, RecommendRequest, Recommender, EMPTY_REQUEST_GUIDANCE};
pub use filter::CandidateFilter;
pub use scorer::hybrid_score;
