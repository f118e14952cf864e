//! bookrec-vector
//!
//! `SimilarityIndex` implementations. `LanceBookIndex` serves queries from a
//! LanceDB table filled offline by `BookIndexWriter`; `InMemoryIndex` is a
//! brute-force cosine index for small catalogs and tests.

pub mod memory;
pub mod schema;
pub mod search;
pub mod table;
pub mod writer;

pub use memory::InMemoryIndex;
pub use search::LanceBookIndex;
pub use writer::BookIndexWriter;
