//! Domain types shared by the store, the indexes and the ranking engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical integer identifier produced by [`crate::ident::normalize_isbn`].
pub type Isbn = u64;

/// Top of the `average_rating` scale.
pub const MAX_RATING: f32 = 5.0;

/// One row of the metadata table, immutable once loaded.
///
/// - `simple_category`: enriched, coarse category (e.g. "Fiction")
/// - `raw_category`: category string as found in the source dataset
/// - `dominant_tone`/`tone_probability`: present only when tone analysis ran
/// - `average_rating` lies in `[0, 5]`; missing ratings and counts are 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub isbn: Isbn,
    pub title: String,
    pub authors: String,
    pub description: String,
    pub simple_category: Option<String>,
    pub raw_category: Option<String>,
    pub dominant_tone: Option<String>,
    pub tone_probability: Option<f32>,
    pub average_rating: f32,
    pub ratings_count: u64,
    pub thumbnail: Option<String>,
}

impl BookRecord {
    /// Minimal record; everything optional left empty, numeric fields zero.
    pub fn new(isbn: Isbn, title: impl Into<String>) -> Self {
        Self {
            isbn,
            title: title.into(),
            authors: String::new(),
            description: String::new(),
            simple_category: None,
            raw_category: None,
            dominant_tone: None,
            tone_probability: None,
            average_rating: 0.0,
            ratings_count: 0,
            thumbnail: None,
        }
    }

    /// Enriched category when present, else the raw one.
    pub fn category(&self) -> Option<&str> {
        self.simple_category.as_deref().or(self.raw_category.as_deref())
    }

    /// Text that gets embedded into the similarity index for this book.
    pub fn embedding_text(&self) -> String {
        if self.description.is_empty() { self.title.clone() } else { format!("{}: {}", self.title, self.description) }
    }
}

/// What the similarity index stores next to each vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    /// Identifier exactly as written at indexing time; normalized on join.
    pub isbn: String,
    pub title: String,
    pub authors: String,
    pub description: String,
}

impl From<&BookRecord> for IndexedDocument {
    fn from(b: &BookRecord) -> Self {
        Self { isbn: b.isbn.to_string(), title: b.title.clone(), authors: b.authors.clone(), description: b.description.clone() }
    }
}

/// A raw candidate from the similarity index.
///
/// `distance` is index-specific but non-negative and 0 means identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexHit {
    pub document: IndexedDocument,
    pub distance: f32,
}

/// Why a book was recommended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchReason {
    /// Both semantic similarity and popularity contributed to the score.
    Hybrid,
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hybrid => f.write_str("Hybrid Match"),
        }
    }
}

/// A ranked, enriched result returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub isbn: Isbn,
    pub title: String,
    pub authors: String,
    pub description: String,
    pub category: Option<String>,
    pub tone: Option<String>,
    pub tone_probability: Option<f32>,
    pub rating: f32,
    pub ratings_count: u64,
    pub thumbnail: Option<String>,
    pub score: f32,
    pub match_reason: MatchReason,
}

impl Recommendation {
    pub fn from_record(book: &BookRecord, score: f32) -> Self {
        Self {
            isbn: book.isbn,
            title: book.title.clone(),
            authors: book.authors.clone(),
            description: book.description.clone(),
            category: book.category().map(str::to_string),
            tone: book.dominant_tone.clone(),
            tone_probability: book.tone_probability,
            rating: book.average_rating,
            ratings_count: book.ratings_count,
            thumbnail: book.thumbnail.clone(),
            score,
            match_reason: MatchReason::Hybrid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enriched_category_wins_over_raw() {
        let mut b = BookRecord::new(1, "t");
        b.raw_category = Some("Juvenile Fiction".into());
        assert_eq!(b.category(), Some("Juvenile Fiction"));
        b.simple_category = Some("Fiction".into());
        assert_eq!(b.category(), Some("Fiction"));
    }

    #[test]
    fn match_reason_label() {
        assert_eq!(MatchReason::Hybrid.to_string(), "Hybrid Match");
    }
}
