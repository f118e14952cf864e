//! The recommendation engine.
//!
//! One `recommend` call walks retrieve, join, filter, score, rank and
//! truncate with no state carried between calls. The metadata store and the
//! index handle are the only things the engine owns, and neither is mutated
//! by a query, so a single `Recommender` can serve concurrent callers.

use thiserror::Error;
use tracing::Span;

use bookrec_core::config::RecommenderSettings;
use bookrec_core::ident::normalize_isbn;
use bookrec_core::types::{BookRecord, IndexHit, Recommendation};
use bookrec_core::{Error, Result, SimilarityIndex};
use bookrec_store::MetadataStore;

use crate::filter::CandidateFilter;
use crate::scorer::hybrid_score;

/// Cosine distances of exact matches can land a few ulps below zero.
const NEGATIVE_DISTANCE_TOLERANCE: f32 = 1e-4;

/// Shown to users who submit neither a query nor a filter.
pub const EMPTY_REQUEST_GUIDANCE: &str = "Please enter a search query or select a filter to find recommendations.";

/// One query plus its optional constraints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendRequest {
    pub query: String,
    pub filter: CandidateFilter,
    /// Overrides the configured `top_k` for this call.
    pub top_k: Option<usize>,
}

impl RecommendRequest {
    pub fn new(query: impl Into<String>) -> Self { Self { query: query.into(), ..Self::default() } }

    pub fn with_category(mut self, category: &str) -> Self {
        self.filter = CandidateFilter::new(Some(category), self.filter.tone.as_deref());
        self
    }

    pub fn with_tone(mut self, tone: &str) -> Self {
        self.filter = CandidateFilter::new(self.filter.category.as_deref(), Some(tone));
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// A blank query with no filter is not worth a search; callers should
    /// show this message instead of calling the engine.
    pub fn guidance(&self) -> Option<&'static str> {
        (self.query.trim().is_empty() && !self.filter.is_active()).then_some(EMPTY_REQUEST_GUIDANCE)
    }
}

/// Per-query accounting, mostly for logs and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStats {
    pub fan_out: usize,
    pub retrieved: usize,
    /// Candidates with no row in the metadata store.
    pub missing_metadata: usize,
    pub filtered_out: usize,
    /// Candidates skipped because their data could not be scored.
    pub skipped: usize,
    pub returned: usize,
}

#[derive(Debug, Error)]
enum CandidateError {
    #[error("invalid distance {0} from index")]
    InvalidDistance(f32),
    #[error("score is not a finite number (distance {distance}, rating {rating})")]
    NonFiniteScore { distance: f32, rating: f32 },
}

enum Resolved {
    Kept(Recommendation),
    MissingMetadata,
    Filtered,
}

pub struct Recommender<I: SimilarityIndex> {
    store: MetadataStore,
    index: I,
    settings: RecommenderSettings,
    span: Span,
}

impl<I: SimilarityIndex> Recommender<I> {
    /// The store is taken as already loaded; it is never re-read.
    pub fn new(store: MetadataStore, index: I, settings: RecommenderSettings) -> Result<Self> {
        settings.validate()?;
        if store.is_empty() { tracing::warn!("metadata store is empty; every candidate will be dropped"); }
        tracing::info!(books = store.len(), top_k = settings.top_k, popularity_weight = settings.popularity_weight, "recommender initialized");
        Ok(Self { store, index, settings, span: tracing::info_span!("recommender") })
    }

    /// Run every query inside `span` instead of the default `recommender` span.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn store(&self) -> &MetadataStore { &self.store }

    pub fn settings(&self) -> &RecommenderSettings { &self.settings }

    pub fn recommend(&self, query: &str, category: Option<&str>, tone: Option<&str>) -> Result<Vec<Recommendation>> {
        let request = RecommendRequest { query: query.to_string(), filter: CandidateFilter::new(category, tone), top_k: None };
        self.recommend_request(&request).map(|(results, _)| results)
    }

    /// Ranked results plus what happened to the candidates along the way.
    ///
    /// Only a failing index is an error; candidates that cannot be joined,
    /// filtered or scored are dropped and counted.
    pub fn recommend_request(&self, request: &RecommendRequest) -> Result<(Vec<Recommendation>, QueryStats)> {
        let top_k = request.top_k.unwrap_or(self.settings.top_k);
        if top_k == 0 { return Err(Error::Operation("requested top_k must be at least 1".into())); }
        let mut stats = QueryStats { fan_out: self.settings.fan_out(top_k, request.filter.has_category()), ..QueryStats::default() };

        let span = tracing::info_span!(parent: &self.span, "recommend", top_k, fan_out = stats.fan_out);
        let _entered = span.enter();

        if request.guidance().is_some() {
            tracing::debug!("blank query without filters, nothing to search");
            return Ok((Vec::new(), stats));
        }

        let hits = self
            .index
            .search(&request.query, stats.fan_out)
            .map_err(|e| Error::RecommendationFailed(format!("{e:#}")))?;
        stats.retrieved = hits.len();

        let mut ranked = Vec::with_capacity(hits.len());
        for hit in &hits {
            match self.resolve(hit, &request.filter) {
                Ok(Resolved::Kept(rec)) => ranked.push(rec),
                Ok(Resolved::MissingMetadata) => stats.missing_metadata += 1,
                Ok(Resolved::Filtered) => stats.filtered_out += 1,
                Err(e) => {
                    tracing::warn!(isbn = %hit.document.isbn, error = %e, "skipping candidate");
                    stats.skipped += 1;
                }
            }
        }

        // stable: equal scores keep retrieval order
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(top_k);
        stats.returned = ranked.len();
        tracing::debug!(retrieved = stats.retrieved, missing_metadata = stats.missing_metadata, filtered_out = stats.filtered_out, skipped = stats.skipped, returned = stats.returned, "query ranked");
        Ok((ranked, stats))
    }

    fn resolve(&self, hit: &IndexHit, filter: &CandidateFilter) -> std::result::Result<Resolved, CandidateError> {
        let Some(book) = self.store.lookup(normalize_isbn(&hit.document.isbn)) else {
            tracing::trace!(isbn = %hit.document.isbn, "no metadata for candidate");
            return Ok(Resolved::MissingMetadata);
        };
        if !filter.accepts(book) { return Ok(Resolved::Filtered); }
        if !hit.distance.is_finite() || hit.distance < -NEGATIVE_DISTANCE_TOLERANCE {
            return Err(CandidateError::InvalidDistance(hit.distance));
        }
        let distance = hit.distance.max(0.0);
        let score = hybrid_score(distance, book.average_rating, self.settings.popularity_weight);
        if !score.is_finite() {
            return Err(CandidateError::NonFiniteScore { distance, rating: book.average_rating });
        }
        let mut rec = Recommendation::from_record(book, score);
        fill_display_gaps(&mut rec, book, hit);
        Ok(Resolved::Kept(rec))
    }
}

// Older tables can lack display text the index still carries.
fn fill_display_gaps(rec: &mut Recommendation, book: &BookRecord, hit: &IndexHit) {
    if book.title.is_empty() { rec.title.clone_from(&hit.document.title); }
    if book.authors.is_empty() { rec.authors.clone_from(&hit.document.authors); }
    if book.description.is_empty() { rec.description.clone_from(&hit.document.description); }
}
