//! Running many queries through one engine.

use bookrec_core::types::Recommendation;
use bookrec_core::{Result, SimilarityIndex};

use crate::engine::{RecommendRequest, Recommender};

/// What one query of a batch produced.
#[derive(Debug)]
pub struct QueryOutcome {
    pub query: String,
    pub result: Result<Vec<Recommendation>>,
}

impl QueryOutcome {
    pub fn is_ok(&self) -> bool { self.result.is_ok() }
}

impl<I: SimilarityIndex> Recommender<I> {
    /// Recommend for each request in order. A failing query is logged and
    /// recorded in its outcome; the rest of the batch still runs.
    pub fn recommend_batch<'r>(&self, requests: impl IntoIterator<Item = &'r RecommendRequest>) -> Vec<QueryOutcome> {
        let outcomes: Vec<QueryOutcome> = requests
            .into_iter()
            .map(|request| {
                let result = self.recommend_request(request).map(|(results, _)| results);
                if let Err(e) = &result {
                    tracing::error!(query = %request.query, error = %e, "batch query failed");
                }
                QueryOutcome { query: request.query.clone(), result }
            })
            .collect();
        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        tracing::info!(queries = outcomes.len(), failed, "batch finished");
        outcomes
    }
}
