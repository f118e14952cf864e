use crate::types::IndexHit;

/// Text embedding capability. Implementations must return vectors of
/// `dim()` length, L2-normalized.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector"))
    }
}

/// Nearest-neighbour search over book descriptions.
///
/// Returns at most `fan_out` hits ordered by ascending distance. An `Err`
/// means the index itself is unusable, not that nothing matched.
pub trait SimilarityIndex: Send + Sync {
    fn search(&self, query: &str, fan_out: usize) -> anyhow::Result<Vec<IndexHit>>;
}

impl<T: SimilarityIndex + ?Sized> SimilarityIndex for Box<T> {
    fn search(&self, query: &str, fan_out: usize) -> anyhow::Result<Vec<IndexHit>> { (**self).search(query, fan_out) }
}

impl<T: SimilarityIndex + ?Sized> SimilarityIndex for std::sync::Arc<T> {
    fn search(&self, query: &str, fan_out: usize) -> anyhow::Result<Vec<IndexHit>> { (**self).search(query, fan_out) }
}

impl<T: Embedder + ?Sized> Embedder for Box<T> {
    fn dim(&self) -> usize { (**self).dim() }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> { (**self).embed_batch(texts) }
}
