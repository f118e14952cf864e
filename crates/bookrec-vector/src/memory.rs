use anyhow::{Result, anyhow};

use bookrec_core::types::{IndexHit, IndexedDocument};
use bookrec_core::{Embedder, SimilarityIndex};

const EMBED_BATCH: usize = 256;

/// Exhaustive cosine-distance index held in memory.
///
/// Distances are `1 - cos`, so they fall in `[0, 2]`. Equal distances keep
/// insertion order.
pub struct InMemoryIndex {
    docs: Vec<IndexedDocument>,
    vectors: Vec<Vec<f32>>,
    embedder: Box<dyn Embedder>,
}

impl InMemoryIndex {
    /// Embed each `(document, text)` pair; `text` is what gets compared to queries.
    pub fn build<I>(entries: I, embedder: Box<dyn Embedder>) -> Result<Self>
    where
        I: IntoIterator<Item = (IndexedDocument, String)>,
    {
        let (docs, texts): (Vec<_>, Vec<_>) = entries.into_iter().unzip();
        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(EMBED_BATCH) {
            let embedded = embedder.embed_batch(chunk)?;
            if embedded.len() != chunk.len() {
                return Err(anyhow!("embedder returned {} vectors for {} texts", embedded.len(), chunk.len()));
            }
            vectors.extend(embedded);
        }
        tracing::debug!(documents = docs.len(), "built in-memory index");
        Ok(Self { docs, vectors, embedder })
    }

    pub fn len(&self) -> usize { self.docs.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 { return 1.0; }
    // rounding can push an exact match just below zero
    (1.0 - dot / (na * nb)).max(0.0)
}

impl SimilarityIndex for InMemoryIndex {
    fn search(&self, query: &str, fan_out: usize) -> Result<Vec<IndexHit>> {
        let q = self.embedder.embed(query)?;
        let mut scored: Vec<(usize, f32)> = self.vectors.iter().enumerate().map(|(i, v)| (i, cosine_distance(&q, v))).collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        Ok(scored
            .into_iter()
            .take(fan_out)
            .map(|(i, distance)| IndexHit { document: self.docs[i].clone(), distance })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_distance_bounds() {
        assert!((cosine_distance(&[1.0, 0.0], &[1.0, 0.0])).abs() < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]) - 2.0).abs() < 1e-6);
        assert!((cosine_distance(&[0.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn self_distance_never_negative() {
        let norm = (0.3f32 * 0.3 + 0.7 * 0.7).sqrt();
        let v = [0.3 / norm, 0.7 / norm];
        for x in [v, [0.6f32, 0.8], [1.0, 1e-3]] {
            let d = cosine_distance(&x, &x);
            assert!((0.0..1e-6).contains(&d), "distance {d}");
        }
    }
}
