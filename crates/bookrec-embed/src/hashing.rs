use anyhow::Result;
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use bookrec_core::Embedder;

/// Deterministic bag-of-tokens embedder.
///
/// Each lowercased token lands in a bucket picked by its xxhash; texts that
/// share words end up close in cosine space. No model files needed, which
/// makes it the provider for tests and smoke runs.
pub struct HashingEmbedder { dim: usize }

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim: dim.max(1) } }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for token in text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            #[allow(clippy::cast_possible_truncation)]
            let idx = (h % self.dim as u64) as usize;
            v[idx] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 { for x in &mut v { *x /= norm; } }
        v
    }
}

impl Embedder for HashingEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> { Ok(texts.iter().map(|t| self.embed_one(t)).collect()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_same_vector_unit_norm() {
        let e = HashingEmbedder::new(64);
        let out = e.embed_batch(&["Space opera with aliens".into(), "space OPERA with aliens!".into()]).unwrap();
        assert_eq!(out[0].len(), 64);
        assert_eq!(out[0], out[1]);
        let norm: f32 = out[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn empty_text_is_zero_vector() {
        let v = HashingEmbedder::new(8).embed("").unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }
}
