//! bookrec-embed
//!
//! `Embedder` implementations and the factory that picks one from
//! configuration. `APP_USE_FAKE_EMBEDDINGS=1` forces the hashing provider
//! regardless of configuration, for tests and machines without model files.

pub mod device;
pub mod hashing;
pub mod model;
pub mod pool;
pub mod tokenize;

use std::str::FromStr;

use bookrec_core::config::{expand_path, EmbeddingSettings};
use bookrec_core::{Embedder, Error, Result};

pub use hashing::HashingEmbedder;
pub use model::{resolve_model_dir, TransformerEmbedder};
pub use pool::masked_mean_l2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProvider {
    /// Transformer checkpoint on local disk.
    Local,
    Hashing,
}

impl FromStr for EmbeddingProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "huggingface" => Ok(Self::Local),
            "hashing" | "fake" => Ok(Self::Hashing),
            other => Err(Error::InvalidConfig(format!("Unsupported embedding provider: {other}. Options: 'local', 'hashing'."))),
        }
    }
}

fn fake_embeddings_forced() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Build the embedder named by `settings.provider`.
///
/// A model that cannot be located or loaded is an [`Error::Init`].
pub fn embedder_from_settings(settings: &EmbeddingSettings) -> Result<Box<dyn Embedder>> {
    let provider = if fake_embeddings_forced() { EmbeddingProvider::Hashing } else { settings.provider.parse()? };
    match provider {
        EmbeddingProvider::Hashing => {
            tracing::info!(dim = settings.dim, "using hashing embedder");
            Ok(Box::new(HashingEmbedder::new(settings.dim)))
        }
        EmbeddingProvider::Local => {
            let configured = settings.model_dir.as_deref().map(expand_path);
            let dir = resolve_model_dir(configured.as_deref()).map_err(|e| Error::init(format!("{e:#}")))?;
            let model = TransformerEmbedder::load(&dir, settings.max_len).map_err(|e| Error::init(format!("{e:#}")))?;
            Ok(Box::new(model))
        }
    }
}
