//! Layered configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (`__` separates nested keys, e.g. `APP_RECOMMENDER__TOP_K=5`). Every
//! setting has a default, so an empty configuration is valid.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?;
        Ok(config)
    }

    /// Build from an explicit figment; no files or environment are consulted.
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn from_toml_str(toml: &str) -> Self { Self::from_figment(Figment::from(Toml::string(toml))) }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Typed settings tree, validated.
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self.figment.extract().map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.recommender.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub recommender: RecommenderSettings,
    pub data: DataSettings,
    pub index: IndexSettings,
    pub embedding: EmbeddingSettings,
}

/// Ranking knobs. `popularity_weight` is a constant, not learned.
impl Settings {
    /// LanceDB directory, relative paths taken against `data.base_dir`.
    pub fn lancedb_dir(&self) -> PathBuf { resolve_with_base(&self.data.base(), &self.index.lancedb_dir) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderSettings {
    pub top_k: usize,
    pub popularity_weight: f32,
    /// Candidates fetched per requested result without a category filter.
    pub fan_out_multiplier: usize,
    /// Same, when a category filter is active.
    pub filtered_fan_out_multiplier: usize,
}

impl Default for RecommenderSettings {
    fn default() -> Self { Self { top_k: 10, popularity_weight: 0.2, fan_out_multiplier: 3, filtered_fan_out_multiplier: 10 } }
}

impl RecommenderSettings {
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::InvalidConfig("recommender.top_k must be at least 1".into()));
        }
        if !self.popularity_weight.is_finite() || self.popularity_weight < 0.0 {
            return Err(Error::InvalidConfig(format!("recommender.popularity_weight must be a non-negative number, got {}", self.popularity_weight)));
        }
        // fan_out must exceed top_k
        if self.fan_out_multiplier < 2 || self.filtered_fan_out_multiplier < 2 {
            return Err(Error::InvalidConfig("fan-out multipliers must be at least 2".into()));
        }
        Ok(())
    }

    pub fn fan_out(&self, top_k: usize, category_filtered: bool) -> usize {
        let multiplier = if category_filtered { self.filtered_fan_out_multiplier } else { self.fan_out_multiplier };
        top_k.saturating_mul(multiplier)
    }
}

/// Where the metadata table lives. Precedence is `path`, then the toned,
/// enriched and clean tiers in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub path: Option<String>,
    pub base_dir: Option<String>,
    pub toned_path: String,
    pub enriched_path: String,
    pub clean_path: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            path: None,
            base_dir: None,
            toned_path: "artifacts/tone_analysis/toned_books.csv".into(),
            enriched_path: "artifacts/data_enrichment/enriched_books.csv".into(),
            clean_path: "artifacts/data_validation/clean_books.csv".into(),
        }
    }
}

impl DataSettings {
    pub fn base(&self) -> PathBuf { self.base_dir.as_deref().map(expand_path).unwrap_or_else(|| PathBuf::from(".")) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub lancedb_dir: String,
    pub table: String,
}

impl Default for IndexSettings {
    fn default() -> Self { Self { lancedb_dir: "artifacts/lancedb".into(), table: "books".into() } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// `local` (transformer model on disk) or `hashing` (deterministic, no model).
    pub provider: String,
    pub model_dir: Option<String>,
    pub max_len: usize,
    /// Output dimension of the hashing provider.
    pub dim: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self { Self { provider: "local".into(), model_dir: None, max_len: 256, dim: 384 } }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
