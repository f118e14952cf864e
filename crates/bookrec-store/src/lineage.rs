//! Picks which metadata snapshot to load.
//!
//! The offline pipeline writes progressively richer tables: cleaned, then
//! category-enriched, then tone-annotated. The most processed one that exists
//! is used unless the configuration names a file explicitly.

use std::fmt;
use std::path::PathBuf;

use bookrec_core::config::{resolve_with_base, DataSettings};
use bookrec_core::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataTier {
    Explicit,
    Toned,
    Enriched,
    Clean,
}

impl fmt::Display for DataTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Explicit => "explicit",
            Self::Toned => "toned",
            Self::Enriched => "enriched",
            Self::Clean => "clean",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLineage {
    pub tier: DataTier,
    pub path: PathBuf,
}

impl DataLineage {
    /// Candidate files in precedence order.
    pub fn candidates(settings: &DataSettings) -> Vec<(DataTier, PathBuf)> {
        let base = settings.base();
        if let Some(p) = &settings.path {
            return vec![(DataTier::Explicit, resolve_with_base(&base, p))];
        }
        vec![
            (DataTier::Toned, resolve_with_base(&base, &settings.toned_path)),
            (DataTier::Enriched, resolve_with_base(&base, &settings.enriched_path)),
            (DataTier::Clean, resolve_with_base(&base, &settings.clean_path)),
        ]
    }

    pub fn resolve(settings: &DataSettings) -> Result<Self> {
        let candidates = Self::candidates(settings);
        if let Some((tier, path)) = candidates.iter().find(|(_, p)| p.is_file()) {
            tracing::info!(%tier, path = %path.display(), "using metadata snapshot");
            return Ok(Self { tier: *tier, path: path.clone() });
        }
        let tried: Vec<String> = candidates.iter().map(|(_, p)| p.display().to_string()).collect();
        Err(Error::NotFound(format!("no metadata table found; tried {}", tried.join(", "))))
    }
}
