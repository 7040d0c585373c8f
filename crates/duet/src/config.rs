//! Top-level configuration, loadable from TOML.

use std::path::Path;
use std::time::Duration;

use duet_access::AccessConfig;
use duet_cache::CacheConfig;
use duet_diff::StreamingConfig;
use duet_structure::StructuralConfig;
use serde::{Deserialize, Serialize};

use crate::error::DuetResult;

/// Every knob Duet exposes, grouped by subsystem. Missing sections and
/// fields take their defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuetConfig {
    pub access: AccessConfig,
    pub streaming: StreamingConfig,
    pub structural: StructuralConfig,
    pub caches: CachesConfig,
}

/// Sizing for the three preset caches.
///
/// A section given only in part fills its other fields from
/// [`CacheConfig::default`], not from the preset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CachesConfig {
    /// Side-by-side tables keyed by (left path, right path).
    pub diff_results: CacheConfig,
    /// Per-line content hashes keyed by file path.
    pub line_hashes: CacheConfig,
    /// Parsed JSON and XML trees keyed by file path.
    pub structures: CacheConfig,
}

impl Default for CachesConfig {
    fn default() -> Self {
        Self {
            diff_results: CacheConfig::new(
                1000,
                Duration::from_secs(5 * 60),
                Some(Duration::from_secs(60)),
            ),
            line_hashes: CacheConfig::new(
                500,
                Duration::from_secs(10 * 60),
                Some(Duration::from_secs(2 * 60)),
            ),
            structures: CacheConfig::new(
                200,
                Duration::from_secs(15 * 60),
                Some(Duration::from_secs(3 * 60)),
            ),
        }
    }
}

impl DuetConfig {
    pub fn from_toml_str(text: &str) -> DuetResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> DuetResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check every section, returning the first problem found.
    pub fn validate(&self) -> DuetResult<()> {
        self.access.validate()?;
        self.streaming.validate()?;
        self.caches.diff_results.validate()?;
        self.caches.line_hashes.validate()?;
        self.caches.structures.validate()?;
        Ok(())
    }
}
