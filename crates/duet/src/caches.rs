//! Preset caches for diff results, line hashes and parsed documents.

use std::path::PathBuf;
use std::sync::Arc;

use duet_cache::{CacheConfig, CacheResult, ContentHasher, ExpiringCache, FileCache};
use duet_diff::SideBySideTable;
use duet_structure::XmlDocument;
use serde_json::Value;

/// Side-by-side tables keyed by `(left path, right path)`.
///
/// Entries are not fingerprinted; callers drop stale pairs with
/// [`Workbench::invalidate_file`](crate::Workbench::invalidate_file).
pub type DiffResultCache = ExpiringCache<(PathBuf, PathBuf), Arc<SideBySideTable>>;

/// Hex line hashes keyed by file path.
pub type LineHashCache = FileCache<Arc<[String]>>;

/// Parsed JSON and XML trees keyed by file path.
pub type StructureCache = FileCache<ParsedStructure>;

/// A parsed structured document.
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedStructure {
    Json(Arc<Value>),
    Xml(Arc<XmlDocument>),
}

impl ParsedStructure {
    pub fn as_json(&self) -> Option<&Arc<Value>> {
        match self {
            Self::Json(value) => Some(value),
            Self::Xml(_) => None,
        }
    }

    pub fn as_xml(&self) -> Option<&Arc<XmlDocument>> {
        match self {
            Self::Xml(doc) => Some(doc),
            Self::Json(_) => None,
        }
    }
}

pub fn diff_result_cache(config: CacheConfig) -> CacheResult<DiffResultCache> {
    ExpiringCache::new("diff-results", config)
}

pub fn line_hash_cache(config: CacheConfig) -> CacheResult<LineHashCache> {
    FileCache::new("line-hashes", config)
}

pub fn structure_cache(config: CacheConfig) -> CacheResult<StructureCache> {
    FileCache::new("structures", config)
}

/// Hash each line with the line-domain BLAKE3 hasher, hex encoded.
pub fn compute_line_hashes<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines
        .iter()
        .map(|line| ContentHasher::LINE.hash(line.as_ref().as_bytes()).to_hex())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CachesConfig;

    #[test]
    fn line_hashes_are_stable_and_distinct() {
        let a = compute_line_hashes(&["alpha", "beta", "alpha"]);
        assert_eq!(a.len(), 3);
        assert_eq!(a[0], a[2]);
        assert_ne!(a[0], a[1]);
        assert_eq!(a[0].len(), 64);
        assert!(compute_line_hashes::<&str>(&[]).is_empty());
    }

    #[test]
    fn line_hashes_are_domain_separated() {
        let line = compute_line_hashes(&["same"]);
        let file = ContentHasher::FILE.hash(b"same").to_hex();
        assert_ne!(line[0], file);
    }

    #[test]
    fn presets_build_from_defaults() {
        let presets = CachesConfig::default();
        let diffs = diff_result_cache(presets.diff_results).unwrap();
        let hashes = line_hash_cache(presets.line_hashes).unwrap();
        let structures = structure_cache(presets.structures).unwrap();

        assert_eq!(diffs.name(), "diff-results");
        assert_eq!(diffs.stats().capacity, 1000);
        assert_eq!(hashes.stats().capacity, 500);
        assert_eq!(structures.stats().capacity, 200);
    }

    #[test]
    fn parsed_structure_accessors() {
        let json = ParsedStructure::Json(Arc::new(serde_json::json!({"a": 1})));
        assert!(json.as_json().is_some());
        assert!(json.as_xml().is_none());

        let xml = ParsedStructure::Xml(Arc::new(XmlDocument::parse("<r/>").unwrap()));
        assert_eq!(xml.as_xml().unwrap().root().name(), "r");
        assert!(xml.as_json().is_none());
    }
}
