//! One handle over loaders, diff engines and the preset caches.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use duet_access::TextLoader;
use duet_cache::CacheStats;
use duet_diff::{
    CancellationToken, Hunk, LineDiffer, SideBySideTable, Streamed, StreamingDiff,
};
use duet_structure::{JsonComparator, JsonDiff, XmlComparator, XmlDiff, XmlDocument};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::caches::{
    compute_line_hashes, diff_result_cache, line_hash_cache, structure_cache, DiffResultCache,
    LineHashCache, ParsedStructure, StructureCache,
};
use crate::config::DuetConfig;
use crate::error::DuetResult;

/// Counters of the three preset caches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WorkbenchStats {
    pub diff_results: CacheStats,
    pub line_hashes: CacheStats,
    pub structures: CacheStats,
}

/// Diffing front end for an embedding application.
///
/// Cheap reads go through the caches; the path arguments are cache keys and,
/// for path-keyed caches, the files whose content is fingerprinted. Text
/// passed alongside a path is expected to be that file's current content.
pub struct Workbench {
    config: DuetConfig,
    streaming: StreamingDiff,
    json: JsonComparator,
    xml: XmlComparator,
    diff_results: DiffResultCache,
    line_hashes: LineHashCache,
    structures: StructureCache,
}

impl Workbench {
    pub fn new(config: DuetConfig) -> DuetResult<Self> {
        config.validate()?;
        let streaming = StreamingDiff::new(config.streaming.clone())?;
        let diff_results = diff_result_cache(config.caches.diff_results.clone())?;
        let line_hashes = line_hash_cache(config.caches.line_hashes.clone())?;
        let structures = structure_cache(config.caches.structures.clone())?;
        info!(
            algorithm = ?config.streaming.algorithm,
            window_size = config.streaming.window_size,
            "workbench ready"
        );
        Ok(Self {
            json: JsonComparator::new(config.structural.clone()),
            xml: XmlComparator::new(config.structural.clone()),
            config,
            streaming,
            diff_results,
            line_hashes,
            structures,
        })
    }

    pub fn config(&self) -> &DuetConfig {
        &self.config
    }

    // ---- Line diffs ----

    /// Open `path` with the loader its size calls for.
    pub fn open(&self, path: &Path) -> DuetResult<TextLoader> {
        Ok(TextLoader::open(path, &self.config.access)?)
    }

    /// Uncached flat diff of two in-memory line lists.
    pub fn diff<S: AsRef<str>>(&self, old: &[S], new: &[S]) -> Hunk {
        self.config.streaming.algorithm.compute_diff(old, new)
    }

    /// Side-by-side table of `old` and `new`, cached under the path pair.
    pub fn side_by_side<S: AsRef<str>>(
        &self,
        left_path: &Path,
        right_path: &Path,
        old: &[S],
        new: &[S],
    ) -> Arc<SideBySideTable> {
        let key = (left_path.to_path_buf(), right_path.to_path_buf());
        self.diff_results.get_or_compute(key, || {
            debug!(
                left = %left_path.display(),
                right = %right_path.display(),
                "computing side-by-side diff"
            );
            Arc::new(self.config.streaming.algorithm.compute_side_by_side(old, new))
        })
    }

    /// Windowed side-by-side diff of two files. Not cached.
    pub fn stream_side_by_side(
        &self,
        left_path: &Path,
        right_path: &Path,
        cancel: &CancellationToken,
    ) -> DuetResult<Streamed<SideBySideTable>> {
        let old = self.open(left_path)?;
        let new = self.open(right_path)?;
        Ok(self.streaming.compute_side_by_side(&old, &new, cancel)?)
    }

    /// Windowed flat diff of two files. Not cached.
    pub fn stream_diff(
        &self,
        left_path: &Path,
        right_path: &Path,
        cancel: &CancellationToken,
    ) -> DuetResult<Streamed<Hunk>> {
        let old = self.open(left_path)?;
        let new = self.open(right_path)?;
        Ok(self.streaming.compute_diff(&old, &new, cancel)?)
    }

    /// Hex line hashes of `lines`, the current content of `path`.
    pub fn line_hashes<S: AsRef<str>>(&self, path: &Path, lines: &[S]) -> Arc<[String]> {
        self.line_hashes
            .get_or_compute(path, || compute_line_hashes(lines).into())
    }

    // ---- Structural diffs ----

    /// Parse `text`, the current content of `path`, as JSON.
    pub fn parse_json(&self, path: &Path, text: &str) -> DuetResult<Arc<Value>> {
        self.cached_structure(path, ParsedStructure::as_json, ParsedStructure::Json, || {
            Ok(duet_structure::parse_json(text)?)
        })
    }

    /// Parse `text`, the current content of `path`, as XML.
    pub fn parse_xml(&self, path: &Path, text: &str) -> DuetResult<Arc<XmlDocument>> {
        let max_depth = self.config.structural.max_depth;
        self.cached_structure(path, ParsedStructure::as_xml, ParsedStructure::Xml, || {
            Ok(XmlDocument::parse_with_max_depth(text, max_depth)?)
        })
    }

    /// Read and parse `path` as JSON, reusing a cached tree if the file is
    /// unchanged.
    pub fn load_json(&self, path: &Path) -> DuetResult<Arc<Value>> {
        self.cached_structure(path, ParsedStructure::as_json, ParsedStructure::Json, || {
            let text = std::fs::read_to_string(path)?;
            Ok(duet_structure::parse_json(&text)?)
        })
    }

    /// Read and parse `path` as XML, reusing a cached tree if the file is
    /// unchanged.
    pub fn load_xml(&self, path: &Path) -> DuetResult<Arc<XmlDocument>> {
        let max_depth = self.config.structural.max_depth;
        self.cached_structure(path, ParsedStructure::as_xml, ParsedStructure::Xml, || {
            let text = std::fs::read_to_string(path)?;
            Ok(XmlDocument::parse_with_max_depth(&text, max_depth)?)
        })
    }

    pub fn compare_json_files(&self, left_path: &Path, right_path: &Path) -> DuetResult<JsonDiff> {
        let left = self.load_json(left_path)?;
        let right = self.load_json(right_path)?;
        let diff = self.json.compare_values(&left, &right)?;
        debug!(
            left = %left_path.display(),
            right = %right_path.display(),
            changes = diff.len(),
            "json files compared"
        );
        Ok(diff)
    }

    pub fn compare_xml_files(&self, left_path: &Path, right_path: &Path) -> DuetResult<XmlDiff> {
        let left = self.load_xml(left_path)?;
        let right = self.load_xml(right_path)?;
        let diff = self.xml.compare_documents(&left, &right)?;
        debug!(
            left = %left_path.display(),
            right = %right_path.display(),
            changes = diff.len(),
            "xml files compared"
        );
        Ok(diff)
    }

    /// A cached tree of the other format is replaced.
    fn cached_structure<T, F>(
        &self,
        path: &Path,
        extract: fn(&ParsedStructure) -> Option<&Arc<T>>,
        wrap: fn(Arc<T>) -> ParsedStructure,
        parse: F,
    ) -> DuetResult<Arc<T>>
    where
        F: FnOnce() -> DuetResult<T>,
    {
        if let Some(hit) = self.structures.try_get(path) {
            if let Some(value) = extract(&hit) {
                return Ok(Arc::clone(value));
            }
        }
        let stamp = self.structures.stamp(path);
        let value = Arc::new(parse()?);
        self.structures.set_stamped(path, wrap(Arc::clone(&value)), stamp);
        Ok(value)
    }

    // ---- Cache maintenance ----

    /// Drop every cached value derived from `path`. Returns how many
    /// entries were removed.
    pub fn invalidate_file(&self, path: &Path) -> usize {
        let pairs = self
            .diff_results
            .invalidate_where(|(left, right): &(PathBuf, PathBuf)| {
                left.as_path() == path || right.as_path() == path
            });
        let hashes = usize::from(self.line_hashes.invalidate(path));
        let structures = usize::from(self.structures.invalidate(path));
        let removed = pairs + hashes + structures;
        debug!(path = %path.display(), removed, "file invalidated");
        removed
    }

    /// Remove expired entries from all caches now.
    pub fn purge_expired(&self) -> usize {
        self.diff_results.purge_expired()
            + self.line_hashes.purge_expired()
            + self.structures.purge_expired()
    }

    pub fn clear_caches(&self) {
        self.diff_results.clear();
        self.line_hashes.clear();
        self.structures.clear();
    }

    pub fn stats(&self) -> WorkbenchStats {
        WorkbenchStats {
            diff_results: self.diff_results.stats(),
            line_hashes: self.line_hashes.stats(),
            structures: self.structures.stats(),
        }
    }
}

impl std::fmt::Debug for Workbench {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workbench")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use duet_diff::ChangeKind;
    use duet_structure::{ElementChangeKind, JsonOperation};

    fn workbench() -> Workbench {
        Workbench::new(DuetConfig::default()).unwrap()
    }

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    // ---- Line diffs ----

    #[test]
    fn side_by_side_is_cached_per_pair() {
        let wb = workbench();
        let (a, b) = (Path::new("a.txt"), Path::new("b.txt"));
        let old = ["one", "two", "three"];
        let new = ["one", "2", "three"];

        let first = wb.side_by_side(a, b, &old, &new);
        let second = wb.side_by_side(a, b, &old, &new);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.modified(), 1);
        assert_eq!(first.len(), 3);

        let stats = wb.stats().diff_results;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);

        // Reversed pair is a different key.
        let reversed = wb.side_by_side(b, a, &new, &old);
        assert!(!Arc::ptr_eq(&first, &reversed));
    }

    #[test]
    fn invalidate_file_drops_every_pair_that_mentions_it() {
        let wb = workbench();
        let lines = ["x"];
        wb.side_by_side(Path::new("a"), Path::new("b"), &lines, &lines);
        wb.side_by_side(Path::new("c"), Path::new("a"), &lines, &lines);
        wb.side_by_side(Path::new("c"), Path::new("d"), &lines, &lines);

        assert_eq!(wb.invalidate_file(Path::new("a")), 2);
        assert_eq!(wb.stats().diff_results.size, 1);
        assert_eq!(wb.invalidate_file(Path::new("a")), 0);
    }

    #[test]
    fn streamed_files_match_in_memory_table() {
        let dir = tempfile::tempdir().unwrap();
        let left = write(&dir, "left.txt", "a\nb\nc\nd\n");
        let right = write(&dir, "right.txt", "a\nB\nc\nd\ne\n");
        let wb = workbench();

        let streamed = wb
            .stream_side_by_side(&left, &right, &CancellationToken::new())
            .unwrap();
        assert!(!streamed.cancelled);
        assert_eq!(streamed.old_consumed, 4);
        assert_eq!(streamed.new_consumed, 5);

        let in_memory = wb.side_by_side(
            &left,
            &right,
            &["a", "b", "c", "d"],
            &["a", "B", "c", "d", "e"],
        );
        assert_eq!(streamed.output.rows(), in_memory.rows());
        assert_eq!(streamed.output.added(), 1);
        assert_eq!(streamed.output.modified(), 1);

        let hunk = wb.stream_diff(&left, &right, &CancellationToken::new()).unwrap();
        assert_eq!(hunk.output.new_lines(), vec!["a", "B", "c", "d", "e"]);
    }

    #[test]
    fn cancelled_stream_reports_partial_run() {
        let dir = tempfile::tempdir().unwrap();
        let left = write(&dir, "left.txt", "a\n");
        let right = write(&dir, "right.txt", "b\n");
        let wb = workbench();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let streamed = wb.stream_side_by_side(&left, &right, &cancel).unwrap();
        assert!(streamed.cancelled);
        assert!(streamed.output.is_empty());
    }

    #[test]
    fn streaming_a_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let right = write(&dir, "right.txt", "b\n");
        let err = workbench()
            .stream_diff(&dir.path().join("nope.txt"), &right, &CancellationToken::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn uncached_diff_uses_configured_algorithm() {
        let hunk = workbench().diff(&["a", "b"], &["a", "c"]);
        assert_eq!(hunk.changes[1].kind, ChangeKind::Modified);
    }

    #[test]
    fn line_hashes_follow_file_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "f.txt", "a\nb\n");
        let wb = workbench();

        let first = wb.line_hashes(&path, &["a", "b"]);
        let again = wb.line_hashes(&path, &["a", "b"]);
        assert!(Arc::ptr_eq(&first, &again));

        std::fs::write(&path, "a\nz\n").unwrap();
        let changed = wb.line_hashes(&path, &["a", "z"]);
        assert_eq!(changed[0], first[0]);
        assert_ne!(changed[1], first[1]);

        let stats = wb.stats().line_hashes;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
    }

    // ---- Structural diffs ----

    #[test]
    fn json_files_compare_and_cache_trees() {
        let dir = tempfile::tempdir().unwrap();
        let left = write(&dir, "l.json", r#"{"a": 1, "b": [1, 2]}"#);
        let right = write(&dir, "r.json", r#"{"b": [2, 1], "a": 2}"#);
        let wb = workbench();

        let diff = wb.compare_json_files(&left, &right).unwrap();
        assert_eq!(diff.at("a").unwrap().operation, JsonOperation::Replace);
        assert_eq!(diff.at("b").unwrap().operation, JsonOperation::Move);
        assert_eq!(diff.len(), 2);

        wb.compare_json_files(&left, &right).unwrap();
        let stats = wb.stats().structures;
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.hits, 2);
    }

    #[test]
    fn xml_files_compare() {
        let dir = tempfile::tempdir().unwrap();
        let left = write(&dir, "l.xml", r#"<cfg mode="a"><item/></cfg>"#);
        let right = write(&dir, "r.xml", r#"<cfg mode="b"><item/><extra/></cfg>"#);

        let diff = workbench().compare_xml_files(&left, &right).unwrap();
        assert_eq!(diff.count(ElementChangeKind::ModifyAttribute), 1);
        assert_eq!(diff.count(ElementChangeKind::AddElement), 1);
    }

    #[test]
    fn malformed_documents_are_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let empty = write(&dir, "empty.json", "");
        let broken = write(&dir, "broken.xml", "<a><b></a>");
        let wb = workbench();

        assert_eq!(wb.load_json(&empty).unwrap_err().kind(), ErrorKind::InvalidInput);
        assert_eq!(wb.load_xml(&broken).unwrap_err().kind(), ErrorKind::InvalidInput);
        assert_eq!(
            wb.load_json(&dir.path().join("missing.json")).unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert!(wb.stats().structures.size == 0);
    }

    #[test]
    fn cached_tree_of_other_format_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "doc", "<r/>");
        let wb = workbench();

        let json = wb.parse_json(&path, "[1]").unwrap();
        assert_eq!(*json, serde_json::json!([1]));
        let xml = wb.parse_xml(&path, "<r/>").unwrap();
        assert_eq!(xml.root().name(), "r");
        assert_eq!(wb.stats().structures.size, 1);
        assert_eq!(wb.invalidate_file(&path), 1);
    }

    // ---- Setup ----

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = DuetConfig::default();
        config.caches.line_hashes.capacity = 0;
        let err = Workbench::new(config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn clear_and_purge() {
        let wb = workbench();
        wb.side_by_side(Path::new("a"), Path::new("b"), &["x"], &["y"]);
        assert_eq!(wb.purge_expired(), 0);
        wb.clear_caches();
        assert_eq!(wb.stats().diff_results.size, 0);
    }
}
