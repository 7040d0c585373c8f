//! Duet: document diffing for applications.
//!
//! Bundles the Duet subsystems behind one dependency and adds the glue an
//! embedding application needs: a TOML-loadable [`DuetConfig`], a logging
//! initializer, the preset caches and the [`Workbench`] front end.
//!
//! The subsystem crates stay reachable under [`access`], [`diff`],
//! [`structure`] and [`cache`].

pub mod caches;
pub mod config;
pub mod error;
pub mod logging;
pub mod workbench;

pub use duet_access as access;
pub use duet_cache as cache;
pub use duet_diff as diff;
pub use duet_structure as structure;

pub use caches::{
    compute_line_hashes, DiffResultCache, LineHashCache, ParsedStructure, StructureCache,
};
pub use config::{CachesConfig, DuetConfig};
pub use error::{DuetError, DuetResult, ErrorKind};
pub use logging::{init_logging, init_logging_with};
pub use workbench::{Workbench, WorkbenchStats};

// Re-export key types
pub use duet_access::{LineSource, TextLoader};
pub use duet_cache::{CacheConfig, CacheStats, ExpiringCache, FileCache};
pub use duet_diff::{
    AlignmentRow, CancellationToken, ChangeKind, DiffAlgorithm, Hunk, LineChange, LineDiffer,
    SideBySideTable, Streamed, StreamingConfig,
};
pub use duet_structure::{
    ElementChange, ElementChangeKind, JsonDiff, JsonOperation, StructuralChange,
    StructuralConfig, XmlDiff, XmlDocument,
};
