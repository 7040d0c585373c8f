//! Structural diff engine for Duet.
//!
//! Compares tree-shaped documents by meaning rather than by text:
//!
//! - [`JsonComparator`] -- object key order is irrelevant; arrays holding the
//!   same elements in another order collapse into a single `Move`
//! - [`XmlComparator`] -- attribute order and namespace declarations are
//!   irrelevant; reordered children are matched by name
//!
//! Both comparators accept either text or already-parsed trees and perform
//! no I/O. Empty or malformed input fails the call with a
//! [`StructureError`]; nothing is reported as a diff.

pub mod config;
pub mod error;
pub mod json;
pub mod xml;

pub use config::{StructuralConfig, DEFAULT_MAX_DEPTH};
pub use error::{StructureError, StructureResult};
pub use json::{
    compare_json, compare_values, parse_json, JsonComparator, JsonDiff, JsonOperation,
    StructuralChange,
};
pub use xml::{
    compare_documents, compare_xml, ElementChange, ElementChangeKind, XmlComparator, XmlDiff,
    XmlDocument, XmlElement,
};
