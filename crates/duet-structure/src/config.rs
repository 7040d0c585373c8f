use serde::{Deserialize, Serialize};

/// Default nesting limit, matching `serde_json`'s own parser limit.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Knobs shared by the JSON and XML comparators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuralConfig {
    /// Deepest nesting level the comparators descend to. The root is level 0.
    pub max_depth: usize,
    /// Emit `ReorderElement` for XML children matched by name at a
    /// different position.
    pub report_reorders: bool,
}

impl Default for StructuralConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            report_reorders: true,
        }
    }
}
