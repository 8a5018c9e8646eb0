use serde::{Deserialize, Serialize};

/// Largest program accepted by the loader, in bytes.
pub const DEFAULT_MAX_SOURCE_LEN: usize = 10_000;

/// Number of cells on a fresh tape.
pub const DEFAULT_TAPE_LEN: usize = 30_000;

/// Size bounds applied to one compile-and-run cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Programs longer than this fail to load.
    pub max_source_len: usize,
    /// Length of the cell tape.
    pub tape_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_source_len: DEFAULT_MAX_SOURCE_LEN,
            tape_len: DEFAULT_TAPE_LEN,
        }
    }
}
