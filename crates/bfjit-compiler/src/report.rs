//! Serializable compile summary.

use bfjit_types::Diagnostic;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Result of [`compile_to_report`](crate::compile_to_report).
///
/// On success `code_len` and `code_sha256` are set; on failure
/// `diagnostic` is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileReport {
    pub success: bool,
    /// Number of instructions in the program, commentary excluded.
    pub instructions: usize,
    /// Bytes of machine code emitted, frame included.
    pub code_len: Option<usize>,
    /// Size of the code buffer reserved for the program.
    pub capacity: usize,
    /// Lowercase hex SHA-256 of the emitted code.
    pub code_sha256: Option<String>,
    pub diagnostic: Option<Diagnostic>,
}

/// Lowercase hex SHA-256 of `code`.
pub fn code_digest(code: &[u8]) -> String {
    Sha256::digest(code)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
