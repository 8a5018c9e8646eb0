//! Source mapping: native code offset → program source location.
//!
//! Each entry covers the bytes emitted for one instruction. With it, a
//! faulting address inside the code region can be traced back to the
//! instruction that produced it.

use bfjit_types::Span;
use serde::{Deserialize, Serialize};

/// A complete source map for one compiled program.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMap {
    pub entries: Vec<SourceMapEntry>,
}

/// One instruction's code range and origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMapEntry {
    /// Offset of the first emitted byte, from the start of the region.
    pub code_offset: usize,
    /// Number of bytes emitted.
    pub code_len: usize,
    /// The instruction symbol.
    pub op: char,
    /// Source position (1-based line/column).
    pub span: Span,
}

impl SourceMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Push a new entry. Entries must arrive in code order.
    pub fn push(&mut self, code_offset: usize, code_len: usize, op: char, span: Span) {
        self.entries.push(SourceMapEntry {
            code_offset,
            code_len,
            op,
            span,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the entry whose code range contains `offset`.
    pub fn find_by_code_offset(&self, offset: usize) -> Option<&SourceMapEntry> {
        let idx = self
            .entries
            .partition_point(|e| e.code_offset + e.code_len <= offset);
        self.entries
            .get(idx)
            .filter(|e| e.code_offset <= offset)
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Deserialize from JSON bytes.
    pub fn from_json(data: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(data)
    }
}
