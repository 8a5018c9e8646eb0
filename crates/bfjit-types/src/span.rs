use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Source location of a single instruction byte.
///
/// `offset` is 0-based; line/column values are 1-based for human-readable
/// error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub offset: usize,
    pub line: u32,
    #[serde(rename = "column")]
    pub col: u32,
}

impl Span {
    /// Create a new span.
    pub fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// A loaded program: its name and raw bytes.
///
/// Programs are arbitrary bytes, not necessarily UTF-8. Only eight of them
/// mean anything; the rest are commentary.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    bytes: Vec<u8>,
    /// Cached line start byte offsets for fast line lookup.
    line_starts: Vec<usize>,
}

impl SourceFile {
    /// Create a new source file.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let line_starts = std::iter::once(0)
            .chain(
                bytes
                    .iter()
                    .enumerate()
                    .filter(|(_, &b)| b == b'\n')
                    .map(|(i, _)| i + 1),
            )
            .collect();
        Self {
            name: name.into(),
            bytes,
            line_starts,
        }
    }

    /// The raw program bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length of the program in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Resolve a byte offset to a [`Span`].
    ///
    /// Offsets past the end resolve to the position just after the last byte.
    pub fn span_at(&self, offset: usize) -> Span {
        let offset = offset.min(self.bytes.len());
        let idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let col = offset - self.line_starts[idx];
        Span::new(offset, idx as u32 + 1, col as u32 + 1)
    }

    /// Extract a source line by 1-based line number, lossily decoded.
    ///
    /// Returns `None` if the line number is out of range.
    pub fn line(&self, line_number: u32) -> Option<Cow<'_, str>> {
        let idx = line_number.checked_sub(1)? as usize;
        if idx >= self.line_starts.len() {
            return None;
        }
        let start = self.line_starts[idx];
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&s| s.saturating_sub(1)) // strip the \n
            .unwrap_or(self.bytes.len());
        let mut line = &self.bytes[start..end];
        if let Some(stripped) = line.strip_suffix(b"\r") {
            line = stripped;
        }
        Some(String::from_utf8_lossy(line))
    }

    /// Get the total number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_display() {
        let s = Span::new(40, 3, 7);
        assert_eq!(format!("{s}"), "3:7");
    }

    #[test]
    fn test_span_at_first_line() {
        let src = SourceFile::new("t.b", "+++[");
        assert_eq!(src.span_at(3), Span::new(3, 1, 4));
    }

    #[test]
    fn test_span_at_after_newline() {
        let src = SourceFile::new("t.b", "++\n-[\n]");
        assert_eq!(src.span_at(3), Span::new(3, 2, 1));
        assert_eq!(src.span_at(4), Span::new(4, 2, 2));
        assert_eq!(src.span_at(6), Span::new(6, 3, 1));
    }

    #[test]
    fn test_span_at_clamps_past_end() {
        let src = SourceFile::new("t.b", "ab");
        assert_eq!(src.span_at(99), Span::new(2, 1, 3));
    }

    #[test]
    fn test_source_file_line_extraction() {
        let src = SourceFile::new("t.b", "line one\nline two\nline three");
        assert_eq!(src.line(1).as_deref(), Some("line one"));
        assert_eq!(src.line(2).as_deref(), Some("line two"));
        assert_eq!(src.line(3).as_deref(), Some("line three"));
        assert_eq!(src.line(0), None);
        assert_eq!(src.line(4), None);
    }

    #[test]
    fn test_source_file_crlf() {
        let src = SourceFile::new("t.b", "+[\r\n-]\r\n");
        assert_eq!(src.line(1).as_deref(), Some("+["));
        assert_eq!(src.line(2).as_deref(), Some("-]"));
    }

    #[test]
    fn test_source_file_non_utf8() {
        let src = SourceFile::new("t.b", vec![b'+', 0xff, b'.']);
        assert_eq!(src.len(), 3);
        assert_eq!(src.line(1).as_deref(), Some("+\u{fffd}."));
    }

    #[test]
    fn test_source_file_empty() {
        let src = SourceFile::new("t.b", "");
        assert!(src.is_empty());
        assert_eq!(src.line_count(), 1);
        assert_eq!(src.line(1).as_deref(), Some(""));
    }
}
