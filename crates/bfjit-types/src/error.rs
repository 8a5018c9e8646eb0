use crate::{SourceFile, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Load,
    Structure,
    Resource,
    Runtime,
}

/// Numeric error code (E100–E499).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Load errors (E100–E199) ──
    pub const SOURCE_UNREADABLE: Self = Self(100);
    pub const SOURCE_TOO_LARGE: Self = Self(101);

    // ── Structure errors (E200–E299) ──
    pub const UNMATCHED_LOOP_OPEN: Self = Self(200);
    pub const UNMATCHED_LOOP_CLOSE: Self = Self(201);

    // ── Resource errors (E300–E399) ──
    pub const CODE_BUFFER_EXHAUSTED: Self = Self(300);
    pub const EXECUTABLE_MEMORY_UNAVAILABLE: Self = Self(301);
    pub const DISPLACEMENT_OVERFLOW: Self = Self(302);
    pub const EMPTY_TAPE: Self = Self(303);

    // ── Runtime errors (E400–E499) ──
    pub const HOST_IO: Self = Self(400);
    pub const POINTER_OUT_OF_BOUNDS: Self = Self(401);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Load,
            200..=299 => ErrorCategory::Structure,
            300..=399 => ErrorCategory::Resource,
            _ => ErrorCategory::Runtime,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load => write!(f, "load"),
            Self::Structure => write!(f, "structure"),
            Self::Resource => write!(f, "resource"),
            Self::Runtime => write!(f, "runtime"),
        }
    }
}

/// A rendered, structured error ready for display or JSON output.
///
/// Every stage error converts into one of these; the CLI never parses
/// free-form error strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Source file name.
    pub file: String,
    /// Error code (e.g., E200).
    pub code: ErrorCode,
    /// Error category (derived from code).
    pub category: ErrorCategory,
    /// Human-readable error message.
    pub message: String,
    /// Source location, when the error points at an instruction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// The source line containing `span`, for context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_line: Option<String>,
    /// Optional fix suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with no location.
    pub fn new(file: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            code,
            category: code.category(),
            message: message.into(),
            span: None,
            source_line: None,
            suggestion: None,
        }
    }

    /// Attach a location, pulling the source line out of `source`.
    pub fn at(mut self, span: Span, source: &SourceFile) -> Self {
        self.source_line = source.line(span.line).map(|l| l.into_owned());
        self.span = Some(span);
        self
    }

    /// Attach a fix suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(f, "{}:{}: ", self.file, span)?,
            None => write!(f, "{}: ", self.file)?,
        }
        write!(f, "{} [{}] {}", self.code, self.category, self.message)?;
        if let Some(line) = &self.source_line {
            write!(f, "\n  | {line}")?;
            if let Some(span) = self.span {
                write!(f, "\n  | {:>width$}", "^", width = span.col as usize)?;
            }
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  help: {suggestion}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}
