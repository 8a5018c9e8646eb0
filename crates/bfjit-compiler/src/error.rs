//! Pipeline error types and their rendering into [`Diagnostic`]s.

use std::path::PathBuf;

use bfjit_codegen::CodegenError;
use bfjit_eval::EvalError;
use bfjit_types::{Diagnostic, ErrorCode, SourceFile, Span};
use thiserror::Error;

// ══════════════════════════════════════════════════════════════════════════════
// Load
// ══════════════════════════════════════════════════════════════════════════════

/// The program could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{} is {len} bytes, over the {limit} byte limit", path.display())]
    SourceTooLarge {
        path: PathBuf,
        len: usize,
        limit: usize,
    },
}

impl LoadError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::SourceUnreadable { .. } => ErrorCode::SOURCE_UNREADABLE,
            Self::SourceTooLarge { .. } => ErrorCode::SOURCE_TOO_LARGE,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let (path, message) = match self {
            Self::SourceUnreadable { path, source } => (path, source.to_string()),
            Self::SourceTooLarge { path, len, limit } => {
                (path, format!("source is {len} bytes, over the {limit} byte limit"))
            }
        };
        let diag = Diagnostic::new(path.display().to_string(), self.code(), message);
        match self {
            Self::SourceTooLarge { .. } => diag.with_suggestion("raise --max-source-len"),
            Self::SourceUnreadable { .. } => diag,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Compile
// ══════════════════════════════════════════════════════════════════════════════

/// The program loaded but could not be compiled.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

impl CompileError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Codegen(e) => e.code(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Codegen(e) => e.span(),
        }
    }

    pub fn to_diagnostic(&self, source: &SourceFile) -> Diagnostic {
        match self {
            Self::Codegen(e) => codegen_diagnostic(e, source),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Run
// ══════════════════════════════════════════════════════════════════════════════

/// A run failed, either before or during execution.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Native execution failed after the program was compiled.
    #[error(transparent)]
    Native(CodegenError),

    #[error(transparent)]
    Interpreter(#[from] EvalError),
}

impl RunError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Compile(e) => e.code(),
            Self::Native(e) => e.code(),
            Self::Interpreter(e) => e.code(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Compile(e) => e.span(),
            Self::Native(e) => e.span(),
            Self::Interpreter(e) => e.span(),
        }
    }

    pub fn to_diagnostic(&self, source: &SourceFile) -> Diagnostic {
        match self {
            Self::Compile(e) => e.to_diagnostic(source),
            Self::Native(e) => codegen_diagnostic(e, source),
            Self::Interpreter(e) => {
                let diag = located(Diagnostic::new(&source.name, e.code(), e.to_string()), e.span(), source);
                match e {
                    EvalError::UnmatchedBracket { bracket: '[', .. } => diag.with_suggestion(OPEN_HINT),
                    EvalError::UnmatchedBracket { .. } => diag.with_suggestion(CLOSE_HINT),
                    EvalError::PointerOutOfBounds { .. } => diag.with_suggestion("raise --tape-len"),
                    EvalError::Io(_) => diag,
                }
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

const OPEN_HINT: &str = "add a matching ']' or remove this '['";
const CLOSE_HINT: &str = "remove this ']' or add a matching '[' before it";

fn codegen_diagnostic(e: &CodegenError, source: &SourceFile) -> Diagnostic {
    let diag = located(Diagnostic::new(&source.name, e.code(), e.to_string()), e.span(), source);
    match e {
        CodegenError::UnmatchedLoopOpen { .. } => diag.with_suggestion(OPEN_HINT),
        CodegenError::UnmatchedLoopClose { .. } => diag.with_suggestion(CLOSE_HINT),
        CodegenError::EmptyTape => diag.with_suggestion("use a tape of at least one cell"),
        _ => diag,
    }
}

fn located(diag: Diagnostic, span: Option<Span>, source: &SourceFile) -> Diagnostic {
    match span {
        Some(span) => diag.at(span, source),
        None => diag,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bfjit_types::ErrorCategory;

    #[test]
    fn test_unmatched_open_diagnostic_points_at_bracket() {
        let sf = SourceFile::new("loop.b", "+\n  [-");
        let err = CompileError::from(CodegenError::UnmatchedLoopOpen {
            span: sf.span_at(4),
        });
        let diag = err.to_diagnostic(&sf);
        assert_eq!(diag.code, ErrorCode::UNMATCHED_LOOP_OPEN);
        assert_eq!(diag.category, ErrorCategory::Structure);
        assert_eq!(diag.source_line.as_deref(), Some("  [-"));
        assert_eq!(diag.span.map(|s| (s.line, s.col)), Some((2, 3)));
        assert!(diag.suggestion.is_some());
    }

    #[test]
    fn test_too_large_diagnostic_has_no_span() {
        let err = LoadError::SourceTooLarge {
            path: PathBuf::from("big.b"),
            len: 11,
            limit: 10,
        };
        let diag = err.to_diagnostic();
        assert_eq!(diag.file, "big.b");
        assert_eq!(diag.code, ErrorCode::SOURCE_TOO_LARGE);
        assert!(diag.span.is_none());
    }

    #[test]
    fn test_native_io_diagnostic() {
        let sf = SourceFile::new("io.b", ".");
        let err = RunError::Native(CodegenError::HostIo(std::io::ErrorKind::BrokenPipe.into()));
        let diag = err.to_diagnostic(&sf);
        assert_eq!(diag.category, ErrorCategory::Runtime);
        assert!(diag.source_line.is_none());
    }
}
