//! Runtime error types for the reference interpreter.

use bfjit_types::{ErrorCode, Span};
use std::fmt;
use std::io;

/// Evaluation error.
#[derive(Debug)]
pub enum EvalError {
    /// A branch scanned off the end of the program looking for its partner.
    /// `bracket` is the bracket that branched.
    UnmatchedBracket { span: Span, bracket: char },
    /// The tape pointer left the tape.
    PointerOutOfBounds { span: Span, tape_len: usize },
    /// Reading input or writing output failed.
    Io(io::Error),
}

impl EvalError {
    /// Stable diagnostic code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnmatchedBracket { bracket: '[', .. } => ErrorCode::UNMATCHED_LOOP_OPEN,
            Self::UnmatchedBracket { .. } => ErrorCode::UNMATCHED_LOOP_CLOSE,
            Self::PointerOutOfBounds { .. } => ErrorCode::POINTER_OUT_OF_BOUNDS,
            Self::Io(_) => ErrorCode::HOST_IO,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnmatchedBracket { span, .. } | Self::PointerOutOfBounds { span, .. } => {
                Some(*span)
            }
            Self::Io(_) => None,
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmatchedBracket { span, bracket } => {
                write!(f, "unmatched '{bracket}' at {span}")
            }
            Self::PointerOutOfBounds { span, tape_len } => {
                write!(f, "tape pointer left the tape ({tape_len} cells) at {span}")
            }
            Self::Io(e) => write!(f, "host I/O failed: {e}"),
        }
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for EvalError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Result alias for interpreter operations.
pub type EvalResult<T> = Result<T, EvalError>;
