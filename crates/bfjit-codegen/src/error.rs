//! Codegen error types.

use bfjit_types::{ErrorCode, Span};
use thiserror::Error;

/// Errors that can occur while compiling or running native code.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// A `[` was still open at the end of the program.
    #[error("unmatched '[' at {span}")]
    UnmatchedLoopOpen { span: Span },

    /// A `]` closed nothing.
    #[error("unmatched ']' at {span}")]
    UnmatchedLoopClose { span: Span },

    /// Emission would write past the end of the code buffer.
    #[error("code buffer exhausted: {needed} bytes needed at offset {offset}, capacity is {capacity}")]
    CodeBufferExhausted {
        offset: usize,
        needed: usize,
        capacity: usize,
    },

    /// The host refused to hand out executable memory.
    #[error("executable memory unavailable: {0}")]
    ExecutableMemoryUnavailable(String),

    /// A branch target is farther away than a rel32 field can express.
    #[error("branch displacement {0} does not fit in 32 bits")]
    DisplacementOverflow(i64),

    /// Generated code needs at least one cell to address.
    #[error("tape has no cells")]
    EmptyTape,

    /// A host I/O bridge failed while the program ran.
    #[error("host I/O failed: {0}")]
    HostIo(#[from] std::io::Error),
}

impl CodegenError {
    /// Stable diagnostic code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnmatchedLoopOpen { .. } => ErrorCode::UNMATCHED_LOOP_OPEN,
            Self::UnmatchedLoopClose { .. } => ErrorCode::UNMATCHED_LOOP_CLOSE,
            Self::CodeBufferExhausted { .. } => ErrorCode::CODE_BUFFER_EXHAUSTED,
            Self::ExecutableMemoryUnavailable(_) => ErrorCode::EXECUTABLE_MEMORY_UNAVAILABLE,
            Self::DisplacementOverflow(_) => ErrorCode::DISPLACEMENT_OVERFLOW,
            Self::EmptyTape => ErrorCode::EMPTY_TAPE,
            Self::HostIo(_) => ErrorCode::HOST_IO,
        }
    }

    /// Source location the error points at, if any.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnmatchedLoopOpen { span } | Self::UnmatchedLoopClose { span } => Some(*span),
            _ => None,
        }
    }
}

/// Codegen result type alias.
pub type CodegenResult<T> = Result<T, CodegenError>;
