//! Shared types for the bfjit workspace.
//!
//! Source files and spans, the cell tape, size limits, latched byte input,
//! and the structured diagnostic every stage error renders into.

mod error;
mod io;
mod limits;
mod span;
mod tape;

pub use error::{Diagnostic, ErrorCategory, ErrorCode};
pub use io::ByteInput;
pub use limits::{Limits, DEFAULT_MAX_SOURCE_LEN, DEFAULT_TAPE_LEN};
pub use span::{SourceFile, Span};
pub use tape::Tape;
