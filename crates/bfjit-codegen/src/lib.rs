//! bfjit native code generator: compiles an instruction stream to x86-64
//! machine code in executable memory and runs it in place.
//!
//! # Architecture
//!
//! One pass over the tokens, no intermediate representation:
//!
//! - [`encoding`]: the fixed byte template for every instruction and the
//!   function frame
//! - [`buffer`]: bounds-checked, non-growing code buffer
//! - [`emitter`]: appends one template per instruction
//! - [`patcher`]: pending-jump stack and rel32 backpatching for loops
//! - [`shell`]: prologue/epilogue and the single call into generated code
//! - [`region`]: anonymous executable memory
//! - `bridge`: the output/input records generated code calls through
//!
//! ## Calling convention
//!
//! Compiled programs are `extern "sysv64" fn(tape, output, input)` on every
//! x86-64 host. The bridges use the same ABI, so the encoding never varies
//! with the operating system.

#[cfg(target_arch = "x86_64")]
mod bridge;
pub mod buffer;
pub mod compiler;
pub mod emitter;
pub mod encoding;
pub mod error;
pub mod patcher;
pub mod region;
pub mod shell;
pub mod source_map;

pub use compiler::{assemble, compile, Assembly, CompiledProgram};
pub use error::{CodegenError, CodegenResult};
pub use source_map::{SourceMap, SourceMapEntry};
