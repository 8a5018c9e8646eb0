//! Program compiler.
//!
//! Orchestrates native code generation:
//! 1. Size the code buffer for the worst case of the source length
//! 2. Map executable memory (fails before anything is emitted)
//! 3. Emit the prologue
//! 4. Emit every instruction, backpatching loops as they close
//! 5. Check bracket balance, emit the epilogue
//!
//! The emitted code uses only relative branches and receives every address
//! it needs as an argument, so it is position-independent: compiling the
//! same program twice gives the same bytes.

use std::io::{Read, Write};

use bfjit_lexer::Token;
use bfjit_types::Tape;
use tracing::debug;

use crate::buffer::CodeBuffer;
use crate::emitter::Emitter;
use crate::encoding::capacity_for;
use crate::error::{CodegenError, CodegenResult};
use crate::region::ExecutableRegion;
use crate::shell;
use crate::source_map::SourceMap;

// ══════════════════════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════════════════════

/// Compile `tokens` into executable memory.
///
/// `source_len` is the length in bytes of the program the tokens came from;
/// the code buffer is sized from it.
pub fn compile(tokens: &[Token], source_len: usize) -> CodegenResult<CompiledProgram> {
    let capacity = capacity_for(source_len);
    let mut region = ExecutableRegion::allocate(capacity)?;
    let (len, source_map) = emit_into(region.as_mut_slice(), tokens)?;
    debug!(
        instructions = tokens.len(),
        code_len = len,
        capacity,
        "compiled to native code"
    );
    Ok(CompiledProgram {
        region,
        len,
        source_map,
    })
}

/// Emit the same code as [`compile`] into ordinary memory.
///
/// Nothing here is executable, so this works on any host. Useful for
/// inspecting and fingerprinting the generated code.
pub fn assemble(tokens: &[Token], source_len: usize) -> CodegenResult<Assembly> {
    let mut mem = vec![0u8; capacity_for(source_len)];
    let (len, source_map) = emit_into(&mut mem, tokens)?;
    mem.truncate(len);
    Ok(Assembly {
        code: mem,
        source_map,
    })
}

/// Code produced by [`assemble`].
#[derive(Debug, Clone)]
pub struct Assembly {
    pub code: Vec<u8>,
    pub source_map: SourceMap,
}

fn emit_into(mem: &mut [u8], tokens: &[Token]) -> CodegenResult<(usize, SourceMap)> {
    let mut buf = CodeBuffer::new(mem);
    shell::emit_prologue(&mut buf)?;

    let mut emitter = Emitter::new(buf);
    for token in tokens {
        emitter.emit(token)?;
    }
    let (mut buf, source_map) = emitter.finish()?;

    shell::emit_epilogue(&mut buf)?;
    Ok((buf.len(), source_map))
}

// ══════════════════════════════════════════════════════════════════════════════
// CompiledProgram
// ══════════════════════════════════════════════════════════════════════════════

/// A program compiled into executable memory, ready to run once.
pub struct CompiledProgram {
    region: ExecutableRegion,
    len: usize,
    source_map: SourceMap,
}

impl CompiledProgram {
    /// The emitted machine code.
    pub fn code(&self) -> &[u8] {
        &self.region.as_slice()[..self.len]
    }

    /// Size of the executable region, emitted or not.
    pub fn capacity(&self) -> usize {
        self.region.len()
    }

    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    /// Run the program against `tape`, then release the code region.
    ///
    /// The tape pointer starts at cell 0. Moving it outside the tape is
    /// undefined behavior: generated code does not bounds-check.
    pub fn run<W, R>(self, tape: &mut Tape, output: &mut W, input: &mut R) -> CodegenResult<()>
    where
        W: Write,
        R: Read,
    {
        if tape.is_empty() {
            return Err(CodegenError::EmptyTape);
        }
        self.execute(tape, output, input)
    }

    #[cfg(target_arch = "x86_64")]
    fn execute(self, tape: &mut Tape, output: &mut dyn Write, input: &mut dyn Read) -> CodegenResult<()> {
        use crate::bridge::{InputBridge, OutputBridge};

        let mut out = OutputBridge::new(output);
        let mut inp = InputBridge::new(input);

        debug!(code_len = self.len, tape_len = tape.len(), "entering native code");
        // SAFETY: the region holds a complete function emitted by the shell,
        // both bridge records outlive the call, and tape bounds are the
        // caller's documented contract.
        unsafe {
            shell::invoke(self.region.as_ptr(), tape.as_mut_ptr(), out.as_raw(), inp.as_raw());
        }
        drop(self);

        let written = out.finish()?;
        inp.finish()?;
        debug!(written, "native code returned");
        Ok(())
    }

    #[cfg(not(target_arch = "x86_64"))]
    fn execute(self, _tape: &mut Tape, _output: &mut dyn Write, _input: &mut dyn Read) -> CodegenResult<()> {
        Err(CodegenError::ExecutableMemoryUnavailable(
            "native code generation requires an x86-64 host".to_string(),
        ))
    }
}

impl std::fmt::Debug for CompiledProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledProgram")
            .field("code_len", &self.len)
            .field("capacity", &self.region.len())
            .field("instructions", &self.source_map.len())
            .finish()
    }
}
