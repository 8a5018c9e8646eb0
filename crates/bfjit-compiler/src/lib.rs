//! bfjit compiler: orchestrates the full pipeline.
//!
//! ```text
//! file → load_source → Lexer → Emitter + BranchPatcher → executable region → run
//!                                 └──────────────→ Interpreter (reference)
//! ```

pub mod error;
pub mod load;
pub mod options;
pub mod report;

use std::io::{Read, Write};

use bfjit_codegen::{CompiledProgram, SourceMap};
use bfjit_eval::Interpreter;
use bfjit_lexer::{Lexer, Token};
use bfjit_types::{SourceFile, Tape};
use tracing::debug;

pub use error::{CompileError, LoadError, RunError};
pub use load::load_source;
pub use options::{Engine, RunOptions};
pub use report::{code_digest, CompileReport};

fn lex(source: &SourceFile) -> Vec<Token> {
    let result = Lexer::new(source).lex();
    debug!(
        file = %source.name,
        instructions = result.tokens.len(),
        skipped = result.skipped,
        "lexed source"
    );
    result.tokens
}

/// Compile a loaded program into executable memory.
pub fn compile(source: &SourceFile) -> Result<CompiledProgram, CompileError> {
    let tokens = lex(source);
    Ok(bfjit_codegen::compile(&tokens, source.len())?)
}

/// Map every instruction of a program to its machine code.
///
/// Emitted code is position-independent, so the offsets match what
/// [`compile`] places in executable memory.
pub fn source_map(source: &SourceFile) -> Result<SourceMap, CompileError> {
    let tokens = lex(source);
    Ok(bfjit_codegen::assemble(&tokens, source.len())?.source_map)
}

/// Compile a program and summarize the result without running it.
///
/// The code is assembled into ordinary memory, so this works on hosts that
/// cannot execute it.
pub fn compile_to_report(source: &SourceFile) -> CompileReport {
    let tokens = lex(source);
    let capacity = bfjit_codegen::encoding::capacity_for(source.len());
    match bfjit_codegen::assemble(&tokens, source.len()) {
        Ok(asm) => CompileReport {
            success: true,
            instructions: tokens.len(),
            code_len: Some(asm.code.len()),
            capacity,
            code_sha256: Some(code_digest(&asm.code)),
            diagnostic: None,
        },
        Err(e) => CompileReport {
            success: false,
            instructions: tokens.len(),
            code_len: None,
            capacity,
            code_sha256: None,
            diagnostic: Some(CompileError::from(e).to_diagnostic(source)),
        },
    }
}

/// Run a loaded program on a fresh tape and return the tape afterwards.
///
/// With [`Engine::Jit`] every structure and resource error is reported
/// before any instruction executes.
pub fn run<W, R>(
    source: &SourceFile,
    options: &RunOptions,
    output: &mut W,
    input: &mut R,
) -> Result<Tape, RunError>
where
    W: Write,
    R: Read,
{
    let tokens = lex(source);
    let mut tape = Tape::new(options.limits.tape_len);
    match options.engine {
        Engine::Jit => {
            let program = bfjit_codegen::compile(&tokens, source.len()).map_err(CompileError::from)?;
            program
                .run(&mut tape, output, input)
                .map_err(RunError::Native)?;
            Ok(tape)
        }
        Engine::Interpreter => {
            let mut interpreter = Interpreter::new(&tokens, tape);
            interpreter.run(output, input)?;
            Ok(interpreter.into_tape())
        }
    }
}
