//! One-pass instruction emitter.
//!
//! Each token appends one fixed template from [`crate::encoding`]; loops
//! additionally go through the [`BranchPatcher`]. There is no lookahead and
//! no second pass.

use bfjit_lexer::{Op, Token};

use crate::buffer::CodeBuffer;
use crate::encoding::*;
use crate::error::CodegenResult;
use crate::patcher::BranchPatcher;
use crate::source_map::SourceMap;

/// Room that must be left before any instruction: the widest template plus
/// the epilogue that closes the function.
const INSTRUCTION_MARGIN: usize = MAX_BYTES_PER_INSTRUCTION + EPILOGUE.len();

pub struct Emitter<'mem> {
    buf: CodeBuffer<'mem>,
    patcher: BranchPatcher,
    source_map: SourceMap,
}

impl<'mem> Emitter<'mem> {
    /// Continue emitting into `buf`, after whatever it already holds.
    pub fn new(buf: CodeBuffer<'mem>) -> Self {
        Self {
            buf,
            patcher: BranchPatcher::new(),
            source_map: SourceMap::new(),
        }
    }

    /// Emit the native sequence for one instruction.
    pub fn emit(&mut self, token: &Token) -> CodegenResult<()> {
        self.buf.ensure(INSTRUCTION_MARGIN)?;
        let start = self.buf.len();

        match token.op {
            Op::Right => self.buf.put(&INC_PTR)?,
            Op::Left => self.buf.put(&DEC_PTR)?,
            Op::Inc => self.buf.put(&INC_CELL)?,
            Op::Dec => self.buf.put(&DEC_CELL)?,
            Op::Output => self.buf.put(&OUTPUT)?,
            Op::Input => self.buf.put(&INPUT)?,
            Op::LoopOpen => {
                self.buf.put(&LOOP_OPEN)?;
                let patch_at = self.buf.reserve_rel32()?;
                self.patcher.open(patch_at, self.buf.len(), token.span);
            }
            Op::LoopClose => {
                let open = self.patcher.close(token.span)?;
                self.buf.put(&LOOP_CLOSE)?;
                let close_field = self.buf.reserve_rel32()?;
                BranchPatcher::resolve(&mut self.buf, &open, close_field)?;
            }
        }

        self.source_map.push(
            start,
            self.buf.len() - start,
            token.op.symbol() as char,
            token.span,
        );
        Ok(())
    }

    /// Current loop nesting depth.
    pub fn depth(&self) -> usize {
        self.patcher.depth()
    }

    /// Check bracket balance and hand back the buffer and source map.
    pub fn finish(self) -> CodegenResult<(CodeBuffer<'mem>, SourceMap)> {
        self.patcher.finish()?;
        Ok((self.buf, self.source_map))
    }
}
