//! Token-walking interpreter.

use crate::error::{EvalError, EvalResult};
use bfjit_lexer::{Op, Token};
use bfjit_types::{ByteInput, Tape};
use std::io::{Read, Write};
use tracing::debug;

/// Executes a token stream against its own tape.
///
/// Brackets are resolved by counting at branch time, so an unbalanced
/// program only fails once a branch actually scans off the end.
pub struct Interpreter<'p> {
    tokens: &'p [Token],
    tape: Tape,
    /// Index of the current cell.
    pointer: usize,
    /// Index of the next token.
    pc: usize,
    /// Tokens executed so far.
    steps: u64,
}

impl<'p> Interpreter<'p> {
    pub fn new(tokens: &'p [Token], tape: Tape) -> Self {
        Self {
            tokens,
            tape,
            pointer: 0,
            pc: 0,
            steps: 0,
        }
    }

    /// Run until the last token. Output is flushed before returning.
    pub fn run<W: Write, R: Read>(&mut self, output: &mut W, input: &mut R) -> EvalResult<()> {
        let mut input = ByteInput::new(input);
        while let Some(&token) = self.tokens.get(self.pc) {
            self.step(token, output, &mut input)?;
            self.pc += 1;
            self.steps += 1;
        }
        output.flush()?;
        debug!(steps = self.steps, pointer = self.pointer, "interpreter finished");
        Ok(())
    }

    fn step<W: Write, R: Read>(
        &mut self,
        token: Token,
        output: &mut W,
        input: &mut ByteInput<R>,
    ) -> EvalResult<()> {
        match token.op {
            Op::Right => {
                if self.pointer + 1 >= self.tape.len() {
                    return Err(self.out_of_bounds(token));
                }
                self.pointer += 1;
            }
            Op::Left => {
                if self.pointer == 0 {
                    return Err(self.out_of_bounds(token));
                }
                self.pointer -= 1;
            }
            Op::Inc => {
                let cell = self.cell_mut(token)?;
                *cell = cell.wrapping_add(1);
            }
            Op::Dec => {
                let cell = self.cell_mut(token)?;
                *cell = cell.wrapping_sub(1);
            }
            Op::Output => {
                let byte = *self.cell_mut(token)?;
                output.write_all(&[byte])?;
            }
            Op::Input => {
                let cell = self.cell_mut(token)?;
                if let Some(byte) = input.next_byte()? {
                    *cell = byte;
                }
            }
            Op::LoopOpen => {
                if *self.cell_mut(token)? == 0 {
                    self.pc = self.matching_close(token)?;
                }
            }
            Op::LoopClose => {
                if *self.cell_mut(token)? != 0 {
                    self.pc = self.matching_open(token)?;
                }
            }
        }
        Ok(())
    }

    fn cell_mut(&mut self, token: Token) -> EvalResult<&mut u8> {
        let tape_len = self.tape.len();
        self.tape
            .cells_mut()
            .get_mut(self.pointer)
            .ok_or(EvalError::PointerOutOfBounds {
                span: token.span,
                tape_len,
            })
    }

    fn out_of_bounds(&self, token: Token) -> EvalError {
        EvalError::PointerOutOfBounds {
            span: token.span,
            tape_len: self.tape.len(),
        }
    }

    /// Index of the `]` matching the `[` at `pc`.
    fn matching_close(&self, token: Token) -> EvalResult<usize> {
        let mut depth = 0usize;
        for (i, t) in self.tokens.iter().enumerate().skip(self.pc) {
            match t.op {
                Op::LoopOpen => depth += 1,
                Op::LoopClose => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(i);
                    }
                }
                _ => {}
            }
        }
        Err(EvalError::UnmatchedBracket {
            span: token.span,
            bracket: '[',
        })
    }

    /// Index of the `[` matching the `]` at `pc`.
    fn matching_open(&self, token: Token) -> EvalResult<usize> {
        let mut depth = 0usize;
        for i in (0..=self.pc).rev() {
            match self.tokens[i].op {
                Op::LoopClose => depth += 1,
                Op::LoopOpen => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(i);
                    }
                }
                _ => {}
            }
        }
        Err(EvalError::UnmatchedBracket {
            span: token.span,
            bracket: ']',
        })
    }

    /// The tape as it currently stands.
    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn into_tape(self) -> Tape {
        self.tape
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }
}
