//! Program lexer: filters the eight instruction bytes out of a source file.
//!
//! Every other byte is commentary and is skipped. Lexing cannot fail;
//! bracket structure is checked by the stages that need it.

use bfjit_types::{SourceFile, Span};

use crate::token::{Op, Token};

/// The bfjit lexer.
pub struct Lexer<'src> {
    /// The full program bytes.
    source: &'src [u8],
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
}

/// Result of lexing.
#[derive(Debug, Clone)]
pub struct LexResult {
    /// Recognised instructions in source order.
    pub tokens: Vec<Token>,
    /// Number of inert bytes skipped.
    pub skipped: usize,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source file.
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.bytes(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Lex the entire source file into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::with_capacity(self.source.len());
        let mut skipped = 0;

        while let Some(byte) = self.peek() {
            let span = Span::new(self.pos, self.line, self.col);
            self.advance();
            match Op::from_byte(byte) {
                Some(op) => tokens.push(Token::new(op, span)),
                None => skipped += 1,
            }
        }

        LexResult { tokens, skipped }
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn advance(&mut self) {
        if let Some(&ch) = self.source.get(self.pos) {
            self.pos += 1;
            if ch == b'\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
    }
}
