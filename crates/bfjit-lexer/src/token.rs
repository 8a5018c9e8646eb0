//! Instruction tokens.
//!
//! [`Op`] covers the eight recognised instruction bytes; [`Token`] pairs one
//! with the source [`Span`] it came from.

use bfjit_types::Span;
use std::fmt;

/// Every recognised instruction, in the order of the symbol table.
pub const ALL_OPS: [Op; 8] = [
    Op::Right,
    Op::Left,
    Op::Inc,
    Op::Dec,
    Op::Output,
    Op::Input,
    Op::LoopOpen,
    Op::LoopClose,
];

/// One of the eight instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// `>` move the tape pointer right
    Right,
    /// `<` move the tape pointer left
    Left,
    /// `+` increment the current cell
    Inc,
    /// `-` decrement the current cell
    Dec,
    /// `.` write the current cell
    Output,
    /// `,` read into the current cell
    Input,
    /// `[` jump past the matching `]` if the current cell is zero
    LoopOpen,
    /// `]` jump back to the matching `[` if the current cell is nonzero
    LoopClose,
}

impl Op {
    /// Decode a program byte. Anything outside the eight symbols is inert.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'>' => Some(Self::Right),
            b'<' => Some(Self::Left),
            b'+' => Some(Self::Inc),
            b'-' => Some(Self::Dec),
            b'.' => Some(Self::Output),
            b',' => Some(Self::Input),
            b'[' => Some(Self::LoopOpen),
            b']' => Some(Self::LoopClose),
            _ => None,
        }
    }

    /// The source byte for this instruction.
    pub fn symbol(self) -> u8 {
        match self {
            Self::Right => b'>',
            Self::Left => b'<',
            Self::Inc => b'+',
            Self::Dec => b'-',
            Self::Output => b'.',
            Self::Input => b',',
            Self::LoopOpen => b'[',
            Self::LoopClose => b']',
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol() as char)
    }
}

/// A single instruction produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub op: Op,
    /// Source location.
    pub span: Span,
}

impl Token {
    pub fn new(op: Op, span: Span) -> Self {
        Self { op, span }
    }
}
