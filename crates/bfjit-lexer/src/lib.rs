//! bfjit lexer: converts program bytes into a stream of instruction tokens.

pub mod lexer;
pub mod token;

pub use lexer::{LexResult, Lexer};
pub use token::{Op, Token, ALL_OPS};
