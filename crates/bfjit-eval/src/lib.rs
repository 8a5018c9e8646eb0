//! bfjit reference interpreter.
//!
//! Executes programs directly from the token stream without generating
//! code. Used as the golden reference for native output.

pub mod error;
pub mod interpreter;

pub use error::{EvalError, EvalResult};
pub use interpreter::Interpreter;
