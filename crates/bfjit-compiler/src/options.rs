//! Run configuration.

use bfjit_types::Limits;
use serde::{Deserialize, Serialize};

/// Which engine executes the program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// Compile to native code and call into it.
    #[default]
    Jit,
    /// Walk the tokens with the reference interpreter.
    Interpreter,
}

/// Options for one [`run`](crate::run).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    pub engine: Engine,
    pub limits: Limits,
}

impl RunOptions {
    pub fn new(engine: Engine, limits: Limits) -> Self {
        Self { engine, limits }
    }
}
