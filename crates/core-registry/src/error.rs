use core_grid::{Value, ValueError};
use thiserror::Error;

/// Errors raised while dispatching a single instruction. These propagate up
/// through the world's tick loop and become a world-level error report; they
/// are distinct from an automaton halting normally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MachineError {
    #[error("invalid symbol: {0}")]
    UnknownGlyph(char),
    #[error("no memory cell for key {0:?}")]
    MissingMemory(Value),
    #[error(transparent)]
    Value(#[from] ValueError),
    #[error("input error: {0}")]
    Io(String),
}
