use core_grid::Position;
use core_registry::MachineError;
use thiserror::Error;

/// A world-level error: always terminates the run, same as the source
/// interpreter's `World.error` calling `exit(1)`.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("{source} at position {position:?}")]
    Machine {
        #[source]
        source: MachineError,
        position: Position,
    },
}

impl WorldError {
    pub fn position(&self) -> Position {
        match self {
            WorldError::Machine { position, .. } => *position,
        }
    }
}
