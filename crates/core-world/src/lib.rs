//! The world: owns the grid, shared memory, the automaton arena, and the
//! tick scheduler. Reports to a pluggable [`Display`] collaborator.

mod display;
mod error;
mod memory;
mod world;

pub use display::Display;
pub use error::WorldError;
pub use memory::Memory;
pub use world::World;
