//! The instruction registry: a data table from glyph to handler, and the
//! dispatcher implementing the NORMAL/READING mode-switch and the
//! parameterized-instruction fork/join protocol.

mod catalogue;
mod error;
mod machine;
mod registry;
mod spec;

pub use catalogue::build_default_registry;
pub use error::MachineError;
pub use machine::Machine;
pub use registry::InstructionRegistry;
pub use spec::{HandlerKind, InstructionSpec, ParamHandlerFn, ZeroHandlerFn};
