use core_automaton::AutomatonId;
use core_grid::{Rotation, Value};

use crate::error::MachineError;
use crate::machine::Machine;

pub type ZeroHandlerFn = fn(&mut dyn Machine, AutomatonId) -> Result<Option<Value>, MachineError>;
pub type ParamHandlerFn =
    fn(&mut dyn Machine, AutomatonId, Vec<Value>) -> Result<Option<Value>, MachineError>;

/// The shape of a registered instruction: either it fires immediately
/// (`Zero`), or it forks children to evaluate 1-2 operands before firing
/// on the following tick (`Param`).
#[derive(Clone, Copy)]
pub enum HandlerKind {
    Zero(ZeroHandlerFn),
    Param {
        params: u8,
        direction_overrides: Option<&'static [Rotation]>,
        handler: ParamHandlerFn,
    },
}

/// A registry entry: its dispatch shape plus whether it still fires while
/// the automaton is in READING mode (direction changes, jumps, and the
/// escape glyph all do; literal body characters do not).
#[derive(Clone, Copy)]
pub struct InstructionSpec {
    pub kind: HandlerKind,
    pub obey_when_reading: bool,
}

impl InstructionSpec {
    pub fn new(kind: HandlerKind) -> Self {
        Self {
            kind,
            obey_when_reading: false,
        }
    }

    pub fn obey_when_reading(mut self) -> Self {
        self.obey_when_reading = true;
        self
    }
}

impl HandlerKind {
    pub fn param(params: u8, handler: ParamHandlerFn) -> Self {
        assert!(
            params <= 2,
            "parameterized instructions support at most 2 operands, got {params}"
        );
        HandlerKind::Param {
            params,
            direction_overrides: None,
            handler,
        }
    }

    pub fn param_with_overrides(
        params: u8,
        direction_overrides: &'static [Rotation],
        handler: ParamHandlerFn,
    ) -> Self {
        assert!(
            params <= 2,
            "parameterized instructions support at most 2 operands, got {params}"
        );
        assert_eq!(
            direction_overrides.len(),
            params as usize,
            "direction override count must match operand arity"
        );
        HandlerKind::Param {
            params,
            direction_overrides: Some(direction_overrides),
            handler,
        }
    }
}
