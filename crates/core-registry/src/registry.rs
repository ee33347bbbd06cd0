use std::collections::HashMap;

use core_automaton::{AutomatonId, AutomatonState};
use core_grid::{Glyph, Rotation, Value};

use crate::error::MachineError;
use crate::machine::Machine;
use crate::spec::{HandlerKind, InstructionSpec};

/// Immutable glyph-to-handler table built once at startup. Dispatch mirrors
/// the source interpreter's mode switch exactly: READING mode accumulates
/// characters into a literal buffer unless the glyph is the literal
/// terminator, a HALT symbol, or an obey-when-reading instruction.
#[derive(Default)]
pub struct InstructionRegistry {
    specs: HashMap<char, InstructionSpec>,
}

fn is_halt(glyph: Glyph) -> bool {
    matches!(glyph, None) || glyph == Some(' ')
}

impl InstructionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `glyph`. Panics on a duplicate registration: the catalogue
    /// is built once at startup and a collision is a programming error, not
    /// a runtime condition.
    pub fn register(&mut self, glyph: char, spec: InstructionSpec) {
        if self.specs.insert(glyph, spec).is_some() {
            panic!("instruction '{glyph}' registered twice");
        }
    }

    /// Dispatches one glyph for `id`. Returns the handler's produced value,
    /// if any — the caller (the world's step loop) is responsible for
    /// storing it as the automaton's `retval` and for applying the default
    /// post-dispatch move.
    pub fn exec(
        &self,
        glyph: Glyph,
        machine: &mut dyn Machine,
        id: AutomatonId,
    ) -> Result<Option<Value>, MachineError> {
        let reading = machine.automaton(id).state == AutomatonState::Reading;
        let is_terminator = glyph == Some(';');

        if reading && !is_terminator {
            return self.exec_reading(glyph, machine, id);
        }

        match glyph.and_then(|c| self.specs.get(&c).map(|spec| (c, *spec))) {
            Some((_, spec)) => self.invoke(&spec, machine, id),
            None => {
                if is_halt(glyph) {
                    machine.halt(id);
                    Ok(None)
                } else {
                    Err(MachineError::UnknownGlyph(
                        glyph.expect("is_halt covers the None case"),
                    ))
                }
            }
        }
    }

    fn exec_reading(
        &self,
        glyph: Glyph,
        machine: &mut dyn Machine,
        id: AutomatonId,
    ) -> Result<Option<Value>, MachineError> {
        if is_halt(glyph) {
            machine.automaton_mut(id).retcache.clear();
            machine.halt(id);
            return Ok(None);
        }
        if let Some(c) = glyph {
            if let Some(spec) = self.specs.get(&c).copied() {
                if spec.obey_when_reading && !machine.automaton(id).ignore_next {
                    return self.invoke(&spec, machine, id);
                }
            }
        }
        if machine.automaton(id).ignore_next {
            machine.automaton_mut(id).ignore_next = false;
        }
        if let Some(c) = glyph {
            machine.automaton_mut(id).retcache.push(c);
        }
        Ok(None)
    }

    fn invoke(
        &self,
        spec: &InstructionSpec,
        machine: &mut dyn Machine,
        id: AutomatonId,
    ) -> Result<Option<Value>, MachineError> {
        match &spec.kind {
            HandlerKind::Zero(handler) => handler(machine, id),
            HandlerKind::Param {
                params,
                direction_overrides,
                handler,
            } => self.invoke_param(*params, *direction_overrides, *handler, machine, id),
        }
    }

    fn invoke_param(
        &self,
        params: u8,
        direction_overrides: Option<&'static [Rotation]>,
        handler: crate::spec::ParamHandlerFn,
        machine: &mut dyn Machine,
        id: AutomatonId,
    ) -> Result<Option<Value>, MachineError> {
        match machine.automaton(id).state {
            AutomatonState::Normal => {
                machine.automaton_mut(id).state = AutomatonState::Waiting;
                const DEFAULT_ROTATIONS: [Rotation; 2] = [Rotation::Left, Rotation::Right];
                let rotations = direction_overrides.unwrap_or(&DEFAULT_ROTATIONS);
                for rotation in rotations.iter().take(params as usize) {
                    let child = machine.spawn_child(id);
                    machine.automaton_mut(child).turn(*rotation);
                    machine.move_automaton(child, None);
                }
                Ok(None)
            }
            AutomatonState::Waiting => {
                if machine.all_children_halted(id) {
                    let operands = machine.take_child_retvals(id);
                    machine.automaton_mut(id).state = AutomatonState::Normal;
                    handler(machine, id, operands)
                } else {
                    Ok(None)
                }
            }
            AutomatonState::Reading | AutomatonState::Halted => Ok(None),
        }
    }
}
