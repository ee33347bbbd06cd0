//! The concrete instruction set: literal framing, direction/flow control,
//! I/O, arithmetic, comparisons, casts, indexing, and memory access.

use core_automaton::{AutomatonId, AutomatonState, ConsecutiveBehavior, LiteralTarget};
use core_grid::{Direction, Rotation, Value};

use crate::error::MachineError;
use crate::machine::Machine;
use crate::registry::InstructionRegistry;
use crate::spec::{HandlerKind, InstructionSpec};

const STRAIGHT_ONLY: &[Rotation] = &[Rotation::Straight];

/// Builds the registry implementing the full catalogue described in
/// `SPEC_FULL.md` section 4.4.
pub fn build_default_registry() -> InstructionRegistry {
    let mut reg = InstructionRegistry::new();

    // Literal framing.
    reg.register('t', InstructionSpec::new(HandlerKind::Zero(start_string_literal)));
    reg.register('n', InstructionSpec::new(HandlerKind::Zero(start_int_literal)));
    reg.register(';', InstructionSpec::new(HandlerKind::Zero(terminate_literal)));
    reg.register(
        ':',
        InstructionSpec::new(HandlerKind::Zero(escape_next)).obey_when_reading(),
    );

    // Direction and flow control.
    reg.register(
        '^',
        InstructionSpec::new(HandlerKind::Zero(face_up)).obey_when_reading(),
    );
    reg.register(
        'v',
        InstructionSpec::new(HandlerKind::Zero(face_down)).obey_when_reading(),
    );
    reg.register(
        '<',
        InstructionSpec::new(HandlerKind::Zero(face_left)).obey_when_reading(),
    );
    reg.register(
        '>',
        InstructionSpec::new(HandlerKind::Zero(face_right)).obey_when_reading(),
    );
    reg.register(
        'O',
        InstructionSpec::new(HandlerKind::Zero(no_op)).obey_when_reading(),
    );
    reg.register(
        'J',
        InstructionSpec::new(HandlerKind::Zero(jump)).obey_when_reading(),
    );
    reg.register(
        'U',
        InstructionSpec::new(HandlerKind::Zero(u_turn)).obey_when_reading(),
    );
    reg.register(
        'H',
        InstructionSpec::new(HandlerKind::Zero(halt_if_horizontal)).obey_when_reading(),
    );
    reg.register(
        'I',
        InstructionSpec::new(HandlerKind::Zero(halt_if_vertical)).obey_when_reading(),
    );

    // I/O and return value.
    reg.register('P', InstructionSpec::new(HandlerKind::param(1, print_line)));
    reg.register('p', InstructionSpec::new(HandlerKind::param(1, print_no_newline)));
    reg.register('r', InstructionSpec::new(HandlerKind::Zero(print_retval)));
    reg.register('i', InstructionSpec::new(HandlerKind::Zero(read_string)));
    reg.register('E', InstructionSpec::new(HandlerKind::Zero(read_int)));

    // Arithmetic.
    reg.register('+', InstructionSpec::new(HandlerKind::param(2, add)));
    reg.register('*', InstructionSpec::new(HandlerKind::param(2, mul)));
    reg.register('-', InstructionSpec::new(HandlerKind::param(2, sub)));
    reg.register('/', InstructionSpec::new(HandlerKind::param(2, floordiv)));
    reg.register('%', InstructionSpec::new(HandlerKind::param(2, rem)));

    // Comparisons (right OP left, see catalogue doc in SPEC_FULL.md 4.4).
    reg.register('l', InstructionSpec::new(HandlerKind::param(2, less_than)));
    reg.register('g', InstructionSpec::new(HandlerKind::param(2, greater_than)));
    reg.register('e', InstructionSpec::new(HandlerKind::param(2, less_or_equal)));
    reg.register('o', InstructionSpec::new(HandlerKind::param(2, greater_or_equal)));

    // Indexing, length, casts.
    reg.register('T', InstructionSpec::new(HandlerKind::param(2, index_into)));
    reg.register('L', InstructionSpec::new(HandlerKind::param(1, length_of)));
    reg.register('m', InstructionSpec::new(HandlerKind::param(1, cast_int)));
    reg.register('s', InstructionSpec::new(HandlerKind::param(1, cast_str)));
    reg.register('N', InstructionSpec::new(HandlerKind::Zero(retval_to_int)));
    reg.register('S', InstructionSpec::new(HandlerKind::Zero(retval_to_str)));

    // Memory.
    reg.register('u', InstructionSpec::new(HandlerKind::param(1, memory_increment)));
    reg.register('d', InstructionSpec::new(HandlerKind::param(1, memory_decrement)));
    reg.register('w', InstructionSpec::new(HandlerKind::param(2, memory_store)));
    reg.register('C', InstructionSpec::new(HandlerKind::param(1, memory_read)));
    reg.register('x', InstructionSpec::new(HandlerKind::Zero(memory_dump)));

    // Branch.
    reg.register(
        '?',
        InstructionSpec::new(HandlerKind::param_with_overrides(1, STRAIGHT_ONLY, branch)),
    );

    reg
}

fn start_string_literal(
    machine: &mut dyn Machine,
    id: AutomatonId,
) -> Result<Option<Value>, MachineError> {
    machine
        .automaton_mut(id)
        .start_literal(LiteralTarget::Str, ConsecutiveBehavior::Concat);
    Ok(None)
}

fn start_int_literal(
    machine: &mut dyn Machine,
    id: AutomatonId,
) -> Result<Option<Value>, MachineError> {
    machine
        .automaton_mut(id)
        .start_literal(LiteralTarget::Int, ConsecutiveBehavior::Overwrite);
    Ok(None)
}

fn terminate_literal(
    machine: &mut dyn Machine,
    id: AutomatonId,
) -> Result<Option<Value>, MachineError> {
    let a = machine.automaton_mut(id);
    a.state = AutomatonState::Normal;
    let Some((target, behavior)) = a.literal.take() else {
        return Ok(None);
    };
    let raw = std::mem::take(&mut a.retcache);
    let converted = match target {
        LiteralTarget::Str => Value::Str(raw),
        LiteralTarget::Int => Value::Str(raw).to_int()?,
    };
    match behavior {
        ConsecutiveBehavior::Concat => {
            let joined = a.retval.add(&converted)?;
            a.retval = joined;
        }
        ConsecutiveBehavior::Overwrite => {
            a.retval = converted;
        }
    }
    Ok(None)
}

fn escape_next(machine: &mut dyn Machine, id: AutomatonId) -> Result<Option<Value>, MachineError> {
    let a = machine.automaton_mut(id);
    if a.state == AutomatonState::Reading {
        a.ignore_next = true;
    }
    Ok(None)
}

fn face(direction: Direction) -> impl Fn(&mut dyn Machine, AutomatonId) -> Result<Option<Value>, MachineError> {
    move |machine, id| {
        machine.automaton_mut(id).direction = direction;
        Ok(None)
    }
}

fn face_up(machine: &mut dyn Machine, id: AutomatonId) -> Result<Option<Value>, MachineError> {
    face(Direction::Up)(machine, id)
}
fn face_down(machine: &mut dyn Machine, id: AutomatonId) -> Result<Option<Value>, MachineError> {
    face(Direction::Down)(machine, id)
}
fn face_left(machine: &mut dyn Machine, id: AutomatonId) -> Result<Option<Value>, MachineError> {
    face(Direction::Left)(machine, id)
}
fn face_right(machine: &mut dyn Machine, id: AutomatonId) -> Result<Option<Value>, MachineError> {
    face(Direction::Right)(machine, id)
}

fn no_op(_machine: &mut dyn Machine, _id: AutomatonId) -> Result<Option<Value>, MachineError> {
    Ok(None)
}

fn jump(machine: &mut dyn Machine, id: AutomatonId) -> Result<Option<Value>, MachineError> {
    machine.move_automaton(id, None);
    Ok(None)
}

fn u_turn(machine: &mut dyn Machine, id: AutomatonId) -> Result<Option<Value>, MachineError> {
    machine.automaton_mut(id).turn(Rotation::Uturn);
    machine.move_automaton(id, None);
    Ok(None)
}

fn halt_if_horizontal(
    machine: &mut dyn Machine,
    id: AutomatonId,
) -> Result<Option<Value>, MachineError> {
    if machine.automaton(id).direction.is_horizontal() {
        machine.halt(id);
    }
    Ok(None)
}

fn halt_if_vertical(
    machine: &mut dyn Machine,
    id: AutomatonId,
) -> Result<Option<Value>, MachineError> {
    if machine.automaton(id).direction.is_vertical() {
        machine.halt(id);
    }
    Ok(None)
}

fn print_line(
    machine: &mut dyn Machine,
    _id: AutomatonId,
    operands: Vec<Value>,
) -> Result<Option<Value>, MachineError> {
    machine.log(&operands[0].to_string(), true);
    Ok(None)
}

fn print_no_newline(
    machine: &mut dyn Machine,
    _id: AutomatonId,
    operands: Vec<Value>,
) -> Result<Option<Value>, MachineError> {
    machine.log(&operands[0].to_string(), false);
    Ok(None)
}

fn print_retval(machine: &mut dyn Machine, id: AutomatonId) -> Result<Option<Value>, MachineError> {
    let text = machine.automaton(id).retval.to_string();
    machine.log(&text, true);
    Ok(None)
}

fn read_string(machine: &mut dyn Machine, _id: AutomatonId) -> Result<Option<Value>, MachineError> {
    let line = machine.read_line()?;
    Ok(Some(Value::Str(line)))
}

fn read_int(machine: &mut dyn Machine, _id: AutomatonId) -> Result<Option<Value>, MachineError> {
    let line = machine.read_line()?;
    Ok(Some(Value::Str(line).to_int()?))
}

fn add(
    _m: &mut dyn Machine,
    _id: AutomatonId,
    operands: Vec<Value>,
) -> Result<Option<Value>, MachineError> {
    Ok(Some(operands[0].add(&operands[1])?))
}

fn mul(
    _m: &mut dyn Machine,
    _id: AutomatonId,
    operands: Vec<Value>,
) -> Result<Option<Value>, MachineError> {
    Ok(Some(operands[0].mul(&operands[1])?))
}

fn sub(
    _m: &mut dyn Machine,
    _id: AutomatonId,
    operands: Vec<Value>,
) -> Result<Option<Value>, MachineError> {
    Ok(Some(operands[0].sub(&operands[1])?))
}

fn floordiv(
    _m: &mut dyn Machine,
    _id: AutomatonId,
    operands: Vec<Value>,
) -> Result<Option<Value>, MachineError> {
    Ok(Some(operands[0].floordiv(&operands[1])?))
}

fn rem(
    _m: &mut dyn Machine,
    _id: AutomatonId,
    operands: Vec<Value>,
) -> Result<Option<Value>, MachineError> {
    Ok(Some(operands[0].rem(&operands[1])?))
}

/// `l`: right-spawn < left-spawn. See `SPEC_FULL.md` 4.4 for why the
/// comparisons are swapped relative to spawn order.
fn less_than(
    _m: &mut dyn Machine,
    _id: AutomatonId,
    operands: Vec<Value>,
) -> Result<Option<Value>, MachineError> {
    Ok(Some(Value::Bool(
        operands[1].compare(&operands[0])? == std::cmp::Ordering::Less,
    )))
}

fn greater_than(
    _m: &mut dyn Machine,
    _id: AutomatonId,
    operands: Vec<Value>,
) -> Result<Option<Value>, MachineError> {
    Ok(Some(Value::Bool(
        operands[1].compare(&operands[0])? == std::cmp::Ordering::Greater,
    )))
}

fn less_or_equal(
    _m: &mut dyn Machine,
    _id: AutomatonId,
    operands: Vec<Value>,
) -> Result<Option<Value>, MachineError> {
    Ok(Some(Value::Bool(
        operands[1].compare(&operands[0])? != std::cmp::Ordering::Greater,
    )))
}

fn greater_or_equal(
    _m: &mut dyn Machine,
    _id: AutomatonId,
    operands: Vec<Value>,
) -> Result<Option<Value>, MachineError> {
    Ok(Some(Value::Bool(
        operands[1].compare(&operands[0])? != std::cmp::Ordering::Less,
    )))
}

fn index_into(
    _m: &mut dyn Machine,
    _id: AutomatonId,
    operands: Vec<Value>,
) -> Result<Option<Value>, MachineError> {
    Ok(Some(operands[0].index(&operands[1])?))
}

fn length_of(
    _m: &mut dyn Machine,
    _id: AutomatonId,
    operands: Vec<Value>,
) -> Result<Option<Value>, MachineError> {
    Ok(Some(operands[0].length()?))
}

fn cast_int(
    _m: &mut dyn Machine,
    _id: AutomatonId,
    operands: Vec<Value>,
) -> Result<Option<Value>, MachineError> {
    Ok(Some(operands[0].to_int()?))
}

fn cast_str(
    _m: &mut dyn Machine,
    _id: AutomatonId,
    operands: Vec<Value>,
) -> Result<Option<Value>, MachineError> {
    Ok(Some(operands[0].to_str()))
}

fn retval_to_int(
    machine: &mut dyn Machine,
    id: AutomatonId,
) -> Result<Option<Value>, MachineError> {
    let converted = machine.automaton(id).retval.to_int()?;
    machine.automaton_mut(id).retval = converted;
    Ok(None)
}

fn retval_to_str(
    machine: &mut dyn Machine,
    id: AutomatonId,
) -> Result<Option<Value>, MachineError> {
    let converted = machine.automaton(id).retval.to_str();
    machine.automaton_mut(id).retval = converted;
    Ok(None)
}

fn memory_increment(
    machine: &mut dyn Machine,
    _id: AutomatonId,
    operands: Vec<Value>,
) -> Result<Option<Value>, MachineError> {
    let cell = operands[0].clone();
    let updated = match machine.memory_get(&cell) {
        Some(existing) => existing.add(&Value::Int(1))?,
        None => Value::Int(1),
    };
    machine.memory_set(cell, updated);
    Ok(None)
}

fn memory_decrement(
    machine: &mut dyn Machine,
    _id: AutomatonId,
    operands: Vec<Value>,
) -> Result<Option<Value>, MachineError> {
    let cell = operands[0].clone();
    let existing = machine
        .memory_get(&cell)
        .ok_or_else(|| MachineError::MissingMemory(cell.clone()))?;
    let updated = existing.sub(&Value::Int(1))?;
    machine.memory_set(cell, updated);
    Ok(None)
}

fn memory_store(
    machine: &mut dyn Machine,
    _id: AutomatonId,
    operands: Vec<Value>,
) -> Result<Option<Value>, MachineError> {
    let data = operands[0].clone();
    let cell = operands[1].clone();
    machine.memory_set(cell, data);
    Ok(None)
}

fn memory_read(
    machine: &mut dyn Machine,
    _id: AutomatonId,
    operands: Vec<Value>,
) -> Result<Option<Value>, MachineError> {
    Ok(Some(machine.memory_get(&operands[0]).unwrap_or(Value::Int(0))))
}

fn memory_dump(machine: &mut dyn Machine, _id: AutomatonId) -> Result<Option<Value>, MachineError> {
    let entries = machine.memory_entries();
    let body = entries
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join(", ");
    machine.log(&format!("{{{body}}}"), true);
    Ok(None)
}

fn branch(
    machine: &mut dyn Machine,
    id: AutomatonId,
    operands: Vec<Value>,
) -> Result<Option<Value>, MachineError> {
    if operands[0].truthy() {
        machine.automaton_mut(id).turn(Rotation::Left);
    } else {
        machine.automaton_mut(id).turn(Rotation::Right);
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_automaton::AutomatonArena;
    use core_grid::Grid;
    use std::collections::HashMap;

    /// Minimal [`Machine`] standing in for `core-world`'s `Machinery`, so
    /// handler semantics (memory, retval casts, branching) can be checked
    /// directly without laying out a grid.
    struct MockMachine {
        grid: Grid,
        arena: AutomatonArena,
        memory: HashMap<Value, Value>,
        log: String,
    }

    impl MockMachine {
        fn new() -> (Self, AutomatonId) {
            let grid = Grid::from_text(" ");
            let mut arena = AutomatonArena::new();
            let id = arena.spawn_root();
            (
                Self {
                    grid,
                    arena,
                    memory: HashMap::new(),
                    log: String::new(),
                },
                id,
            )
        }
    }

    impl Machine for MockMachine {
        fn grid(&self) -> &Grid {
            &self.grid
        }
        fn automaton(&self, id: AutomatonId) -> &core_automaton::Automaton {
            self.arena.get(id)
        }
        fn automaton_mut(&mut self, id: AutomatonId) -> &mut core_automaton::Automaton {
            self.arena.get_mut(id)
        }
        fn spawn_child(&mut self, parent: AutomatonId) -> AutomatonId {
            self.arena.spawn_child(parent)
        }
        fn all_children_halted(&self, id: AutomatonId) -> bool {
            self.arena.all_children_halted(id)
        }
        fn take_child_retvals(&mut self, id: AutomatonId) -> Vec<Value> {
            self.arena.take_child_retvals(id)
        }
        fn halt(&mut self, id: AutomatonId) {
            self.arena.get_mut(id).state = core_automaton::AutomatonState::Halted;
        }
        fn move_automaton(&mut self, id: AutomatonId, direction: Option<Direction>) {
            let grid = self.grid.clone();
            self.arena.get_mut(id).move_dir(&grid, direction);
        }
        fn memory_get(&self, key: &Value) -> Option<Value> {
            self.memory.get(key).cloned()
        }
        fn memory_set(&mut self, key: Value, value: Value) {
            self.memory.insert(key, value);
        }
        fn memory_entries(&self) -> Vec<(Value, Value)> {
            self.memory.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
        }
        fn log(&mut self, text: &str, newline: bool) {
            self.log.push_str(text);
            if newline {
                self.log.push('\n');
            }
        }
        fn read_line(&mut self) -> Result<String, MachineError> {
            Ok(String::new())
        }
    }

    #[test]
    fn memory_store_then_read_roundtrips() {
        let (mut m, id) = MockMachine::new();
        memory_store(&mut m, id, vec![Value::Int(7), Value::Str("x".into())]).unwrap();
        let result = memory_read(&mut m, id, vec![Value::Str("x".into())]).unwrap();
        assert_eq!(result, Some(Value::Int(7)));
    }

    #[test]
    fn memory_read_of_unset_cell_is_zero() {
        let (mut m, id) = MockMachine::new();
        let result = memory_read(&mut m, id, vec![Value::Str("missing".into())]).unwrap();
        assert_eq!(result, Some(Value::Int(0)));
    }

    #[test]
    fn memory_increment_starts_at_one_then_accumulates() {
        let (mut m, id) = MockMachine::new();
        let cell = Value::Str("counter".into());
        memory_increment(&mut m, id, vec![cell.clone()]).unwrap();
        memory_increment(&mut m, id, vec![cell.clone()]).unwrap();
        let result = memory_read(&mut m, id, vec![cell]).unwrap();
        assert_eq!(result, Some(Value::Int(2)));
    }

    #[test]
    fn memory_decrement_of_unset_cell_errors() {
        let (mut m, id) = MockMachine::new();
        let err = memory_decrement(&mut m, id, vec![Value::Str("missing".into())]);
        assert!(err.is_err());
    }

    #[test]
    fn add_sums_operands_in_spawn_order() {
        let (mut m, id) = MockMachine::new();
        let result = add(&mut m, id, vec![Value::Int(2), Value::Int(3)]).unwrap();
        assert_eq!(result, Some(Value::Int(5)));
    }

    #[test]
    fn less_than_compares_right_spawn_against_left_spawn() {
        let (mut m, id) = MockMachine::new();
        // operands[0] is the left spawn, operands[1] the right spawn; `l`
        // asks whether the right spawn is less than the left spawn.
        let result = less_than(&mut m, id, vec![Value::Int(5), Value::Int(2)]).unwrap();
        assert_eq!(result, Some(Value::Bool(true)));
    }

    #[test]
    fn branch_turns_left_when_truthy_right_when_falsy() {
        let (mut m, id) = MockMachine::new();
        m.automaton_mut(id).direction = Direction::Right;
        branch(&mut m, id, vec![Value::Bool(true)]).unwrap();
        assert_eq!(m.automaton(id).direction, Direction::Down);

        m.automaton_mut(id).direction = Direction::Right;
        branch(&mut m, id, vec![Value::Bool(false)]).unwrap();
        assert_eq!(m.automaton(id).direction, Direction::Up);
    }

    #[test]
    fn halt_if_horizontal_stops_a_left_or_right_facing_automaton() {
        let (mut m, id) = MockMachine::new();
        m.automaton_mut(id).direction = Direction::Right;
        halt_if_horizontal(&mut m, id).unwrap();
        assert!(m.automaton(id).is_halted());
    }

    #[test]
    fn halt_if_horizontal_passes_through_a_vertically_facing_automaton() {
        let (mut m, id) = MockMachine::new();
        m.automaton_mut(id).direction = Direction::Down;
        halt_if_horizontal(&mut m, id).unwrap();
        assert!(!m.automaton(id).is_halted());
    }

    #[test]
    fn halt_if_vertical_stops_an_up_or_down_facing_automaton() {
        let (mut m, id) = MockMachine::new();
        m.automaton_mut(id).direction = Direction::Up;
        halt_if_vertical(&mut m, id).unwrap();
        assert!(m.automaton(id).is_halted());
    }

    #[test]
    fn halt_if_vertical_passes_through_a_horizontally_facing_automaton() {
        let (mut m, id) = MockMachine::new();
        m.automaton_mut(id).direction = Direction::Left;
        halt_if_vertical(&mut m, id).unwrap();
        assert!(!m.automaton(id).is_halted());
    }
}
