use core_automaton::{Automaton, AutomatonId};
use core_grid::{Direction, Grid, Value};

use crate::error::MachineError;

/// Everything an instruction handler needs from the outside world: the
/// grid, the shared memory map, the automaton arena, the display's log
/// sink, and standard input. Implemented by the world crate so that
/// `core-registry` never depends on it.
pub trait Machine {
    fn grid(&self) -> &Grid;

    fn automaton(&self, id: AutomatonId) -> &Automaton;
    fn automaton_mut(&mut self, id: AutomatonId) -> &mut Automaton;

    fn spawn_child(&mut self, parent: AutomatonId) -> AutomatonId;
    fn all_children_halted(&self, id: AutomatonId) -> bool;
    fn take_child_retvals(&mut self, id: AutomatonId) -> Vec<Value>;

    /// Halts `id`, removing it from the live list and firing the
    /// corresponding display lifecycle hook.
    fn halt(&mut self, id: AutomatonId);

    /// Moves `id` one cell along `direction` (defaulting to its own
    /// heading), firing the move/halted display hooks. Used both for the
    /// caller-driven default move after a step and for instructions (`J`,
    /// `U`) that move an extra cell themselves.
    fn move_automaton(&mut self, id: AutomatonId, direction: Option<Direction>);

    fn memory_get(&self, key: &Value) -> Option<Value>;
    fn memory_set(&mut self, key: Value, value: Value);
    fn memory_entries(&self) -> Vec<(Value, Value)>;

    fn log(&mut self, text: &str, newline: bool);

    fn read_line(&mut self) -> Result<String, MachineError>;
}
