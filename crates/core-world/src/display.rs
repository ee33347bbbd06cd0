use core_automaton::AutomatonId;
use core_grid::{Direction, Grid, Position};

/// Observer the world reports to: log output, per-tick redraw requests,
/// error reporting, and automaton lifecycle events. All methods default to
/// no-ops so a display only needs to implement the hooks it cares about.
pub trait Display {
    fn log(&mut self, _text: &str, _newline: bool) {}

    /// Called once per tick, after every live automaton has stepped.
    /// `automata` lists the position of every still-live automaton.
    fn blit(&mut self, _grid: &Grid, _automata: &[(AutomatonId, Position)]) {}

    fn error(&mut self, _message: &str, _pos: Position) {}

    fn on_new_automaton(&mut self, _id: AutomatonId, _pos: Position, _dir: Direction) {}
    fn on_automaton_move(&mut self, _id: AutomatonId, _pos: Position, _dir: Direction) {}
    fn on_automaton_child(&mut self, _parent: AutomatonId, _child: AutomatonId) {}
    fn on_automaton_halted(&mut self, _id: AutomatonId) {}
}
