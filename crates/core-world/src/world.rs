use core_automaton::{Automaton, AutomatonArena, AutomatonId, AutomatonState};
use core_grid::{Direction, Glyph, Grid, Position, Value};
use core_registry::{InstructionRegistry, Machine, MachineError, build_default_registry};

use crate::display::Display;
use crate::error::WorldError;
use crate::memory::Memory;

/// Everything an instruction handler can touch, minus the registry itself
/// (kept as a sibling field on [`World`] so dispatch can borrow both at
/// once without aliasing `self`).
struct Machinery {
    grid: Grid,
    memory: Memory,
    arena: AutomatonArena,
    live: Vec<AutomatonId>,
    display: Option<Box<dyn Display>>,
}

impl Machinery {
    /// Runs `f` with the display temporarily removed from `self`, so `f`
    /// can freely borrow the rest of `self` alongside the display.
    fn with_display(&mut self, f: impl FnOnce(&mut dyn Display, &Machinery)) {
        if let Some(mut display) = self.display.take() {
            f(&mut *display, self);
            self.display = Some(display);
        }
    }

    fn halt(&mut self, id: AutomatonId) {
        self.arena.get_mut(id).state = AutomatonState::Halted;
        self.live.retain(|&x| x != id);
        self.with_display(|d, _| d.on_automaton_halted(id));
    }
}

impl Machine for Machinery {
    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn automaton(&self, id: AutomatonId) -> &Automaton {
        self.arena.get(id)
    }

    fn automaton_mut(&mut self, id: AutomatonId) -> &mut Automaton {
        self.arena.get_mut(id)
    }

    fn spawn_child(&mut self, parent: AutomatonId) -> AutomatonId {
        let child = self.arena.spawn_child(parent);
        self.live.push(child);
        let (pos, dir) = {
            let a = self.arena.get(child);
            (a.position, a.direction)
        };
        self.with_display(|d, _| {
            d.on_new_automaton(child, pos, dir);
            d.on_automaton_child(parent, child);
        });
        child
    }

    fn all_children_halted(&self, id: AutomatonId) -> bool {
        self.arena.all_children_halted(id)
    }

    fn take_child_retvals(&mut self, id: AutomatonId) -> Vec<Value> {
        self.arena.take_child_retvals(id)
    }

    fn halt(&mut self, id: AutomatonId) {
        Machinery::halt(self, id);
    }

    fn move_automaton(&mut self, id: AutomatonId, direction: Option<Direction>) {
        self.arena.get_mut(id).move_dir(&self.grid, direction);
        let a = self.arena.get(id);
        if a.is_halted() {
            self.live.retain(|&x| x != id);
            self.with_display(|d, _| d.on_automaton_halted(id));
        } else {
            let (pos, dir) = (a.position, a.direction);
            self.with_display(|d, _| d.on_automaton_move(id, pos, dir));
        }
    }

    fn memory_get(&self, key: &Value) -> Option<Value> {
        self.memory.get(key)
    }

    fn memory_set(&mut self, key: Value, value: Value) {
        self.memory.set(key, value);
    }

    fn memory_entries(&self) -> Vec<(Value, Value)> {
        self.memory.entries()
    }

    fn log(&mut self, text: &str, newline: bool) {
        self.with_display(|d, _| d.log(text, newline));
    }

    fn read_line(&mut self) -> Result<String, MachineError> {
        use std::io::{self, BufRead, Write};
        print!("Input > ");
        io::stdout()
            .flush()
            .map_err(|e| MachineError::Io(e.to_string()))?;
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| MachineError::Io(e.to_string()))?;
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }
}

/// Owns the grid, memory, and automata, and drives the tick scheduler.
pub struct World {
    registry: InstructionRegistry,
    machinery: Machinery,
}

impl World {
    pub fn from_text(src: &str, display: Box<dyn Display>) -> Self {
        let grid = Grid::from_text(src);
        let mut arena = AutomatonArena::new();
        let root = arena.spawn_root();
        let (pos, dir) = {
            let a = arena.get(root);
            (a.position, a.direction)
        };
        let mut machinery = Machinery {
            grid,
            memory: Memory::new(),
            arena,
            live: vec![root],
            display: Some(display),
        };
        machinery.with_display(|d, _| d.on_new_automaton(root, pos, dir));
        Self {
            registry: build_default_registry(),
            machinery,
        }
    }

    /// Advances every live automaton by one step. Returns `false` once the
    /// live list is empty (the run is complete).
    pub fn tick(&mut self) -> Result<bool, WorldError> {
        if self.machinery.live.is_empty() {
            return Ok(false);
        }
        let snapshot = self.machinery.live.clone();
        for id in snapshot {
            if self.machinery.arena.get(id).is_halted() {
                continue;
            }
            if let Err(err) = self.step(id) {
                let message = err.to_string();
                let position = err.position();
                self.machinery
                    .with_display(|d, _| d.error(&message, position));
                return Err(err);
            }
        }
        let automata: Vec<(AutomatonId, Position)> = self
            .machinery
            .live
            .iter()
            .map(|&id| (id, self.machinery.arena.get(id).position))
            .collect();
        let mut display = self.machinery.display.take();
        if let Some(d) = display.as_mut() {
            d.blit(&self.machinery.grid, &automata);
        }
        self.machinery.display = display;
        Ok(true)
    }

    pub fn run_until_done(&mut self) -> Result<(), WorldError> {
        while self.tick()? {}
        Ok(())
    }

    fn step(&mut self, id: AutomatonId) -> Result<(), WorldError> {
        let state = self.machinery.arena.get(id).state;
        match state {
            AutomatonState::Normal | AutomatonState::Reading => self.dispatch_and_move(id),
            AutomatonState::Waiting => {
                if self.machinery.arena.all_children_halted(id) {
                    self.dispatch_and_move(id)
                } else {
                    Ok(())
                }
            }
            AutomatonState::Halted => Ok(()),
        }
    }

    fn dispatch_and_move(&mut self, id: AutomatonId) -> Result<(), WorldError> {
        let pos = self.machinery.arena.get(id).position;
        let glyph: Glyph = match self.machinery.grid.get(pos) {
            Some(glyph) => glyph,
            None => {
                self.machinery.halt(id);
                return Ok(());
            }
        };
        let result = self
            .registry
            .exec(glyph, &mut self.machinery, id)
            .map_err(|source| WorldError::Machine {
                source,
                position: pos,
            })?;
        if let Some(value) = result {
            self.machinery.arena.get_mut(id).retval = value;
        }
        let state = self.machinery.arena.get(id).state;
        if state != AutomatonState::Halted && state != AutomatonState::Waiting {
            self.machinery.move_automaton(id, None);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct CapturingDisplay {
        log: Rc<RefCell<String>>,
    }

    impl Display for CapturingDisplay {
        fn log(&mut self, text: &str, newline: bool) {
            let mut log = self.log.borrow_mut();
            log.push_str(text);
            if newline {
                log.push('\n');
            }
        }
    }

    #[test]
    fn prints_a_string_literal() {
        // Zero-parameter glyphs only: a string literal followed by "r " to
        // print whatever ended up in retval.
        let log = Rc::new(RefCell::new(String::new()));
        let mut world = World::from_text(
            "tHello;r ",
            Box::new(CapturingDisplay { log: log.clone() }),
        );
        world.run_until_done().unwrap();
        assert_eq!(log.borrow().as_str(), "Hello\n");
    }

    #[test]
    fn halts_on_space() {
        // A lone space halts the root automaton on its very first step, so
        // the first tick still reports "something happened" (true); only
        // the following tick, with no automata left, reports false.
        let log = Rc::new(RefCell::new(String::new()));
        let mut world = World::from_text(" ", Box::new(CapturingDisplay { log }));
        assert!(world.tick().unwrap());
        assert!(!world.tick().unwrap());
    }

    #[test]
    fn addition_via_spawned_children_prints_five() {
        // A parameterized instruction's children inherit the parent's
        // facing and step perpendicular to it (default rotations are
        // Left/Right), so they need room on both sides of the row the
        // parent travels along. Layout, by column:
        //
        //   col:  0    1
        //   row0: v
        //   row1: n    ;
        //   row2: 3    3
        //   row3: ;    n
        //   row4: >    + r (space)
        //   row5:      n
        //   row6:      2
        //   row7:      ;
        //   row8:      (space)
        //
        // The root descends col 0 reading "n3;" (its own retval, later
        // overwritten) then turns right into "+". The child rotated Left
        // (down) reads "n2;" below; the child rotated Right (up) reads
        // "n3;" above, running off the grid's top edge as its halt. Their
        // retvals (2 and 3, in spawn order) are summed to 5 and printed.
        let program = "v\nn;\n33\n;n\n>+r \n n\n 2\n ;\n  ";
        let log = Rc::new(RefCell::new(String::new()));
        let mut world = World::from_text(program, Box::new(CapturingDisplay { log: log.clone() }));
        world.run_until_done().unwrap();
        assert_eq!(log.borrow().as_str(), "5\n");
    }

    #[test]
    fn escape_in_literal_keeps_direction_glyph_literal() {
        // ";" always terminates a literal regardless of the escape flag (it
        // is checked before the reading/escape dispatch), so escaping is
        // only observable on other obey-when-reading glyphs. Here ":"
        // escapes the ">" that follows, keeping it as a literal character
        // instead of turning the automaton.
        let program = "t:>ok;r ";
        let log = Rc::new(RefCell::new(String::new()));
        let mut world = World::from_text(program, Box::new(CapturingDisplay { log: log.clone() }));
        world.run_until_done().unwrap();
        assert_eq!(log.borrow().as_str(), ">ok\n");
    }
}
