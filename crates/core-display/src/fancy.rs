use std::time::Duration;

use core_automaton::AutomatonId;
use core_grid::{Direction, Grid, Position};
use core_terminal::CrosstermBackend;
use core_world::Display;

/// Redraws the whole grid every tick, with `@` marking each live automaton,
/// under a full-screen clear. The log is never cleared and is reprinted in
/// full after every redraw, matching the source's habit of accumulating a
/// running transcript rather than a one-shot message (see `DESIGN.md`). Each
/// redraw is followed by a configurable delay, mirroring the source's
/// unconditional `sleep(0.1)` at the end of `blit`.
pub struct FancyDisplay {
    terminal: CrosstermBackend,
    log: String,
    tick_delay: Duration,
}

impl FancyDisplay {
    pub fn new(tick_delay: Duration) -> Self {
        let mut terminal = CrosstermBackend::new();
        let _ = terminal.enter();
        Self {
            terminal,
            log: String::new(),
            tick_delay,
        }
    }

    fn render_grid(&mut self, grid: &Grid, automata: &[(AutomatonId, Position)]) {
        let _ = self.terminal.clear_and_home();
        for row in 0..grid.height() {
            let mut line = String::with_capacity(grid.width());
            for col in 0..grid.width() {
                let pos = (row as i64, col as i64);
                let is_automaton = automata.iter().any(|&(_, p)| p == pos);
                if is_automaton {
                    line.push('@');
                } else {
                    line.push(match grid.get(pos) {
                        Some(Some(c)) => c,
                        _ => ' ',
                    });
                }
            }
            println!("{line}");
        }
        println!("--------");
    }

    fn print_log(&self) {
        for line in self.log.split('\n') {
            println!("{line}");
        }
    }
}

impl Default for FancyDisplay {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl Display for FancyDisplay {
    fn log(&mut self, text: &str, newline: bool) {
        self.log.push_str(text);
        if newline {
            self.log.push('\n');
        }
    }

    fn blit(&mut self, grid: &Grid, automata: &[(AutomatonId, Position)]) {
        self.render_grid(grid, automata);
        self.print_log();
        if !self.tick_delay.is_zero() {
            std::thread::sleep(self.tick_delay);
        }
    }

    fn error(&mut self, message: &str, pos: Position) {
        eprintln!("{message}");
        eprintln!("at position: {pos:?}");
        println!("--------");
        self.print_log();
    }

    fn on_new_automaton(&mut self, _id: AutomatonId, _pos: Position, _dir: Direction) {}
    fn on_automaton_move(&mut self, _id: AutomatonId, _pos: Position, _dir: Direction) {}
    fn on_automaton_child(&mut self, _parent: AutomatonId, _child: AutomatonId) {}
    fn on_automaton_halted(&mut self, _id: AutomatonId) {}
}
