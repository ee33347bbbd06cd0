use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use core_automaton::AutomatonId;
use core_grid::{Direction, Grid, Position};
use core_world::Display;
use image::{ImageBuffer, Rgb, RgbImage};
use tracing::warn;

const CELL_PIXELS: u32 = 16;
const COLORS: [[u8; 3]; 5] = [
    [220, 40, 40],   // red
    [40, 160, 60],   // green
    [50, 90, 220],   // blue
    [230, 140, 30],  // orange
    [150, 60, 200],  // purple
];

/// Renders one PNG frame per tick into a directory instead of driving a live
/// turtle-graphics window: each live automaton is a colored square, assigned
/// a color from a fixed palette in spawn order and cycling once exhausted,
/// the way the source cycles `TurtleDisplay.COLORS`. Each frame is followed
/// by a configurable delay, mirroring the source's unconditional
/// `sleep(0.1)` at the end of `blit`.
pub struct TurtleDisplay {
    output_dir: PathBuf,
    frame: u32,
    next_color: usize,
    automata: HashMap<AutomatonId, (Position, [u8; 3])>,
    tick_delay: Duration,
}

impl TurtleDisplay {
    pub fn new(output_dir: impl Into<PathBuf>, tick_delay: Duration) -> Self {
        let output_dir = output_dir.into();
        if let Err(e) = std::fs::create_dir_all(&output_dir) {
            warn!(error = %e, dir = %output_dir.display(), "could not create turtle frame directory");
        }
        Self {
            output_dir,
            frame: 0,
            next_color: 0,
            automata: HashMap::new(),
            tick_delay,
        }
    }

    fn render_frame(&mut self, grid: &Grid) {
        let width = (grid.width() as u32).max(1) * CELL_PIXELS;
        let height = (grid.height() as u32).max(1) * CELL_PIXELS;
        let mut image: RgbImage = ImageBuffer::from_pixel(width, height, Rgb([250, 250, 245]));

        for &(pos, color) in self.automata.values() {
            let (row, col) = pos;
            if row < 0 || col < 0 {
                continue;
            }
            let x0 = col as u32 * CELL_PIXELS;
            let y0 = row as u32 * CELL_PIXELS;
            for dy in 0..CELL_PIXELS {
                for dx in 0..CELL_PIXELS {
                    let (x, y) = (x0 + dx, y0 + dy);
                    if x < width && y < height {
                        image.put_pixel(x, y, Rgb(color));
                    }
                }
            }
        }

        let path = self.output_dir.join(format!("frame_{:05}.png", self.frame));
        if let Err(e) = image.save(&path) {
            warn!(error = %e, path = %path.display(), "failed to save turtle frame");
        }
        self.frame += 1;
    }

    fn next_color(&mut self) -> [u8; 3] {
        let color = COLORS[self.next_color % COLORS.len()];
        self.next_color += 1;
        color
    }
}

impl Display for TurtleDisplay {
    fn log(&mut self, text: &str, newline: bool) {
        print!("{text}");
        if newline {
            println!();
        }
    }

    fn blit(&mut self, grid: &Grid, _automata: &[(AutomatonId, Position)]) {
        self.render_frame(grid);
        if !self.tick_delay.is_zero() {
            std::thread::sleep(self.tick_delay);
        }
    }

    fn error(&mut self, message: &str, pos: Position) {
        eprintln!("{message}");
        eprintln!("at position: {pos:?}");
    }

    fn on_new_automaton(&mut self, id: AutomatonId, pos: Position, _dir: Direction) {
        let color = self.next_color();
        self.automata.insert(id, (pos, color));
    }

    fn on_automaton_move(&mut self, id: AutomatonId, pos: Position, _dir: Direction) {
        if let Some(entry) = self.automata.get_mut(&id) {
            entry.0 = pos;
        }
    }

    fn on_automaton_child(&mut self, _parent: AutomatonId, _child: AutomatonId) {}

    fn on_automaton_halted(&mut self, id: AutomatonId) {
        self.automata.remove(&id);
    }
}
