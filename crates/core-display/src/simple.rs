use std::io::{self, Write};

use core_world::Display;

/// Prints log output as it happens and nothing else — no grid redraw, no
/// lifecycle chatter. The default choice when stdout just needs to carry
/// the program's own output stream.
#[derive(Debug, Default)]
pub struct SimpleDisplay;

impl SimpleDisplay {
    pub fn new() -> Self {
        Self
    }
}

impl Display for SimpleDisplay {
    fn log(&mut self, text: &str, newline: bool) {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        let _ = handle.write_all(text.as_bytes());
        if newline {
            let _ = handle.write_all(b"\n");
        }
        let _ = handle.flush();
    }
}
