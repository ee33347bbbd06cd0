//! Terminal backend abstraction for the fancy display: cursor hide/show and
//! full-screen clear via ANSI sequences, RAII-guarded so the cursor is always
//! restored even if the run ends in an error.

use anyhow::Result;
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{Clear, ClearType},
};
use std::io::{Write, stdout};

pub trait TerminalBackend {
    fn enter(&mut self) -> Result<()>;
    fn leave(&mut self) -> Result<()>;
    fn clear_and_home(&mut self) -> Result<()>;
}

pub struct CrosstermBackend {
    entered: bool,
}

/// RAII guard ensuring cursor visibility is restored even if the caller
/// early-returns or panics mid-run.
pub struct TerminalGuard<'a> {
    backend: &'a mut CrosstermBackend,
    active: bool,
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    pub fn new() -> Self {
        Self { entered: false }
    }

    /// Enter and return a guard that will leave on drop.
    pub fn enter_guard(&mut self) -> Result<TerminalGuard<'_>> {
        self.enter()?;
        Ok(TerminalGuard {
            backend: self,
            active: true,
        })
    }
}

impl TerminalBackend for CrosstermBackend {
    fn enter(&mut self) -> Result<()> {
        if !self.entered {
            execute!(stdout(), Hide)?;
            self.entered = true;
        }
        Ok(())
    }

    fn leave(&mut self) -> Result<()> {
        if self.entered {
            execute!(stdout(), Show)?;
            self.entered = false;
        }
        Ok(())
    }

    fn clear_and_home(&mut self) -> Result<()> {
        execute!(stdout(), Clear(ClearType::All))?;
        print!("\x1b[H");
        stdout().flush()?;
        Ok(())
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

impl<'a> Drop for TerminalGuard<'a> {
    fn drop(&mut self) {
        if self.active {
            let _ = self.backend.leave();
        }
    }
}

impl<'a> TerminalGuard<'a> {
    pub fn clear_and_home(&mut self) -> Result<()> {
        self.backend.clear_and_home()
    }
}
