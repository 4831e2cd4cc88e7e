use anyhow::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use log::error;
use ratatui::{backend::CrosstermBackend, Frame, Terminal};

use std::io::{self, Stderr};
use std::panic;

/// Owns the terminal while the UI is running, and puts it back how it was when dropped.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stderr>>,
}

impl Tui {
    /// Initialize the terminal interface.
    pub fn enter() -> Result<Self> {
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stderr()))?;

        terminal::enable_raw_mode()?;
        crossterm::execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture)?;

        // Reset the terminal before printing any panic
        let panic_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic| {
            if let Err(e) = reset() {
                eprintln!("failed to reset the terminal: {e}");
            }
            panic_hook(panic);
        }));

        terminal.hide_cursor()?;
        terminal.clear()?;

        Ok(Self { terminal })
    }

    pub fn draw(&mut self, f: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(f)?;

        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = reset().and_then(|_| Ok(self.terminal.show_cursor()?)) {
            error!("error resetting terminal: {:?}", e);
        }
    }
}

/// Resets the terminal interface.
fn reset() -> Result<()> {
    terminal::disable_raw_mode()?;
    crossterm::execute!(io::stderr(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}
