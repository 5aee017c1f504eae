// Terminal UI - the face of TuneDeck
// Built with ratatui; all decisions live in `state`, this layer only draws and forwards input

mod app;        // event loop and drawing
pub mod events; // crossterm -> Action translation

pub use app::App;
pub use events::{translate, AppEvent, ClickMap, EventHandler, ListArea};

use anyhow::Result;
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

/// Owns the terminal while the player runs and puts it back on drop.
pub struct TerminalManager {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    _restore: RestoreGuard,
}

/// Restores the terminal even if the app unwinds before `TerminalManager` is built.
struct RestoreGuard;

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            cursor::Show
        );
    }
}

impl TerminalManager {
    pub fn new() -> Result<Self> {
        let guard = RestoreGuard;

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        // mouse capture so clicks arrive as press/release pairs
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.clear()?;

        Ok(Self {
            terminal,
            _restore: guard,
        })
    }

    pub fn draw<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        self.terminal.draw(f)?;
        Ok(())
    }
}

impl Drop for TerminalManager {
    fn drop(&mut self) {
        let _ = self.terminal.clear();
        let _ = self.terminal.show_cursor();
    }
}
