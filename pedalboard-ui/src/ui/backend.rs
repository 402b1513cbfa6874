use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};

use super::input::MenuKey;

/// Crossterm terminal in raw mode on the alternate screen.
pub struct RatatuiBackend {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    started: bool,
}

impl RatatuiBackend {
    /// Create a new ratatui backend (does not start terminal mode)
    pub fn new() -> io::Result<Self> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        Ok(Self {
            terminal,
            started: false,
        })
    }

    pub fn start(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        self.started = true;
        self.terminal.clear()?;
        Ok(())
    }

    /// Leave raw mode and the alternate screen. Safe to call twice.
    pub fn stop(&mut self) -> io::Result<()> {
        if !self.started {
            return Ok(());
        }
        self.started = false;
        disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    pub fn draw<F>(&mut self, render: F) -> io::Result<()>
    where
        F: FnOnce(&mut Frame),
    {
        self.terminal.draw(render)?;
        Ok(())
    }

    /// Wait up to `timeout` for a menu key. Other events are drained.
    pub fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<MenuKey>> {
        let mut t = timeout;
        loop {
            if !event::poll(t)? {
                return Ok(None);
            }
            match event::read()? {
                Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                    if let Some(key) = MenuKey::from_key_event(key_event) {
                        return Ok(Some(key));
                    }
                }
                // Redraw happens every loop iteration anyway
                Event::Resize(..) => return Ok(None),
                _ => {}
            }
            t = Duration::ZERO;
        }
    }
}

impl Drop for RatatuiBackend {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
