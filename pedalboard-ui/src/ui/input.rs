//! Key input for the menu, decoupled from the terminal backend.

use crossterm::event::{KeyCode as CrosstermKeyCode, KeyEvent, KeyModifiers};

/// The keys the menu reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKey {
    Up,
    Down,
    Press,
    Back,
    Quit,
}

impl MenuKey {
    pub fn from_key_event(event: KeyEvent) -> Option<Self> {
        if event.modifiers.contains(KeyModifiers::CONTROL) {
            return match event.code {
                CrosstermKeyCode::Char('c') => Some(MenuKey::Quit),
                _ => None,
            };
        }
        match event.code {
            CrosstermKeyCode::Up | CrosstermKeyCode::Char('k') => Some(MenuKey::Up),
            CrosstermKeyCode::Down | CrosstermKeyCode::Char('j') => Some(MenuKey::Down),
            CrosstermKeyCode::Enter | CrosstermKeyCode::Char(' ') => Some(MenuKey::Press),
            CrosstermKeyCode::Esc | CrosstermKeyCode::Backspace => Some(MenuKey::Back),
            CrosstermKeyCode::Char('q') => Some(MenuKey::Quit),
            _ => None,
        }
    }
}
