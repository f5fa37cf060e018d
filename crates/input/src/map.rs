//! Key mapping from terminal events to session commands.

use crate::types::PuzzleVariant;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Non-pointer commands the player can issue from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    /// Start a fresh session with the current picture.
    Restart,
    /// Start a fresh session with another picture.
    SelectVariant(PuzzleVariant),
}

/// Map keyboard input to menu commands.
pub fn handle_key_event(key: KeyEvent) -> Option<MenuCommand> {
    match key.code {
        KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::Enter => Some(MenuCommand::Restart),

        // Picture selection
        KeyCode::Char('1') | KeyCode::F(1) => Some(MenuCommand::SelectVariant(PuzzleVariant::Face)),
        KeyCode::Char('2') | KeyCode::F(2) => {
            Some(MenuCommand::SelectVariant(PuzzleVariant::Animal))
        }
        KeyCode::Char('3') | KeyCode::F(3) => {
            Some(MenuCommand::SelectVariant(PuzzleVariant::Furniture))
        }

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
