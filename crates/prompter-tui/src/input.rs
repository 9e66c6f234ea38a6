use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Mode};
use crate::keymap::Keymap;

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    TogglePlay,
    SpeedUp,
    SpeedDown,
    FontLarger,
    FontSmaller,
    ToggleFlip,
    ToggleOutline,
    CycleAlign,
    Reset,
    ShowHelp,
    ExitMode,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent, app: &App, keymap: &Keymap) -> Action {
    // Ctrl+C always quits, whatever the mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    match app.mode {
        // Any key closes help
        Mode::Help => Action::ExitMode,
        Mode::Normal => keymap.lookup(&key).unwrap_or(Action::None),
    }
}
