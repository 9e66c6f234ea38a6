use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use prompter_core::config::KeymapConfig;
use tracing::warn;

use crate::input::Action;

/// Parsed key binding (key code + modifiers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub fn simple(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::CONTROL)
    }

    pub fn shift(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::SHIFT)
    }
}

/// Runtime keymap for key-to-action lookup
pub struct Keymap {
    bindings: HashMap<KeyBinding, Action>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self::from_config(&KeymapConfig::default())
    }
}

impl Keymap {
    /// Create a keymap from configuration
    pub fn from_config(config: &KeymapConfig) -> Self {
        let mut bindings = HashMap::new();

        let mut add_binding = |key_str: &str, action: Action| {
            if let Some(binding) = parse_key_binding(key_str) {
                if let Some(existing) = bindings.get(&binding) {
                    warn!(
                        "Key conflict: '{}' already bound to {:?}, ignoring binding to {:?}",
                        key_str, existing, action
                    );
                } else {
                    bindings.insert(binding, action);
                }
            } else {
                warn!("Invalid key binding: '{}', ignoring", key_str);
            }
        };

        add_binding(&config.quit, Action::Quit);
        add_binding(&config.toggle_play, Action::TogglePlay);
        add_binding(&config.speed_up, Action::SpeedUp);
        add_binding(&config.speed_down, Action::SpeedDown);
        add_binding(&config.font_larger, Action::FontLarger);
        add_binding(&config.font_smaller, Action::FontSmaller);
        add_binding(&config.toggle_flip, Action::ToggleFlip);
        add_binding(&config.toggle_outline, Action::ToggleOutline);
        add_binding(&config.cycle_align, Action::CycleAlign);
        add_binding(&config.reset, Action::Reset);
        add_binding(&config.help, Action::ShowHelp);

        // Ctrl+C always quits
        bindings.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        bindings.insert(KeyBinding::simple(KeyCode::Esc), Action::ExitMode);

        Self { bindings }
    }

    /// Get action for a key binding
    pub fn get(&self, binding: &KeyBinding) -> Option<&Action> {
        self.bindings.get(binding)
    }

    /// Resolve a key event
    ///
    /// Terminals report punctuation such as `?` with SHIFT set, so a
    /// non-letter character falls back to its unshifted binding.
    pub fn lookup(&self, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::new(key.code, key.modifiers);
        if let Some(action) = self.get(&binding) {
            return Some(*action);
        }
        match key.code {
            KeyCode::Char(c) if !c.is_ascii_alphabetic() && key.modifiers == KeyModifiers::SHIFT => {
                self.get(&KeyBinding::simple(key.code)).copied()
            }
            _ => None,
        }
    }

    /// Human-readable binding list for the help popup
    pub fn describe(config: &KeymapConfig) -> Vec<(String, &'static str)> {
        vec![
            (config.toggle_play.clone(), "Play / pause"),
            (format!("{}/{}", config.speed_up, config.speed_down), "Speed up / down"),
            (format!("{}/{}", config.font_larger, config.font_smaller), "Text larger / smaller"),
            (config.toggle_flip.clone(), "Mirror"),
            (config.toggle_outline.clone(), "Outline"),
            (config.cycle_align.clone(), "Cycle alignment"),
            (config.reset.clone(), "Restart script"),
            (config.help.clone(), "Help"),
            (config.quit.clone(), "Quit"),
        ]
    }

    /// One-line reminder of the most used bindings, for the status bar
    pub fn hint(config: &KeymapConfig) -> String {
        let short = ["play", "speed", "size", "", "", "", "restart", "help", "quit"];
        Self::describe(config)
            .into_iter()
            .zip(short)
            .filter(|(_, label)| !label.is_empty())
            .map(|((keys, _), label)| format!("{}:{}", keys, label))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Parse Vim-style key notation into KeyBinding
/// Supported formats:
/// - Single char: "f", "o", "q", etc.
/// - Uppercase (Shift): "R", "F", etc.
/// - Special chars: "?", "+", etc.
/// - Ctrl: "<C-r>", "<C-c>", etc.
/// - Shift: "<S-Tab>", "<S-r>", etc.
/// - Special keys: "<CR>", "<Enter>", "<Esc>", "<Tab>", "<Space>", "<Left>", "<Right>", "<Up>", "<Down>"
pub fn parse_key_binding(s: &str) -> Option<KeyBinding> {
    let s = s.trim();

    if s.len() > 2 && s.starts_with('<') && s.ends_with('>') {
        let inner = &s[1..s.len() - 1];
        return parse_special_key(inner);
    }

    let mut chars = s.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    // Uppercase letters are Shift+letter
    if c.is_ascii_uppercase() {
        return Some(KeyBinding::shift(KeyCode::Char(c)));
    }
    Some(KeyBinding::simple(KeyCode::Char(c)))
}

/// Parse special key notation (content inside <...>)
fn parse_special_key(inner: &str) -> Option<KeyBinding> {
    if let Some(rest) = inner.strip_prefix("C-") {
        let key = parse_key_name(rest)?;
        return Some(KeyBinding::ctrl(key));
    }

    if let Some(rest) = inner.strip_prefix("S-") {
        let key = parse_key_name(rest)?;
        return Some(KeyBinding::shift(key));
    }

    parse_key_name(inner).map(KeyBinding::simple)
}

/// Parse a key name (without modifiers)
fn parse_key_name(name: &str) -> Option<KeyCode> {
    let lower = name.to_lowercase();
    match lower.as_str() {
        "cr" | "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "space" | "spc" => Some(KeyCode::Char(' ')),
        "bs" | "backspace" => Some(KeyCode::Backspace),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "pageup" | "pgup" => Some(KeyCode::PageUp),
        "pagedown" | "pgdn" => Some(KeyCode::PageDown),
        _ => {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(KeyCode::Char(c.to_ascii_lowercase())),
                _ => lower
                    .strip_prefix('f')
                    .and_then(|n| n.parse::<u8>().ok())
                    .filter(|n| (1..=12).contains(n))
                    .map(KeyCode::F),
            }
        }
    }
}
