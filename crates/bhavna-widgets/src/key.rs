//! Key bindings with display labels, shared by input handling and the hint bar.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// One or more key combinations that trigger a described action.
#[derive(Debug, Clone)]
pub struct Binding {
    /// The key combinations that trigger this binding.
    pub keys: Vec<KeyCombination>,
    /// Short key label shown in hints, e.g. `"ctrl+l"`.
    pub label: String,
    /// What the binding does, e.g. `"clear"`.
    pub description: String,
    /// Disabled bindings never match and are dimmed in hints.
    pub enabled: bool,
}

/// A key code plus the exact set of modifiers that must be held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCombination {
    /// The base key code.
    pub code: KeyCode,
    /// Modifiers that must be held, and no others.
    pub modifiers: KeyModifiers,
}

impl Binding {
    /// Create a binding for a single key combination.
    pub fn new(
        key: KeyCombination,
        label: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self::with_keys(vec![key], label, description)
    }

    /// Create a binding triggered by any of several key combinations.
    pub fn with_keys(
        keys: Vec<KeyCombination>,
        label: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            keys,
            label: label.into(),
            description: description.into(),
            enabled: true,
        }
    }

    /// Whether `event` is a press (or repeat) of one of this binding's keys.
    ///
    /// Modifiers must match exactly, so plain `Enter` and `Shift+Enter` can
    /// be bound to different actions.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if !self.enabled || event.kind == KeyEventKind::Release {
            return false;
        }
        self.keys.iter().any(|k| k.matches(event))
    }

    /// Enable or disable the binding.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl KeyCombination {
    /// A key with no modifiers.
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    /// A key with Ctrl held.
    pub const fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    /// A key with Alt held.
    pub const fn alt(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::ALT,
        }
    }

    /// A key with Shift held.
    pub const fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    fn matches(&self, event: &KeyEvent) -> bool {
        if self.code != event.code {
            return false;
        }
        // Terminals disagree on whether shifted characters carry SHIFT.
        let held = match event.code {
            KeyCode::Char(_) => event.modifiers - KeyModifiers::SHIFT,
            _ => event.modifiers,
        };
        let wanted = match self.code {
            KeyCode::Char(_) => self.modifiers - KeyModifiers::SHIFT,
            _ => self.modifiers,
        };
        held == wanted
    }
}

/// Types that expose their bindings to a [`HintBar`](crate::hint_bar::HintBar).
pub trait KeyMap {
    /// Bindings in display order.
    fn hints(&self) -> Vec<&Binding>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn plain_enter_does_not_match_shift_enter() {
        let submit = Binding::new(KeyCombination::new(KeyCode::Enter), "enter", "analyze");
        assert!(submit.matches(&press(KeyCode::Enter, KeyModifiers::NONE)));
        assert!(!submit.matches(&press(KeyCode::Enter, KeyModifiers::SHIFT)));
    }

    #[test]
    fn any_of_several_keys_matches() {
        let newline = Binding::with_keys(
            vec![
                KeyCombination::shift(KeyCode::Enter),
                KeyCombination::alt(KeyCode::Enter),
            ],
            "shift+enter",
            "new line",
        );
        assert!(newline.matches(&press(KeyCode::Enter, KeyModifiers::SHIFT)));
        assert!(newline.matches(&press(KeyCode::Enter, KeyModifiers::ALT)));
        assert!(!newline.matches(&press(KeyCode::Enter, KeyModifiers::NONE)));
    }

    #[test]
    fn ctrl_char_ignores_shift_flag() {
        let clear = Binding::new(KeyCombination::ctrl(KeyCode::Char('l')), "ctrl+l", "clear");
        assert!(clear.matches(&press(KeyCode::Char('l'), KeyModifiers::CONTROL)));
        assert!(clear.matches(&press(
            KeyCode::Char('l'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT
        )));
        assert!(!clear.matches(&press(KeyCode::Char('l'), KeyModifiers::NONE)));
    }

    #[test]
    fn disabled_binding_never_matches() {
        let mut submit = Binding::new(KeyCombination::new(KeyCode::Enter), "enter", "analyze");
        submit.set_enabled(false);
        assert!(!submit.matches(&press(KeyCode::Enter, KeyModifiers::NONE)));
    }

    #[test]
    fn release_events_are_ignored() {
        let submit = Binding::new(KeyCombination::new(KeyCode::Enter), "enter", "analyze");
        let mut event = press(KeyCode::Enter, KeyModifiers::NONE);
        event.kind = KeyEventKind::Release;
        assert!(!submit.matches(&event));
    }
}
