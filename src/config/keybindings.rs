//! Keyboard bindings configuration.

use crate::model::key_action::{KeyAction, NavKey};
use crossterm::event::KeyEvent;
use std::collections::HashMap;

/// Maps keyboard events to domain actions.
///
/// Provides default bindings (arrows plus vim-style aliases).
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<KeyEvent, KeyAction>,
}

impl KeyBindings {
    /// Look up the action for a key event.
    ///
    /// Only the code and modifiers are matched; event kind and keyboard
    /// state are ignored.
    pub fn get(&self, key: KeyEvent) -> Option<KeyAction> {
        self.bindings
            .get(&KeyEvent::new(key.code, key.modifiers))
            .copied()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        use crossterm::event::{KeyCode, KeyModifiers};

        let mut bindings = HashMap::new();
        let mut bind = |code: KeyCode, modifiers: KeyModifiers, action: KeyAction| {
            bindings.insert(KeyEvent::new(code, modifiers), action);
        };

        // Cursor movement
        bind(KeyCode::Left, KeyModifiers::NONE, KeyAction::Navigate(NavKey::ArrowLeft));
        bind(KeyCode::Right, KeyModifiers::NONE, KeyAction::Navigate(NavKey::ArrowRight));
        bind(KeyCode::Up, KeyModifiers::NONE, KeyAction::Navigate(NavKey::ArrowUp));
        bind(KeyCode::Down, KeyModifiers::NONE, KeyAction::Navigate(NavKey::ArrowDown));

        // Vim-style aliases
        bind(KeyCode::Char('h'), KeyModifiers::NONE, KeyAction::Navigate(NavKey::ArrowLeft));
        bind(KeyCode::Char('l'), KeyModifiers::NONE, KeyAction::Navigate(NavKey::ArrowRight));
        bind(KeyCode::Char('k'), KeyModifiers::NONE, KeyAction::Navigate(NavKey::ArrowUp));
        bind(KeyCode::Char('j'), KeyModifiers::NONE, KeyAction::Navigate(NavKey::ArrowDown));
        bind(KeyCode::Char('g'), KeyModifiers::NONE, KeyAction::Navigate(NavKey::Home));
        bind(KeyCode::Char('G'), KeyModifiers::SHIFT, KeyAction::Navigate(NavKey::End));

        // Jumps
        bind(KeyCode::Home, KeyModifiers::NONE, KeyAction::Navigate(NavKey::Home));
        bind(KeyCode::End, KeyModifiers::NONE, KeyAction::Navigate(NavKey::End));
        bind(KeyCode::PageUp, KeyModifiers::NONE, KeyAction::Navigate(NavKey::PageUp));
        bind(KeyCode::PageDown, KeyModifiers::NONE, KeyAction::Navigate(NavKey::PageDown));
        bind(KeyCode::Char('u'), KeyModifiers::CONTROL, KeyAction::Navigate(NavKey::PageUp));
        bind(KeyCode::Char('d'), KeyModifiers::CONTROL, KeyAction::Navigate(NavKey::PageDown));
        bind(KeyCode::Esc, KeyModifiers::NONE, KeyAction::Navigate(NavKey::Escape));

        // Display
        bind(KeyCode::Char('a'), KeyModifiers::NONE, KeyAction::ToggleAscii);
        bind(KeyCode::Char('r'), KeyModifiers::NONE, KeyAction::Retry);

        // Application controls
        bind(KeyCode::Char('q'), KeyModifiers::NONE, KeyAction::Quit);
        bind(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyAction::Quit);

        Self { bindings }
    }
}
