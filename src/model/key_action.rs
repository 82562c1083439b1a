//! Domain-level keyboard actions independent of key bindings.

/// Navigation keys understood by the input controller.
///
/// Device-agnostic: hosts translate their native key events into these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavKey {
    /// Move one byte back, wrapping from offset 0 to the last byte.
    ArrowLeft,
    /// Move one byte forward, wrapping from the last byte to offset 0.
    ArrowRight,
    /// Move one row up, wrapping from the first row to the last.
    ArrowUp,
    /// Move one row down, wrapping from the last row to the first.
    ArrowDown,
    /// Jump to offset 0.
    Home,
    /// Jump to the last byte.
    End,
    /// Move up by one viewport of rows.
    PageUp,
    /// Move down by one viewport of rows.
    PageDown,
    /// Clear the selection.
    Escape,
}

/// Actions that can be mapped to configurable key bindings.
///
/// These represent user intent, not specific keys. The mapping from
/// `crossterm::event::KeyEvent` to `KeyAction` is handled by `KeyBindings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Move the selection cursor. Default: arrows, h/j/k/l, Home/End, PgUp/PgDn, Esc
    Navigate(NavKey),
    /// Show or hide the ASCII column. Default: a
    ToggleAscii,
    /// Retry a failed load. Default: r
    Retry,
    /// Exit the application. Default: q/Ctrl+c
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigate_carries_nav_key() {
        let action = KeyAction::Navigate(NavKey::ArrowLeft);
        match action {
            KeyAction::Navigate(key) => assert_eq!(key, NavKey::ArrowLeft),
            _ => panic!("Navigate should match Navigate variant"),
        }
    }

    #[test]
    fn navigate_with_different_keys_not_equal() {
        assert_ne!(
            KeyAction::Navigate(NavKey::Home),
            KeyAction::Navigate(NavKey::End)
        );
    }

    #[test]
    fn actions_are_copy() {
        let action = KeyAction::Retry;
        let copied = action;
        assert_eq!(action, copied);
    }
}
