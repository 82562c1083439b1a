//! Keyboard navigation handler.
//!
//! Navigation works from the minimum endpoint of the selection and always
//! collapses the selection to a single byte. Moves wrap at the file
//! boundaries rather than stopping.

use super::input::{set_highlight, Effect, InputContext, InputState, Transition};
use crate::model::{NavKey, SelectionRange};

/// Result of applying a navigation key to a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Move the cursor to this offset.
    MoveTo(u64),
    /// Drop the selection.
    Clear,
    /// Nothing to do.
    Stay,
}

/// Where `key` takes a cursor at `current` in a file of `size` bytes.
///
/// With no cursor every movement key lands on offset 0. `page_rows` is the
/// number of whole rows on screen.
pub fn navigate(
    key: NavKey,
    current: Option<u64>,
    size: u64,
    bytes_per_row: u64,
    page_rows: u64,
) -> Navigation {
    if key == NavKey::Escape {
        return match current {
            Some(_) => Navigation::Clear,
            None => Navigation::Stay,
        };
    }
    if size == 0 || bytes_per_row == 0 {
        return Navigation::Stay;
    }
    let Some(current) = current else {
        return Navigation::MoveTo(0);
    };

    let last = size - 1;
    let current = current.min(last);
    let column = current % bytes_per_row;
    let last_row = last / bytes_per_row;
    let page = page_rows.max(1).saturating_mul(bytes_per_row);

    let target = match key {
        NavKey::ArrowLeft => {
            if current == 0 {
                last
            } else {
                current - 1
            }
        }
        NavKey::ArrowRight => {
            if current == last {
                0
            } else {
                current + 1
            }
        }
        NavKey::ArrowUp => {
            if current >= bytes_per_row {
                current - bytes_per_row
            } else {
                (last_row * bytes_per_row + column).min(last)
            }
        }
        NavKey::ArrowDown => {
            if current / bytes_per_row == last_row {
                column
            } else {
                (current + bytes_per_row).min(last)
            }
        }
        NavKey::PageUp => current.saturating_sub(page),
        NavKey::PageDown => current.saturating_add(page).min(last),
        NavKey::Home => 0,
        NavKey::End => last,
        NavKey::Escape => return Navigation::Stay,
    };
    Navigation::MoveTo(target)
}

/// Apply a navigation key to the input state.
///
/// A move selects the target byte, scrolls it into view and highlights it.
pub fn handle_key(state: InputState, key: NavKey, ctx: &InputContext<'_>) -> Transition {
    let Some(metrics) = ctx.metrics else {
        return Transition::unchanged(state);
    };

    let current = state.selection.map(|s| s.min());
    match navigate(
        key,
        current,
        metrics.source_size,
        metrics.bytes_per_row,
        metrics.page_rows(),
    ) {
        Navigation::Stay => Transition::unchanged(state),
        Navigation::Clear => {
            let mut state = state;
            state.selection = None;
            Transition::with(state, vec![Effect::SelectionChanged(None)])
        }
        Navigation::MoveTo(offset) => {
            let range = SelectionRange::single(offset);
            if state.selection == Some(range) {
                return Transition::unchanged(state);
            }
            let mut state = state;
            state.selection = Some(range);
            let highlighted = set_highlight(state, offset, ctx);

            let mut effects = vec![
                Effect::SelectionChanged(Some(range)),
                Effect::ScrollIntoView(offset),
            ];
            effects.extend(highlighted.effects);
            Transition::with(highlighted.state, effects)
        }
    }
}

#[cfg(test)]
#[path = "keyboard_handler_tests.rs"]
mod tests;
