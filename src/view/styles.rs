//! Grid styling configuration.
//!
//! Distinct looks for the address column, plain bytes, the selection, the
//! hovered byte, the navigation highlight and the scrollbar.

use crate::render::RenderFrame;
use ratatui::style::{Color, Modifier, Style};

// ===== ColorConfig =====

/// Configuration for color output.
///
/// Colors are disabled by the `NO_COLOR` environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Create a ColorConfig from the environment.
    ///
    /// Any value of `NO_COLOR` disables colors.
    pub fn from_env() -> Self {
        Self::new(std::env::var_os("NO_COLOR").is_none())
    }

    /// Create a ColorConfig with colors explicitly on or off.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

// ===== GridStyles =====

/// Styles used to paint the hex grid and status line.
///
/// Without colors, state is shown with modifiers only (reverse video for the
/// selection, bold for the highlight, underline for hover).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStyles {
    /// Address column.
    pub address: Style,
    /// Unselected byte.
    pub byte: Style,
    /// Byte inside the selection.
    pub selected: Style,
    /// Byte under the mouse.
    pub hover: Style,
    /// Byte carrying the navigation highlight.
    pub highlight: Style,
    /// Scrollbar track.
    pub track: Style,
    /// Scrollbar thumb.
    pub thumb: Style,
    /// Status line.
    pub status: Style,
    /// Load failure banner.
    pub error: Style,
}

impl GridStyles {
    /// Create styles for `config`.
    pub fn with_color_config(config: ColorConfig) -> Self {
        if config.colors_enabled() {
            Self {
                address: Style::default().fg(Color::DarkGray),
                byte: Style::default(),
                selected: Style::default().fg(Color::White).bg(Color::Blue),
                hover: Style::default().add_modifier(Modifier::UNDERLINED),
                highlight: Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
                track: Style::default().fg(Color::DarkGray),
                thumb: Style::default().fg(Color::Gray),
                status: Style::default().fg(Color::Black).bg(Color::Gray),
                error: Style::default()
                    .fg(Color::White)
                    .bg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            }
        } else {
            Self {
                address: Style::default(),
                byte: Style::default(),
                selected: Style::default().add_modifier(Modifier::REVERSED),
                hover: Style::default().add_modifier(Modifier::UNDERLINED),
                highlight: Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED),
                track: Style::default(),
                thumb: Style::default(),
                status: Style::default().add_modifier(Modifier::REVERSED),
                error: Style::default().add_modifier(Modifier::BOLD),
            }
        }
    }

    /// Style for the byte at `offset` in `frame`.
    ///
    /// The highlight wins over the selection, and the selection over hover.
    pub fn byte_style(&self, frame: &RenderFrame, offset: u64) -> Style {
        if frame.is_highlighted(offset) {
            self.highlight
        } else if frame.is_selected(offset) {
            self.selected
        } else if frame.is_hovered(offset) {
            self.byte.patch(self.hover)
        } else {
            self.byte
        }
    }
}

impl Default for GridStyles {
    fn default() -> Self {
        Self::with_color_config(ColorConfig::from_env())
    }
}
