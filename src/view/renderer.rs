//! Terminal surface for the engine's frames.

use super::grid::{HexGridWidget, StatusLine};
use super::styles::GridStyles;
use crate::render::{RenderFrame, Renderer};
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::Terminal;
use std::io;

/// Height of the status line under the grid.
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Split the terminal area into the grid and the status line.
pub fn split_area(area: Rect) -> (Rect, Rect) {
    let [grid, status] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_BAR_HEIGHT)]).areas(area);
    (grid, status)
}

/// [`Renderer`] drawing into a ratatui terminal.
///
/// Generic over backend to support testing with `TestBackend`.
pub struct TerminalRenderer<B>
where
    B: Backend,
{
    terminal: Terminal<B>,
    styles: GridStyles,
}

impl<B> TerminalRenderer<B>
where
    B: Backend,
{
    /// Wrap `terminal`.
    pub fn new(terminal: Terminal<B>, styles: GridStyles) -> Self {
        Self { terminal, styles }
    }

    /// The wrapped terminal.
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    /// Area the grid is drawn into, given the current terminal size.
    pub fn grid_area(&self) -> io::Result<Rect> {
        let size = self.terminal.size()?;
        Ok(split_area(Rect::new(0, 0, size.width, size.height)).0)
    }
}

impl<B> Renderer for TerminalRenderer<B>
where
    B: Backend,
{
    type Error = io::Error;

    fn paint(&mut self, frame: &RenderFrame) -> io::Result<()> {
        let styles = &self.styles;
        self.terminal.draw(|f| {
            let (grid, status) = split_area(f.area());
            f.render_widget(HexGridWidget::new(frame, styles), grid);
            f.render_widget(StatusLine::new(frame, styles), status);
        })?;
        Ok(())
    }
}
