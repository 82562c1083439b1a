//! TUI rendering and terminal management (impure shell)

mod grid;
mod renderer;
mod styles;

pub use grid::{HexGridWidget, StatusLine};
pub use renderer::{split_area, TerminalRenderer, STATUS_BAR_HEIGHT};
pub use styles::{ColorConfig, GridStyles};

use crate::config::{ConfigError, KeyBindings};
use crate::logging::LoggingError;
use crate::model::{InputError, KeyAction};
use crate::render::FrameOutcome;
use crate::state::{InputEvent, PointerEventData};
use crate::viewer::HexViewer;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::Backend, backend::CrosstermBackend, layout::Rect, Terminal};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

/// Time between frames (about 60 Hz).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Rows scrolled per wheel notch.
pub const WHEEL_ROWS: f64 = 3.0;

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),

    /// The file to view could not be opened
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging could not be initialized
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),
}

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: Backend,
{
    viewer: HexViewer,
    renderer: TerminalRenderer<B>,
    key_bindings: KeyBindings,
    grid_area: Rect,
}

impl<B> TuiApp<B>
where
    B: Backend,
{
    /// Wrap `viewer` and size its viewport to the terminal's grid area.
    pub fn new(
        terminal: Terminal<B>,
        viewer: HexViewer,
        key_bindings: KeyBindings,
        styles: GridStyles,
    ) -> Result<Self, TuiError> {
        let mut app = Self {
            viewer,
            renderer: TerminalRenderer::new(terminal, styles),
            key_bindings,
            grid_area: Rect::default(),
        };
        let grid_area = app.renderer.grid_area()?;
        app.set_grid_area(grid_area);
        Ok(app)
    }

    /// The viewer driven by this app.
    pub fn viewer(&self) -> &HexViewer {
        &self.viewer
    }

    /// Mutable access to the viewer.
    pub fn viewer_mut(&mut self) -> &mut HexViewer {
        &mut self.viewer
    }

    /// The terminal frames are drawn into.
    pub fn terminal(&self) -> &Terminal<B> {
        self.renderer.terminal()
    }

    /// Run the main event loop
    ///
    /// Returns when the user quits.
    pub fn run(&mut self) -> Result<(), TuiError> {
        loop {
            self.tick(Instant::now())?;

            if !event::poll(FRAME_INTERVAL)? {
                continue;
            }
            // Drain everything queued so a burst of mouse moves costs one frame.
            loop {
                if self.handle_event(event::read()?, Instant::now()) {
                    info!("Quit requested");
                    return Ok(());
                }
                if !event::poll(Duration::ZERO)? {
                    break;
                }
            }
        }
    }

    /// Advance the viewer one frame and paint it.
    pub fn tick(&mut self, now: Instant) -> Result<FrameOutcome, TuiError> {
        Ok(self.viewer.tick(now, &mut self.renderer)?)
    }

    /// Handle one terminal event.
    ///
    /// Returns `true` when the user asked to quit.
    pub fn handle_event(&mut self, event: Event, now: Instant) -> bool {
        match event {
            Event::Key(key) => self.handle_key(key, now),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse, now);
                false
            }
            Event::Resize(width, height) => {
                debug!(width, height, "Terminal resized");
                let (grid, _) = split_area(Rect::new(0, 0, width, height));
                self.set_grid_area(grid);
                false
            }
            Event::FocusLost => {
                self.viewer.handle_input(InputEvent::PointerLeave, now);
                false
            }
            _ => false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        let Some(action) = self.key_bindings.get(key) else {
            return false;
        };
        match action {
            KeyAction::Navigate(nav) => self.viewer.handle_input(InputEvent::Key(nav), now),
            KeyAction::ToggleAscii => self.viewer.toggle_ascii(),
            KeyAction::Retry => self.viewer.retry(),
            KeyAction::Quit => return true,
        }
        false
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        let Some(event) = self.translate_mouse(mouse, now) else {
            return;
        };
        self.viewer.handle_input(event, now);
    }

    /// Map a crossterm mouse event onto the viewer's input events.
    ///
    /// Positions are taken at the cell center, relative to the grid area.
    /// Moves over the status line count as leaving the grid.
    fn translate_mouse(&self, mouse: MouseEvent, now: Instant) -> Option<InputEvent> {
        let area = self.grid_area;
        let inside = mouse.column >= area.x
            && mouse.column < area.right()
            && mouse.row >= area.y
            && mouse.row < area.bottom();
        let x = f64::from(mouse.column) - f64::from(area.x) + 0.5;
        let y = f64::from(mouse.row) - f64::from(area.y) + 0.5;
        let mut pointer = PointerEventData::mouse(x, y, now);
        if mouse.modifiers.contains(KeyModifiers::SHIFT) {
            pointer = pointer.with_shift();
        }
        let row_height = self
            .viewer
            .metrics()
            .map_or(1.0, |metrics| metrics.row_height);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if inside => {
                Some(InputEvent::PointerDown(pointer))
            }
            MouseEventKind::Drag(MouseButton::Left) => Some(InputEvent::PointerMove(pointer)),
            MouseEventKind::Up(MouseButton::Left) => Some(InputEvent::PointerUp(pointer)),
            MouseEventKind::Moved if inside => Some(InputEvent::PointerMove(pointer)),
            MouseEventKind::Moved => Some(InputEvent::PointerLeave),
            MouseEventKind::ScrollDown if inside => Some(InputEvent::Wheel {
                delta_y: WHEEL_ROWS * row_height,
            }),
            MouseEventKind::ScrollUp if inside => Some(InputEvent::Wheel {
                delta_y: -WHEEL_ROWS * row_height,
            }),
            _ => None,
        }
    }

    fn set_grid_area(&mut self, area: Rect) {
        self.grid_area = area;
        self.viewer
            .set_viewport_size(f64::from(area.width), f64::from(area.height));
    }
}

/// Initialize and run the TUI for `viewer`.
///
/// Handles terminal setup, runs the event loop, and restores the terminal
/// even when the loop fails.
///
/// Note: Logging must be initialized by caller before calling this function.
pub fn run(
    viewer: HexViewer,
    key_bindings: KeyBindings,
    styles: GridStyles,
) -> Result<(), TuiError> {
    let terminal = setup_terminal()?;
    let result = TuiApp::new(terminal, viewer, key_bindings, styles)
        .and_then(|mut app| app.run());

    // Always restore terminal state
    let restored = restore_terminal();
    result.and(restored)
}

/// Put the terminal in raw mode on the alternate screen with mouse capture.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableMouseCapture)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

/// Restore terminal to normal state
///
/// Disables raw mode, mouse capture, and leaves alternate screen
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(DisableMouseCapture)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;
