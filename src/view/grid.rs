//! Hex grid and status line widgets.

use super::styles::GridStyles;
use crate::render::{format_address, glyph_for, RenderFrame};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

const TRACK_SYMBOL: &str = "│";
const THUMB_SYMBOL: &str = "█";

/// Draws the rows of a [`RenderFrame`]: address column, hex cells, ASCII
/// cells and the scrollbar.
///
/// One terminal cell is one layout pixel, so row `y` and cell `x` positions
/// map onto buffer coordinates after flooring.
pub struct HexGridWidget<'a> {
    frame: &'a RenderFrame,
    styles: &'a GridStyles,
}

impl<'a> HexGridWidget<'a> {
    /// Create a widget for `frame`.
    pub fn new(frame: &'a RenderFrame, styles: &'a GridStyles) -> Self {
        Self { frame, styles }
    }
}

impl Widget for HexGridWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let frame = self.frame;
        let metrics = &frame.metrics;
        let digits = metrics.address_digits as usize;

        for row in &frame.rows {
            let Some(y) = cell_row(area, row.y) else {
                continue;
            };
            put(
                buf,
                area,
                0.0,
                y,
                &format_address(row.offset, digits),
                self.styles.address,
            );

            for (column, &byte) in (0u64..).zip(row.bytes.iter()) {
                let style = self.styles.byte_style(frame, row.offset + column);
                put(buf, area, metrics.hex_cell_x(column), y, &format!("{byte:02X}"), style);
                if metrics.show_ascii {
                    let glyph = glyph_for(byte).to_string();
                    put(buf, area, metrics.ascii_cell_x(column), y, &glyph, style);
                }
            }
        }

        if let Some(bar) = frame.scrollbar {
            let thumb_start = bar.thumb_top.floor();
            let thumb_end = (bar.thumb_top + bar.thumb_height).ceil();
            for line in 0..area.height {
                let top = f64::from(line);
                let (symbol, style) = if top >= thumb_start && top < thumb_end {
                    (THUMB_SYMBOL, self.styles.thumb)
                } else {
                    (TRACK_SYMBOL, self.styles.track)
                };
                put(buf, area, bar.x, area.y + line, symbol, style);
            }
        }
    }
}

/// Buffer row for a layout row top, `None` when it falls outside `area`.
fn cell_row(area: Rect, y: f64) -> Option<u16> {
    let y = y.floor();
    if y < 0.0 || y >= f64::from(area.height) {
        return None;
    }
    Some(area.y + y as u16)
}

/// Write `text` at layout x `x`, clipped to `area`.
fn put(buf: &mut Buffer, area: Rect, x: f64, y: u16, text: &str, style: Style) {
    let x = x.floor();
    if !(0.0..f64::from(area.width)).contains(&x) {
        return;
    }
    let x = x as u16;
    buf.set_stringn(area.x + x, y, text, usize::from(area.width - x), style);
}

/// One-line summary under the grid.
///
/// Shows the visible byte span, the selection and the load state. A load
/// failure replaces the summary with an error banner and the retry hint.
pub struct StatusLine<'a> {
    frame: &'a RenderFrame,
    styles: &'a GridStyles,
}

impl<'a> StatusLine<'a> {
    /// Create a status line for `frame`.
    pub fn new(frame: &'a RenderFrame, styles: &'a GridStyles) -> Self {
        Self { frame, styles }
    }

    /// Text of the status line.
    pub fn text(&self) -> String {
        let frame = self.frame;
        if let Some(message) = &frame.error {
            return format!(" Load failed: {message} (r: retry)");
        }

        let mut parts = Vec::new();
        if frame.source_size == 0 {
            parts.push("empty".to_string());
        } else if frame.visible.is_empty() {
            parts.push(format!("{} bytes", frame.source_size));
        } else {
            parts.push(format!(
                "{:X}-{:X} of {} bytes",
                frame.visible.start,
                frame.visible.end - 1,
                frame.source_size
            ));
        }
        if let Some(selection) = frame.selection {
            if selection.is_single() {
                parts.push(format!("sel {:X}", selection.min()));
            } else {
                parts.push(format!(
                    "sel {:X}-{:X} ({} bytes)",
                    selection.min(),
                    selection.max(),
                    selection.len()
                ));
            }
        }
        if frame.loading {
            parts.push("loading".to_string());
        }
        format!(" {}", parts.join(" | "))
    }
}

impl Widget for StatusLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = if self.frame.error.is_some() {
            self.styles.error
        } else {
            self.styles.status
        };
        Paragraph::new(Line::from(Span::styled(self.text(), style)))
            .style(style)
            .render(area, buf);
    }
}
