//! Grid geometry.
//!
//! Layout is a pure function of the viewport size, font metrics, ASCII
//! visibility, an optional bytes-per-row override and the source size.
//! [`LayoutEngine`] memoizes the last inputs and their [`LayoutMetrics`].
//!
//! All lengths are in host pixels. A terminal host uses one cell as one
//! pixel (`FontMetrics { char_width: 1.0, line_height: 1.0 }`).

/// Width of one character and height of one line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    /// Advance width of one monospace character.
    pub char_width: f64,
    /// Height of one text line.
    pub line_height: f64,
}

impl FontMetrics {
    /// Metrics of a character-cell terminal.
    pub const TERMINAL: Self = Self {
        char_width: 1.0,
        line_height: 1.0,
    };

    /// Create font metrics.
    pub fn new(char_width: f64, line_height: f64) -> Self {
        Self {
            char_width,
            line_height,
        }
    }
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self::TERMINAL
    }
}

/// Fixed decorations around the byte cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridStyle {
    /// Minimum hex digits in the address column.
    pub address_digits: u32,
    /// Characters between the address column and the first hex cell.
    pub address_gap_chars: f64,
    /// Characters between the hex and ASCII columns.
    pub border_chars: f64,
    /// Characters reserved for the scrollbar on the right.
    pub scrollbar_chars: f64,
    /// Space above the first row and below the last, in pixels.
    pub vertical_padding: f64,
}

impl Default for GridStyle {
    fn default() -> Self {
        Self {
            address_digits: 8,
            address_gap_chars: 2.0,
            border_chars: 2.0,
            scrollbar_chars: 1.0,
            vertical_padding: 0.0,
        }
    }
}

/// Everything the layout is derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutInputs {
    /// Viewport width in pixels.
    pub viewport_width: f64,
    /// Viewport height in pixels.
    pub viewport_height: f64,
    /// Font metrics.
    pub font: FontMetrics,
    /// Whether the ASCII column is shown.
    pub show_ascii: bool,
    /// Fixed bytes per row, bypassing the fit-to-width rule.
    pub bytes_per_row_override: Option<u32>,
    /// Size of the byte source.
    pub source_size: u64,
    /// Decorations.
    pub style: GridStyle,
}

impl Default for LayoutInputs {
    fn default() -> Self {
        Self {
            viewport_width: 0.0,
            viewport_height: 0.0,
            font: FontMetrics::default(),
            show_ascii: true,
            bytes_per_row_override: None,
            source_size: 0,
            style: GridStyle::default(),
        }
    }
}

/// Derived, immutable grid geometry.
///
/// Recomputed whenever any [`LayoutInputs`] field changes; never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    /// Viewport width in pixels.
    pub viewport_width: f64,
    /// Viewport height in pixels.
    pub viewport_height: f64,
    /// Bytes shown per row (at least 1).
    pub bytes_per_row: u64,
    /// Height of one row.
    pub row_height: f64,
    /// Width of one character.
    pub char_width: f64,
    /// Width of one hex cell (two digits plus a space).
    pub cell_width: f64,
    /// Width of the address column including its gap.
    pub address_column_width: f64,
    /// Width of one ASCII cell.
    pub ascii_cell_width: f64,
    /// Space above the first row.
    pub vertical_padding: f64,
    /// Gap between the hex and ASCII columns.
    pub border_width: f64,
    /// Width reserved for the scrollbar.
    pub scrollbar_width: f64,
    /// Hex digits printed in the address column.
    pub address_digits: u32,
    /// Left edge of the first hex cell.
    pub hex_start_x: f64,
    /// Left edge of the first ASCII cell.
    pub ascii_start_x: f64,
    /// Whether the ASCII column is shown.
    pub show_ascii: bool,
    /// Size of the byte source.
    pub source_size: u64,
    /// Rows needed to show the whole source.
    pub row_count: u64,
    /// Height of all rows plus padding.
    pub total_height: f64,
    /// Largest valid scroll offset.
    pub max_scroll: f64,
}

impl LayoutMetrics {
    /// Left edge of hex cell `column`.
    pub fn hex_cell_x(&self, column: u64) -> f64 {
        self.hex_start_x + column as f64 * self.cell_width
    }

    /// Left edge of ASCII cell `column`.
    pub fn ascii_cell_x(&self, column: u64) -> f64 {
        self.ascii_start_x + column as f64 * self.ascii_cell_width
    }

    /// Top of `row` in content coordinates (before subtracting scroll).
    pub fn row_top(&self, row: u64) -> f64 {
        self.vertical_padding + row as f64 * self.row_height
    }

    /// Row containing `offset`.
    pub fn row_of(&self, offset: u64) -> u64 {
        offset / self.bytes_per_row
    }

    /// Column of `offset` within its row.
    pub fn column_of(&self, offset: u64) -> u64 {
        offset % self.bytes_per_row
    }

    /// Whole rows that fit in the viewport, at least 1.
    pub fn page_rows(&self) -> u64 {
        ((self.viewport_height / self.row_height).floor() as u64).max(1)
    }

    /// Left edge of the scrollbar.
    pub fn scrollbar_x(&self) -> f64 {
        self.viewport_width - self.scrollbar_width
    }

    /// Clamp a scroll offset to `[0, max_scroll]`.
    pub fn clamp_scroll(&self, scroll: f64) -> f64 {
        if scroll.is_nan() {
            return 0.0;
        }
        scroll.clamp(0.0, self.max_scroll)
    }
}

/// Compute the grid geometry for `inputs`.
///
/// Returns `None` when the viewport or font has no usable size; callers treat
/// that as an empty grid, not an error.
///
/// Bytes per row is the override when given, otherwise the largest multiple
/// of 8 that fits the width. When fewer than 8 bytes fit, as many as fit
/// (at least 1).
pub fn compute_layout(inputs: &LayoutInputs) -> Option<LayoutMetrics> {
    let font = inputs.font;
    let usable = |v: f64| v.is_finite() && v > 0.0;
    if !usable(inputs.viewport_width)
        || !usable(inputs.viewport_height)
        || !usable(font.char_width)
        || !usable(font.line_height)
    {
        return None;
    }

    let style = inputs.style;
    let address_digits = style.address_digits.max(hex_digits(inputs.source_size));
    let address_column_width = (address_digits as f64 + style.address_gap_chars) * font.char_width;
    let cell_width = 3.0 * font.char_width;
    let ascii_cell_width = font.char_width;
    let border_width = style.border_chars * font.char_width;
    let scrollbar_width = style.scrollbar_chars * font.char_width;

    let bytes_per_row = match inputs.bytes_per_row_override {
        Some(fixed) => u64::from(fixed.max(1)),
        None => {
            let mut available = inputs.viewport_width - address_column_width - scrollbar_width;
            let mut per_byte = cell_width;
            if inputs.show_ascii {
                available -= border_width;
                per_byte += ascii_cell_width;
            }
            let fit = if available > 0.0 {
                (available / per_byte).floor() as u64
            } else {
                0
            };
            if fit >= 8 {
                fit / 8 * 8
            } else {
                fit.max(1)
            }
        }
    };

    let hex_start_x = address_column_width;
    let ascii_start_x = hex_start_x + bytes_per_row as f64 * cell_width + border_width;
    let row_count = inputs.source_size.div_ceil(bytes_per_row);
    let row_height = font.line_height;
    let total_height = row_count as f64 * row_height + 2.0 * style.vertical_padding;
    let max_scroll = (total_height - inputs.viewport_height).max(0.0);

    Some(LayoutMetrics {
        viewport_width: inputs.viewport_width,
        viewport_height: inputs.viewport_height,
        bytes_per_row,
        row_height,
        char_width: font.char_width,
        cell_width,
        address_column_width,
        ascii_cell_width,
        vertical_padding: style.vertical_padding,
        border_width,
        scrollbar_width,
        address_digits,
        hex_start_x,
        ascii_start_x,
        show_ascii: inputs.show_ascii,
        source_size: inputs.source_size,
        row_count,
        total_height,
        max_scroll,
    })
}

/// Hex digits needed to print the largest offset of a `size`-byte source.
fn hex_digits(size: u64) -> u32 {
    let last = size.saturating_sub(1);
    (u64::BITS - last.leading_zeros()).div_ceil(4).max(1)
}

/// Memoized layout computation.
///
/// Setters return `true` when the metrics changed and dependents
/// (scroll bounds, required ranges) need refreshing.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    inputs: LayoutInputs,
    metrics: Option<LayoutMetrics>,
}

impl LayoutEngine {
    /// Create an engine for `inputs`.
    pub fn new(inputs: LayoutInputs) -> Self {
        Self {
            metrics: compute_layout(&inputs),
            inputs,
        }
    }

    /// Current inputs.
    pub fn inputs(&self) -> &LayoutInputs {
        &self.inputs
    }

    /// Current metrics, `None` while the viewport has no size.
    pub fn metrics(&self) -> Option<&LayoutMetrics> {
        self.metrics.as_ref()
    }

    /// Replace all inputs at once.
    pub fn set_inputs(&mut self, inputs: LayoutInputs) -> bool {
        if inputs == self.inputs {
            return false;
        }
        self.inputs = inputs;
        let metrics = compute_layout(&self.inputs);
        let changed = metrics != self.metrics;
        self.metrics = metrics;
        changed
    }

    /// Set the viewport size.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) -> bool {
        self.set_inputs(LayoutInputs {
            viewport_width: width,
            viewport_height: height,
            ..self.inputs
        })
    }

    /// Set the font metrics.
    pub fn set_font(&mut self, font: FontMetrics) -> bool {
        self.set_inputs(LayoutInputs { font, ..self.inputs })
    }

    /// Show or hide the ASCII column.
    pub fn set_show_ascii(&mut self, show_ascii: bool) -> bool {
        self.set_inputs(LayoutInputs {
            show_ascii,
            ..self.inputs
        })
    }

    /// Fix or release bytes per row.
    pub fn set_bytes_per_row_override(&mut self, bytes_per_row: Option<u32>) -> bool {
        self.set_inputs(LayoutInputs {
            bytes_per_row_override: bytes_per_row,
            ..self.inputs
        })
    }

    /// Set the source size.
    pub fn set_source_size(&mut self, source_size: u64) -> bool {
        self.set_inputs(LayoutInputs {
            source_size,
            ..self.inputs
        })
    }
}
