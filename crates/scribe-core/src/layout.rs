//! Soft wrap layout.
//!
//! Derives visual lines from hard lines under a wrap width measured in
//! character cells (UAX #11 widths, tab-stop expansion). The wrap is greedy:
//! break at the last whitespace boundary that fits, fall back to a forced
//! mid-word break when a single unbroken run is wider than the viewport.
//!
//! Each view owns its own [`WrapLayout`] so the same document can be displayed
//! at different widths simultaneously.

use unicode_width::UnicodeWidthChar;

/// Default tab width (in cells) used when a caller does not specify one.
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Visual width of a character per UAX #11.
///
/// Control and unassigned characters fall back to 1 cell.
pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(1)
}

/// Visual width of `ch` when it starts at `cell_offset` within the line.
///
/// `'\t'` advances to the next tab stop; everything else follows
/// [`char_width`].
pub fn cell_width_at(ch: char, cell_offset: usize, tab_width: usize) -> usize {
    if ch == '\t' {
        let tab_width = tab_width.max(1);
        tab_width - (cell_offset % tab_width)
    } else {
        char_width(ch)
    }
}

/// Total cell width of a string, expanding tabs with `tab_width`.
pub fn str_width(s: &str, tab_width: usize) -> usize {
    let mut x = 0usize;
    for ch in s.chars() {
        x = x.saturating_add(cell_width_at(ch, x, tab_width));
    }
    x
}

/// A soft break inside one hard line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapPoint {
    /// Character index (within the line) where the next row starts.
    pub char_index: usize,
    /// Byte offset (within the line) where the next row starts.
    pub byte_offset: usize,
}

/// Wrap result for a single hard line.
#[derive(Debug, Clone)]
pub struct LineWrap {
    /// Soft breaks, strictly increasing. The line occupies
    /// `breaks.len() + 1` visual rows.
    pub breaks: Vec<WrapPoint>,
}

impl LineWrap {
    fn unwrapped() -> Self {
        Self { breaks: Vec::new() }
    }

    /// Wrap `text` (one hard line, no newline) at `wrap_width` cells.
    ///
    /// `None` or zero width disables wrapping.
    pub fn compute(text: &str, wrap_width: Option<usize>, tab_width: usize) -> Self {
        let Some(width) = wrap_width.filter(|w| *w > 0) else {
            return Self::unwrapped();
        };

        let mut breaks = Vec::new();
        let mut row_start_char = 0usize;
        let mut row_start_x = 0usize;
        // Candidate break after the most recent whitespace:
        // (char_index, byte_offset, x_in_line).
        let mut last_break: Option<(usize, usize, usize)> = None;
        let mut x_in_line = 0usize;

        for (char_index, (byte_offset, ch)) in text.char_indices().enumerate() {
            let ch_width = cell_width_at(ch, x_in_line, tab_width);

            loop {
                let x_in_row = x_in_line.saturating_sub(row_start_x);
                if x_in_row.saturating_add(ch_width) <= width {
                    break;
                }

                if let Some((break_char, break_byte, break_x)) = last_break
                    && break_char > row_start_char
                {
                    breaks.push(WrapPoint {
                        char_index: break_char,
                        byte_offset: break_byte,
                    });
                    row_start_char = break_char;
                    row_start_x = break_x;
                    last_break = None;
                    continue;
                }

                // No usable whitespace in this row: force a break here unless
                // the row is still empty (a single unit wider than the
                // viewport keeps its own row).
                if char_index > row_start_char {
                    breaks.push(WrapPoint {
                        char_index,
                        byte_offset,
                    });
                    row_start_char = char_index;
                    row_start_x = x_in_line;
                    last_break = None;
                }
                break;
            }

            x_in_line = x_in_line.saturating_add(ch_width);

            if ch.is_whitespace() {
                last_break = Some((char_index + 1, byte_offset + ch.len_utf8(), x_in_line));
            }
        }

        Self { breaks }
    }

    /// Number of visual rows this line occupies (always at least 1).
    pub fn row_count(&self) -> usize {
        self.breaks.len() + 1
    }
}

/// One visual row of a hard line, as a half-open char range within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualSpan {
    /// Hard (logical) line index.
    pub line: usize,
    /// First character of the span, relative to the line start.
    pub start: usize,
    /// One past the last character of the span, relative to the line start.
    pub end: usize,
    /// `true` for every row after the first (soft continuation).
    pub continuation: bool,
}

/// Wrap state for every hard line of a document, at one width.
pub struct WrapLayout {
    wrap_width: Option<usize>,
    tab_width: usize,
    /// Hard line texts without newlines, kept so width changes can re-wrap
    /// without consulting the document.
    line_texts: Vec<String>,
    line_wraps: Vec<LineWrap>,
}

impl WrapLayout {
    /// Create an empty layout at the given width.
    pub fn new(wrap_width: Option<usize>) -> Self {
        Self {
            wrap_width,
            tab_width: DEFAULT_TAB_WIDTH,
            line_texts: Vec::new(),
            line_wraps: Vec::new(),
        }
    }

    /// Replace all lines (document open or reload).
    pub fn reset<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.line_texts.clear();
        self.line_wraps.clear();
        for line in lines {
            let text = line.into();
            self.line_wraps
                .push(LineWrap::compute(&text, self.wrap_width, self.tab_width));
            self.line_texts.push(text);
        }
        if self.line_texts.is_empty() {
            self.line_texts.push(String::new());
            self.line_wraps.push(LineWrap::unwrapped());
        }
    }

    /// Current wrap width in cells, `None` when wrapping is off.
    pub fn wrap_width(&self) -> Option<usize> {
        self.wrap_width
    }

    /// Change the wrap width. Re-wraps every line if the width changed.
    pub fn set_wrap_width(&mut self, wrap_width: Option<usize>) {
        if self.wrap_width != wrap_width {
            self.wrap_width = wrap_width;
            self.rewrap_all();
        }
    }

    /// Tab width in cells.
    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// Change the tab width (minimum 1). Re-wraps every line if it changed.
    pub fn set_tab_width(&mut self, tab_width: usize) {
        let tab_width = tab_width.max(1);
        if self.tab_width != tab_width {
            self.tab_width = tab_width;
            self.rewrap_all();
        }
    }

    /// Patch the layout after an edit: replace `removed` hard lines starting
    /// at `first_line` with `new_lines`. Only the spliced lines are re-wrapped.
    pub fn splice<I, S>(&mut self, first_line: usize, removed: usize, new_lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let first_line = first_line.min(self.line_texts.len());
        let end = (first_line + removed).min(self.line_texts.len());

        let mut texts = Vec::new();
        let mut wraps = Vec::new();
        for line in new_lines {
            let text = line.into();
            wraps.push(LineWrap::compute(&text, self.wrap_width, self.tab_width));
            texts.push(text);
        }

        self.line_texts.splice(first_line..end, texts);
        self.line_wraps.splice(first_line..end, wraps);

        if self.line_texts.is_empty() {
            self.line_texts.push(String::new());
            self.line_wraps.push(LineWrap::unwrapped());
        }
    }

    /// Number of hard lines.
    pub fn line_count(&self) -> usize {
        self.line_texts.len()
    }

    /// Text of a hard line, if in range.
    pub fn line_text(&self, line: usize) -> Option<&str> {
        self.line_texts.get(line).map(String::as_str)
    }

    /// Total number of visual rows across all lines.
    pub fn visual_line_count(&self) -> usize {
        self.line_wraps.iter().map(LineWrap::row_count).sum()
    }

    /// First visual row of a hard line.
    pub fn logical_to_visual_row(&self, line: usize) -> usize {
        self.line_wraps
            .iter()
            .take(line)
            .map(LineWrap::row_count)
            .sum()
    }

    /// Resolve a visual row to `(hard_line, row_within_line)`.
    ///
    /// Rows past the end resolve to the last row of the last line.
    pub fn visual_to_logical(&self, visual_row: usize) -> (usize, usize) {
        let mut cumulative = 0usize;
        for (line, wrap) in self.line_wraps.iter().enumerate() {
            if cumulative + wrap.row_count() > visual_row {
                return (line, visual_row - cumulative);
            }
            cumulative += wrap.row_count();
        }
        let last = self.line_wraps.len().saturating_sub(1);
        let last_row = self
            .line_wraps
            .last()
            .map(|w| w.row_count().saturating_sub(1))
            .unwrap_or(0);
        (last, last_row)
    }

    /// All visual spans of one hard line, in order.
    pub fn spans_for_line(&self, line: usize) -> Vec<VisualSpan> {
        let Some(wrap) = self.line_wraps.get(line) else {
            return Vec::new();
        };
        let char_len = self.line_texts[line].chars().count();

        let mut spans = Vec::with_capacity(wrap.row_count());
        let mut start = 0usize;
        for brk in &wrap.breaks {
            spans.push(VisualSpan {
                line,
                start,
                end: brk.char_index,
                continuation: start > 0,
            });
            start = brk.char_index;
        }
        spans.push(VisualSpan {
            line,
            start,
            end: char_len,
            continuation: start > 0,
        });
        spans
    }

    /// The span occupying one global visual row, if in range.
    pub fn span_at_visual_row(&self, visual_row: usize) -> Option<VisualSpan> {
        if visual_row >= self.visual_line_count() {
            return None;
        }
        let (line, row) = self.visual_to_logical(visual_row);
        self.spans_for_line(line).into_iter().nth(row)
    }

    /// Spans for the window of visual rows `[first_row, first_row + count)`.
    /// Used by renderers to draw exactly the visible rows.
    pub fn visible_spans(&self, first_row: usize, count: usize) -> Vec<VisualSpan> {
        let total = self.visual_line_count();
        let first_row = first_row.min(total);
        let end = first_row.saturating_add(count).min(total);

        let mut spans = Vec::with_capacity(end - first_row);
        let (mut line, mut row) = self.visual_to_logical(first_row);
        let mut line_spans = self.spans_for_line(line);
        for _ in first_row..end {
            if row >= line_spans.len() {
                line += 1;
                row = 0;
                line_spans = self.spans_for_line(line);
            }
            spans.push(line_spans[row]);
            row += 1;
        }
        spans
    }

    /// The visual row containing `(line, column)` and the cell offset within
    /// that row. `None` if `line` is out of range.
    pub fn position_to_visual(&self, line: usize, column: usize) -> Option<(usize, usize)> {
        let wrap = self.line_wraps.get(line)?;
        let text = &self.line_texts[line];
        let column = column.min(text.chars().count());

        let mut row = 0usize;
        let mut row_start = 0usize;
        for brk in &wrap.breaks {
            if column >= brk.char_index {
                row += 1;
                row_start = brk.char_index;
            } else {
                break;
            }
        }

        let mut x_in_line = 0usize;
        let mut x_in_row = 0usize;
        for (i, ch) in text.chars().enumerate().take(column) {
            let w = cell_width_at(ch, x_in_line, self.tab_width);
            x_in_line = x_in_line.saturating_add(w);
            if i >= row_start {
                x_in_row = x_in_row.saturating_add(w);
            }
        }

        Some((self.logical_to_visual_row(line) + row, x_in_row))
    }

    fn rewrap_all(&mut self) {
        for (wrap, text) in self.line_wraps.iter_mut().zip(&self.line_texts) {
            *wrap = LineWrap::compute(text, self.wrap_width, self.tab_width);
        }
    }
}
