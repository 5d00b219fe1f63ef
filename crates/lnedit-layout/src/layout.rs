#![forbid(unsafe_code)]

//! Screen layout: packing prompt, buffer, and status message into rows.
//!
//! # Algorithm
//!
//! Each logical stream (the prompt followed by one logical buffer line, or
//! one line of the status message) is rendered into cells and packed
//! greedily. With `u = width - marker_width`:
//!
//! 1. While more than `u` cells remain, emit a row of `u` cells followed by
//!    the wrap marker.
//! 2. The remaining `<= u` cells form the final row of the stream, without a
//!    marker. A final row that ends exactly at the edge is not followed by an
//!    empty row, unless it ends a buffer line and more rows follow: the
//!    cursor after that line then gets an empty row of its own.
//!
//! With an empty marker `u == width`, rows are packed to the full width and
//! the continuation is left to the terminal's own auto-wrap.
//!
//! Every cell carries its origin, so the [`CursorMap`] is filled while the
//! rows are emitted, without a second pass.
//!
//! # Invariants
//!
//! 1. Every row is at most `width` columns wide.
//! 2. Dropping the wrap markers and concatenating the rows of a stream gives
//!    back the rendered stream exactly.
//! 3. For every buffer offset holding a printable character,
//!    `screen[row][col] == buffer[offset]` where `(col, row)` is its mapped
//!    position.

use std::fmt;

use lnedit_core::Position;

use crate::config::{ConfigError, LayoutConfig, StatusPlacement};
use crate::display;
use crate::screen::Screen;

/// Errors raised for inputs that break the layout contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The configuration failed validation.
    InvalidConfig(Vec<ConfigError>),
    /// A buffer offset past the end of the buffer.
    OffsetOutOfBounds {
        /// Requested offset.
        offset: usize,
        /// Buffer length (the largest valid offset).
        len: usize,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(errors) => {
                write!(f, "invalid layout configuration: ")?;
                for (i, error) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{error}")?;
                }
                Ok(())
            }
            Self::OffsetOutOfBounds { offset, len } => {
                write!(f, "buffer offset {offset} is outside 0..={len}")
            }
        }
    }
}

impl std::error::Error for LayoutError {}

impl From<Vec<ConfigError>> for LayoutError {
    fn from(errors: Vec<ConfigError>) -> Self {
        Self::InvalidConfig(errors)
    }
}

/// Buffer offset to screen position, consistent with one [`Screen`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorMap {
    /// Position of every offset in `0..=buffer.len()`.
    positions: Vec<Position>,
    /// Offset the layout was computed for.
    cursor_offset: usize,
}

impl CursorMap {
    /// Screen position of buffer offset `offset`.
    ///
    /// Offsets of buffer characters map to the first cell of their rendering.
    /// The offset of a line break, and `buffer.len()`, map to the column just
    /// after the last character of their logical line, or to column 0 of the
    /// next row when that column would equal the width.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::OffsetOutOfBounds`] for offsets past the end of
    /// the buffer.
    pub fn offset_to_position(&self, offset: usize) -> Result<Position, LayoutError> {
        self.positions
            .get(offset)
            .copied()
            .ok_or(LayoutError::OffsetOutOfBounds {
                offset,
                len: self.buffer_len(),
            })
    }

    /// Screen position of the cursor offset passed to [`compute_screen`].
    #[must_use]
    pub fn cursor(&self) -> Position {
        self.positions[self.cursor_offset]
    }

    /// The cursor offset passed to [`compute_screen`].
    #[must_use]
    pub fn cursor_offset(&self) -> usize {
        self.cursor_offset
    }

    /// Length of the buffer this map was computed for.
    #[must_use]
    pub fn buffer_len(&self) -> usize {
        self.positions.len() - 1
    }
}

/// Where a rendered cell came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Prompt,
    /// First cell of the buffer character at this offset.
    Buffer(usize),
    /// Second and later cells of an escaped buffer character.
    Escape,
    Message,
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    ch: char,
    origin: Origin,
}

/// Row builder shared by every stream of one layout.
struct Packer<'a> {
    width: usize,
    usable: usize,
    marker: &'a str,
    lines: Vec<String>,
    positions: Vec<Position>,
}

impl<'a> Packer<'a> {
    fn new(config: &'a LayoutConfig, buffer_len: usize) -> Self {
        Self {
            width: config.width,
            usable: config.usable_width(),
            marker: &config.wrap_marker,
            lines: Vec::new(),
            positions: vec![Position::ORIGIN; buffer_len + 1],
        }
    }

    /// Pack one stream and return the position just after its last cell.
    fn pack(&mut self, cells: &[Cell]) -> Position {
        let mut rest = cells;
        while rest.len() > self.usable {
            let (row, tail) = rest.split_at(self.usable);
            self.emit(row, true);
            rest = tail;
        }
        self.emit(rest, false);

        let row = self.lines.len() - 1;
        if rest.len() == self.width {
            Position::new(0, row + 1)
        } else {
            Position::new(rest.len(), row)
        }
    }

    /// Add an empty row for `end` when it points past the last row.
    fn open_row(&mut self, end: Position) {
        if end.row == self.lines.len() {
            self.lines.push(String::new());
        }
    }

    fn emit(&mut self, cells: &[Cell], broken: bool) {
        let row = self.lines.len();
        let mut line = String::with_capacity(cells.len() + self.marker.len());
        for (col, cell) in cells.iter().enumerate() {
            if let Origin::Buffer(offset) = cell.origin {
                self.positions[offset] = Position::new(col, row);
            }
            line.push(cell.ch);
        }
        if broken {
            line.push_str(self.marker);
        }
        self.lines.push(line);
    }

    /// Lay out the status message, one stream per message line.
    fn pack_message(&mut self, message: &str) {
        if message.is_empty() {
            return;
        }
        for part in message.split('\n') {
            let mut cells = Vec::with_capacity(part.len());
            push_rendered(&mut cells, part, Origin::Message);
            self.pack(&cells);
        }
    }
}

/// Append the rendering of `text` to `cells`, tagging every cell with `origin`.
fn push_rendered(cells: &mut Vec<Cell>, text: &str, origin: Origin) {
    for ch in text.chars() {
        display::render_char(ch, |cell| cells.push(Cell { ch: cell, origin }));
    }
}

/// Prompt for logical line `lineno` of a buffer with `line_count` lines.
fn prompt_for<'a>(
    config: &'a LayoutConfig,
    prompt: &'a str,
    lineno: usize,
    line_count: usize,
) -> &'a str {
    match &config.continuation_prompts {
        Some(prompts) if line_count > 1 => prompts.for_line(lineno, line_count),
        _ if lineno == 0 => prompt,
        _ => "",
    }
}

/// Compute the rows for `prompt` + `buffer` (+ status message) and the
/// mapping from buffer offsets to screen positions.
///
/// `buffer` may contain `'\n'`; each logical line starts a new row and gets
/// its own prompt (see [`LayoutConfig::continuation_prompts`]). A `'\n'`
/// inside a prompt ends the current row early.
///
/// # Errors
///
/// - [`LayoutError::InvalidConfig`] when `config` fails validation (zero
///   width, a wrap marker not narrower than the width).
/// - [`LayoutError::OffsetOutOfBounds`] when `cursor_offset > buffer.len()`.
pub fn compute_screen(
    prompt: &str,
    buffer: &[char],
    cursor_offset: usize,
    config: &LayoutConfig,
) -> Result<(Screen, CursorMap), LayoutError> {
    config.validate()?;
    if cursor_offset > buffer.len() {
        return Err(LayoutError::OffsetOutOfBounds {
            offset: cursor_offset,
            len: buffer.len(),
        });
    }

    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!(
        "compute_screen",
        width = config.width,
        buffer_len = buffer.len(),
        cursor_offset
    );
    #[cfg(feature = "tracing")]
    let _guard = _span.enter();

    let message = config.status_message.as_deref().unwrap_or("");
    let mut packer = Packer::new(config, buffer.len());

    if config.status_placement == StatusPlacement::Top {
        packer.pack_message(message);
    }

    let message_below = config.status_placement == StatusPlacement::Bottom && !message.is_empty();
    let line_count = buffer.iter().filter(|&&ch| ch == '\n').count() + 1;
    let mut start = 0;
    let mut cells = Vec::with_capacity(prompt.len() + buffer.len());
    for (lineno, line) in buffer.split(|&ch| ch == '\n').enumerate() {
        cells.clear();
        let mut prompt_rows = prompt_for(config, prompt, lineno, line_count).split('\n');
        if let Some(first) = prompt_rows.next() {
            push_rendered(&mut cells, first, Origin::Prompt);
        }
        for row in prompt_rows {
            packer.pack(&cells);
            cells.clear();
            push_rendered(&mut cells, row, Origin::Prompt);
        }

        for (i, &ch) in line.iter().enumerate() {
            let mut origin = Origin::Buffer(start + i);
            display::render_char(ch, |cell| {
                cells.push(Cell { ch: cell, origin });
                origin = Origin::Escape;
            });
        }

        let end = packer.pack(&cells);
        if lineno + 1 < line_count || message_below {
            packer.open_row(end);
        }
        packer.positions[start + line.len()] = end;
        start += line.len() + 1;
    }

    if config.status_placement == StatusPlacement::Bottom {
        packer.pack_message(message);
    }

    lnedit_core::trace!(rows = packer.lines.len(), "layout computed");

    let map = CursorMap {
        positions: packer.positions,
        cursor_offset,
    };
    Ok((Screen::new(packer.lines), map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContinuationPrompts;

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    fn layout(prompt: &str, buffer: &str, config: &LayoutConfig) -> (Screen, CursorMap) {
        let buffer = chars(buffer);
        compute_screen(prompt, &buffer, buffer.len(), config).unwrap()
    }

    /// Every printable buffer character is found where the map says it is.
    fn assert_map_consistent(buffer: &str, screen: &Screen, map: &CursorMap) {
        for (offset, ch) in buffer.chars().enumerate() {
            if ch == '\n' || display::needs_escape(ch) {
                continue;
            }
            let pos = map.offset_to_position(offset).unwrap();
            assert_eq!(
                screen.char_at(pos.col, pos.row),
                Some(ch),
                "offset {offset} mapped to {pos}"
            );
        }
    }

    #[test]
    fn wraps_with_marker() {
        let config = LayoutConfig::new(10);
        let (screen, map) = layout("foo$", "01234567890123456789", &config);
        assert_eq!(screen.lines(), ["foo$01234\\", "567890123\\", "456789"]);
        assert_map_consistent("01234567890123456789", &screen, &map);
        assert_eq!(map.cursor(), Position::new(6, 2));
    }

    #[test]
    fn wraps_without_marker() {
        let config = LayoutConfig::new(10).with_wrap_marker("");
        let (screen, map) = layout("foo$", "01234567890123456789", &config);
        assert_eq!(screen.lines(), ["foo$012345", "6789012345", "6789"]);
        assert_map_consistent("01234567890123456789", &screen, &map);
    }

    #[test]
    fn long_prompt_wraps_before_buffer() {
        let config = LayoutConfig::new(10).with_wrap_marker("");
        let (screen, map) = layout("0123456789foo$", "01234567890123456789", &config);
        assert_eq!(
            screen.lines(),
            ["0123456789", "foo$012345", "6789012345", "6789"]
        );
        assert_map_consistent("01234567890123456789", &screen, &map);
        assert_eq!(map.offset_to_position(0).unwrap(), Position::new(4, 1));
    }

    #[test]
    fn status_message_at_bottom_and_top() {
        let buffer = "01234567890123456789";
        let config = LayoutConfig::new(10).with_status_message("status1status2status3status4");
        let (screen, map) = layout("foo$", buffer, &config);
        assert_eq!(
            screen.lines(),
            [
                "foo$01234\\",
                "567890123\\",
                "456789",
                "status1st\\",
                "atus2stat\\",
                "us3status\\",
                "4"
            ]
        );
        assert_map_consistent(buffer, &screen, &map);

        let config = config.with_status_placement(StatusPlacement::Top);
        let (screen, map) = layout("foo$", buffer, &config);
        assert_eq!(
            screen.lines(),
            [
                "status1st\\",
                "atus2stat\\",
                "us3status\\",
                "4",
                "foo$01234\\",
                "567890123\\",
                "456789"
            ]
        );
        assert_map_consistent(buffer, &screen, &map);
        assert_eq!(map.offset_to_position(0).unwrap(), Position::new(4, 4));
    }

    #[test]
    fn message_exactly_filling_last_row_adds_no_empty_row() {
        let buffer = "01234567890123456789";
        let config = LayoutConfig::new(10)
            .with_status_message("status1status2status3status")
            .with_status_placement(StatusPlacement::Top);
        let (screen, map) = layout("foo$", buffer, &config);
        assert_eq!(
            screen.lines(),
            [
                "status1st\\",
                "atus2stat\\",
                "us3status",
                "foo$01234\\",
                "567890123\\",
                "456789"
            ]
        );
        assert_map_consistent(buffer, &screen, &map);

        let config = config.with_status_placement(StatusPlacement::Bottom);
        let (screen, _) = layout("foo$", buffer, &config);
        assert_eq!(screen.len(), 6);
        assert_eq!(screen.line(5), Some("us3status"));
    }

    #[test]
    fn empty_buffer_is_prompt_only() {
        let (screen, map) = layout("foo$", "", &LayoutConfig::new(10));
        assert_eq!(screen.lines(), ["foo$"]);
        assert_eq!(map.cursor(), Position::new(4, 0));
        assert_eq!(map.buffer_len(), 0);
    }

    #[test]
    fn empty_prompt_and_buffer_is_one_empty_row() {
        let (screen, map) = layout("", "", &LayoutConfig::new(10));
        assert_eq!(screen.lines(), [""]);
        assert_eq!(map.cursor(), Position::ORIGIN);
    }

    #[test]
    fn empty_status_message_adds_nothing() {
        let config = LayoutConfig::new(10).with_status_message("");
        let (screen, _) = layout("$ ", "ab", &config);
        assert_eq!(screen.lines(), ["$ ab"]);
    }

    #[test]
    fn cursor_after_exactly_full_row_moves_to_next_row() {
        let config = LayoutConfig::new(10).with_wrap_marker("");
        let (screen, map) = layout("foo$", "012345", &config);
        assert_eq!(screen.lines(), ["foo$012345"]);
        assert_eq!(map.cursor(), Position::new(0, 1));
    }

    #[test]
    fn cursor_after_full_row_gets_own_row_above_message() {
        let config = LayoutConfig::new(10)
            .with_wrap_marker("")
            .with_status_message("msg");
        let (screen, map) = layout("foo$", "012345", &config);
        assert_eq!(screen.lines(), ["foo$012345", "", "msg"]);
        assert_eq!(map.cursor(), Position::new(0, 1));
        assert_eq!(screen.line(map.cursor().row), Some(""));

        let config = config.with_status_placement(StatusPlacement::Top);
        let (screen, map) = layout("foo$", "012345", &config);
        assert_eq!(screen.lines(), ["msg", "foo$012345"]);
        assert_eq!(map.cursor(), Position::new(0, 2));
    }

    #[test]
    fn full_buffer_line_is_followed_by_cursor_row() {
        let config = LayoutConfig::new(5).with_wrap_marker("");
        let (screen, map) = layout("", "abcde\nhi", &config);
        assert_eq!(screen.lines(), ["abcde", "", "hi"]);
        assert_eq!(map.offset_to_position(5).unwrap(), Position::new(0, 1));
        assert_eq!(map.offset_to_position(6).unwrap(), Position::new(0, 2));
        assert_eq!(map.cursor(), Position::new(2, 2));
        assert_map_consistent("abcde\nhi", &screen, &map);
    }

    #[test]
    fn cursor_after_marker_broken_stream_stays_on_row() {
        let config = LayoutConfig::new(10);
        let (screen, map) = layout("foo$", "0123456789012", &config);
        assert_eq!(screen.lines(), ["foo$01234\\", "56789012"]);
        assert_eq!(map.cursor(), Position::new(8, 1));
    }

    #[test]
    fn cursor_offset_is_translated_past_prompt() {
        let buffer = chars("01234567890123456789");
        let (_, map) = compute_screen("foo$", &buffer, 3, &LayoutConfig::new(10)).unwrap();
        assert_eq!(map.cursor_offset(), 3);
        assert_eq!(map.cursor(), Position::new(7, 0));
    }

    #[test]
    fn control_characters_are_escaped() {
        let (screen, map) = layout("$ ", "a\x01b\x7f", &LayoutConfig::new(20));
        assert_eq!(screen.lines(), ["$ a^Ab^?"]);
        assert_eq!(map.offset_to_position(1).unwrap(), Position::new(3, 0));
        assert_eq!(map.offset_to_position(2).unwrap(), Position::new(5, 0));
        assert_eq!(map.cursor(), Position::new(8, 0));
    }

    #[test]
    fn escapes_may_straddle_rows() {
        let config = LayoutConfig::new(4).with_wrap_marker("");
        let (screen, map) = layout("", "abc\x01d", &config);
        assert_eq!(screen.lines(), ["abc^", "Ad"]);
        assert_eq!(map.offset_to_position(3).unwrap(), Position::new(3, 0));
        assert_eq!(map.offset_to_position(4).unwrap(), Position::new(1, 1));
    }

    #[test]
    fn multi_line_buffer_without_continuation_prompts() {
        let config = LayoutConfig::new(10);
        let (screen, map) = layout("> ", "abc\ndef", &config);
        assert_eq!(screen.lines(), ["> abc", "def"]);
        assert_eq!(map.offset_to_position(3).unwrap(), Position::new(5, 0));
        assert_eq!(map.offset_to_position(4).unwrap(), Position::new(0, 1));
        assert_eq!(map.cursor(), Position::new(3, 1));
    }

    #[test]
    fn multi_line_buffer_with_continuation_prompts() {
        let config = LayoutConfig::new(20)
            .with_continuation_prompts(ContinuationPrompts::new("/>> ", "|.. ", "\\__ "));
        let buffer = "if x:\n  y\n  z";
        let (screen, map) = layout("->> ", buffer, &config);
        assert_eq!(screen.lines(), ["/>> if x:", "|..   y", "\\__   z"]);
        assert_map_consistent(buffer, &screen, &map);

        let (screen, _) = layout("->> ", "single", &config);
        assert_eq!(screen.lines(), ["->> single"]);
    }

    #[test]
    fn each_logical_line_wraps_independently() {
        let config = LayoutConfig::new(5).with_wrap_marker("");
        let (screen, map) = layout("", "abcdefg\nhi", &config);
        assert_eq!(screen.lines(), ["abcde", "fg", "hi"]);
        assert_eq!(map.offset_to_position(7).unwrap(), Position::new(2, 1));
    }

    #[test]
    fn multi_line_prompt_breaks_rows() {
        let config = LayoutConfig::new(10);
        let (screen, map) = layout("header\n$ ", "ab", &config);
        assert_eq!(screen.lines(), ["header", "$ ab"]);
        assert_eq!(map.offset_to_position(0).unwrap(), Position::new(2, 1));
    }

    #[test]
    fn multi_line_status_message() {
        let config = LayoutConfig::new(10)
            .with_wrap_marker("")
            .with_status_message("one\ntwo");
        let (screen, _) = layout("$ ", "x", &config);
        assert_eq!(screen.lines(), ["$ x", "one", "two"]);
    }

    #[test]
    fn wider_marker_reserves_more_columns() {
        let config = LayoutConfig::new(6).with_wrap_marker("->");
        let (screen, map) = layout("", "abcdefghij", &config);
        assert_eq!(screen.lines(), ["abcd->", "efgh->", "ij"]);
        assert_map_consistent("abcdefghij", &screen, &map);
    }

    #[test]
    fn cursor_out_of_bounds_is_rejected() {
        let buffer = chars("abc");
        let err = compute_screen("$ ", &buffer, 4, &LayoutConfig::new(10)).unwrap_err();
        assert_eq!(err, LayoutError::OffsetOutOfBounds { offset: 4, len: 3 });
        assert_eq!(err.to_string(), "buffer offset 4 is outside 0..=3");
    }

    #[test]
    fn offset_lookup_past_end_is_rejected() {
        let (_, map) = layout("$ ", "abc", &LayoutConfig::new(10));
        assert!(map.offset_to_position(3).is_ok());
        assert!(matches!(
            map.offset_to_position(4),
            Err(LayoutError::OffsetOutOfBounds { offset: 4, len: 3 })
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let buffer = chars("abc");
        let err = compute_screen("$ ", &buffer, 0, &LayoutConfig::new(0)).unwrap_err();
        let LayoutError::InvalidConfig(errors) = &err else {
            panic!("expected invalid config, got {err:?}");
        };
        assert_eq!(errors[0].field, "width");
        assert!(err.to_string().starts_with("invalid layout configuration: width=0"));

        let err = compute_screen("$ ", &buffer, 0, &LayoutConfig::new(1)).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidConfig(_)));
    }

    #[test]
    fn width_one_without_marker_packs_single_columns() {
        let config = LayoutConfig::new(1).with_wrap_marker("");
        let (screen, map) = layout("$", "ab", &config);
        assert_eq!(screen.lines(), ["$", "a", "b"]);
        assert_eq!(map.cursor(), Position::new(0, 3));
    }
}
