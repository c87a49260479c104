//! The `Session` data model: buffer, cursor, and the screen-row index that
//! maps wrapped lines back to buffer offsets.
//!
//! `Session` owns only data and the primitive mutations (insert/delete at a
//! byte range, cursor placement, row bookkeeping). The higher-level motions
//! (word-left, kill-to-end, and so on) live in `core-actions`, which composes
//! these primitives with `core-text::unicode_props` boundary walking. Keeping
//! the split this way means `Session` never needs to know *why* an edit
//! happened, only what changed.
//!
//! Non-goals carried over unchanged from the edit engine this crate backs:
//! no undo stack, no history, no completion, no wide/RTL character widths
//! (every codepoint counts as one column).

use core_events::TermInfo;

/// Whether the buffer line-wraps across multiple screen rows or stays on a
/// single horizontally-scrolling line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameMode {
    SingleLine,
    Multiline,
}

/// All mutable state for one line-editing session.
#[derive(Debug, Clone)]
pub struct Session {
    /// The line being edited, as UTF-8 text.
    pub buffer: String,
    /// Codepoint count of `buffer` (cached so callers don't recount it).
    pub nchars: usize,
    /// Byte offset of the cursor within `buffer`. Always a codepoint
    /// boundary.
    pub offset: usize,

    /// Byte offset of the start of each screen row, in row order.
    /// `line_offset[0]` is always `0`. Populated by [`Session::recompute`].
    pub line_offset: Vec<usize>,
    /// Cursor's current screen column within its row (codepoints, not
    /// bytes; the prompt's visible length is folded in on row 0).
    pub pos_x: u16,
    /// Cursor's current screen row, relative to the first row of the frame.
    pub pos_y: u16,
    /// Sticky column requested by the last vertical motion (Up/Down), used
    /// so that visiting a shorter row and returning to a longer one
    /// restores the original column instead of snapping to its end.
    pub requested_pos_x: Option<u16>,

    /// Terminal cursor column where the prompt was first drawn, from the
    /// initial DSR query.
    pub initial_col: u16,
    /// Terminal cursor row where the prompt was first drawn.
    pub initial_row: u16,
    pub term_cols: u16,
    pub term_rows: u16,

    /// Visible length of the prompt (CSI escapes excluded).
    pub prompt_len: usize,
    /// High-water mark of `line_offset.len()` reached so far this session;
    /// never shrinks and never truncates `line_offset` itself. Used for
    /// frame placement so the frame doesn't jump around as rows come and go.
    pub max_lines: usize,
    /// Extra screen rows reserved below the edit for the frame decoration:
    /// `0` or `1`, fixed for the life of the session.
    pub cur_frame_lines: usize,

    pub frame_mode: FrameMode,
    /// `true` = insert (default), `false` = overwrite.
    pub insert: bool,
}

impl Session {
    pub fn new(term: TermInfo, prompt_len: usize, frame_mode: FrameMode, max_lines: usize) -> Self {
        let mut session = Self {
            buffer: String::new(),
            nchars: 0,
            offset: 0,
            line_offset: vec![0],
            pos_x: 0,
            pos_y: 0,
            requested_pos_x: None,
            initial_col: 0,
            initial_row: 0,
            term_cols: term.cols,
            term_rows: term.rows,
            prompt_len,
            max_lines: max_lines.max(1),
            cur_frame_lines: 1,
            frame_mode,
            insert: true,
        };
        session.recompute(0);
        session
    }

    /// Record where the terminal's real cursor sat when the prompt was
    /// drawn, as reported by a DSR (`ESC[6n`) query.
    pub fn set_initial_cursor(&mut self, col: u16, row: u16) {
        self.initial_col = col;
        self.initial_row = row;
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn toggle_overwrite(&mut self) {
        self.insert = !self.insert;
    }

    /// Insert `s` at the current cursor offset and advance the cursor past
    /// it.
    pub fn insert_at_cursor(&mut self, s: &str) {
        self.buffer.insert_str(self.offset, s);
        let from_row = self.row_of_offset(self.offset);
        self.offset += s.len();
        self.nchars += s.chars().count();
        self.recompute(from_row);
        self.requested_pos_x = None;
    }

    /// Overwrite the single codepoint starting at the cursor with `c`
    /// (insert if the cursor sits at end-of-buffer). Used in overwrite mode.
    pub fn overwrite_at_cursor(&mut self, c: char) {
        if self.offset >= self.buffer.len() {
            self.insert_at_cursor(c.encode_utf8(&mut [0u8; 4]));
            return;
        }
        let next = core_text::unicode_props::next_boundary(&self.buffer, self.offset);
        let from_row = self.row_of_offset(self.offset);
        self.buffer.replace_range(self.offset..next, "");
        let mut encode_buf = [0u8; 4];
        let encoded = c.encode_utf8(&mut encode_buf);
        self.buffer.insert_str(self.offset, encoded);
        self.offset += encoded.len();
        self.recompute(from_row);
        self.requested_pos_x = None;
    }

    /// Delete the byte range `[start, end)`, which must lie on codepoint
    /// boundaries. The cursor is left at `start`.
    pub fn delete_range(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let removed_chars = self.buffer[start..end].chars().count();
        let from_row = self.row_of_offset(start);
        self.buffer.replace_range(start..end, "");
        self.nchars -= removed_chars;
        self.offset = start;
        self.recompute(from_row);
        self.requested_pos_x = None;
    }

    /// Move the cursor to `offset` without touching `buffer`; only cursor
    /// bookkeeping is recomputed.
    pub fn move_cursor_to(&mut self, offset: usize) {
        self.offset = offset.min(self.buffer.len());
        self.recompute_cursor_position();
    }

    /// Screen row (index into [`Session::line_offset`]) containing byte
    /// offset `at`.
    pub fn row_of_offset(&self, at: usize) -> usize {
        let mut row = 0;
        for (i, &start) in self.line_offset.iter().enumerate() {
            if start <= at {
                row = i;
            } else {
                break;
            }
        }
        row
    }

    fn row_width(&self, row: usize) -> usize {
        if row == 0 {
            (self.term_cols as usize).saturating_sub(self.prompt_len).max(1)
        } else {
            (self.term_cols as usize).max(1)
        }
    }

    /// Rebuild `line_offset` for the current `frame_mode`, then refresh the
    /// cursor position. `from_row` is only meaningful in [`FrameMode::Multiline`]:
    /// rows before it are assumed unaffected by whatever edit triggered the
    /// recompute and are left untouched.
    pub fn recompute(&mut self, from_row: usize) {
        match self.frame_mode {
            FrameMode::Multiline => self.recompute_wrapped(from_row),
            FrameMode::SingleLine => self.recompute_scrolled(),
        }
        self.max_lines = self.max_lines.max(self.line_offset.len());
        self.recompute_cursor_position();
    }

    /// Wrap `buffer` into screen rows at the terminal width (minus the
    /// prompt on row 0), extending `line_offset` from `from_row` onward.
    fn recompute_wrapped(&mut self, from_row: usize) {
        let keep = from_row.min(self.line_offset.len()).max(1);
        self.line_offset.truncate(keep);

        let mut row = self.line_offset.len() - 1;
        let mut byte_idx = self.line_offset[row];
        loop {
            let width = self.row_width(row);
            let mut consumed = 0usize;
            let mut cursor = byte_idx;
            while consumed < width && cursor < self.buffer.len() {
                cursor += core_text::utf8_step(self.buffer.as_bytes()[cursor]);
                consumed += 1;
            }
            if cursor >= self.buffer.len() {
                break;
            }
            row += 1;
            byte_idx = cursor;
            self.line_offset.push(byte_idx);
        }
    }

    /// Slide the single visible row's window so the cursor stays on screen.
    /// `line_offset` always has exactly one entry in [`FrameMode::SingleLine`]:
    /// the byte offset of the first codepoint currently shown, which is `0`
    /// until the cursor first crosses the scroll threshold.
    fn recompute_scrolled(&mut self) {
        self.line_offset.truncate(1);
        let mut window_start = self.line_offset[0].min(self.buffer.len());

        if window_start > self.offset {
            // The cursor moved left of the visible window (e.g. Home, a
            // left motion): snap the window back to meet it.
            window_start = self.offset;
        }

        let avail = (self.term_cols as usize).saturating_sub(self.prompt_len).max(1);
        let threshold = avail * 9 / 10;
        let shift = (avail / 10).max(1);
        loop {
            let cursor_col = self.buffer[window_start..self.offset].chars().count();
            if cursor_col <= threshold || window_start >= self.offset {
                break;
            }
            let (shifted, _) = core_text::offset_after_n_chars(&self.buffer, window_start, shift);
            window_start = shifted.min(self.offset);
        }

        self.line_offset[0] = window_start;
    }

    fn recompute_cursor_position(&mut self) {
        let row = self.row_of_offset(self.offset);
        let row_start = self.line_offset[row];
        let col_chars = self.buffer[row_start..self.offset].chars().count();
        let base = if row == 0 { self.prompt_len } else { 0 };
        let mut x = base + col_chars;

        if matches!(self.frame_mode, FrameMode::Multiline) && x >= self.term_cols as usize {
            // The row is exactly full but the terminal hasn't actually
            // wrapped yet (it defers wrapping until the next byte is
            // written); hang the cursor at the last column instead of
            // reporting it one past the edge.
            x = (self.term_cols as usize).saturating_sub(1);
        }

        self.pos_y = row as u16;
        self.pos_x = x as u16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn term(cols: u16, rows: u16) -> TermInfo {
        TermInfo::new(cols, rows)
    }

    #[test]
    fn new_session_starts_empty_at_origin() {
        let s = Session::new(term(80, 24), 2, FrameMode::Multiline, 10);
        assert!(s.is_empty());
        assert_eq!(s.offset, 0);
        assert_eq!(s.pos_x, 2);
        assert_eq!(s.pos_y, 0);
    }

    #[test]
    fn insert_advances_cursor_and_char_count() {
        let mut s = Session::new(term(80, 24), 2, FrameMode::Multiline, 10);
        s.insert_at_cursor("café");
        assert_eq!(s.buffer, "café");
        assert_eq!(s.nchars, 4);
        assert_eq!(s.offset, "café".len());
        assert_eq!(s.pos_x, 2 + 4);
    }

    #[test]
    fn delete_range_shrinks_buffer_and_moves_cursor() {
        let mut s = Session::new(term(80, 24), 0, FrameMode::Multiline, 10);
        s.insert_at_cursor("hello");
        s.delete_range(1, 3);
        assert_eq!(s.buffer, "hlo");
        assert_eq!(s.offset, 1);
    }

    #[test]
    fn multiline_wraps_at_terminal_width_minus_prompt() {
        // cols=10, prompt_len=2 -> first row holds 8 chars before wrapping.
        let mut s = Session::new(term(10, 24), 2, FrameMode::Multiline, 10);
        s.insert_at_cursor(&"x".repeat(9));
        assert_eq!(s.line_offset.len(), 2);
        assert_eq!(s.line_offset[1], 8);
        assert_eq!(s.pos_y, 1);
    }

    #[test]
    fn single_line_mode_never_wraps() {
        let mut s = Session::new(term(10, 24), 2, FrameMode::SingleLine, 10);
        s.insert_at_cursor(&"x".repeat(50));
        assert_eq!(s.line_offset.len(), 1);
    }

    #[test]
    fn single_line_mode_scrolls_window_once_past_threshold() {
        let mut s = Session::new(term(10, 24), 0, FrameMode::SingleLine, 10);
        for _ in 0..9 {
            s.insert_at_cursor("x");
        }
        assert_eq!(s.line_offset[0], 0, "buffer not yet past the scroll threshold");
        s.insert_at_cursor("x");
        assert!(s.line_offset[0] > 0, "window should have shifted forward");
        assert_eq!(s.pos_x, s.term_cols - 1);
    }

    #[test]
    fn max_lines_tracks_a_high_water_mark_without_truncating() {
        let mut s = Session::new(term(10, 24), 0, FrameMode::Multiline, 2);
        s.insert_at_cursor(&"x".repeat(35));
        assert_eq!(s.line_offset.len(), 4);
        assert_eq!(s.max_lines, 4);
        assert_eq!(s.line_offset[0], 0, "row index must never be truncated");
        assert_eq!(s.cur_frame_lines, 1);
    }

    #[test]
    fn last_column_hangs_cursor_instead_of_reporting_it_off_screen() {
        let mut s = Session::new(term(20, 24), 2, FrameMode::Multiline, 10);
        s.insert_at_cursor(&"a".repeat(18));
        assert_eq!(s.line_offset, vec![0]);
        assert_eq!(s.pos_x, 19);
        assert_eq!(s.pos_y, 0);
        s.insert_at_cursor("s");
        assert_eq!(s.line_offset, vec![0, 18]);
        assert_eq!(s.pos_x, 1);
        assert_eq!(s.pos_y, 1);
    }

    #[test]
    fn overwrite_mode_replaces_char_in_place() {
        let mut s = Session::new(term(80, 24), 0, FrameMode::Multiline, 10);
        s.insert_at_cursor("abc");
        s.move_cursor_to(0);
        s.overwrite_at_cursor('z');
        assert_eq!(s.buffer, "zbc");
        assert_eq!(s.nchars, 3);
    }
}
