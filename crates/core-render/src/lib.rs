//! Frame assembly: turns a [`core_state::Session`] into one batch of escape
//! sequences ready for a single `write(2)`.
//!
//! There is no line-level diff cache here (see this crate's removed
//! `partial_cache`/`partial_diff` ancestors) — every redraw rebuilds the
//! whole visible frame from `Session::line_offset`. For a single-line
//! editing surface capped at a handful of wrapped rows this is cheap enough
//! that the diffing machinery those ancestors built would be solving a
//! problem this crate doesn't have; what carries over is the *emission*
//! discipline: queue everything, flush once.

pub mod writer;

pub use writer::Writer;

use core_color::{adjust, Rgb};
use core_state::{FrameMode, Session};

/// How the frame's background is distinguished from the rest of the
/// terminal: a colored line under the text, or a colored rectangle behind
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStyle {
    Line,
    Background,
}

/// Foreground/background pair the frame is drawn with. [`FrameColors::highlight_fg`]
/// and [`FrameColors::empty_message_fg`] derive accent colors from these via
/// [`core_color::adjust`] rather than requiring the caller to pick them by hand.
#[derive(Debug, Clone, Copy)]
pub struct FrameColors {
    pub fg: Rgb,
    pub bg: Rgb,
}

impl FrameColors {
    pub fn new(fg: Rgb, bg: Rgb) -> Self {
        Self { fg, bg }
    }

    /// Color for the `«` scroll indicator: a stronger shift than the dim
    /// hint text so it stays legible against the frame background.
    pub fn highlight_fg(&self) -> Rgb {
        adjust(self.fg, self.bg, 32)
    }

    /// Color for the empty-buffer hint text: dimmed toward the background's
    /// luminance so it reads as a placeholder, not real input.
    pub fn empty_message_fg(&self) -> Rgb {
        adjust(self.fg, self.bg, 48)
    }
}

const SCROLL_INDICATOR: &str = "\u{ab}"; // «

/// Build the full escape-sequence frame for the current session state.
///
/// `prompt` is the literal prompt string (may itself carry SGR escapes);
/// `empty_message` is the dim hint shown only while `session.buffer` is
/// empty, and is never part of the returned input line.
pub fn draw_frame(
    session: &Session,
    prompt: &str,
    empty_message: Option<&str>,
    style: FrameStyle,
    colors: FrameColors,
) -> Vec<u8> {
    let mut w = Writer::new();
    let scrolled_off = session.line_offset.first().copied().unwrap_or(0) > 0;
    let single_line = matches!(session.frame_mode, FrameMode::SingleLine);

    for (row_idx, &row_start) in session.line_offset.iter().enumerate() {
        w.move_to(0, session.initial_row + row_idx as u16);
        w.clear_to_eol();

        if matches!(style, FrameStyle::Background) {
            w.set_bg(colors.bg);
            w.set_fg(colors.fg);
        }

        if row_idx == 0 {
            if scrolled_off {
                w.set_fg(colors.highlight_fg());
                w.print(SCROLL_INDICATOR);
                if matches!(style, FrameStyle::Background) {
                    w.set_fg(colors.fg);
                }
            }
            w.print(prompt);
        }

        let text = if single_line {
            // The single editable row never holds more than `term_cols`
            // minus the prompt (minus one more column for the scroll
            // indicator once scrolled) worth of codepoints at a time.
            let avail = (session.term_cols as usize)
                .saturating_sub(if row_idx == 0 { session.prompt_len } else { 0 })
                .saturating_sub(if scrolled_off { 1 } else { 0 });
            let (end, _) = core_text::offset_after_n_chars(&session.buffer, row_start, avail);
            &session.buffer[row_start..end]
        } else {
            let row_end = session
                .line_offset
                .get(row_idx + 1)
                .copied()
                .unwrap_or(session.buffer.len());
            &session.buffer[row_start..row_end]
        };
        w.print(text);

        if row_idx == 0 && session.is_empty() {
            if let Some(msg) = empty_message {
                w.set_fg(colors.empty_message_fg());
                w.print(msg);
                w.set_fg(colors.fg);
            }
        }

        if matches!(style, FrameStyle::Background) {
            w.reset_style();
        }
    }

    if session.cur_frame_lines > 0 {
        let frame_row = session.initial_row + session.line_offset.len() as u16;
        w.move_to(0, frame_row);
        w.clear_to_eol();
        match style {
            FrameStyle::Line => {
                w.set_fg(colors.fg);
                w.print(&"\u{2500}".repeat(session.term_cols as usize));
                w.reset_style();
            }
            FrameStyle::Background => {
                w.set_fg(colors.bg);
                w.print(&"\u{2584}".repeat(session.term_cols as usize));
                w.reset_style();
            }
        }
    }

    w.move_to(session.pos_x, session.initial_row + session.pos_y);
    w.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::TermInfo;
    use pretty_assertions::assert_eq;

    fn colors() -> FrameColors {
        FrameColors::new(Rgb::new(220, 220, 220), Rgb::new(20, 20, 20))
    }

    #[test]
    fn frame_prints_prompt_then_buffer_and_positions_cursor() {
        let mut s = Session::new(TermInfo::new(80, 24), 2, FrameMode::Multiline, 10);
        s.insert_at_cursor("hi");
        let bytes = draw_frame(&s, "> ", None, FrameStyle::Line, colors());
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("> "));
        assert!(text.contains("hi"));
        assert!(text.ends_with("\x1b[1;5H"));
    }

    #[test]
    fn empty_buffer_shows_dim_hint_message() {
        let s = Session::new(TermInfo::new(80, 24), 2, FrameMode::Multiline, 10);
        let bytes = draw_frame(&s, "> ", Some("type here"), FrameStyle::Line, colors());
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("type here"));
    }

    #[test]
    fn scrolled_single_line_emits_scroll_indicator_and_clips_text() {
        let mut s = Session::new(TermInfo::new(10, 24), 0, FrameMode::SingleLine, 10);
        s.insert_at_cursor(&"x".repeat(20));
        assert!(s.line_offset[0] > 0, "fixture should have scrolled");
        let bytes = draw_frame(&s, "", None, FrameStyle::Line, colors());
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains(SCROLL_INDICATOR));
        // one row of at most term_cols columns: the indicator plus 9 chars.
        assert!(text.contains(&format!("{SCROLL_INDICATOR}{}", "x".repeat(9))));
    }

    #[test]
    fn background_style_wraps_rows_in_sgr_and_resets() {
        let s = Session::new(TermInfo::new(80, 24), 2, FrameMode::Multiline, 10);
        let bytes = draw_frame(&s, "> ", None, FrameStyle::Background, colors());
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\x1b[48;2;"));
        assert!(text.contains("\x1b[0m"));
    }

    #[test]
    fn line_style_draws_a_rule_row_below_the_edit() {
        let s = Session::new(TermInfo::new(10, 24), 2, FrameMode::Multiline, 10);
        let bytes = draw_frame(&s, "> ", None, FrameStyle::Line, colors());
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains(&"\u{2500}".repeat(10)));
    }

    #[test]
    fn background_style_draws_a_half_block_rule_row() {
        let s = Session::new(TermInfo::new(10, 24), 2, FrameMode::Multiline, 10);
        let bytes = draw_frame(&s, "> ", None, FrameStyle::Background, colors());
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains(&"\u{2584}".repeat(10)));
    }
}
