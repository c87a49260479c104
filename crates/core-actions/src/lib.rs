//! Executes a single [`core_keymap::EditAction`] against a [`Session`].
//!
//! One function per action family (motion, deletion, word-boundary scan)
//! rather than a single sprawling match arm body, so each can carry its own
//! focused doc comment; the public surface is still just [`execute`].

use core_keymap::EditAction;
use core_state::Session;
use core_text::unicode_props;

/// What happened as a result of executing one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The session continues; nothing terminal happened.
    Continue,
    /// Same as `Continue`, but the caller must force a full redraw even
    /// though no buffer state changed (Ctrl-L).
    Repaint,
    /// Enter was pressed: the session is done, yielding this line.
    Accept(String),
    /// Ctrl-C or Esc: the session is done, no line produced.
    Cancel,
    /// Ctrl-D pressed on an empty buffer: end-of-input.
    Eof,
}

pub fn execute(action: EditAction, session: &mut Session) -> ActionOutcome {
    match action {
        EditAction::InsertChar(c) => {
            insert_char(session, c);
            ActionOutcome::Continue
        }
        EditAction::MoveLeft => {
            move_left(session);
            ActionOutcome::Continue
        }
        EditAction::MoveRight => {
            move_right(session);
            ActionOutcome::Continue
        }
        EditAction::MoveWordLeft => {
            let target = word_left(&session.buffer, session.offset);
            session.requested_pos_x = None;
            session.move_cursor_to(target);
            ActionOutcome::Continue
        }
        EditAction::MoveWordRight => {
            let target = word_right(&session.buffer, session.offset);
            session.requested_pos_x = None;
            session.move_cursor_to(target);
            ActionOutcome::Continue
        }
        EditAction::MoveHome => {
            session.requested_pos_x = None;
            session.move_cursor_to(0);
            ActionOutcome::Continue
        }
        EditAction::MoveEnd => {
            session.requested_pos_x = None;
            let end = session.buffer.len();
            session.move_cursor_to(end);
            ActionOutcome::Continue
        }
        EditAction::MoveScreenLineUp => {
            move_vertical(session, -1);
            ActionOutcome::Continue
        }
        EditAction::MoveScreenLineDown => {
            move_vertical(session, 1);
            ActionOutcome::Continue
        }
        EditAction::DeleteBackward => {
            delete_backward(session);
            ActionOutcome::Continue
        }
        EditAction::DeleteForward => delete_forward(session),
        EditAction::DeleteWordBackward => {
            let start = word_left(&session.buffer, session.offset);
            let end = session.offset;
            session.delete_range(start, end);
            ActionOutcome::Continue
        }
        EditAction::DeleteWordForward => {
            let start = session.offset;
            let end = word_right(&session.buffer, session.offset);
            session.delete_range(start, end);
            ActionOutcome::Continue
        }
        EditAction::KillToStart => {
            session.delete_range(0, session.offset);
            ActionOutcome::Continue
        }
        EditAction::KillToEnd => {
            let end = session.buffer.len();
            let start = session.offset;
            session.delete_range(start, end);
            ActionOutcome::Continue
        }
        EditAction::ToggleOverwrite => {
            session.toggle_overwrite();
            ActionOutcome::Continue
        }
        EditAction::Repaint => ActionOutcome::Repaint,
        EditAction::AcceptLine => ActionOutcome::Accept(session.buffer.clone()),
        EditAction::Cancel => ActionOutcome::Cancel,
    }
}

fn insert_char(session: &mut Session, c: char) {
    if session.insert {
        let mut buf = [0u8; 4];
        session.insert_at_cursor(c.encode_utf8(&mut buf));
    } else {
        session.overwrite_at_cursor(c);
    }
}

fn move_left(session: &mut Session) {
    session.requested_pos_x = None;
    if session.offset > 0 {
        let prev = unicode_props::prev_boundary(&session.buffer, session.offset);
        session.move_cursor_to(prev);
    }
}

fn move_right(session: &mut Session) {
    session.requested_pos_x = None;
    if session.offset < session.buffer.len() {
        let next = unicode_props::next_boundary(&session.buffer, session.offset);
        session.move_cursor_to(next);
    }
}

fn delete_backward(session: &mut Session) {
    if session.offset > 0 {
        let prev = unicode_props::prev_boundary(&session.buffer, session.offset);
        let at = session.offset;
        session.delete_range(prev, at);
    }
}

fn delete_forward(session: &mut Session) -> ActionOutcome {
    if session.is_empty() {
        return ActionOutcome::Eof;
    }
    if session.offset < session.buffer.len() {
        let next = unicode_props::next_boundary(&session.buffer, session.offset);
        let at = session.offset;
        session.delete_range(at, next);
    }
    ActionOutcome::Continue
}

fn move_vertical(session: &mut Session, delta: isize) {
    let current_row = session.row_of_offset(session.offset) as isize;
    let target_row = current_row + delta;
    if target_row < 0 || target_row as usize >= session.line_offset.len() {
        return;
    }
    let target_row = target_row as usize;
    let want_col = session.requested_pos_x.unwrap_or(session.pos_x);
    let row_start = session.line_offset[target_row];
    let row_end = session
        .line_offset
        .get(target_row + 1)
        .copied()
        .unwrap_or(session.buffer.len());
    let base = if target_row == 0 {
        session.prompt_len as u16
    } else {
        0
    };
    let want_chars = want_col.saturating_sub(base) as usize;
    let (mut target_offset, _) =
        core_text::offset_after_n_chars(&session.buffer, row_start, want_chars);
    target_offset = target_offset.min(row_end);
    session.requested_pos_x = Some(want_col);
    session.move_cursor_to(target_offset);
}

/// Scan backward from `offset`, skipping any run of non-word characters
/// then a run of word characters, landing on the start of the word behind
/// the cursor (or `0`).
///
/// Each step first computes the previous codepoint boundary and only then
/// reads the character in `[prev, idx)` — never dereferencing past a
/// boundary that hasn't been established yet — so a word at the very start
/// of the buffer can't be scanned one codepoint past where it begins.
fn word_left(buf: &str, offset: usize) -> usize {
    let mut idx = offset;
    while idx > 0 {
        let prev = unicode_props::prev_boundary(buf, idx);
        let c = buf[prev..idx].chars().next().expect("non-empty slice");
        if unicode_props::is_word_char(c) {
            break;
        }
        idx = prev;
    }
    while idx > 0 {
        let prev = unicode_props::prev_boundary(buf, idx);
        let c = buf[prev..idx].chars().next().expect("non-empty slice");
        if !unicode_props::is_word_char(c) {
            break;
        }
        idx = prev;
    }
    idx
}

/// Scan forward from `offset`, skipping any run of non-word characters then
/// a run of word characters, landing just past the next word (or
/// `buf.len()`).
fn word_right(buf: &str, offset: usize) -> usize {
    let mut idx = offset;
    while idx < buf.len() {
        let c = buf[idx..].chars().next().expect("idx < buf.len()");
        if unicode_props::is_word_char(c) {
            break;
        }
        idx += c.len_utf8();
    }
    while idx < buf.len() {
        let c = buf[idx..].chars().next().expect("idx < buf.len()");
        if !unicode_props::is_word_char(c) {
            break;
        }
        idx += c.len_utf8();
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::TermInfo;
    use core_state::FrameMode;
    use pretty_assertions::assert_eq;

    fn session_with(text: &str) -> Session {
        let mut s = Session::new(TermInfo::new(80, 24), 0, FrameMode::Multiline, 10);
        s.insert_at_cursor(text);
        s
    }

    #[test]
    fn insert_char_advances_cursor() {
        let mut s = Session::new(TermInfo::new(80, 24), 0, FrameMode::Multiline, 10);
        assert_eq!(execute(EditAction::InsertChar('h'), &mut s), ActionOutcome::Continue);
        assert_eq!(s.buffer, "h");
        assert_eq!(s.offset, 1);
    }

    #[test]
    fn overwrite_mode_replaces_existing_char() {
        let mut s = session_with("abc");
        s.move_cursor_to(0);
        s.toggle_overwrite();
        execute(EditAction::InsertChar('z'), &mut s);
        assert_eq!(s.buffer, "zbc");
    }

    #[test]
    fn move_word_left_and_right_skip_whole_words() {
        let mut s = session_with("foo bar baz");
        s.move_cursor_to(s.buffer.len());
        execute(EditAction::MoveWordLeft, &mut s);
        assert_eq!(s.offset, "foo bar ".len());
        execute(EditAction::MoveWordLeft, &mut s);
        assert_eq!(s.offset, "foo ".len());
        execute(EditAction::MoveWordRight, &mut s);
        assert_eq!(s.offset, "foo bar".len());
    }

    #[test]
    fn delete_word_backward_removes_preceding_word() {
        let mut s = session_with("foo bar");
        execute(EditAction::DeleteWordBackward, &mut s);
        assert_eq!(s.buffer, "foo ");
    }

    #[test]
    fn kill_to_start_and_end() {
        let mut s = session_with("hello world");
        s.move_cursor_to(6);
        execute(EditAction::KillToStart, &mut s);
        assert_eq!(s.buffer, "world");
        s.move_cursor_to(2);
        execute(EditAction::KillToEnd, &mut s);
        assert_eq!(s.buffer, "wo");
    }

    #[test]
    fn delete_forward_on_empty_buffer_signals_eof() {
        let mut s = Session::new(TermInfo::new(80, 24), 0, FrameMode::Multiline, 10);
        assert_eq!(execute(EditAction::DeleteForward, &mut s), ActionOutcome::Eof);
    }

    #[test]
    fn accept_line_returns_buffer_contents() {
        let mut s = session_with("submit me");
        assert_eq!(
            execute(EditAction::AcceptLine, &mut s),
            ActionOutcome::Accept("submit me".to_string())
        );
    }

    #[test]
    fn repaint_action_does_not_mutate_buffer() {
        let mut s = session_with("unchanged");
        assert_eq!(execute(EditAction::Repaint, &mut s), ActionOutcome::Repaint);
        assert_eq!(s.buffer, "unchanged");
    }

    #[test]
    fn vertical_motion_preserves_sticky_column() {
        // cols=10, prompt_len=0: "aaaaaaaaaa" wraps into two rows of 10.
        let mut s = session_with(&"a".repeat(15));
        s.term_cols = 10;
        s.recompute(0);
        s.move_cursor_to(5);
        execute(EditAction::MoveScreenLineDown, &mut s);
        assert_eq!(s.pos_x, 5);
    }
}
