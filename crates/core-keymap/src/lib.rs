//! Flat keymap: translates a single decoded key into an [`EditAction`].
//!
//! Unlike a modal editor's trie-based mapping engine, this dispatch has no
//! pending state to accumulate (no counts, no operator-then-motion
//! composition) — every binding is a direct `(symbolic?, modifiers, code) ->
//! action` row, looked up independently per keystroke. Plain printable
//! characters with no modifier fall through to [`EditAction::InsertChar`].

use core_events::{DecodedKey, KeyToken, ModMask, NamedKey};

/// The closed set of actions `core-actions` knows how to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    InsertChar(char),
    MoveLeft,
    MoveRight,
    MoveWordLeft,
    MoveWordRight,
    MoveHome,
    MoveEnd,
    MoveScreenLineUp,
    MoveScreenLineDown,
    DeleteBackward,
    DeleteForward,
    DeleteWordBackward,
    DeleteWordForward,
    KillToStart,
    KillToEnd,
    ToggleOverwrite,
    Repaint,
    AcceptLine,
    Cancel,
}

type Binding = (KeyToken, ModMask, EditAction);

/// Static `(code, modifiers) -> action` table for every non-printable
/// binding. Printable characters with no modifier are handled separately in
/// [`dispatch`] rather than enumerated here one by one.
const BINDINGS: &[Binding] = &[
    (
        KeyToken::Named(NamedKey::Left),
        ModMask::empty(),
        EditAction::MoveLeft,
    ),
    (KeyToken::Char('b'), ModMask::CTRL, EditAction::MoveLeft),
    (
        KeyToken::Named(NamedKey::Right),
        ModMask::empty(),
        EditAction::MoveRight,
    ),
    (KeyToken::Char('f'), ModMask::CTRL, EditAction::MoveRight),
    (KeyToken::Char('b'), ModMask::ALT, EditAction::MoveWordLeft),
    (
        KeyToken::Char('f'),
        ModMask::ALT,
        EditAction::MoveWordRight,
    ),
    (
        KeyToken::Named(NamedKey::Home),
        ModMask::empty(),
        EditAction::MoveHome,
    ),
    (KeyToken::Char('a'), ModMask::CTRL, EditAction::MoveHome),
    (
        KeyToken::Named(NamedKey::End),
        ModMask::empty(),
        EditAction::MoveEnd,
    ),
    (KeyToken::Char('e'), ModMask::CTRL, EditAction::MoveEnd),
    (
        KeyToken::Named(NamedKey::Up),
        ModMask::empty(),
        EditAction::MoveScreenLineUp,
    ),
    (
        KeyToken::Named(NamedKey::Down),
        ModMask::empty(),
        EditAction::MoveScreenLineDown,
    ),
    (
        KeyToken::Named(NamedKey::Backspace),
        ModMask::empty(),
        EditAction::DeleteBackward,
    ),
    (
        KeyToken::Named(NamedKey::Delete),
        ModMask::empty(),
        EditAction::DeleteForward,
    ),
    (KeyToken::Char('d'), ModMask::CTRL, EditAction::DeleteForward),
    (
        KeyToken::Char('d'),
        ModMask::ALT,
        EditAction::DeleteWordForward,
    ),
    (
        // Terminals report Alt-Backspace as ESC followed by the raw 0x7f
        // byte, which decodes to a DEL char chorded with Alt.
        KeyToken::Char('\u{7f}'),
        ModMask::ALT,
        EditAction::DeleteWordBackward,
    ),
    (KeyToken::Char('u'), ModMask::CTRL, EditAction::KillToStart),
    (KeyToken::Char('k'), ModMask::CTRL, EditAction::KillToEnd),
    (
        KeyToken::Named(NamedKey::Enter),
        ModMask::empty(),
        EditAction::AcceptLine,
    ),
    (KeyToken::Char('c'), ModMask::CTRL, EditAction::Cancel),
    (
        KeyToken::Named(NamedKey::Esc),
        ModMask::empty(),
        EditAction::Cancel,
    ),
    (KeyToken::Char('l'), ModMask::CTRL, EditAction::Repaint),
    (
        KeyToken::Named(NamedKey::Insert),
        ModMask::empty(),
        EditAction::ToggleOverwrite,
    ),
];

/// Look up the action bound to `key`.
///
/// Returns `None` when `key` is neither a recognized binding nor a plain
/// printable character (e.g. an unbound control chord); callers should treat
/// that as "ignore this keystroke".
pub fn dispatch(key: DecodedKey) -> Option<EditAction> {
    for (token, mods, action) in BINDINGS {
        if *token == key.token && *mods == key.mods {
            return Some(*action);
        }
    }
    if key.mods.is_empty() {
        if let KeyToken::Char(c) = key.token {
            if !c.is_control() {
                return Some(EditAction::InsertChar(c));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_char_inserts() {
        let key = DecodedKey::plain(KeyToken::Char('q'));
        assert_eq!(dispatch(key), Some(EditAction::InsertChar('q')));
    }

    #[test]
    fn ctrl_a_moves_home_same_as_home_key() {
        let via_ctrl = DecodedKey::new(KeyToken::Char('a'), ModMask::CTRL);
        let via_named = DecodedKey::plain(KeyToken::Named(NamedKey::Home));
        assert_eq!(dispatch(via_ctrl), Some(EditAction::MoveHome));
        assert_eq!(dispatch(via_named), Some(EditAction::MoveHome));
    }

    #[test]
    fn alt_f_moves_word_right() {
        let key = DecodedKey::new(KeyToken::Char('f'), ModMask::ALT);
        assert_eq!(dispatch(key), Some(EditAction::MoveWordRight));
    }

    #[test]
    fn ctrl_l_repaints() {
        let key = DecodedKey::new(KeyToken::Char('l'), ModMask::CTRL);
        assert_eq!(dispatch(key), Some(EditAction::Repaint));
    }

    #[test]
    fn unbound_ctrl_chord_yields_none() {
        let key = DecodedKey::new(KeyToken::Char('z'), ModMask::CTRL);
        assert_eq!(dispatch(key), None);
    }

    #[test]
    fn enter_accepts_line() {
        let key = DecodedKey::plain(KeyToken::Named(NamedKey::Enter));
        assert_eq!(dispatch(key), Some(EditAction::AcceptLine));
    }
}
