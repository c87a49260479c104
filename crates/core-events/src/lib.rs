//! Event and key-decoding types shared across the edit engine.
//!
//! This crate defines the *contract* between the raw byte stream read off a
//! terminal fd and everything above it: a [`KeyDecoder`] turns bytes into
//! [`DecodedKey`]s, and [`TermInfo`] is the read-only capability record a
//! decoder or renderer consults. Concrete decoding lives in `core-input`; a
//! host embedding this engine on a platform with its own key-decoding layer
//! can supply an alternate `KeyDecoder` impl without touching anything above
//! this boundary.

use thiserror::Error;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ModMask: u8 {
        const CTRL  = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const SHIFT = 0b0000_0100;
    }
}

/// Keys with no direct Unicode representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Enter,
    Esc,
    Backspace,
    Tab,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

/// A decoded key, either a Unicode codepoint or one of [`NamedKey`]'s
/// symbolic keys. Modifiers are tracked separately in [`DecodedKey`] rather
/// than folded into this enum, since the same modifier mask can apply to
/// either variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyToken {
    Char(char),
    Named(NamedKey),
}

/// A single decoded keypress, ready for `core-keymap` to dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodedKey {
    pub token: KeyToken,
    pub mods: ModMask,
}

impl DecodedKey {
    pub fn new(token: KeyToken, mods: ModMask) -> Self {
        Self { token, mods }
    }

    pub fn plain(token: KeyToken) -> Self {
        Self::new(token, ModMask::empty())
    }
}

/// A terminal resize report (new column/row count).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResizeEvent {
    pub cols: u16,
    pub rows: u16,
}

/// Everything the event loop can observe on a given wakeup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    Key(DecodedKey),
    Resize(ResizeEvent),
}

/// Read-only terminal capability record, probed once at session start.
///
/// Mirrors the narrow, non-exhaustive capability-struct shape used
/// elsewhere in this engine: add fields as new escape sequences need
/// gating, never remove without checking every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct TermInfo {
    pub cols: u16,
    pub rows: u16,
    pub supports_truecolor: bool,
    pub supports_osc133: bool,
}

impl TermInfo {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            supports_truecolor: true,
            supports_osc133: true,
        }
    }
}

/// Errors a [`KeyDecoder`] may surface for a byte sequence it cannot make
/// sense of. Decoders are free to recover silently instead (e.g. dropping
/// one invalid byte and resynchronizing); this type exists for decoders
/// that want to report rather than swallow.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unterminated escape sequence: {0:?}")]
    UnterminatedEscape(Vec<u8>),
    #[error("invalid UTF-8 byte sequence: {0:?}")]
    InvalidUtf8(Vec<u8>),
}

/// Contract between the raw byte stream and decoded [`DecodedKey`]s.
///
/// A `KeyDecoder` is fed raw bytes as they arrive off the session fd and is
/// pulled for as many complete keys as are currently buffered. It must never
/// block: `try_next` returns `None` when the buffered bytes don't yet form a
/// complete key (e.g. a CSI sequence still awaiting its final byte).
pub trait KeyDecoder {
    /// Append newly read bytes to the decoder's internal buffer.
    fn feed(&mut self, bytes: &[u8]);

    /// Pop the next fully-decoded key, if the buffer holds one.
    fn try_next(&mut self) -> Option<DecodedKey>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_key_has_empty_mods() {
        let k = DecodedKey::plain(KeyToken::Char('a'));
        assert_eq!(k.token, KeyToken::Char('a'));
        assert!(k.mods.is_empty());
    }

    #[test]
    fn mod_mask_combines_with_bitor() {
        let combined = ModMask::CTRL | ModMask::ALT;
        assert!(combined.contains(ModMask::CTRL));
        assert!(combined.contains(ModMask::ALT));
        assert!(!combined.contains(ModMask::SHIFT));
    }

    #[test]
    fn term_info_defaults_to_full_capability() {
        let info = TermInfo::new(80, 24);
        assert_eq!(info.cols, 80);
        assert_eq!(info.rows, 24);
        assert!(info.supports_truecolor);
    }
}
