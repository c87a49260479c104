//! The reference [`KeyDecoder`] implementation: a non-blocking ANSI/UTF-8
//! byte-to-key decoder fed directly from the raw session fd.
//!
//! `core-events::KeyDecoder` is the contract; this crate is one concrete
//! implementation of it, kept swappable so a host with its own terminal
//! input layer (a different escape-sequence dialect, a platform console
//! API) can supply an alternate decoder without touching `core-actions` or
//! `core-terminal`.

use core_events::{DecodedKey, KeyDecoder, KeyToken, ModMask, NamedKey};

const ESC: u8 = 0x1b;
const DEL: u8 = 0x7f;

/// Buffers raw bytes and decodes them into [`DecodedKey`]s without ever
/// blocking. A lone trailing `ESC` byte is ambiguous (Esc key vs. the start
/// of a sequence still in flight) and is held back by [`Self::try_next`]
/// until either more bytes arrive or the caller calls
/// [`Self::force_pending_escape`] after its input-idle timeout fires.
#[derive(Debug, Default)]
pub struct AnsiKeyDecoder {
    buf: Vec<u8>,
}

impl AnsiKeyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a buffered lone `ESC` byte as the Esc key itself.
    ///
    /// The event loop calls this when its epoll wait times out with no
    /// further bytes having arrived, which is the only way to disambiguate
    /// a bare Esc press from the first byte of a still-incoming sequence.
    pub fn force_pending_escape(&mut self) -> Option<DecodedKey> {
        if self.buf == [ESC] {
            self.buf.clear();
            Some(DecodedKey::plain(KeyToken::Named(NamedKey::Esc)))
        } else {
            None
        }
    }

    fn decode_csi(&mut self) -> Option<DecodedKey> {
        // buf[0] == ESC, buf[1] == b'['; scan for the final byte.
        let final_idx = self.buf[2..]
            .iter()
            .position(|b| (0x40..=0x7e).contains(b))
            .map(|i| i + 2)?;
        let seq = self.buf[2..final_idx].to_vec();
        let final_byte = self.buf[final_idx];
        self.buf.drain(0..=final_idx);

        let named = match (seq.as_slice(), final_byte) {
            ([], b'A') => Some(NamedKey::Up),
            ([], b'B') => Some(NamedKey::Down),
            ([], b'C') => Some(NamedKey::Right),
            ([], b'D') => Some(NamedKey::Left),
            ([], b'H') => Some(NamedKey::Home),
            ([], b'F') => Some(NamedKey::End),
            ([b'1'], b'~') | ([b'7'], b'~') => Some(NamedKey::Home),
            ([b'4'], b'~') | ([b'8'], b'~') => Some(NamedKey::End),
            ([b'3'], b'~') => Some(NamedKey::Delete),
            ([b'2'], b'~') => Some(NamedKey::Insert),
            _ => None,
        };
        match named {
            Some(key) => Some(DecodedKey::plain(KeyToken::Named(key))),
            None => {
                tracing::trace!(target: "input.decode", ?seq, final_byte, "unrecognized CSI sequence dropped");
                None
            }
        }
    }

    fn decode_utf8_char(&mut self) -> Option<DecodedKey> {
        let lead = self.buf[0];
        let need = core_text::utf8_step(lead);
        if self.buf.len() < need {
            return None;
        }
        let bytes: Vec<u8> = self.buf.drain(0..need).collect();
        match std::str::from_utf8(&bytes) {
            Ok(s) => {
                let c = s.chars().next().expect("utf8_step guarantees one char");
                Some(DecodedKey::plain(KeyToken::Char(c)))
            }
            Err(_) => {
                tracing::trace!(target: "input.decode", ?bytes, "invalid UTF-8 sequence dropped");
                None
            }
        }
    }
}

impl KeyDecoder for AnsiKeyDecoder {
    fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn try_next(&mut self) -> Option<DecodedKey> {
        loop {
            let Some(&lead) = self.buf.first() else {
                return None;
            };

            if lead == ESC {
                if self.buf.len() == 1 {
                    // Ambiguous: wait for more bytes or a forced timeout.
                    return None;
                }
                if self.buf[1] == b'[' {
                    if self.buf[2..].iter().any(|b| (0x40..=0x7e).contains(b)) {
                        if let Some(key) = self.decode_csi() {
                            return Some(key);
                        }
                        continue;
                    }
                    return None;
                }
                // Alt+key: ESC followed by a plain printable byte.
                let c = self.buf[1] as char;
                self.buf.drain(0..2);
                return Some(DecodedKey::new(KeyToken::Char(c), ModMask::ALT));
            }

            if lead == DEL || lead == 0x08 {
                self.buf.remove(0);
                return Some(DecodedKey::plain(KeyToken::Named(NamedKey::Backspace)));
            }

            if lead == b'\t' {
                self.buf.remove(0);
                return Some(DecodedKey::plain(KeyToken::Named(NamedKey::Tab)));
            }

            if lead == b'\r' || lead == b'\n' {
                self.buf.remove(0);
                return Some(DecodedKey::plain(KeyToken::Named(NamedKey::Enter)));
            }

            if (0x01..=0x1a).contains(&lead) {
                self.buf.remove(0);
                let c = (b'a' + lead - 1) as char;
                return Some(DecodedKey::new(KeyToken::Char(c), ModMask::CTRL));
            }

            if lead < 0x80 {
                self.buf.remove(0);
                return Some(DecodedKey::plain(KeyToken::Char(lead as char)));
            }

            if let Some(key) = self.decode_utf8_char() {
                return Some(key);
            }
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decode_all(bytes: &[u8]) -> Vec<DecodedKey> {
        let mut dec = AnsiKeyDecoder::new();
        dec.feed(bytes);
        let mut out = Vec::new();
        while let Some(k) = dec.try_next() {
            out.push(k);
        }
        out
    }

    #[test]
    fn plain_ascii_char() {
        let keys = decode_all(b"a");
        assert_eq!(keys, vec![DecodedKey::plain(KeyToken::Char('a'))]);
    }

    #[test]
    fn multibyte_utf8_char() {
        let keys = decode_all("é".as_bytes());
        assert_eq!(keys, vec![DecodedKey::plain(KeyToken::Char('é'))]);
    }

    #[test]
    fn incomplete_utf8_waits_for_more_bytes() {
        let mut dec = AnsiKeyDecoder::new();
        let full = "é".as_bytes();
        dec.feed(&full[..1]);
        assert_eq!(dec.try_next(), None);
        dec.feed(&full[1..]);
        assert_eq!(
            dec.try_next(),
            Some(DecodedKey::plain(KeyToken::Char('é')))
        );
    }

    #[test]
    fn ctrl_a_decodes_with_ctrl_mod() {
        let keys = decode_all(&[0x01]);
        assert_eq!(
            keys,
            vec![DecodedKey::new(KeyToken::Char('a'), ModMask::CTRL)]
        );
    }

    #[test]
    fn backspace_from_del_byte() {
        let keys = decode_all(&[DEL]);
        assert_eq!(
            keys,
            vec![DecodedKey::plain(KeyToken::Named(NamedKey::Backspace))]
        );
    }

    #[test]
    fn arrow_key_csi_sequence() {
        let keys = decode_all(b"\x1b[C");
        assert_eq!(
            keys,
            vec![DecodedKey::plain(KeyToken::Named(NamedKey::Right))]
        );
    }

    #[test]
    fn delete_key_extended_csi_sequence() {
        let keys = decode_all(b"\x1b[3~");
        assert_eq!(
            keys,
            vec![DecodedKey::plain(KeyToken::Named(NamedKey::Delete))]
        );
    }

    #[test]
    fn alt_chord_from_esc_prefixed_char() {
        let keys = decode_all(b"\x1bd");
        assert_eq!(
            keys,
            vec![DecodedKey::new(KeyToken::Char('d'), ModMask::ALT)]
        );
    }

    #[test]
    fn lone_escape_waits_then_resolves_on_forced_timeout() {
        let mut dec = AnsiKeyDecoder::new();
        dec.feed(&[ESC]);
        assert_eq!(dec.try_next(), None);
        assert_eq!(
            dec.force_pending_escape(),
            Some(DecodedKey::plain(KeyToken::Named(NamedKey::Esc)))
        );
    }

    #[test]
    fn unrecognized_csi_sequence_is_dropped_not_stuck() {
        let mut dec = AnsiKeyDecoder::new();
        dec.feed(b"\x1b[99zb");
        // The bogus sequence is consumed silently; the following plain 'b' still decodes.
        assert_eq!(dec.try_next(), Some(DecodedKey::plain(KeyToken::Char('b'))));
    }
}
