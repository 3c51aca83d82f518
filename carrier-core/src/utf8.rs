//! Script-pipe UTF-8 codec (spec §4.4, §6): a table-driven byte-level
//! decoder that reports accept/reject rather than substituting U+FFFD, so
//! the script bridge can discard malformed sequences outright.
//!
//! Shares the `utf8parse` crate with `carrier-vte::utf8`, which instead
//! folds invalid sequences into the replacement character — the two
//! callers want different recovery policies from the same table.

use utf8parse::Receiver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeEvent {
    Char(char),
    Invalid,
}

#[derive(Default)]
struct EventReceiver {
    event: Option<DecodeEvent>,
}

impl Receiver for EventReceiver {
    fn codepoint(&mut self, c: char) {
        self.event = Some(DecodeEvent::Char(c));
    }

    fn invalid_sequence(&mut self) {
        self.event = Some(DecodeEvent::Invalid);
    }
}

/// One decoder per byte stream (script stdout, script stderr); state
/// persists across `advance` calls so a sequence can span reads.
#[derive(Default)]
pub struct Utf8Decoder {
    inner: utf8parse::Parser,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte. Returns `None` while a multi-byte sequence is still
    /// incomplete.
    pub fn advance(&mut self, byte: u8) -> Option<DecodeEvent> {
        let mut receiver = EventReceiver::default();
        self.inner.advance(&mut receiver, byte);
        receiver.event
    }
}

/// Encode `c` into up to 4 bytes, for 8-bit emulations re-encoding a
/// translated byte as a one-element UTF-8 sequence is never needed — they
/// truncate to the low byte instead (see `script::ScriptBridge`).
pub fn encode_utf8(c: char, buf: &mut [u8; 4]) -> usize {
    c.encode_utf8(buf).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_ascii_one_byte_at_a_time() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.advance(b'A'), Some(DecodeEvent::Char('A')));
    }

    #[test]
    fn rejects_overlong_encoding_and_recovers() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.advance(0xC0), None);
        assert_eq!(decoder.advance(0x80), Some(DecodeEvent::Invalid));
        assert_eq!(decoder.advance(b'A'), Some(DecodeEvent::Char('A')));
    }

    #[test]
    fn decodes_multibyte_sequence() {
        let mut decoder = Utf8Decoder::new();
        let bytes = "é".as_bytes();
        assert_eq!(decoder.advance(bytes[0]), None);
        assert_eq!(decoder.advance(bytes[1]), Some(DecodeEvent::Char('é')));
    }

    #[test]
    fn round_trips_every_scalar_value() {
        for c in (0u32..=0x10FFFF).filter_map(char::from_u32) {
            let mut buf = [0u8; 4];
            let bytes = c.encode_utf8(&mut buf).as_bytes();
            let mut decoder = Utf8Decoder::new();
            let mut decoded = None;
            for &byte in bytes {
                match decoder.advance(byte) {
                    Some(DecodeEvent::Char(got)) => decoded = Some(got),
                    Some(DecodeEvent::Invalid) => panic!("valid scalar value {c:?} rejected"),
                    None => {},
                }
            }
            assert_eq!(decoded, Some(c));
        }
    }
}
