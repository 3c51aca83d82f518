//! Keystroke encoders: pure functions mapping a logical key event to
//! the byte sequence a given emulation would send upstream.

use crate::display::{ArrowKeysMode, KeypadMode};
use crate::keyboard::{KeyEvent, NamedKey};

/// Result of encoding a [`KeyEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedKey {
    /// The key produces no output (e.g. a bare modifier).
    Empty,
    /// The key is not recognized by this encoder.
    Unhandled,
    /// The key encodes to this byte sequence.
    Bytes(Vec<u8>),
}

impl EncodedKey {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            EncodedKey::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

/// ATASCII keystroke encoder: literal octal byte mappings.
pub fn encode_atascii(event: &KeyEvent) -> EncodedKey {
    use NamedKey::*;
    let byte = match event.key {
        Escape => 0o033,
        Tab => 0o011,
        Backspace => 0o024,
        ArrowLeft => 0o235,
        ArrowRight => 0o035,
        ArrowUp => 0o221,
        ArrowDown => 0o021,
        Insert => 0o224,
        Delete => 0o024,
        Home => 0o023,
        Enter => 0o015,
        F1 => 0o205,
        F2 => 0o211,
        F3 => 0o206,
        F4 => 0o212,
        F5 => 0o207,
        F6 => 0o213,
        F7 => 0o210,
        F8 => 0o214,
        _ => return EncodedKey::Unhandled,
    };
    EncodedKey::Bytes(vec![byte])
}

/// ANSI/VT family keystroke encoder.
///
/// Cursor keys switch between the normal (`CSI`) and application (`SS3`)
/// forms per DECCKM. Keypad digits switch between their plain-ASCII
/// (numeric mode) and `SS3`-prefixed (application mode) forms per DECPAM/
/// DECPNM.
pub fn encode_ansi(
    event: &KeyEvent,
    arrow_keys_mode: ArrowKeysMode,
    keypad_mode: KeypadMode,
) -> EncodedKey {
    use NamedKey::*;
    let cursor = |final_byte: u8| -> Vec<u8> {
        match arrow_keys_mode {
            ArrowKeysMode::Normal => vec![0x1b, b'[', final_byte],
            ArrowKeysMode::Application => vec![0x1b, b'O', final_byte],
        }
    };
    let keypad = |numeric_byte: u8, application_byte: u8| -> Vec<u8> {
        match keypad_mode {
            KeypadMode::Numeric => vec![numeric_byte],
            KeypadMode::Application => vec![0x1b, b'O', application_byte],
        }
    };

    let bytes = match event.key {
        ArrowUp => cursor(b'A'),
        ArrowDown => cursor(b'B'),
        ArrowRight => cursor(b'C'),
        ArrowLeft => cursor(b'D'),
        Home => vec![0x1b, b'[', b'H'],
        End => vec![0x1b, b'[', b'F'],
        Insert => vec![0x1b, b'[', b'2', b'~'],
        Delete => vec![0x1b, b'[', b'3', b'~'],
        PageUp => vec![0x1b, b'[', b'5', b'~'],
        PageDown => vec![0x1b, b'[', b'6', b'~'],
        F1 => vec![0x1b, b'O', b'P'],
        F2 => vec![0x1b, b'O', b'Q'],
        F3 => vec![0x1b, b'O', b'R'],
        F4 => vec![0x1b, b'O', b'S'],
        F5 => vec![0x1b, b'[', b'1', b'5', b'~'],
        F6 => vec![0x1b, b'[', b'1', b'7', b'~'],
        F7 => vec![0x1b, b'[', b'1', b'8', b'~'],
        F8 => vec![0x1b, b'[', b'1', b'9', b'~'],
        Escape => vec![0x1b],
        Tab => vec![b'\t'],
        Backspace => vec![0x7f],
        Enter => vec![b'\r'],
        Kp0 => keypad(b'0', b'p'),
        Kp1 => keypad(b'1', b'q'),
        Kp2 => keypad(b'2', b'r'),
        Kp3 => keypad(b'3', b's'),
        Kp4 => keypad(b'4', b't'),
        Kp5 => keypad(b'5', b'u'),
        Kp6 => keypad(b'6', b'v'),
        Kp7 => keypad(b'7', b'w'),
        Kp8 => keypad(b'8', b'x'),
        Kp9 => keypad(b'9', b'y'),
        KpPeriod => keypad(b'.', b'n'),
        KpMinus => keypad(b'-', b'm'),
        KpEnter => keypad(b'\r', b'M'),
    };
    EncodedKey::Bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: NamedKey) -> KeyEvent {
        KeyEvent { key: k }
    }

    #[test]
    fn atascii_escape_and_backspace() {
        assert_eq!(
            encode_atascii(&key(NamedKey::Escape)),
            EncodedKey::Bytes(vec![0o033])
        );
        assert_eq!(
            encode_atascii(&key(NamedKey::Backspace)),
            EncodedKey::Bytes(vec![0o024])
        );
    }

    #[test]
    fn atascii_function_keys() {
        assert_eq!(
            encode_atascii(&key(NamedKey::F1)),
            EncodedKey::Bytes(vec![0o205])
        );
        assert_eq!(
            encode_atascii(&key(NamedKey::F8)),
            EncodedKey::Bytes(vec![0o214])
        );
    }

    #[test]
    fn atascii_unmapped_key_is_unhandled() {
        assert_eq!(encode_atascii(&key(NamedKey::PageUp)), EncodedKey::Unhandled);
    }

    #[test]
    fn ansi_arrow_keys_switch_on_application_mode() {
        let normal = encode_ansi(&key(NamedKey::ArrowUp), ArrowKeysMode::Normal, KeypadMode::Numeric);
        let app = encode_ansi(&key(NamedKey::ArrowUp), ArrowKeysMode::Application, KeypadMode::Numeric);
        assert_eq!(normal, EncodedKey::Bytes(vec![0x1b, b'[', b'A']));
        assert_eq!(app, EncodedKey::Bytes(vec![0x1b, b'O', b'A']));
    }

    #[test]
    fn ansi_function_keys() {
        assert_eq!(
            encode_ansi(&key(NamedKey::F1), ArrowKeysMode::Normal, KeypadMode::Numeric),
            EncodedKey::Bytes(vec![0x1b, b'O', b'P'])
        );
    }

    #[test]
    fn keypad_sends_plain_digit_in_numeric_mode() {
        assert_eq!(
            encode_ansi(&key(NamedKey::Kp5), ArrowKeysMode::Normal, KeypadMode::Numeric),
            EncodedKey::Bytes(vec![b'5'])
        );
    }

    #[test]
    fn keypad_sends_ss3_sequence_in_application_mode() {
        assert_eq!(
            encode_ansi(&key(NamedKey::Kp5), ArrowKeysMode::Normal, KeypadMode::Application),
            EncodedKey::Bytes(vec![0x1b, b'O', b'u'])
        );
    }

    #[test]
    fn keypad_enter_switches_with_mode() {
        assert_eq!(
            encode_ansi(&key(NamedKey::KpEnter), ArrowKeysMode::Normal, KeypadMode::Numeric),
            EncodedKey::Bytes(vec![b'\r'])
        );
        assert_eq!(
            encode_ansi(&key(NamedKey::KpEnter), ArrowKeysMode::Normal, KeypadMode::Application),
            EncodedKey::Bytes(vec![0x1b, b'O', b'M'])
        );
    }
}
