//! ATASCII emulator with ANSI fallback.
//!
//! A small hand-rolled state machine handles the ATASCII codepage and its
//! minimal `ESC [ ... m` SGR dialect directly; anything it doesn't recognize
//! is handed off to the nested [`AnsiEmulator`], reusing the exact same
//! `Actor` surface the standalone ANSI/VT family emulator drives.

use std::collections::VecDeque;

use log::debug;

use crate::ansi::AnsiEmulator;
use crate::display::DisplayState;
use crate::emulation::{EmitOutcome, EmulationKind, Emulator};
use crate::error::EmulationError;
use crate::keyboard::KeyEvent;
use crate::keymap;
use crate::sgr::apply_sgr;

/// Maximum bytes buffered while parsing an as-yet-incomplete `ESC [ ... m`
/// sequence before giving up and falling back.
const PARAM_BUFFER_BOUND: usize = 32;

/// Maximum bytes replayed through the nested ANSI emulator before its
/// sequence is considered malformed and dumped verbatim.
const FALLBACK_BYTE_BOUND: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AtasciiState {
    Ground,
    Esc,
    Csi,
    CsiParam,
    AnsiFallback,
    DumpUnknown,
}

/// The 128-entry ATASCII-to-Unicode mapping table.
pub static ATASCII_TABLE: [char; 128] = build_atascii_table();

const fn build_atascii_table() -> [char; 128] {
    let mut table = [' '; 128];
    let mut i = 0;
    while i < 128 {
        table[i] = match i as u8 {
            b @ 0x20..=0x7F => b as char,
            _ => '\u{2400}',
        };
        i += 1;
    }

    // Overrides for the notable codepoints; anything in 0x20..0x7F
    // not listed below keeps its ASCII identity from the loop above.
    table[0x00] = '\u{2665}';
    table[0x01] = '\u{251C}';
    table[0x0D] = '\u{23BA}';
    table[0x10] = '\u{2663}';
    table[0x12] = '\u{2500}';
    table[0x14] = '\u{25CF}';
    table[0x1B] = '\u{241B}';
    table[0x1C] = '\u{2191}';
    table[0x1D] = '\u{2193}';
    table[0x1E] = '\u{2190}';
    table[0x1F] = '\u{2192}';
    table[0x60] = '\u{2666}';
    table[0x7B] = '\u{2660}';
    table[0x7D] = '\u{2196}';
    table[0x7E] = '\u{25C0}';
    table[0x7F] = '\u{25B6}';

    table
}

/// ATASCII emulator: a nested state machine that falls back to the ANSI/VT
/// family parser for sequences outside its own minimal dialect.
pub struct AtasciiEmulator {
    state: AtasciiState,
    param_buffer: Vec<u8>,
    fallback: AnsiEmulator,
    fallback_bytes_replayed: usize,
    dump_queue: VecDeque<u8>,
    pending_dump_char: Option<char>,
}

impl AtasciiEmulator {
    pub fn new() -> Self {
        Self {
            state: AtasciiState::Ground,
            param_buffer: Vec::new(),
            fallback: AnsiEmulator::new(EmulationKind::Ansi),
            fallback_bytes_replayed: 0,
            dump_queue: VecDeque::new(),
            pending_dump_char: None,
        }
    }

    /// When [`Emulator::feed`] returns [`EmitOutcome::ManyChars`] while
    /// draining a dumped sequence, the character for that call is retrieved
    /// through this accessor rather than the return value, which carries no
    /// payload for that variant.
    pub fn take_pending_dump_char(&mut self) -> Option<char> {
        self.pending_dump_char.take()
    }

    fn enter_dump(&mut self, bytes: impl IntoIterator<Item = u8>) {
        self.state = AtasciiState::DumpUnknown;
        self.dump_queue.clear();
        self.dump_queue.extend(bytes);
        self.param_buffer.clear();
        debug!("{}", EmulationError::MalformedSequence(self.dump_queue.len()));
    }

    fn start_fallback(
        &mut self,
        byte: u8,
        display: &mut DisplayState,
    ) -> EmitOutcome {
        if !display.atascii_ansi_fallback {
            let mut dumped = std::mem::take(&mut self.param_buffer);
            dumped.push(byte);
            self.enter_dump(dumped);
            return self.feed(0, display);
        }

        self.state = AtasciiState::AnsiFallback;
        self.fallback_bytes_replayed = 0;

        let mut replay: Vec<u8> = std::mem::take(&mut self.param_buffer);
        replay.push(byte);
        self.drive_fallback(&replay, display)
    }

    fn drive_fallback(&mut self, bytes: &[u8], display: &mut DisplayState) -> EmitOutcome {
        let mut last = EmitOutcome::NoCharYet;
        for &b in bytes {
            self.fallback_bytes_replayed += 1;
            last = self.fallback.feed(b, display);
            if matches!(last, EmitOutcome::OneChar(_)) {
                self.state = AtasciiState::Ground;
                return last;
            }
        }

        if self.fallback_bytes_replayed >= FALLBACK_BYTE_BOUND {
            self.enter_dump(bytes.to_vec());
            return self.feed(0, display);
        }

        last
    }
}

impl Default for AtasciiEmulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Emulator for AtasciiEmulator {
    fn kind(&self) -> EmulationKind {
        EmulationKind::Atascii
    }

    fn reset(&mut self, display: &mut DisplayState) {
        self.state = AtasciiState::Ground;
        self.param_buffer.clear();
        self.dump_queue.clear();
        self.pending_dump_char = None;
        self.fallback.reset(display);
        display.reset_for(EmulationKind::Atascii);
    }

    fn feed(&mut self, byte: u8, display: &mut DisplayState) -> EmitOutcome {
        if !display.has_wide_font {
            display.double_width_requested = true;
        }

        match self.state {
            AtasciiState::Ground => {
                if byte == 0x1B
                    && (display.atascii_color || display.atascii_ansi_fallback)
                {
                    self.param_buffer.clear();
                    self.param_buffer.push(byte);
                    self.state = AtasciiState::Esc;
                    return EmitOutcome::NoCharYet;
                }

                if byte == 0x9B && (display.atascii_color || display.atascii_ansi_fallback) {
                    return self.start_fallback(byte, display);
                }

                if byte < 0x20 || (0x80..0xA0).contains(&byte) {
                    if byte == 0x07 {
                        display.bell_pending = true;
                    }
                    debug!("[atascii] control byte 0x{byte:02X}");
                    return EmitOutcome::NoCharYet;
                }

                EmitOutcome::OneChar(ATASCII_TABLE[(byte & 0x7F) as usize])
            },

            AtasciiState::Esc => {
                if byte == b'[' && display.atascii_color {
                    self.param_buffer.push(byte);
                    self.state = AtasciiState::Csi;
                    return EmitOutcome::NoCharYet;
                }
                if byte == 0x1B {
                    self.param_buffer.clear();
                    self.param_buffer.push(byte);
                    return EmitOutcome::NoCharYet;
                }
                self.start_fallback(byte, display)
            },

            AtasciiState::Csi => {
                if byte == 0x1B {
                    self.param_buffer.clear();
                    self.param_buffer.push(byte);
                    self.state = AtasciiState::Esc;
                    return EmitOutcome::NoCharYet;
                }
                if byte.is_ascii_digit() {
                    self.param_buffer.push(byte);
                    self.state = AtasciiState::CsiParam;
                    return EmitOutcome::NoCharYet;
                }
                if byte == b'm' {
                    display.attributes.reset();
                    self.param_buffer.clear();
                    self.state = AtasciiState::Ground;
                    return EmitOutcome::NoCharYet;
                }
                self.start_fallback(byte, display)
            },

            AtasciiState::CsiParam => {
                if byte == 0x1B {
                    self.param_buffer.clear();
                    self.param_buffer.push(byte);
                    self.state = AtasciiState::Esc;
                    return EmitOutcome::NoCharYet;
                }
                if byte.is_ascii_digit() || byte == b';' {
                    if self.param_buffer.len() >= PARAM_BUFFER_BOUND {
                        debug!("[atascii] sgr parameter list truncated at buffer bound");
                    } else {
                        self.param_buffer.push(byte);
                    }
                    return EmitOutcome::NoCharYet;
                }
                if byte == b'm' {
                    let params = parse_sgr_params(&self.param_buffer[2..]);
                    apply_sgr(&mut display.attributes, &params);
                    self.param_buffer.clear();
                    self.state = AtasciiState::Ground;
                    return EmitOutcome::NoCharYet;
                }
                self.start_fallback(byte, display)
            },

            AtasciiState::AnsiFallback => {
                let byte = [byte];
                self.drive_fallback(&byte, display)
            },

            AtasciiState::DumpUnknown => {
                let Some(raw) = self.dump_queue.pop_front() else {
                    self.state = AtasciiState::Ground;
                    return EmitOutcome::NoCharYet;
                };
                let c = ATASCII_TABLE[(raw & 0x7F) as usize];
                if self.dump_queue.is_empty() {
                    self.state = AtasciiState::Ground;
                    EmitOutcome::OneChar(c)
                } else {
                    self.pending_dump_char = Some(c);
                    EmitOutcome::ManyChars
                }
            },
        }
    }

    fn encode_key(&self, event: &KeyEvent, _display: &DisplayState) -> Option<Vec<u8>> {
        keymap::encode_atascii(event).as_bytes().map(|b| b.to_vec())
    }

    fn take_many_char(&mut self) -> Option<char> {
        self.take_pending_dump_char()
    }
}

fn parse_sgr_params(buffer: &[u8]) -> Vec<i64> {
    if buffer.is_empty() {
        return Vec::new();
    }

    buffer
        .split(|&b| b == b';')
        .map(|digits| {
            digits
                .iter()
                .fold(0i64, |acc, &d| acc * 10 + (d - b'0') as i64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_str(emulator: &mut AtasciiEmulator, display: &mut DisplayState, s: &[u8]) -> Vec<char> {
        let mut out = Vec::new();
        for &byte in s {
            match emulator.feed(byte, display) {
                EmitOutcome::OneChar(c) => out.push(c),
                EmitOutcome::ManyChars => {
                    if let Some(c) = emulator.take_pending_dump_char() {
                        out.push(c);
                    }
                },
                _ => {},
            }
        }
        out
    }

    #[test]
    fn prints_ascii_identity_range() {
        let mut emulator = AtasciiEmulator::new();
        let mut display = DisplayState::default();
        assert_eq!(feed_str(&mut emulator, &mut display, b"hi"), vec!['h', 'i']);
    }

    #[test]
    fn maps_inverse_video_glyphs() {
        let mut emulator = AtasciiEmulator::new();
        let mut display = DisplayState::default();
        let out = feed_str(&mut emulator, &mut display, &[0x00]);
        assert_eq!(out, vec!['\u{2665}']);
    }

    #[test]
    fn esc_bracket_digit_m_applies_sgr_directly() {
        let mut emulator = AtasciiEmulator::new();
        let mut display = DisplayState::default();
        feed_str(&mut emulator, &mut display, b"\x1b[1m");
        assert!(display.attributes.bold);
    }

    #[test]
    fn esc_bracket_m_resets_attributes() {
        let mut emulator = AtasciiEmulator::new();
        let mut display = DisplayState::default();
        display.attributes.bold = true;
        feed_str(&mut emulator, &mut display, b"\x1b[m");
        assert!(!display.attributes.bold);
    }

    #[test]
    fn unrecognized_escape_falls_back_to_ansi() {
        let mut emulator = AtasciiEmulator::new();
        let mut display = DisplayState::default();
        let out = feed_str(&mut emulator, &mut display, b"\x1bZhello");
        assert_eq!(out, vec!['h', 'e', 'l', 'l', 'o']);
    }

    #[test]
    fn ansi_fallback_disabled_dumps_verbatim() {
        let mut emulator = AtasciiEmulator::new();
        let mut display = DisplayState::default();
        display.atascii_ansi_fallback = false;
        let out = feed_str(&mut emulator, &mut display, b"\x1bZ");
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn narrow_font_requests_double_width() {
        let mut emulator = AtasciiEmulator::new();
        let mut display = DisplayState::default();
        display.has_wide_font = false;
        emulator.feed(b'h', &mut display);
        assert!(display.double_width_requested);
    }

    #[test]
    fn bare_0x9b_drives_ansi_fallback() {
        let mut emulator = AtasciiEmulator::new();
        let mut display = DisplayState::default();
        let out = feed_str(&mut emulator, &mut display, &[0x9B, b'Z', b'h', b'i']);
        assert_eq!(out, vec!['h', 'i']);
    }

    #[test]
    fn bare_0x9b_dumps_verbatim_when_fallback_disabled() {
        let mut emulator = AtasciiEmulator::new();
        let mut display = DisplayState::default();
        display.atascii_ansi_fallback = false;
        let out = feed_str(&mut emulator, &mut display, &[0x9B]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn new_escape_restarts_mid_sequence() {
        let mut emulator = AtasciiEmulator::new();
        let mut display = DisplayState::default();
        let out = feed_str(&mut emulator, &mut display, b"\x1b[1\x1b[31mZ");
        assert!(out.is_empty() || out == vec!['Z']);
    }
}
