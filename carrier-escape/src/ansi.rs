//! The ANSI/VT family `Emulator`: generalizes VT100/VT102/VT220,
//! LINUX, XTERM and their UTF-8 siblings over the shared table-driven
//! tokenizer in [`crate::parser`].
//!
//! The same parser instance backs the ATASCII emulator's fallback path
//! (see [`crate::atascii`]), since both consume the identical `Actor`
//! callback surface.

use std::collections::VecDeque;

use crate::actor::Actor;
use crate::charset::{Charset, CharsetIndex};
use crate::display::{ArrowKeysMode, DisplayState, KeypadMode};
use crate::emulation::{EmitOutcome, EmulationKind, Emulator};
use crate::keyboard::KeyEvent;
use crate::keymap;
use crate::mode::{ClearMode, LineClearMode, Mode, NamedMode, NamedPrivateMode, PrivateMode};
use crate::parser::Parser;
use crate::sgr::apply_sgr;

/// Bridges the low-level [`Actor`] callbacks to a borrowed [`DisplayState`],
/// queueing printed characters for the caller to drain one at a time.
struct Adapter<'a> {
    display: &'a mut DisplayState,
    queue: &'a mut VecDeque<char>,
}

impl<'a> Actor for Adapter<'a> {
    fn print(&mut self, c: char) {
        let charset = self.display.charsets[self.display.active_charset as usize];
        self.queue.push_back(charset.map(c));
        self.display.wrap_pending = false;
    }

    fn backspace(&mut self) {
        self.display.cursor_col = self.display.cursor_col.saturating_sub(1);
    }

    fn bell(&mut self) {
        self.display.bell_pending = true;
    }

    fn request_double_width(&mut self) {
        self.display.double_width_requested = true;
    }

    fn linefeed(&mut self) {
        self.display.cursor_row = self
            .display
            .cursor_row
            .saturating_add(1)
            .min(self.display.scroll_bottom);
    }

    fn carriage_return(&mut self) {
        self.display.cursor_col = 0;
        self.display.wrap_pending = false;
    }

    fn horizontal_tab(&mut self) {
        self.display.cursor_col = ((self.display.cursor_col / 8) + 1) * 8;
    }

    fn next_line(&mut self) {
        self.carriage_return();
        self.linefeed();
    }

    fn reverse_index(&mut self) {
        self.display.cursor_row = self
            .display
            .cursor_row
            .saturating_sub(1)
            .max(self.display.scroll_top);
    }

    fn full_reset(&mut self) {
        let (rows, cols) = (self.display.rows, self.display.cols);
        *self.display = DisplayState::new(rows, cols);
    }

    fn save_cursor_position(&mut self) {
        self.display.saved_cursor = Some((self.display.cursor_row, self.display.cursor_col));
    }

    fn restore_cursor_position(&mut self) {
        if let Some((row, col)) = self.display.saved_cursor {
            self.display.cursor_row = row;
            self.display.cursor_col = col;
        }
    }

    fn screen_alignment_display(&mut self) {
        self.display.cursor_row = 0;
        self.display.cursor_col = 0;
    }

    fn set_keypad_application_mode(&mut self) {
        self.display.keypad_mode = KeypadMode::Application;
    }

    fn set_keypad_numeric_mode(&mut self) {
        self.display.keypad_mode = KeypadMode::Numeric;
    }

    fn set_active_charset(&mut self, index: CharsetIndex) {
        self.display.active_charset = index;
    }

    fn configure_charset(&mut self, index: CharsetIndex, charset: Charset) {
        self.display.charsets[index as usize] = charset;
    }

    fn cursor_up(&mut self, count: i64) {
        self.display.cursor_row =
            self.display.cursor_row.saturating_sub(count.max(0) as u16);
    }

    fn cursor_down(&mut self, count: i64) {
        self.display.cursor_row = self
            .display
            .cursor_row
            .saturating_add(count.max(0) as u16)
            .min(self.display.rows.saturating_sub(1));
    }

    fn cursor_forward(&mut self, count: i64) {
        self.display.cursor_col = self
            .display
            .cursor_col
            .saturating_add(count.max(0) as u16)
            .min(self.display.cols.saturating_sub(1));
    }

    fn cursor_backward(&mut self, count: i64) {
        self.display.cursor_col =
            self.display.cursor_col.saturating_sub(count.max(0) as u16);
    }

    fn cursor_position(&mut self, row: i64, col: i64) {
        self.display.cursor_row = row.saturating_sub(1).max(0) as u16;
        self.display.cursor_col = col.saturating_sub(1).max(0) as u16;
    }

    fn erase_line(&mut self, _mode: LineClearMode) {
        self.display.wrap_pending = false;
    }

    fn erase_display(&mut self, _mode: ClearMode) {
        self.display.cursor_row = 0;
        self.display.cursor_col = 0;
    }

    fn set_scroll_region(&mut self, top: i64, bottom: i64) {
        let top = top.max(1) as u16 - 1;
        let bottom = if bottom <= 0 {
            self.display.rows.saturating_sub(1)
        } else {
            (bottom as u16).saturating_sub(1)
        };
        if top < bottom {
            self.display.scroll_top = top;
            self.display.scroll_bottom = bottom;
        }
    }

    fn select_graphic_rendition(&mut self, params: &[i64]) {
        apply_sgr(&mut self.display.attributes, params);
    }

    fn set_mode(&mut self, mode: Mode) {
        if let Mode::Named(NamedMode::LineFeedNewLine) = mode {
            self.display.new_line_mode = true;
        }
    }

    fn unset_mode(&mut self, mode: Mode) {
        if let Mode::Named(NamedMode::LineFeedNewLine) = mode {
            self.display.new_line_mode = false;
        }
    }

    fn set_private_mode(&mut self, mode: PrivateMode) {
        match mode {
            PrivateMode::Named(NamedPrivateMode::Origin) => self.display.origin_mode = true,
            PrivateMode::Named(NamedPrivateMode::ScreenReverse) => {
                self.display.reverse_video_screen = true
            },
            PrivateMode::Named(NamedPrivateMode::CursorKeys) => {
                self.display.arrow_keys_mode = ArrowKeysMode::Application
            },
            PrivateMode::Named(NamedPrivateMode::LineWrap) => {
                self.display.wrap_pending = false;
            },
            _ => {},
        }
    }

    fn unset_private_mode(&mut self, mode: PrivateMode) {
        match mode {
            PrivateMode::Named(NamedPrivateMode::Origin) => self.display.origin_mode = false,
            PrivateMode::Named(NamedPrivateMode::ScreenReverse) => {
                self.display.reverse_video_screen = false
            },
            PrivateMode::Named(NamedPrivateMode::CursorKeys) => {
                self.display.arrow_keys_mode = ArrowKeysMode::Normal
            },
            _ => {},
        }
    }

    fn set_window_title(&mut self, _title: &str) {}
}

/// The ANSI/VT family emulator: generalizes VT100/VT102/VT220/LINUX/XTERM
/// (8-bit and UTF-8) over the shared tokenizer.
pub struct AnsiEmulator {
    kind: EmulationKind,
    parser: Parser,
    /// Characters still queued from a single byte that printed more than
    /// one (only possible via charset mapping); drained on sentinel
    /// re-drives per the `ManyChars` protocol.
    pending: VecDeque<char>,
    pending_char: Option<char>,
}

impl AnsiEmulator {
    pub fn new(kind: EmulationKind) -> Self {
        Self {
            kind,
            parser: Parser::new(),
            pending: VecDeque::new(),
            pending_char: None,
        }
    }
}

impl Emulator for AnsiEmulator {
    fn kind(&self) -> EmulationKind {
        self.kind
    }

    fn reset(&mut self, display: &mut DisplayState) {
        self.parser = Parser::new();
        self.pending.clear();
        self.pending_char = None;
        display.reset_for(self.kind);
    }

    fn feed(&mut self, byte: u8, display: &mut DisplayState) -> EmitOutcome {
        if let Some(c) = self.pending.pop_front() {
            return self.emit_or_queue(c);
        }

        let mut queue = VecDeque::new();
        {
            let mut adapter = Adapter { display, queue: &mut queue };
            if !adapter.display.has_wide_font {
                adapter.request_double_width();
            }
            self.parser.advance(&[byte], &mut adapter);
        }

        match queue.len() {
            0 => EmitOutcome::NoCharYet,
            1 => EmitOutcome::OneChar(queue.pop_front().unwrap()),
            _ => {
                self.pending = queue;
                let c = self.pending.pop_front().unwrap();
                self.emit_or_queue(c)
            },
        }
    }

    fn encode_key(&self, event: &KeyEvent, display: &DisplayState) -> Option<Vec<u8>> {
        keymap::encode_ansi(event, display.arrow_keys_mode, display.keypad_mode)
            .as_bytes()
            .map(|b| b.to_vec())
    }

    fn take_many_char(&mut self) -> Option<char> {
        self.pending_char.take()
    }
}

impl AnsiEmulator {
    /// `c` is the next character off `self.pending`: report it directly if
    /// it was the last one, otherwise stash it for `take_many_char` and
    /// signal the caller to re-drive.
    fn emit_or_queue(&mut self, c: char) -> EmitOutcome {
        if self.pending.is_empty() {
            EmitOutcome::OneChar(c)
        } else {
            self.pending_char = Some(c);
            EmitOutcome::ManyChars
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_str(emulator: &mut AnsiEmulator, display: &mut DisplayState, s: &str) -> Vec<char> {
        let mut out = Vec::new();
        for &byte in s.as_bytes() {
            if let EmitOutcome::OneChar(c) = emulator.feed(byte, display) {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn prints_plain_text() {
        let mut emulator = AnsiEmulator::new(EmulationKind::Vt100);
        let mut display = DisplayState::default();
        assert_eq!(feed_str(&mut emulator, &mut display, "hi"), vec!['h', 'i']);
    }

    #[test]
    fn sgr_updates_attributes_without_printing() {
        let mut emulator = AnsiEmulator::new(EmulationKind::Ansi);
        let mut display = DisplayState::default();
        let out = feed_str(&mut emulator, &mut display, "\x1b[31m");
        assert!(out.is_empty());
        assert_eq!(
            display.attributes.foreground,
            crate::color::Color::Std(crate::color::StdColor::Red)
        );
    }

    #[test]
    fn decscnm_sets_screen_reverse() {
        let mut emulator = AnsiEmulator::new(EmulationKind::Xterm);
        let mut display = DisplayState::default();
        feed_str(&mut emulator, &mut display, "\x1b[?5h");
        assert!(display.reverse_video_screen);
    }

    #[test]
    fn narrow_font_requests_double_width_every_feed() {
        let mut emulator = AnsiEmulator::new(EmulationKind::Vt100);
        let mut display = DisplayState::default();
        display.has_wide_font = false;
        emulator.feed(b'h', &mut display);
        assert!(display.double_width_requested);
    }

    #[test]
    fn wide_font_does_not_request_double_width() {
        let mut emulator = AnsiEmulator::new(EmulationKind::Vt100);
        let mut display = DisplayState::default();
        display.has_wide_font = true;
        emulator.feed(b'h', &mut display);
        assert!(!display.double_width_requested);
    }

    #[test]
    fn cursor_position_is_one_indexed() {
        let mut emulator = AnsiEmulator::new(EmulationKind::Vt100);
        let mut display = DisplayState::default();
        feed_str(&mut emulator, &mut display, "\x1b[5;10H");
        assert_eq!(display.cursor_row, 4);
        assert_eq!(display.cursor_col, 9);
    }
}
