//! High-level escape sequence consumer interface for the ANSI/VT family.
//!
//! [`AnsiParser`](crate::parser::AnsiParser) translates the raw byte stream
//! into semantic events and relays them to an [`Actor`] implementation. The
//! [`AnsiEmulator`](crate::emulation::AnsiEmulator) implements this trait to
//! mutate a [`DisplayState`](crate::display::DisplayState); the ATASCII
//! parser's fallback path reuses the same parser and therefore the same
//! `Actor`.

use crate::charset::{Charset, CharsetIndex};
use crate::mode::{ClearMode, LineClearMode, Mode, PrivateMode};

/// Trait implemented by consumers of the escape sequence parser.
///
/// All methods have a default empty implementation so that downstream crates
/// only need to override the variants they actually care about. The parser
/// invokes these callbacks synchronously while it walks through the input
/// byte stream.
pub trait Actor {
    /// Emits a printable Unicode scalar value.
    fn print(&mut self, _: char) {}

    fn backspace(&mut self) {}

    fn bell(&mut self) {}

    /// Requests the external display layer switch to double-width glyph
    /// rendering. Invoked once per `feed` call whenever the active font is
    /// not already wide.
    fn request_double_width(&mut self) {}

    fn substitute(&mut self) {}

    fn set_active_charset(&mut self, _: CharsetIndex) {}

    fn configure_charset(&mut self, _index: CharsetIndex, _charset: Charset) {}

    fn linefeed(&mut self) {}

    fn carriage_return(&mut self) {}

    fn horizontal_tab(&mut self) {}

    fn next_line(&mut self) {}

    fn reverse_index(&mut self) {}

    fn full_reset(&mut self) {}

    fn save_cursor_position(&mut self) {}

    fn restore_cursor_position(&mut self) {}

    fn screen_alignment_display(&mut self) {}

    fn set_keypad_application_mode(&mut self) {}

    fn set_keypad_numeric_mode(&mut self) {}

    fn cursor_up(&mut self, _count: i64) {}

    fn cursor_down(&mut self, _count: i64) {}

    fn cursor_forward(&mut self, _count: i64) {}

    fn cursor_backward(&mut self, _count: i64) {}

    fn cursor_position(&mut self, _row: i64, _col: i64) {}

    fn erase_line(&mut self, _mode: LineClearMode) {}

    fn erase_display(&mut self, _mode: ClearMode) {}

    fn set_scroll_region(&mut self, _top: i64, _bottom: i64) {}

    fn select_graphic_rendition(&mut self, _params: &[i64]) {}

    fn set_mode(&mut self, _mode: Mode) {}

    fn unset_mode(&mut self, _mode: Mode) {}

    fn set_private_mode(&mut self, _mode: PrivateMode) {}

    fn unset_private_mode(&mut self, _mode: PrivateMode) {}

    fn set_window_title(&mut self, _title: &str) {}
}
