//! Shared display-state invariants mutated by every emulation parser.
//!
//! A single [`DisplayState`] is owned by the [`Session`](../carrier_core/struct.Session.html)
//! ownership root and mutated only by whichever [`Emulator`](crate::emulation::Emulator)
//! is currently active. It is reset wholesale whenever the active emulation changes.

use crate::charset::{Charset, CharsetIndex};
use crate::color::Color;
use crate::emulation::EmulationKind;

/// Graphic rendition attributes attached to a cell at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphicRendition {
    pub bold: bool,
    pub blink: bool,
    pub underline: bool,
    pub reverse: bool,
    pub protect: bool,
    pub altcharset: bool,
    pub foreground: Color,
    pub background: Color,
}

impl Default for GraphicRendition {
    fn default() -> Self {
        Self {
            bold: false,
            blink: false,
            underline: false,
            reverse: false,
            protect: false,
            altcharset: false,
            foreground: Color::Default,
            background: Color::Default,
        }
    }
}

impl GraphicRendition {
    /// SGR 0: reset to the default rendition.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Keypad mode, toggled by DECPAM/DECPNM (ESC `=` / ESC `>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeypadMode {
    #[default]
    Numeric,
    Application,
}

/// Cursor key mode, toggled by DECCKM (CSI `?1h`/`?1l`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrowKeysMode {
    #[default]
    Normal,
    Application,
}

/// Process-wide mutable state for the currently active emulator.
///
/// Created once per [`Session`](../carrier_core/struct.Session.html) and reset
/// (but not reallocated) whenever [`DisplayState::reset_for`] is called on an
/// emulator switch.
#[derive(Debug, Clone)]
pub struct DisplayState {
    pub cursor_row: u16,
    pub cursor_col: u16,
    pub scroll_top: u16,
    pub scroll_bottom: u16,
    pub attributes: GraphicRendition,
    pub origin_mode: bool,
    pub wrap_pending: bool,
    pub new_line_mode: bool,
    /// DECSCNM: whole-screen reverse video.
    pub reverse_video_screen: bool,
    pub arrow_keys_mode: ArrowKeysMode,
    pub keypad_mode: KeypadMode,
    pub atascii_color: bool,
    pub atascii_ansi_fallback: bool,
    pub has_wide_font: bool,
    pub rows: u16,
    pub cols: u16,
    /// G0..G3 designations, indexed by [`CharsetIndex`].
    pub charsets: [Charset; 4],
    pub active_charset: CharsetIndex,
    /// DECSC/DECRC save slot.
    pub saved_cursor: Option<(u16, u16)>,
    /// Set by a BEL byte; cleared once the owning `Session` has consumed it
    /// through its beep throttle. Not reset by emulator switch.
    pub bell_pending: bool,
    /// Set whenever `has_wide_font` was false on the most recent `feed`
    /// call, requesting the external display layer switch to double-width
    /// rendering. The display layer clears it once handled.
    pub double_width_requested: bool,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            cursor_row: 0,
            cursor_col: 0,
            scroll_top: 0,
            scroll_bottom: 23,
            attributes: GraphicRendition::default(),
            origin_mode: false,
            wrap_pending: false,
            new_line_mode: false,
            reverse_video_screen: false,
            arrow_keys_mode: ArrowKeysMode::Normal,
            keypad_mode: KeypadMode::Numeric,
            atascii_color: true,
            atascii_ansi_fallback: true,
            has_wide_font: true,
            rows: 24,
            cols: 80,
            charsets: [Charset::Ascii; 4],
            active_charset: CharsetIndex::G0,
            saved_cursor: None,
            bell_pending: false,
            double_width_requested: false,
        }
    }
}

impl DisplayState {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            rows,
            cols,
            scroll_bottom: rows.saturating_sub(1),
            ..Self::default()
        }
    }

    /// Reset every field owned by the emulator that is about to become
    /// active, preserving the screen geometry.
    pub fn reset_for(&mut self, _kind: EmulationKind) {
        let (rows, cols) = (self.rows, self.cols);
        let bell_pending = self.bell_pending;
        *self = Self::new(rows, cols);
        self.bell_pending = bell_pending;
    }
}

/// Emulations for which a cell's resolved reverse bit is the XOR of its own
/// `REVERSE` attribute with the screen-wide DECSCNM flag.
fn xors_with_decscnm(kind: EmulationKind) -> bool {
    use EmulationKind::*;
    matches!(
        kind,
        Ansi | Avatar
            | Petscii
            | Vt100
            | Vt102
            | Vt220
            | Linux
            | LinuxUtf8
            | Xterm
            | XtermUtf8
            | Atascii
    )
}

/// Resolve the final reverse-video state and color pair for a cell's
/// rendition, given the screen-wide DECSCNM flag.
///
/// For `Tty`/`Vt52`/`Debug` the attribute is returned unchanged. For every
/// other emulation the local `REVERSE` bit is combined with `screen_reverse`
/// by XOR; the returned rendition never has `reverse` set — instead the
/// foreground/background colors are swapped when the combined value is true.
pub fn resolve_reverse_video(
    kind: EmulationKind,
    screen_reverse: bool,
    mut attrs: GraphicRendition,
) -> GraphicRendition {
    if !xors_with_decscnm(kind) {
        return attrs;
    }

    let resolved = attrs.reverse ^ screen_reverse;
    attrs.reverse = false;

    if resolved {
        std::mem::swap(&mut attrs.foreground, &mut attrs.background);
    }

    attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::StdColor;

    #[test]
    fn tty_never_xors() {
        let mut attrs = GraphicRendition::default();
        attrs.reverse = true;
        let resolved = resolve_reverse_video(EmulationKind::Tty, true, attrs);
        assert!(resolved.reverse);
    }

    #[test]
    fn ansi_xors_and_swaps_colors() {
        let mut attrs = GraphicRendition::default();
        attrs.foreground = Color::Std(StdColor::Red);
        attrs.background = Color::Std(StdColor::Blue);
        attrs.reverse = true;

        // local REVERSE true, screen_reverse true -> XOR false -> no swap
        let resolved = resolve_reverse_video(EmulationKind::Ansi, true, attrs);
        assert!(!resolved.reverse);
        assert_eq!(resolved.foreground, Color::Std(StdColor::Red));

        // local REVERSE true, screen_reverse false -> XOR true -> swap
        let resolved = resolve_reverse_video(EmulationKind::Ansi, false, attrs);
        assert!(!resolved.reverse);
        assert_eq!(resolved.foreground, Color::Std(StdColor::Blue));
        assert_eq!(resolved.background, Color::Std(StdColor::Red));
    }
}
