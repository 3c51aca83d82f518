//! Emulation registry: the set of supported terminal dialects and the
//! `Emulator`/`EmitOutcome` contract every parser implements.

use crate::display::DisplayState;
use crate::keyboard::KeyEvent;

/// Every terminal dialect the core can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmulationKind {
    Tty,
    Vt52,
    Debug,
    Ansi,
    Avatar,
    Petscii,
    Vt100,
    Vt102,
    Vt220,
    Linux,
    LinuxUtf8,
    Xterm,
    XtermUtf8,
    Atascii,
}

impl EmulationKind {
    /// Whether this dialect decodes its byte stream as UTF-8 rather than
    /// treating each byte as one cell.
    pub fn is_utf8(self) -> bool {
        matches!(self, Self::LinuxUtf8 | Self::XtermUtf8)
    }
}

/// Result of feeding a single byte to an [`Emulator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitOutcome {
    /// The byte was consumed but produced no displayable character (it was
    /// buffered, or altered display state, or is part of an incomplete
    /// sequence).
    NoCharYet,
    /// The byte completed exactly one displayable character.
    OneChar(char),
    /// The byte is one of several the caller must re-drive the parser for;
    /// see the per-emulator documentation for the re-drive protocol.
    ManyChars,
    /// `c` should be emitted `n` times in a row (REP-style repetition).
    Repeat(char, usize),
}

/// A terminal-dialect byte-stream decoder and keystroke encoder.
///
/// An `Emulator` never owns the [`DisplayState`] it mutates: the owning
/// `Session` holds one `DisplayState` and swaps the active `Emulator` trait
/// object, calling [`Emulator::reset`] on every switch so the two stay in
/// sync without the state being reallocated.
pub trait Emulator {
    fn kind(&self) -> EmulationKind;

    /// Restore the emulator's internal scan state and the parts of
    /// `display` this emulation owns exclusively.
    fn reset(&mut self, display: &mut DisplayState);

    /// Consume one byte. Must never panic on any input.
    fn feed(&mut self, byte: u8, display: &mut DisplayState) -> EmitOutcome;

    /// Encode a logical key event into outbound bytes, or `None` if this
    /// emulation has no mapping for it.
    fn encode_key(&self, event: &KeyEvent, display: &DisplayState) -> Option<Vec<u8>>;

    /// Retrieve the character produced by the most recent `ManyChars`
    /// outcome. Only meaningful immediately after `feed` returns
    /// `EmitOutcome::ManyChars`; the re-drive protocol for each emulator is
    /// documented alongside its `feed` implementation.
    fn take_many_char(&mut self) -> Option<char> {
        None
    }
}

/// Build the `Emulator` for `kind`. `Atascii` gets its dedicated parser with
/// an ANSI-fallback sibling; every other dialect is a parameterization of
/// the shared ANSI/VT-family parser (including `Tty`/`Vt52`/`Debug`, whose
/// only distinguishing behavior is in [`crate::display::resolve_reverse_video`]).
pub fn create_emulator(kind: EmulationKind) -> Box<dyn Emulator> {
    match kind {
        EmulationKind::Atascii => Box::new(crate::atascii::AtasciiEmulator::new()),
        other => Box::new(crate::ansi::AnsiEmulator::new(other)),
    }
}
