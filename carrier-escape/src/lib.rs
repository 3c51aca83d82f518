//! Escape-sequence interpretation shared by every terminal emulation.
//!
//! [`parser::Parser`] tokenizes a byte stream with [`carrier_vte`] and drives a
//! domain-level [`actor::Actor`]; [`emulation`] wraps that into the
//! `Emulator` contract the rest of the workspace depends on, with
//! [`ansi::AnsiEmulator`] covering the whole VT100/VT102/VT220/LINUX/XTERM/
//! AVATAR/PETSCII family and [`atascii::AtasciiEmulator`] covering ATASCII
//! with an ANSI fallback.

mod actor;
mod ansi;
mod atascii;
mod charset;
mod color;
mod control;
mod csi;
mod display;
mod emulation;
mod error;
mod esc;
mod keyboard;
mod keymap;
mod mode;
mod osc;
mod parser;
mod sgr;

pub use actor::Actor;
pub use ansi::AnsiEmulator;
pub use atascii::AtasciiEmulator;
pub use charset::{Charset, CharsetIndex};
pub use color::{Color, StdColor};
pub use display::{ArrowKeysMode, DisplayState, GraphicRendition, KeypadMode, resolve_reverse_video};
pub use emulation::{EmitOutcome, EmulationKind, Emulator, create_emulator};
pub use error::EmulationError;
pub use keyboard::{KeyEvent, NamedKey};
pub use keymap::{EncodedKey, encode_ansi, encode_atascii};
pub use mode::*;
pub use carrier_vte as vte;
pub use parser::Parser;
