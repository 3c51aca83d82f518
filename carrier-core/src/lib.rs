//! Session orchestration: ties the emulator registry (`carrier-escape`) and
//! the protocol dispatcher (`carrier-transfer`) into a single ownership
//! root, and owns the two pieces neither of those crates is responsible
//! for — the script subprocess bridge and typed configuration loading.

mod beep;
mod config;
mod error;
#[cfg(unix)]
mod poller;
mod script;
mod scroll;
mod session;
mod utf8;

pub use config::ConfigOptions;
pub use error::{CoreError, ScriptError};
#[cfg(unix)]
pub use poller::SessionPoller;
pub use script::{ConsolePath, ScriptBridge, ScriptEnv, ScriptStatus, PRINT_BUFFER_CAPACITY};
pub use scroll::{STATUS_PANE_LINES, ScrollBuffer, ScrollLine};
pub use session::Session;
pub use utf8::{DecodeEvent, Utf8Decoder, encode_utf8};
