//! Operating system command recognition.
//!
//! Only window-title setting is in scope; every other OSC sequence is
//! recognized and ignored.

use crate::actor::Actor;
use log::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperatingSystemCommand {
    SetWindowTitle,
    Unhandled,
}

impl From<&[u8]> for OperatingSystemCommand {
    fn from(action: &[u8]) -> Self {
        match action {
            b"0" | b"2" => Self::SetWindowTitle,
            _ => Self::Unhandled,
        }
    }
}

/// Dispatch a parsed OSC sequence to `actor`. `params[0]` is the numeric
/// code; the window-title text, if any, is the last parameter.
pub(crate) fn perform<A: Actor>(actor: &mut A, params: &[&[u8]]) {
    let Some(&code) = params.first() else {
        return;
    };

    match OperatingSystemCommand::from(code) {
        OperatingSystemCommand::SetWindowTitle => {
            if let Some(title) = params.get(1) {
                match std::str::from_utf8(title) {
                    Ok(title) => actor.set_window_title(title),
                    Err(_) => debug!("[osc] window title was not valid utf-8"),
                }
            }
        },
        OperatingSystemCommand::Unhandled => {
            debug!("[unexpected osc] params: {:?}", params);
        },
    }
}
