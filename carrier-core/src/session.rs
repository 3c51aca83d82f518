//! Session orchestration (spec §4.7): the single ownership root tying the
//! active emulator, the protocol dispatcher, the optional script bridge, and
//! resolved configuration together in place of the source's module-level
//! globals (§9).

use std::path::Path;
use std::time::Instant;

use carrier_escape::{DisplayState, EmitOutcome, EmulationKind, Emulator, KeyEvent, create_emulator};
use carrier_transfer::{AsciiTransferConfig, Direction, ProtocolDispatcher, ProtocolKind, TransferEngine, TransferError};

use crate::beep::BeepThrottle;
use crate::config::ConfigOptions;
use crate::error::CoreError;
use crate::script::{ConsolePath, ScriptBridge, ScriptEnv, ScriptError};
use crate::scroll::STATUS_PANE_LINES;

/// Feed one byte through `emulator`, resolving the `ManyChars` re-drive
/// protocol into a flat list of produced characters.
fn drive_emulator(emulator: &mut dyn Emulator, display: &mut DisplayState, byte: u8) -> Vec<char> {
    let mut out = Vec::new();
    match emulator.feed(byte, display) {
        EmitOutcome::NoCharYet => {},
        EmitOutcome::OneChar(c) => out.push(c),
        EmitOutcome::Repeat(c, n) => out.extend(std::iter::repeat(c).take(n)),
        EmitOutcome::ManyChars => loop {
            if let Some(c) = emulator.take_many_char() {
                out.push(c);
            }
            match emulator.feed(0, display) {
                EmitOutcome::NoCharYet => break,
                EmitOutcome::OneChar(c) => {
                    out.push(c);
                    break;
                },
                EmitOutcome::Repeat(c, n) => {
                    out.extend(std::iter::repeat(c).take(n));
                    break;
                },
                EmitOutcome::ManyChars => continue,
            }
        },
    }
    out
}

/// Borrows only the two `Session` fields the console path needs, so the
/// script bridge (borrowed separately) and this borrow can coexist.
struct ConsoleBridge<'a> {
    emulator: &'a mut dyn Emulator,
    display: &'a mut DisplayState,
}

impl ConsolePath for ConsoleBridge<'_> {
    fn feed_console_byte(&mut self, byte: u8) -> Vec<char> {
        drive_emulator(self.emulator, self.display, byte)
    }
}

/// Single ownership root for one terminal session: display state, active
/// emulator, transfer dispatcher, optional script co-process, and resolved
/// configuration. All operations that the distilled source expressed as
/// acting on implicit globals instead take `&mut Session`.
pub struct Session {
    display: DisplayState,
    emulator: Box<dyn Emulator>,
    dispatcher: ProtocolDispatcher,
    script: Option<ScriptBridge>,
    config: ConfigOptions,
    beep: BeepThrottle,
    transfer_active: bool,
}

impl Session {
    pub fn new(kind: EmulationKind, rows: u16, cols: u16, config: ConfigOptions) -> Self {
        Self {
            display: DisplayState::new(rows, cols),
            emulator: create_emulator(kind),
            dispatcher: ProtocolDispatcher::new(),
            script: None,
            config,
            beep: BeepThrottle::new(),
            transfer_active: false,
        }
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn dispatcher(&self) -> &ProtocolDispatcher {
        &self.dispatcher
    }

    pub fn config(&self) -> &ConfigOptions {
        &self.config
    }

    pub fn emulation_kind(&self) -> EmulationKind {
        self.emulator.kind()
    }

    pub fn is_script_active(&self) -> bool {
        self.script.is_some()
    }

    pub fn is_transfer_active(&self) -> bool {
        self.transfer_active
    }

    /// Swap the active emulator, fully resetting display state owned by the
    /// outgoing one.
    pub fn switch_emulator(&mut self, kind: EmulationKind) {
        self.emulator = create_emulator(kind);
        self.emulator.reset(&mut self.display);
    }

    /// Encode a logical key event for the active emulator.
    pub fn encode_key(&self, event: &KeyEvent) -> Option<Vec<u8>> {
        self.emulator.encode_key(event, &self.display)
    }

    /// Returns `true` at most once per wall-clock second, even if the
    /// display state has signaled more than one pending bell meanwhile.
    pub fn take_beep(&mut self) -> bool {
        if !self.display.bell_pending {
            return false;
        }
        self.display.bell_pending = false;
        self.beep.gate(Instant::now())
    }

    pub fn start_ascii_transfer(
        &mut self,
        config: AsciiTransferConfig,
        direction: Direction,
        path: &Path,
    ) -> Result<(), TransferError> {
        self.dispatcher.start_ascii(config, direction, path)?;
        self.transfer_active = true;
        Ok(())
    }

    pub fn start_engine_transfer(&mut self, protocol: ProtocolKind, engine: Box<dyn TransferEngine>) {
        self.dispatcher.start_engine(protocol, engine);
        self.transfer_active = true;
    }

    pub fn cancel_transfer(&mut self, save_partial: bool) {
        self.dispatcher.cancel(save_partial);
    }

    /// Release the current transfer, returning to the console state.
    pub fn return_to_console(&mut self) {
        self.dispatcher.return_to_console();
        self.transfer_active = false;
    }

    /// Spawn a script co-process. `LINES`/`COLUMNS` are derived from the
    /// current screen geometry, minus the status pane height (§4.4).
    pub fn start_script(&mut self, path: &Path, term: Option<String>) -> Result<(), ScriptError> {
        let env = ScriptEnv {
            term,
            lines: self.display.rows.saturating_sub(STATUS_PANE_LINES as u16),
            columns: self.display.cols,
            lang: self.config.utf8_locale.clone(),
        };
        let output_translate_table = if self.config.ascii_transfer.download_use_translate_table {
            Some(self.config.ascii_transfer.download_translate_table)
        } else {
            None
        };
        let bridge = ScriptBridge::start(
            path,
            &env,
            &self.config.scripts_dir,
            self.display.cols as usize,
            output_translate_table,
            self.emulator.kind().is_utf8(),
        )?;
        self.script = Some(bridge);
        Ok(())
    }

    pub fn pause_script(&mut self) {
        if let Some(script) = self.script.as_mut() {
            script.pause();
        }
    }

    pub fn resume_script(&mut self) {
        if let Some(script) = self.script.as_mut() {
            script.resume();
        }
    }

    /// Terminate the active script, if any, and drop it.
    pub fn stop_script(&mut self) -> Result<(), ScriptError> {
        if let Some(mut script) = self.script.take() {
            script.stop()?;
        }
        Ok(())
    }

    /// Drive one tick of the session (spec §5): route `input` to the active
    /// transfer protocol when one is running, otherwise through the script
    /// bridge (if any) and the console path.
    pub fn tick(
        &mut self,
        input: &[u8],
        remaining: &mut usize,
        output: &mut [u8],
        output_written: &mut usize,
    ) -> Result<(), CoreError> {
        if self.transfer_active {
            self.dispatcher.process_data(input, remaining, output, output_written)?;
            if self.dispatcher.stats().phase().is_terminal() {
                self.transfer_active = false;
            }
            return Ok(());
        }

        if let Some(script) = self.script.as_mut() {
            let mut console = ConsoleBridge { emulator: self.emulator.as_mut(), display: &mut self.display };
            script.process_data(input, remaining, output, output_written, &mut console)?;
            if script.is_dead() {
                self.script = None;
            }
            return Ok(());
        }

        *output_written = 0;
        for &byte in input {
            drive_emulator(self.emulator.as_mut(), &mut self.display, byte);
        }
        *remaining = 0;
        Ok(())
    }
}

impl ConsolePath for Session {
    fn feed_console_byte(&mut self, byte: u8) -> Vec<char> {
        drive_emulator(self.emulator.as_mut(), &mut self.display, byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feeds_ascii_through_ansi_emulator() {
        let mut session = Session::new(EmulationKind::Ansi, 24, 80, ConfigOptions::default());
        let mut remaining = 0;
        let mut output = [0u8; 16];
        let mut written = 0;
        session.tick(b"hi", &mut remaining, &mut output, &mut written).unwrap();
        assert_eq!(remaining, 0);
    }

    #[test]
    fn switching_emulator_resets_display_geometry() {
        let mut session = Session::new(EmulationKind::Ansi, 24, 80, ConfigOptions::default());
        session.display.cursor_row = 5;
        session.switch_emulator(EmulationKind::Atascii);
        assert_eq!(session.emulation_kind(), EmulationKind::Atascii);
        assert_eq!(session.display().cursor_row, 0);
    }

    #[test]
    fn bell_byte_sets_pending_and_beep_gate_throttles() {
        let mut session = Session::new(EmulationKind::Ansi, 24, 80, ConfigOptions::default());
        let mut remaining = 0;
        let mut output = [0u8; 16];
        let mut written = 0;
        session.tick(&[0x07], &mut remaining, &mut output, &mut written).unwrap();
        assert!(session.take_beep());
        // bell_pending was cleared by take_beep; a second call without a
        // fresh BEL byte reports no pending bell at all.
        assert!(!session.take_beep());
    }

    #[test]
    fn transfer_start_marks_session_active_until_terminal() {
        let dir = std::env::temp_dir().join(format!(
            "carrier-core-session-{:?}",
            std::thread::current().id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("f.txt");
        std::fs::write(&path, b"abc").unwrap();

        let mut session = Session::new(EmulationKind::Ansi, 24, 80, ConfigOptions::default());
        session
            .start_ascii_transfer(AsciiTransferConfig::default(), Direction::Upload, &path)
            .unwrap();
        assert!(session.is_transfer_active());

        let mut remaining = 0;
        let mut output = [0u8; 4096];
        let mut written = 0;
        for _ in 0..8 {
            session.tick(&[], &mut remaining, &mut output, &mut written).unwrap();
            if !session.is_transfer_active() {
                break;
            }
        }
        assert!(!session.is_transfer_active());

        let _ = std::fs::remove_file(&path);
    }
}
