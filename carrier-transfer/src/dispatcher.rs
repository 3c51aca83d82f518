//! Protocol dispatcher (spec §4.2): multiplexes the bidirectional byte
//! stream between the ASCII transfer engine and the pluggable serialized
//! protocol engines, and owns the phase-transition/logging policy shared by
//! all of them.

use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use log::{error, info};

use crate::ascii::{AsciiTransferConfig, AsciiTransferEngine, Direction, StepOutcome};
use crate::engine::{EngineStep, TransferEngine};
use crate::error::TransferError;
use crate::stats::{Phase, ProtocolKind, TransferStats};

/// How long a transient I/O condition may persist, with no intervening
/// success, before the dispatcher escalates it to an abort (spec §7).
const STALL_TIMEOUT: Duration = Duration::from_secs(3);

/// Owns the active transfer (if any) and arbitrates byte flow for it.
///
/// A single instance lives for the lifetime of a `Session`
/// (`carrier-core`); `stats` is reset back to its idle `Ascii`/`Init` shape
/// whenever the dispatcher returns to the console state.
pub struct ProtocolDispatcher {
    stats: TransferStats,
    ascii: Option<(AsciiTransferEngine, Direction)>,
    engine: Option<Box<dyn TransferEngine>>,
    batch_continues: bool,
    stalled_since: Option<Instant>,
}

impl ProtocolDispatcher {
    pub fn new() -> Self {
        Self {
            stats: TransferStats::new(ProtocolKind::Ascii),
            ascii: None,
            engine: None,
            batch_continues: false,
            stalled_since: None,
        }
    }

    pub fn stats(&self) -> &TransferStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut TransferStats {
        &mut self.stats
    }

    /// Start an ASCII transfer against `path`.
    pub fn start_ascii(
        &mut self,
        config: AsciiTransferConfig,
        direction: Direction,
        path: &Path,
    ) -> Result<(), TransferError> {
        self.stats.reset(ProtocolKind::Ascii);
        let engine = AsciiTransferEngine::start(config, direction, path, &mut self.stats)?;
        self.ascii = Some((engine, direction));
        self.engine = None;
        self.stalled_since = None;

        match direction {
            Direction::Upload => info!(
                "UPLOAD BEGIN: protocol {}, filename {}",
                self.stats.protocol_name(),
                self.stats.filename()
            ),
            Direction::Download => info!(
                "DOWNLOAD BEGIN: protocol {}, filename {}",
                self.stats.protocol_name(),
                self.stats.filename()
            ),
        }

        Ok(())
    }

    /// Hand off to a serialized protocol engine (Xmodem/Ymodem/Zmodem/Kermit
    /// family); the engine itself is implemented outside this crate.
    pub fn start_engine(&mut self, protocol: ProtocolKind, engine: Box<dyn TransferEngine>) {
        self.stats.reset(protocol);
        self.ascii = None;
        self.engine = Some(engine);
        self.stalled_since = None;
        info!(
            "DOWNLOAD BEGIN: protocol {}, filename {}",
            self.stats.protocol_name(),
            self.stats.filename()
        );
    }

    /// Drive the active transfer by one tick.
    ///
    /// `remaining` reports how many bytes of `input` the engine left
    /// unconsumed (always `0` for Ascii/Zmodem/Kermit, which either ignore
    /// `input` outright or buffer internally).
    pub fn process_data(
        &mut self,
        input: &[u8],
        remaining: &mut usize,
        output: &mut [u8],
        output_written: &mut usize,
    ) -> Result<(), TransferError> {
        *output_written = 0;
        *remaining = 0;

        if self.stats.phase().is_terminal() {
            return Ok(());
        }

        if self.stats.phase() == Phase::FileDone {
            self.advance_after_file_done();
            return Ok(());
        }

        if let Some((ascii, direction)) = self.ascii.as_mut() {
            let result = match direction {
                Direction::Upload => ascii.upload_step(&mut self.stats, output, output_written),
                Direction::Download => {
                    ascii.download_step(&mut self.stats, input).map(|_| StepOutcome::Continue)
                },
            };
            let outcome = self.gate_stall(result)?;
            if outcome == StepOutcome::Done {
                self.finish_file();
            }
            return Ok(());
        }

        let protocol = self.stats.protocol();
        let Some(engine) = self.engine.as_mut() else {
            return Err(TransferError::NotStarted);
        };

        let result = engine.process(input, output, &mut self.stats);
        let (consumed, written, step) = self.gate_stall(result)?;
        *output_written = written;
        if !protocol.consumes_all_input() {
            *remaining = input.len().saturating_sub(consumed);
        }

        match step {
            EngineStep::Continue => {},
            EngineStep::FileComplete => self.finish_file(),
            EngineStep::Fatal => {
                error!(
                    "transfer aborted: protocol {}, filename {}: {}",
                    self.stats.protocol_name(),
                    self.stats.filename(),
                    self.stats.last_message()
                );
                self.stats.set_phase(Phase::Abort);
            },
        }

        Ok(())
    }

    /// User-initiated cancel from the transfer UI.
    pub fn cancel(&mut self, save_partial: bool) {
        if let Some(engine) = self.engine.as_mut() {
            engine.abort(save_partial, &mut self.stats);
        }
        self.stats.set_phase(Phase::Abort);
    }

    /// Mark the batch as continuing (another file follows `FileDone`)
    /// rather than ending. Batch-protocol engines call this as part of
    /// reporting `FileComplete` when they know more files remain.
    pub fn set_batch_continues(&mut self, continues: bool) {
        self.batch_continues = continues;
    }

    /// Release the current transfer, returning the dispatcher to the
    /// console state. Frees the owned strings in `stats` by ordinary drop.
    pub fn return_to_console(&mut self) {
        self.ascii = None;
        self.engine = None;
        self.stats.reset(ProtocolKind::Ascii);
        self.stalled_since = None;
    }

    /// Tracks a [`TransferError::TransientIo`] condition across calls;
    /// escalates to `Abort`/[`TransferError::Timeout`] once it has
    /// persisted past [`STALL_TIMEOUT`] with no intervening success.
    fn gate_stall<T>(&mut self, result: Result<T, TransferError>) -> Result<T, TransferError> {
        match result {
            Err(TransferError::TransientIo) => {
                let since = *self.stalled_since.get_or_insert_with(Instant::now);
                if since.elapsed() >= STALL_TIMEOUT {
                    error!(
                        "transfer aborted: protocol {}, filename {}: no forward progress for over {}s",
                        self.stats.protocol_name(),
                        self.stats.filename(),
                        STALL_TIMEOUT.as_secs()
                    );
                    self.stats.set_phase(Phase::Abort);
                    self.stalled_since = None;
                    return Err(TransferError::Timeout);
                }
                Err(TransferError::TransientIo)
            },
            other => {
                self.stalled_since = None;
                other
            },
        }
    }

    /// Called when the current file finishes. Stops at `FileDone` for one
    /// tick; the next call to [`process_data`](Self::process_data) resolves
    /// it onward via [`advance_after_file_done`](Self::advance_after_file_done).
    fn finish_file(&mut self) {
        let filesize = self.stats.bytes_transfer;
        self.stats.set_phase(Phase::FileDone);
        info!(
            "UPLOAD FILE COMPLETE: protocol {}, filename {}, filesize {}",
            self.stats.protocol_name(),
            self.stats.filename(),
            filesize
        );
    }

    fn advance_after_file_done(&mut self) {
        if self.stats.protocol().is_batch() && self.batch_continues {
            self.stats.set_phase(Phase::Transfer);
        } else {
            self.stats.end_time.get_or_insert_with(std::time::SystemTime::now);
            self.stats.set_phase(Phase::End);
        }
    }
}

impl Default for ProtocolDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an owned protocol-display name, for callers constructing a custom
/// [`TransferStats`] outside of [`ProtocolDispatcher::start_ascii`]/
/// [`ProtocolDispatcher::start_engine`].
pub fn protocol_display_name(protocol: ProtocolKind) -> Rc<str> {
    Rc::from(protocol.display_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_op_when_terminal() {
        let mut dispatcher = ProtocolDispatcher::new();
        dispatcher.stats_mut().set_phase(Phase::End);
        let mut remaining = 0;
        let mut output = [0u8; 16];
        let mut written = 0;
        dispatcher
            .process_data(b"abc", &mut remaining, &mut output, &mut written)
            .unwrap();
        assert_eq!(written, 0);
        assert_eq!(remaining, 0);
    }

    #[test]
    fn process_without_start_is_not_started_error() {
        let mut dispatcher = ProtocolDispatcher::new();
        dispatcher.stats_mut().set_phase(Phase::FileInfo);
        let mut remaining = 0;
        let mut output = [0u8; 16];
        let mut written = 0;
        let result = dispatcher.process_data(b"abc", &mut remaining, &mut output, &mut written);
        assert!(matches!(result, Err(TransferError::NotStarted)));
    }

    struct StallingEngine;

    impl TransferEngine for StallingEngine {
        fn process(
            &mut self,
            _input: &[u8],
            _output: &mut [u8],
            _stats: &mut TransferStats,
        ) -> Result<(usize, usize, EngineStep), TransferError> {
            Err(TransferError::TransientIo)
        }

        fn abort(&mut self, _save_partial: bool, _stats: &mut TransferStats) {}
    }

    #[test]
    fn transient_io_past_stall_timeout_escalates_to_abort() {
        let mut dispatcher = ProtocolDispatcher::new();
        dispatcher.start_engine(ProtocolKind::Xmodem(crate::stats::XmodemVariant::Crc), Box::new(StallingEngine));

        let mut remaining = 0;
        let mut output = [0u8; 16];
        let mut written = 0;

        let first = dispatcher.process_data(b"", &mut remaining, &mut output, &mut written);
        assert!(matches!(first, Err(TransferError::TransientIo)));

        dispatcher.stalled_since = Some(Instant::now() - Duration::from_secs(4));

        let escalated = dispatcher.process_data(b"", &mut remaining, &mut output, &mut written);
        assert!(matches!(escalated, Err(TransferError::Timeout)));
        assert_eq!(dispatcher.stats().phase(), Phase::Abort);
    }

    #[test]
    fn full_ascii_upload_reaches_end_phase() {
        let dir = std::env::temp_dir().join(format!(
            "carrier-transfer-dispatch-{:?}",
            std::thread::current().id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("dispatch.txt");
        std::fs::write(&path, vec![b'x'; 1024]).unwrap();

        let mut dispatcher = ProtocolDispatcher::new();
        dispatcher
            .start_ascii(AsciiTransferConfig::default(), Direction::Upload, &path)
            .unwrap();

        let mut remaining = 0;
        let mut output = [0u8; 4096];
        let mut written = 0;
        loop {
            dispatcher
                .process_data(&[], &mut remaining, &mut output, &mut written)
                .unwrap();
            if dispatcher.stats().phase() == Phase::End {
                break;
            }
        }
        assert_eq!(dispatcher.stats().bytes_transfer, 1024);

        let _ = std::fs::remove_file(&path);
    }
}
