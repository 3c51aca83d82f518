//! Seam for the serialized transfer protocols (Xmodem/Ymodem/Zmodem/Kermit).
//!
//! Implementing the wire protocols themselves is out of scope (spec §1's
//! non-goals); this crate only defines the contract the dispatcher drives
//! them through.

use crate::error::TransferError;
use crate::stats::TransferStats;

/// What happened during one [`TransferEngine::process`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStep {
    /// The engine made progress; the transfer continues.
    Continue,
    /// The current file finished; the dispatcher decides whether the batch
    /// continues (`FileDone -> Transfer`) or the whole transfer is over
    /// (`FileDone -> End`).
    FileComplete,
    /// The engine reported an unrecoverable error; the dispatcher moves to
    /// `Abort` with `stats.last_message` already set by the engine.
    Fatal,
}

/// A serialized file-transfer protocol engine, driven one tick at a time by
/// [`crate::dispatcher::ProtocolDispatcher`].
///
/// Xmodem/Ymodem-family implementations consume only as much of `input` as
/// they want per call and report it back through the return value so the
/// dispatcher can preserve the remainder across calls. Zmodem/Kermit
/// implementations buffer internally and always consume everything handed
/// to them (see [`crate::stats::ProtocolKind::consumes_all_input`]).
pub trait TransferEngine {
    /// Advance the transfer by one tick.
    ///
    /// Returns the number of bytes of `input` consumed and the number of
    /// bytes written into `output`, alongside the resulting step outcome.
    fn process(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        stats: &mut TransferStats,
    ) -> Result<(usize, usize, EngineStep), TransferError>;

    /// User-initiated cancel. `save_partial` requests keeping whatever of
    /// the current file was already written rather than deleting it.
    fn abort(&mut self, save_partial: bool, stats: &mut TransferStats);
}
