use thiserror::Error;

/// Error taxonomy for the transfer engines and the dispatcher that drives
/// them. Mirrors the subset of the shared error taxonomy that applies to
/// file transfer (parser-side `MalformedSequence`/`Eof`/`SpawnFailure` live
/// in the crates that can actually raise them).
#[derive(Debug, Error)]
pub enum TransferError {
    /// The outbound/transfer buffer has no room this tick; retry next tick.
    #[error("transfer buffer is full")]
    BufferFull,

    /// No forward progress was possible this tick (`WouldBlock` and
    /// friends); retry next tick.
    #[error("transient I/O condition, retry next tick")]
    TransientIo,

    /// The transfer file could not be read/written; always fatal.
    #[error("fatal transfer I/O error")]
    FatalIo(#[from] std::io::Error),

    /// The engine reported a protocol timeout.
    #[error("transfer timed out")]
    Timeout,

    /// `process_data` was called before `start`.
    #[error("transfer engine has not been started")]
    NotStarted,
}
