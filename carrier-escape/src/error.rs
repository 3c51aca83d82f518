//! Error taxonomy mirror for the emulation crate (spec §7).
//!
//! Parsers never surface these as `Result` — `feed` always recovers via the
//! `DumpUnknown` state and keeps running — but giving the recovery path a
//! typed, `thiserror`-derived shape keeps its log line consistent with the
//! sibling taxonomies in `carrier-transfer`/`carrier-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmulationError {
    /// An escape sequence could not be parsed before hitting its buffer
    /// bound; the buffered bytes are dumped to the screen verbatim.
    #[error("malformed escape sequence, dumping {0} buffered byte(s) verbatim")]
    MalformedSequence(usize),
}
