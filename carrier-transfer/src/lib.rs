//! Protocol dispatcher, ASCII transfer engine, and transfer-stats lifecycle.
//!
//! [`dispatcher::ProtocolDispatcher`] multiplexes the bidirectional byte
//! stream between [`ascii::AsciiTransferEngine`] (implemented here) and the
//! pluggable [`engine::TransferEngine`] trait object that the serialized
//! protocols (Xmodem/Ymodem/Zmodem/Kermit families) implement outside this
//! crate.

mod ascii;
mod dispatcher;
mod engine;
mod error;
mod stats;

pub use ascii::{AsciiTransferConfig, AsciiTransferEngine, CrlfPolicy, Direction, StepOutcome};
pub use dispatcher::{ProtocolDispatcher, protocol_display_name};
pub use engine::{EngineStep, TransferEngine};
pub use error::TransferError;
pub use stats::{Phase, ProtocolKind, TransferStats, XmodemVariant, YmodemVariant};
