//! Error taxonomy for session orchestration and the script subprocess bridge
//! (spec §7), mirrored as a `thiserror` enum the way `carrier-escape` and
//! `carrier-transfer` mirror their own slices of the same taxonomy.

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("failed to spawn script subprocess")]
    SpawnFailure(#[from] io::Error),

    #[error("script stdin buffer is full")]
    BufferFull,

    #[error("transient I/O condition, retry next tick")]
    TransientIo,

    #[error("fatal I/O error on a script pipe: {0}")]
    FatalIo(String),
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("script bridge error: {0}")]
    Script(#[from] ScriptError),

    #[error("transfer error: {0}")]
    Transfer(#[from] carrier_transfer::TransferError),
}
