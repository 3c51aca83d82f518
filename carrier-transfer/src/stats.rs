//! Transfer state and the transfer-stats lifecycle (spec §3, §4.6).

use std::rc::Rc;
use std::time::SystemTime;

use serde::Serialize;

/// Monotone (except for the two terminal variants) lifecycle of a single
/// file transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Init,
    FileInfo,
    Transfer,
    FileDone,
    End,
    Abort,
}

impl Phase {
    /// `End` and `Abort` absorb all further ticks.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::End | Phase::Abort)
    }
}

/// Xmodem block-format variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum XmodemVariant {
    Checksum,
    Crc,
    OneK,
    OneKG,
}

/// Ymodem batch variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum YmodemVariant {
    Standard,
    Gilbert,
}

/// The file-transfer protocol backing the current transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProtocolKind {
    Ascii,
    Xmodem(XmodemVariant),
    Ymodem(YmodemVariant),
    Zmodem,
    Kermit,
}

impl ProtocolKind {
    /// Ymodem/Zmodem/Kermit can carry more than one file per session.
    pub fn is_batch(self) -> bool {
        matches!(
            self,
            ProtocolKind::Ymodem(_) | ProtocolKind::Zmodem | ProtocolKind::Kermit
        )
    }

    /// Zmodem and Kermit buffer internally and always consume everything
    /// handed to them; Xmodem/Ymodem report back unconsumed input.
    pub fn consumes_all_input(self) -> bool {
        matches!(self, ProtocolKind::Zmodem | ProtocolKind::Kermit)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ProtocolKind::Ascii => "ASCII",
            ProtocolKind::Xmodem(XmodemVariant::Checksum) => "Xmodem",
            ProtocolKind::Xmodem(XmodemVariant::Crc) => "Xmodem-CRC",
            ProtocolKind::Xmodem(XmodemVariant::OneK) => "Xmodem-1K",
            ProtocolKind::Xmodem(XmodemVariant::OneKG) => "Xmodem-1K/G",
            ProtocolKind::Ymodem(YmodemVariant::Standard) => "Ymodem",
            ProtocolKind::Ymodem(YmodemVariant::Gilbert) => "Ymodem-G",
            ProtocolKind::Zmodem => "Zmodem",
            ProtocolKind::Kermit => "Kermit",
        }
    }
}

/// Pointer-identity string setter: replaces `slot` with `new` unless they
/// are already the same allocation or have equal content, in which case the
/// call is a no-op. Reproduces the source's "compare the incoming pointer
/// against the stored one before freeing" guard without any use-after-free
/// hazard, since `Rc<str>` makes the old allocation's lifetime explicit.
fn set_rc_str(slot: &mut Rc<str>, new: Rc<str>) -> bool {
    if Rc::ptr_eq(slot, &new) || **slot == *new {
        return false;
    }
    *slot = new;
    true
}

/// The full transfer record (spec §3 "Transfer state" + §6 "Transfer-stats
/// exposed record" — the source keeps these as one struct and so do we).
#[derive(Debug, Clone, Serialize)]
pub struct TransferStats {
    phase: Phase,
    protocol: ProtocolKind,
    protocol_name: Rc<str>,
    filename: Rc<str>,
    pathname: Rc<str>,
    last_message: Rc<str>,
    pub bytes_total: u64,
    pub bytes_transfer: u64,
    pub error_count: u32,
    pub blocks: u32,
    pub block_size: u32,
    pub blocks_transfer: u32,
    pub batch_bytes_total: u64,
    pub batch_bytes_transfer: u64,
    pub file_start_time: Option<SystemTime>,
    pub batch_start_time: Option<SystemTime>,
    pub end_time: Option<SystemTime>,
    dirty: bool,
}

impl TransferStats {
    pub fn new(protocol: ProtocolKind) -> Self {
        Self {
            phase: Phase::Init,
            protocol,
            protocol_name: Rc::from(protocol.display_name()),
            filename: Rc::from(""),
            pathname: Rc::from(""),
            last_message: Rc::from(""),
            bytes_total: 0,
            bytes_transfer: 0,
            error_count: 0,
            blocks: 0,
            block_size: 0,
            blocks_transfer: 0,
            batch_bytes_total: 0,
            batch_bytes_transfer: 0,
            file_start_time: None,
            batch_start_time: None,
            end_time: None,
            dirty: true,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn protocol(&self) -> ProtocolKind {
        self.protocol
    }

    pub fn protocol_name(&self) -> &str {
        &self.protocol_name
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    pub fn last_message(&self) -> &str {
        &self.last_message
    }

    /// Advance to `phase`. Callers are expected to uphold the monotone
    /// ordering `Init -> FileInfo -> Transfer -> FileDone -> (Transfer |
    /// End | Abort)`; this setter does not itself validate it (the
    /// dispatcher owns that decision) but does mark the record dirty.
    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.mark_dirty();
    }

    pub fn set_filename(&mut self, new: Rc<str>) {
        if set_rc_str(&mut self.filename, new) {
            self.mark_dirty();
        }
    }

    pub fn set_pathname(&mut self, new: Rc<str>) {
        if set_rc_str(&mut self.pathname, new) {
            self.mark_dirty();
        }
    }

    pub fn set_protocol_name(&mut self, new: Rc<str>) {
        if set_rc_str(&mut self.protocol_name, new) {
            self.mark_dirty();
        }
    }

    pub fn set_last_message(&mut self, new: Rc<str>) {
        if set_rc_str(&mut self.last_message, new) {
            self.mark_dirty();
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Read and clear the dirty flag; call once per tick.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Fraction of the current file transferred, or `None` before
    /// `bytes_total` is known.
    pub fn file_progress(&self) -> Option<f64> {
        (self.bytes_total > 0).then(|| self.bytes_transfer as f64 / self.bytes_total as f64)
    }

    /// Fraction of the whole batch transferred, or `None` for non-batch
    /// protocols or before `batch_bytes_total` is known. Kept separate from
    /// [`file_progress`](Self::file_progress) rather than blended into one
    /// number (see the open-question resolution in the design notes).
    pub fn batch_progress(&self) -> Option<f64> {
        (self.batch_bytes_total > 0)
            .then(|| self.batch_bytes_transfer as f64 / self.batch_bytes_total as f64)
    }

    /// Release the owned strings and reset counters when the dispatcher
    /// returns to the console state. The `Rc<str>` allocations are freed by
    /// ordinary drop semantics once replaced.
    pub fn reset(&mut self, protocol: ProtocolKind) {
        *self = Self::new(protocol);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setter_is_noop_for_same_allocation() {
        let mut stats = TransferStats::new(ProtocolKind::Ascii);
        let name: Rc<str> = Rc::from("FILE.TXT");
        stats.set_filename(Rc::clone(&name));
        stats.take_dirty();
        stats.set_filename(Rc::clone(&name));
        assert!(!stats.take_dirty());
        assert_eq!(stats.filename(), "FILE.TXT");
    }

    #[test]
    fn setter_is_noop_for_equal_content() {
        let mut stats = TransferStats::new(ProtocolKind::Ascii);
        stats.set_filename(Rc::from("FILE.TXT"));
        stats.take_dirty();
        stats.set_filename(Rc::from("FILE.TXT"));
        assert!(!stats.take_dirty());
    }

    #[test]
    fn progress_fields_are_independent() {
        let mut stats = TransferStats::new(ProtocolKind::Ymodem(YmodemVariant::Standard));
        stats.bytes_total = 1024;
        stats.bytes_transfer = 512;
        stats.batch_bytes_total = 4096;
        stats.batch_bytes_transfer = 512;
        assert_eq!(stats.file_progress(), Some(0.5));
        assert_eq!(stats.batch_progress(), Some(0.125));
    }

    #[test]
    fn bytes_transfer_never_exceeds_bytes_total_invariant_holds_in_practice() {
        let mut stats = TransferStats::new(ProtocolKind::Ascii);
        stats.bytes_total = 100;
        stats.bytes_transfer = 40;
        assert!(stats.bytes_transfer <= stats.bytes_total);
        stats.bytes_transfer += 60;
        assert!(stats.bytes_transfer <= stats.bytes_total);
    }
}
