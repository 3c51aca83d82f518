//! Inline ASCII file transfer (spec §4.3): CRLF policy plus an optional
//! byte-translation table, applied on top of plain file I/O.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::rc::Rc;
use std::time::SystemTime;

use serde::Serialize;

use crate::error::TransferError;
use crate::stats::{Phase, TransferStats};

/// How a CR or LF byte is handled while crossing the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CrlfPolicy {
    /// Pass the byte through unchanged.
    None,
    /// Drop the byte.
    Strip,
    /// Normalize to `CR LF`.
    Add,
}

impl CrlfPolicy {
    /// Parse a configuration string, falling back to the safest policy
    /// (`None`) for anything unrecognized.
    pub fn from_str_or_default(value: &str) -> Self {
        match value {
            "strip" => CrlfPolicy::Strip,
            "add" => CrlfPolicy::Add,
            "none" => CrlfPolicy::None,
            _ => CrlfPolicy::None,
        }
    }
}

/// Byte-identity 256-entry translate table.
pub fn identity_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    for (i, slot) in table.iter_mut().enumerate() {
        *slot = i as u8;
    }
    table
}

/// The eight policy toggles §6 recognizes for ASCII transfer, plus the two
/// translate tables they gate.
#[derive(Debug, Clone, Serialize)]
pub struct AsciiTransferConfig {
    pub upload_use_translate_table: bool,
    pub upload_cr_policy: CrlfPolicy,
    pub upload_lf_policy: CrlfPolicy,
    /// Not UI-exposed: the 256-entry table is config, not display state.
    #[serde(skip)]
    pub upload_translate_table: [u8; 256],
    pub download_use_translate_table: bool,
    pub download_cr_policy: CrlfPolicy,
    pub download_lf_policy: CrlfPolicy,
    #[serde(skip)]
    pub download_translate_table: [u8; 256],
}

impl Default for AsciiTransferConfig {
    fn default() -> Self {
        Self {
            upload_use_translate_table: false,
            upload_cr_policy: CrlfPolicy::None,
            upload_lf_policy: CrlfPolicy::None,
            upload_translate_table: identity_table(),
            download_use_translate_table: false,
            download_cr_policy: CrlfPolicy::None,
            download_lf_policy: CrlfPolicy::None,
            download_translate_table: identity_table(),
        }
    }
}

fn apply_crlf(byte: u8, cr_policy: CrlfPolicy, lf_policy: CrlfPolicy, out: &mut Vec<u8>) {
    match byte {
        b'\r' => match cr_policy {
            CrlfPolicy::None => out.push(b'\r'),
            CrlfPolicy::Strip => {},
            CrlfPolicy::Add => out.extend_from_slice(b"\r\n"),
        },
        b'\n' => match lf_policy {
            CrlfPolicy::None => out.push(b'\n'),
            CrlfPolicy::Strip => {},
            CrlfPolicy::Add => out.extend_from_slice(b"\r\n"),
        },
        other => out.push(other),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Upload,
    Download,
}

/// Outcome of a single `upload_step`/`download_step` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Done,
}

/// Drives one ASCII file transfer, in either direction, against an open
/// file handle.
pub struct AsciiTransferEngine {
    config: AsciiTransferConfig,
    direction: Direction,
    file: File,
}

impl AsciiTransferEngine {
    /// Resolve configuration and open the transfer file, advancing `stats`
    /// to `FileInfo` and stamping `file_start_time`.
    pub fn start(
        config: AsciiTransferConfig,
        direction: Direction,
        path: &Path,
        stats: &mut TransferStats,
    ) -> Result<Self, TransferError> {
        let file = match direction {
            Direction::Upload => File::open(path)?,
            Direction::Download => File::create(path)?,
        };

        if direction == Direction::Upload {
            stats.bytes_total = file.metadata().map(|m| m.len()).unwrap_or(0);
        }
        stats.set_filename(Rc::from(
            path.file_name().and_then(|n| n.to_str()).unwrap_or(""),
        ));
        stats.set_pathname(Rc::from(path.to_string_lossy().as_ref()));
        stats.file_start_time = Some(SystemTime::now());
        stats.set_phase(Phase::FileInfo);

        Ok(Self { config, direction, file })
    }

    /// Read a chunk from the file, translate, apply CRLF policy, and stage
    /// it in `output`. Reads at most `(output.len() / 2) - 1` bytes so CRLF
    /// expansion (worst case 2x) cannot overflow the buffer.
    pub fn upload_step(
        &mut self,
        stats: &mut TransferStats,
        output: &mut [u8],
        output_written: &mut usize,
    ) -> Result<StepOutcome, TransferError> {
        debug_assert_eq!(self.direction, Direction::Upload);

        let read_cap = (output.len() / 2).saturating_sub(1).max(1);
        let mut raw = vec![0u8; read_cap];
        let n = self.file.read(&mut raw)?;

        if n == 0 {
            stats.end_time = Some(SystemTime::now());
            *output_written = 0;
            return Ok(StepOutcome::Done);
        }

        let mut staged = Vec::with_capacity(n * 2);
        for &byte in &raw[..n] {
            let byte = if self.config.upload_use_translate_table {
                self.config.upload_translate_table[byte as usize]
            } else {
                byte
            };
            apply_crlf(
                byte,
                self.config.upload_cr_policy,
                self.config.upload_lf_policy,
                &mut staged,
            );
        }

        if staged.len() > output.len() {
            return Err(TransferError::BufferFull);
        }

        output[..staged.len()].copy_from_slice(&staged);
        *output_written = staged.len();
        stats.bytes_transfer += staged.len() as u64;
        stats.set_phase(Phase::Transfer);
        Ok(StepOutcome::Continue)
    }

    /// Apply CRLF policy then translate `input`, write the result to the
    /// file, and flush. A short write is treated as fatal (disk full).
    pub fn download_step(
        &mut self,
        stats: &mut TransferStats,
        input: &[u8],
    ) -> Result<StepOutcome, TransferError> {
        debug_assert_eq!(self.direction, Direction::Download);

        if input.is_empty() {
            return Ok(StepOutcome::Continue);
        }

        let mut crlf_applied = Vec::with_capacity(input.len() * 2);
        for &byte in input {
            apply_crlf(
                byte,
                self.config.download_cr_policy,
                self.config.download_lf_policy,
                &mut crlf_applied,
            );
        }

        let staged: Vec<u8> = if self.config.download_use_translate_table {
            crlf_applied
                .iter()
                .map(|&b| self.config.download_translate_table[b as usize])
                .collect()
        } else {
            crlf_applied
        };

        let written = self.file.write(&staged)?;
        self.file.flush()?;

        if written < staged.len() {
            stats.set_last_message(Rc::from("disk full"));
            stats.set_phase(Phase::Abort);
            return Err(TransferError::FatalIo(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "short write to transfer file",
            )));
        }

        stats.bytes_transfer += written as u64;
        stats.set_phase(Phase::Transfer);
        Ok(StepOutcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn upload_cr_none_lf_add_doubles_newlines() {
        let dir = std::env::temp_dir().join(format!(
            "carrier-transfer-test-{:?}",
            std::thread::current().id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("upload.txt");
        std::fs::write(&path, b"A\nB\n").unwrap();

        let mut stats = TransferStats::new(crate::stats::ProtocolKind::Ascii);
        let mut config = AsciiTransferConfig::default();
        config.upload_lf_policy = CrlfPolicy::Add;
        let mut engine =
            AsciiTransferEngine::start(config, Direction::Upload, &path, &mut stats).unwrap();

        let mut output = [0u8; 256];
        let mut written = 0;
        let outcome = engine.upload_step(&mut stats, &mut output, &mut written).unwrap();

        assert_eq!(outcome, StepOutcome::Continue);
        assert_eq!(&output[..written], b"A\r\nB\r\n");
        assert_eq!(stats.bytes_transfer, 6);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn crlf_none_is_byte_identical() {
        let mut out = Vec::new();
        for &b in b"hello\r\nworld" {
            apply_crlf(b, CrlfPolicy::None, CrlfPolicy::None, &mut out);
        }
        assert_eq!(out, b"hello\r\nworld");
    }

    #[test]
    fn strip_drops_matching_bytes() {
        let mut out = Vec::new();
        for &b in b"a\rb\nc" {
            apply_crlf(b, CrlfPolicy::Strip, CrlfPolicy::Strip, &mut out);
        }
        assert_eq!(out, b"abc");
    }

    #[test]
    fn upload_reaching_eof_advances_to_end() {
        let dir = std::env::temp_dir().join(format!(
            "carrier-transfer-test-eof-{:?}",
            std::thread::current().id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("empty.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"").unwrap();
        drop(f);

        let mut stats = TransferStats::new(crate::stats::ProtocolKind::Ascii);
        let mut engine = AsciiTransferEngine::start(
            AsciiTransferConfig::default(),
            Direction::Upload,
            &path,
            &mut stats,
        )
        .unwrap();

        let mut output = [0u8; 64];
        let mut written = 0;
        let outcome = engine.upload_step(&mut stats, &mut output, &mut written).unwrap();
        assert_eq!(outcome, StepOutcome::Done);
        assert!(stats.end_time.is_some());

        let _ = std::fs::remove_file(&path);
    }
}
