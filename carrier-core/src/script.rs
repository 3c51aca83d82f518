//! Script subprocess bridge (spec §4.4): spawns a co-process whose stdin
//! receives printable characters the emulator decodes, whose stdout is
//! re-encoded onto the outbound stream, and whose stderr is framed into
//! scroll lines for the status pane.
//!
//! The source's note on conditional platform pipes (§9) picks plain
//! non-blocking pipes for POSIX rather than a pseudo-terminal — a script is
//! a data co-process, not an interactive shell, so it never needs a
//! controlling terminal of its own.

use std::io::{self, Read, Write};
#[cfg(unix)]
use std::os::fd::AsRawFd;
use std::path::Path;
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{Duration, Instant, SystemTime};

#[cfg(unix)]
use std::os::unix::process::ExitStatusExt;

use bitflags::bitflags;
use log::{info, warn};
#[cfg(unix)]
use nix::fcntl::{FcntlArg, OFlag, fcntl};
#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

use crate::error::ScriptError;
use crate::scroll::ScrollBuffer;
use crate::utf8::{DecodeEvent, Utf8Decoder};

/// Code points the print buffer can hold before the emulator is expected to
/// start dropping further printable characters (spec §8, scenario 5).
pub const PRINT_BUFFER_CAPACITY: usize = 128;

/// How long `stdin` may refuse writes, with no intervening progress, before
/// the bridge treats the script as unresponsive (spec §7).
const STALL_TIMEOUT: Duration = Duration::from_secs(3);

bitflags! {
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ScriptStatus: u8 {
        const PAUSED           = 0b0000_0001;
        const DEAD             = 0b0000_0010;
        const PRINT_BUFFER_FULL = 0b0000_0100;
    }
}

/// Environment the child script inherits (spec §4.4).
#[derive(Debug, Clone)]
pub struct ScriptEnv {
    pub term: Option<String>,
    pub lines: u16,
    pub columns: u16,
    pub lang: String,
}

/// The "console path": feeding remote bytes through the active emulator.
/// Implemented by `Session`; kept as a trait here so the bridge does not
/// need to know about `carrier-escape`'s `Emulator`/`DisplayState` types.
pub trait ConsolePath {
    /// Feed one byte through the active emulator, returning whatever
    /// printable characters it produced (ordinarily zero or one, but a
    /// `ManyChars`/`Repeat` outcome can produce more).
    fn feed_console_byte(&mut self, byte: u8) -> Vec<char>;
}

pub struct ScriptBridge {
    child: Child,
    stdin: ChildStdin,
    stdout: ChildStdout,
    stderr: ChildStderr,
    status: ScriptStatus,
    print_buffer: std::collections::VecDeque<char>,
    pending_stdin_bytes: Vec<u8>,
    stdout_decoder: Utf8Decoder,
    stderr_decoder: Utf8Decoder,
    stderr_scroll: ScrollBuffer,
    output_translate_table: Option<[u8; 256]>,
    emulation_is_utf8: bool,
    script_start_time: SystemTime,
    script_rc: Option<i32>,
    stdin_stalled_since: Option<Instant>,
}

impl ScriptBridge {
    /// Spawn `path` with the environment described in spec §4.4. `scripts_dir`
    /// is prepended to `PATH` (POSIX only); `status_line_width` sizes the
    /// stderr scroll buffer.
    pub fn start(
        path: &Path,
        env: &ScriptEnv,
        scripts_dir: &Path,
        status_line_width: usize,
        output_translate_table: Option<[u8; 256]>,
        emulation_is_utf8: bool,
    ) -> Result<Self, ScriptError> {
        let mut command = Command::new(path);
        match &env.term {
            Some(term) if !term.is_empty() => {
                command.env("TERM", term);
            },
            _ => {
                command.env_remove("TERM");
            },
        }
        command.env("LINES", env.lines.to_string());
        command.env("COLUMNS", env.columns.to_string());
        command.env("LANG", &env.lang);

        if cfg!(unix) {
            let mut path_var = scripts_dir.as_os_str().to_owned();
            if let Some(existing) = std::env::var_os("PATH") {
                path_var.push(":");
                path_var.push(existing);
            }
            command.env("PATH", path_var);
        }

        command.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped());

        let mut child = command.spawn()?;
        let stdin = child.stdin.take().expect("stdin was piped");
        let stdout = child.stdout.take().expect("stdout was piped");
        let stderr = child.stderr.take().expect("stderr was piped");

        #[cfg(unix)]
        {
            set_nonblocking(stdin.as_raw_fd())?;
            set_nonblocking(stdout.as_raw_fd())?;
            set_nonblocking(stderr.as_raw_fd())?;
        }

        Ok(Self {
            child,
            stdin,
            stdout,
            stderr,
            status: ScriptStatus::empty(),
            print_buffer: std::collections::VecDeque::with_capacity(PRINT_BUFFER_CAPACITY),
            pending_stdin_bytes: Vec::new(),
            stdout_decoder: Utf8Decoder::new(),
            stderr_decoder: Utf8Decoder::new(),
            stderr_scroll: ScrollBuffer::new(status_line_width),
            output_translate_table,
            emulation_is_utf8,
            script_start_time: SystemTime::now(),
            script_rc: None,
            stdin_stalled_since: None,
        })
    }

    pub fn is_paused(&self) -> bool {
        self.status.contains(ScriptStatus::PAUSED)
    }

    pub fn is_dead(&self) -> bool {
        self.status.contains(ScriptStatus::DEAD)
    }

    pub fn is_print_buffer_full(&self) -> bool {
        self.status.contains(ScriptStatus::PRINT_BUFFER_FULL)
    }

    pub fn script_rc(&self) -> Option<i32> {
        self.script_rc
    }

    pub fn pause(&mut self) {
        self.status.insert(ScriptStatus::PAUSED);
    }

    pub fn resume(&mut self) {
        self.status.remove(ScriptStatus::PAUSED);
    }

    /// Queue one printable character for the script's stdin. Returns
    /// `false` without appending once the buffer is at capacity.
    pub fn print_character(&mut self, c: char) -> bool {
        if self.print_buffer.len() >= PRINT_BUFFER_CAPACITY {
            self.status.insert(ScriptStatus::PRINT_BUFFER_FULL);
            return false;
        }
        self.print_buffer.push_back(c);
        if self.print_buffer.len() >= PRINT_BUFFER_CAPACITY {
            self.status.insert(ScriptStatus::PRINT_BUFFER_FULL);
        }
        true
    }

    /// Graceful termination: flush the in-progress stderr line, `SIGHUP`
    /// the child, reap it, and log total elapsed time.
    pub fn stop(&mut self) -> Result<(), ScriptError> {
        if self.status.contains(ScriptStatus::DEAD) {
            return Ok(());
        }

        if let Some(line) = self.stderr_scroll.flush() {
            info!("Script message: {}", line.trimmed());
        }

        #[cfg(unix)]
        {
            let pid = Pid::from_raw(self.child.id() as i32);
            let _ = signal::kill(pid, Signal::SIGHUP);
        }

        match self.child.wait() {
            Ok(status) => {
                #[cfg(unix)]
                let rc = status.code().unwrap_or_else(|| status.signal().map_or(-1, |s| s + 128));
                #[cfg(not(unix))]
                let rc = status.code().unwrap_or(-1);
                self.script_rc = Some(rc);
                info!("Script exited with RC={rc}");
            },
            Err(e) => warn!("failed to reap script subprocess: {e}"),
        }

        let elapsed = self.script_start_time.elapsed().unwrap_or_default();
        info!("Script exiting, total script time: {}", format_hms(elapsed));
        self.status.insert(ScriptStatus::DEAD);
        Ok(())
    }

    /// Drive one tick of the bridge (spec §4.4's four-step `process_data`).
    pub fn process_data(
        &mut self,
        remote_in: &[u8],
        remaining: &mut usize,
        output: &mut [u8],
        output_written: &mut usize,
        console: &mut dyn ConsolePath,
    ) -> Result<(), ScriptError> {
        *output_written = 0;
        *remaining = remote_in.len();

        self.drain_print_buffer()?;

        if self.is_paused() || self.is_dead() || !self.is_print_buffer_full() {
            for &byte in remote_in {
                for c in console.feed_console_byte(byte) {
                    self.print_character(c);
                }
            }
            *remaining = 0;
        }

        self.poll_stderr();
        self.poll_stdout(output, output_written)?;

        Ok(())
    }

    fn drain_print_buffer(&mut self) -> Result<(), ScriptError> {
        if self.pending_stdin_bytes.is_empty() {
            let mut buf = [0u8; 4];
            while let Some(c) = self.print_buffer.pop_front() {
                self.pending_stdin_bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
            self.status.remove(ScriptStatus::PRINT_BUFFER_FULL);
        }

        while !self.pending_stdin_bytes.is_empty() {
            match self.stdin.write(&self.pending_stdin_bytes) {
                Ok(0) => return self.gate_stdin_stall(),
                Ok(n) => {
                    self.pending_stdin_bytes.drain(..n);
                    self.stdin_stalled_since = None;
                },
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return self.gate_stdin_stall(),
                Err(e) => return Err(ScriptError::FatalIo(e.to_string())),
            }
        }
        self.stdin_stalled_since = None;
        Ok(())
    }

    /// `stdin` could not accept more bytes this tick; escalate once the
    /// condition has persisted past [`STALL_TIMEOUT`].
    fn gate_stdin_stall(&mut self) -> Result<(), ScriptError> {
        let since = *self.stdin_stalled_since.get_or_insert_with(Instant::now);
        if since.elapsed() >= STALL_TIMEOUT {
            self.stdin_stalled_since = None;
            return Err(ScriptError::FatalIo(format!(
                "script stdin stalled for over {}s",
                STALL_TIMEOUT.as_secs()
            )));
        }
        Ok(())
    }

    fn poll_stderr(&mut self) {
        if self.is_dead() {
            return;
        }
        let mut buf = [0u8; 256];
        loop {
            match self.stderr.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    for &byte in &buf[..n] {
                        if let Some(DecodeEvent::Char(c)) = self.stderr_decoder.advance(byte) {
                            if let Some(line) = self.stderr_scroll.feed(c) {
                                info!("Script message: {}", line.trimmed());
                            }
                        }
                    }
                },
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(_) => break,
            }
        }
    }

    fn poll_stdout(&mut self, output: &mut [u8], output_written: &mut usize) -> Result<(), ScriptError> {
        if self.is_dead() {
            return Ok(());
        }
        let mut buf = [0u8; 256];
        'read: loop {
            if output.len().saturating_sub(*output_written) < 4 {
                break;
            }
            match self.stdout.read(&mut buf) {
                Ok(0) => {
                    self.stop()?;
                    break;
                },
                Ok(n) => {
                    for &byte in &buf[..n] {
                        if let Some(DecodeEvent::Char(c)) = self.stdout_decoder.advance(byte) {
                            let translated = self.apply_output_translate(c);
                            let written = self.encode_outbound(translated, &mut output[*output_written..]);
                            *output_written += written;
                            if output.len().saturating_sub(*output_written) < 4 {
                                break 'read;
                            }
                        }
                    }
                },
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(_) => break,
            }
        }
        Ok(())
    }

    fn apply_output_translate(&self, c: char) -> char {
        let code = c as u32;
        if code <= 0x7F {
            if let Some(table) = &self.output_translate_table {
                return char::from(table[code as usize]);
            }
        }
        c
    }

    fn encode_outbound(&self, c: char, out: &mut [u8]) -> usize {
        if self.emulation_is_utf8 {
            let mut buf = [0u8; 4];
            let s = c.encode_utf8(&mut buf);
            out[..s.len()].copy_from_slice(s.as_bytes());
            s.len()
        } else {
            out[0] = (c as u32 & 0xFF) as u8;
            1
        }
    }
}

fn format_hms(elapsed: std::time::Duration) -> String {
    let total_secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", total_secs / 3600, (total_secs / 60) % 60, total_secs % 60)
}

#[cfg(unix)]
fn set_nonblocking(fd: std::os::fd::RawFd) -> Result<(), ScriptError> {
    let flags = fcntl(fd, FcntlArg::F_GETFL).map_err(|e| ScriptError::FatalIo(e.to_string()))?;
    let flags = OFlag::from_bits_truncate(flags) | OFlag::O_NONBLOCK;
    fcntl(fd, FcntlArg::F_SETFL(flags)).map_err(|e| ScriptError::FatalIo(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullConsole;
    impl ConsolePath for NullConsole {
        fn feed_console_byte(&mut self, _byte: u8) -> Vec<char> {
            Vec::new()
        }
    }

    fn spawn_cat() -> ScriptBridge {
        let env = ScriptEnv {
            term: Some("xterm".to_string()),
            lines: 24,
            columns: 80,
            lang: "en_US.UTF-8".to_string(),
        };
        ScriptBridge::start(Path::new("/bin/cat"), &env, Path::new("/tmp"), 80, None, true).unwrap()
    }

    #[test]
    fn print_buffer_backpressure_matches_capacity() {
        let mut bridge = spawn_cat();
        for _ in 0..PRINT_BUFFER_CAPACITY {
            assert!(bridge.print_character('\u{1F600}'));
        }
        assert!(bridge.is_print_buffer_full());
        assert!(!bridge.print_character('x'));
        bridge.stop().unwrap();
    }

    #[test]
    fn stdout_echoes_stdin_through_cat() {
        let mut bridge = spawn_cat();
        bridge.print_character('h');
        bridge.print_character('i');
        let mut console = NullConsole;
        let mut remaining = 0;
        let mut output = [0u8; 64];
        let mut written = 0;

        for _ in 0..20 {
            bridge.process_data(&[], &mut remaining, &mut output, &mut written, &mut console).unwrap();
            if written > 0 {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(written > 0);
        assert_eq!(&output[..written], b"hi");
        bridge.stop().unwrap();
    }

    #[test]
    fn stdin_stall_within_timeout_is_not_fatal() {
        let mut bridge = spawn_cat();
        assert!(bridge.gate_stdin_stall().is_ok());
        bridge.stop().unwrap();
    }

    #[test]
    fn stdin_stall_past_timeout_escalates_to_fatal_io() {
        let mut bridge = spawn_cat();
        bridge.stdin_stalled_since = Some(Instant::now() - Duration::from_secs(4));
        let result = bridge.gate_stdin_stall();
        assert!(matches!(result, Err(ScriptError::FatalIo(_))));
        bridge.stop().unwrap();
    }

    #[test]
    fn format_hms_formats_zero_padded() {
        assert_eq!(format_hms(std::time::Duration::from_secs(3725)), "01:02:05");
    }
}
