//! Event-loop driver (spec §5): a small `mio`-registry-based poller over the
//! remote stream and the script's three pipes, matching the non-blocking
//! poll-and-dispatch shape used throughout the teacher's own event loop.

#[cfg(unix)]
use std::os::fd::{AsRawFd, RawFd};
use std::time::Duration;

use mio::{Events, Interest, Poll, Token};
#[cfg(unix)]
use mio::unix::SourceFd;

pub const REMOTE_TOKEN: Token = Token(0);
pub const SCRIPT_STDOUT_TOKEN: Token = Token(1);
pub const SCRIPT_STDERR_TOKEN: Token = Token(2);

const EVENT_CAPACITY: usize = 16;

/// Wraps one `mio::Poll` registry for a session's pollable resources. The
/// remote stream is always registered; script pipes are (de)registered as
/// the bridge starts and stops.
pub struct SessionPoller {
    poll: Poll,
    events: Events,
}

impl SessionPoller {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self { poll: Poll::new()?, events: Events::with_capacity(EVENT_CAPACITY) })
    }

    #[cfg(unix)]
    pub fn register_remote(&mut self, fd: RawFd) -> std::io::Result<()> {
        self.poll
            .registry()
            .register(&mut SourceFd(&fd), REMOTE_TOKEN, Interest::READABLE)
    }

    #[cfg(unix)]
    pub fn register_script_stdout(&mut self, fd: RawFd) -> std::io::Result<()> {
        self.poll
            .registry()
            .register(&mut SourceFd(&fd), SCRIPT_STDOUT_TOKEN, Interest::READABLE)
    }

    #[cfg(unix)]
    pub fn register_script_stderr(&mut self, fd: RawFd) -> std::io::Result<()> {
        self.poll
            .registry()
            .register(&mut SourceFd(&fd), SCRIPT_STDERR_TOKEN, Interest::READABLE)
    }

    #[cfg(unix)]
    pub fn deregister(&mut self, fd: RawFd) -> std::io::Result<()> {
        self.poll.registry().deregister(&mut SourceFd(&fd))
    }

    /// Block until at least one registered resource is ready, or `timeout`
    /// elapses. Returns the tokens that became ready this round.
    pub fn poll(&mut self, timeout: Option<Duration>) -> std::io::Result<Vec<Token>> {
        self.events.clear();
        self.poll.poll(&mut self.events, timeout)?;
        Ok(self.events.iter().map(|e| e.token()).collect())
    }
}
