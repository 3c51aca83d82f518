//! Beep emission throttling (spec §5): at most one beep per wall-clock
//! second, regardless of how many BEL bytes the active emulator sees.

use std::time::{Duration, Instant};

const BEEP_WINDOW: Duration = Duration::from_secs(1);

pub struct BeepThrottle {
    last_allowed: Option<Instant>,
}

impl BeepThrottle {
    pub fn new() -> Self {
        Self { last_allowed: None }
    }

    /// Called once per tick when the display state reports a pending bell.
    /// Returns whether this bell should actually sound.
    pub fn gate(&mut self, now: Instant) -> bool {
        let allow = match self.last_allowed {
            Some(last) => now.duration_since(last) >= BEEP_WINDOW,
            None => true,
        };
        if allow {
            self.last_allowed = Some(now);
        }
        allow
    }
}

impl Default for BeepThrottle {
    fn default() -> Self {
        Self::new()
    }
}
