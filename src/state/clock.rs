//! Time sources.
//!
//! The game never reads the system clock directly. Every deadline (level
//! timer, mismatch-hide delay, tick cadence) is measured in milliseconds
//! from a [`Clock`], so tests can drive time by hand with [`ManualClock`].

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime};

/// Source of monotonic and wall-clock time.
pub trait Clock: fmt::Debug {
    /// Milliseconds since an arbitrary fixed origin. Never goes backwards.
    fn now_ms(&self) -> u64;

    /// Local date and time, used to stamp leaderboard records.
    fn wall_time(&self) -> NaiveDateTime;
}

/// Real time: `Instant` for deadlines, `chrono::Local` for record stamps.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn wall_time(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Hand-driven clock.
///
/// Clones share the same time cell, so a test keeps one handle and gives
/// another to the game:
///
/// ```rust
/// use memory_flip_state::state::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// handle.advance_ms(1500);
/// assert_eq!(clock.now_ms(), 1500);
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
    wall_origin: NaiveDateTime,
}

impl ManualClock {
    /// Start at zero, with wall time 1 January 2024 12:00.
    pub fn new() -> Self {
        let wall_origin = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap_or_default();
        Self::starting_at(wall_origin)
    }

    /// Start at zero with the given wall time.
    pub fn starting_at(wall_origin: NaiveDateTime) -> Self {
        Self {
            now: Rc::new(Cell::new(0)),
            wall_origin,
        }
    }

    pub fn advance_ms(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance_ms(secs * 1000);
    }

    /// Jump to an absolute reading. Earlier readings are ignored.
    pub fn set_ms(&self, ms: u64) {
        if ms > self.now.get() {
            self.now.set(ms);
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn wall_time(&self) -> NaiveDateTime {
        self.wall_origin + ChronoDuration::milliseconds(self.now.get() as i64)
    }
}
