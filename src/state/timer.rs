//! Level countdown timer.
//!
//! Tracks the time left in the current level against clock readings passed
//! in by the caller. Pausing freezes the countdown; resuming shifts the
//! start instant forward so paused time never counts against the player.
//!
//! # State Diagram
//!
//! ```text
//!             start                pause
//! ┌─────────┐ ─────▶ ┌─────────┐ ───────▶ ┌────────┐
//! │ Stopped │        │ Running │          │ Paused │
//! └─────────┘ ◀───── └─────────┘ ◀─────── └────────┘
//!      ▲     expiry       ▲       resume       │
//!      └──────────────────┴──────── stop ──────┘
//! ```

use std::fmt;

/// Timer state. Instants are clock milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Stopped,
    Running {
        started_at: u64,
    },
    Paused {
        started_at: u64,
        paused_at: u64,
    },
}

impl TimerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Running { .. } => "running",
            Self::Paused { .. } => "paused",
        }
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a [`LevelTimer::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    /// Timer is stopped; nothing to report.
    Idle,
    /// Time left in milliseconds (frozen while paused).
    Remaining(u64),
    /// The countdown just reached zero. Reported once per `start`.
    Expired,
}

/// Countdown for one level attempt.
#[derive(Debug, Clone, Default)]
pub struct LevelTimer {
    limit_ms: u64,
    state: TimerState,
}

impl LevelTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the countdown from `limit_ms`.
    pub fn start(&mut self, limit_ms: u64, now: u64) {
        self.limit_ms = limit_ms;
        self.state = TimerState::Running { started_at: now };
    }

    /// Returns false if the timer was not running.
    pub fn pause(&mut self, now: u64) -> bool {
        match self.state {
            TimerState::Running { started_at } => {
                self.state = TimerState::Paused {
                    started_at,
                    paused_at: now.max(started_at),
                };
                true
            }
            _ => false,
        }
    }

    /// Returns the paused duration, or `None` if the timer was not paused.
    pub fn resume(&mut self, now: u64) -> Option<u64> {
        match self.state {
            TimerState::Paused {
                started_at,
                paused_at,
            } => {
                let paused_for = now.saturating_sub(paused_at);
                self.state = TimerState::Running {
                    started_at: started_at + paused_for,
                };
                Some(paused_for)
            }
            _ => None,
        }
    }

    pub fn stop(&mut self) {
        self.state = TimerState::Stopped;
    }

    /// Evaluate the countdown at `now`.
    ///
    /// Reaching zero while running reports [`TimerTick::Expired`] and stops
    /// the timer, so later ticks are [`TimerTick::Idle`] until the next
    /// `start`.
    pub fn tick(&mut self, now: u64) -> TimerTick {
        match self.state {
            TimerState::Stopped => TimerTick::Idle,
            TimerState::Paused { .. } => TimerTick::Remaining(self.remaining_ms(now)),
            TimerState::Running { .. } => {
                let remaining = self.remaining_ms(now);
                if remaining == 0 {
                    self.state = TimerState::Stopped;
                    TimerTick::Expired
                } else {
                    TimerTick::Remaining(remaining)
                }
            }
        }
    }

    /// Milliseconds left, clamped at zero. Zero when stopped.
    pub fn remaining_ms(&self, now: u64) -> u64 {
        let elapsed = match self.state {
            TimerState::Stopped => return 0,
            TimerState::Running { started_at } => now.saturating_sub(started_at),
            TimerState::Paused {
                started_at,
                paused_at,
            } => paused_at.saturating_sub(started_at),
        };
        self.limit_ms.saturating_sub(elapsed)
    }

    /// Whole seconds left, rounded down.
    pub fn remaining_secs(&self, now: u64) -> u32 {
        (self.remaining_ms(now) / 1000) as u32
    }

    pub fn limit_ms(&self) -> u64 {
        self.limit_ms
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.state, TimerState::Paused { .. })
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self.state, TimerState::Stopped)
    }
}
