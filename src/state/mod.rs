//! State management module for Memory Flip.
//!
//! - `board` - Shuffled boards and symbol colors
//! - `timer` - Level countdown with pause/resume
//! - `score` - Per-level and total score ledger
//! - `session` - Player name validation and the session value
//! - `game` - The tile-selection state machine that drives the rest
//! - `leaderboard` - Append-only score log and ranking
//! - `clock` - Injected time sources
//! - `config` - Level table, palette, scoring and delays
//! - `event` - Notifications for the presentation layer
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                               Game                                 │
//! │                                                                    │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────┐  │
//! │  │ GameSession  │  │    Board     │  │       LevelTimer         │  │
//! │  │              │  │              │  │                          │  │
//! │  │ player name  │  │ 16 tiles     │  │ Stopped / Running /      │  │
//! │  │ level, moves │  │ symbol →     │  │ Paused, driven by Clock  │  │
//! │  │ ScoreLedger  │  │   color      │  │                          │  │
//! │  └──────────────┘  └──────────────┘  └──────────────────────────┘  │
//! │                                                                    │
//! │  pending continuations: mismatch hide, next timer tick             │
//! │  event queue ──▶ drain_events()                                    │
//! │                                                                    │
//! │  ┌──────────────────────────────────────────────────────────────┐  │
//! │  │ LeaderboardStore: append on completion/failure, top_n query  │  │
//! │  └──────────────────────────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────────────┘
//! ```

pub mod board;
pub mod clock;
pub mod config;
pub mod event;
pub mod game;
pub mod leaderboard;
pub mod score;
pub mod session;
pub mod timer;

// Re-export commonly used types
pub use board::{generate, Board, BoardError, Tile};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    Color, ConfigError, GameConfig, LevelSpec, LevelTable, LIGHT_COLORS, NUM_PAIRS, NUM_TILES,
};
pub use event::GameEvent;
pub use game::{Game, GameError, GamePhase, Selection};
pub use leaderboard::{
    LeaderboardError, LeaderboardRecord, LeaderboardStore, LeaderboardWarning, Ranking, HEADER,
};
pub use score::{ScoreLedger, MAX_LEVELS};
pub use session::{GameSession, NameError, PlayerName};
pub use timer::{LevelTimer, TimerState, TimerTick};
