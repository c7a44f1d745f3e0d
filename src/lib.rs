//! Memory Flip State Library
//!
//! Game logic for Memory Flip, a timed tile-matching game for one local
//! player across three levels.
//!
//! # Overview
//!
//! - **Board Generator** - Two tiles per symbol, uniformly shuffled, with a
//!   color per symbol.
//!
//! - **Level Timer** - Countdown against an injected clock; pause and resume
//!   without drift.
//!
//! - **Score Ledger** - +10 per match, -2 per miss, per level and in total.
//!
//! - **Game State Machine** - Tile selection, match resolution, level
//!   progression, failure and completion.
//!
//! - **Leaderboard Store** - Append-only CSV log with a stable top-N ranking.
//!
//! # Design Principles
//!
//! 1. **One owner** - All mutable state lives in a single [`Game`]; every
//!    change goes through its operations.
//!
//! 2. **No rendering** - The crate emits [`GameEvent`]s and JSON snapshots;
//!    drawing tiles and dialogs is someone else's job.
//!
//! 3. **No blocking** - Delays are deadlines run by [`Game::poll`] from the
//!    caller's event loop.
//!
//! 4. **Failures degrade** - Leaderboard problems become events and
//!    warnings, never a lost game.
//!
//! # Example
//!
//! ```rust
//! use memory_flip_state::state::{Game, GameConfig, GameEvent, GamePhase, ManualClock};
//!
//! let path = std::env::temp_dir().join("memory-flip-doc-example.csv");
//! let _ = std::fs::remove_file(&path);
//!
//! let clock = ManualClock::new();
//! let config = GameConfig::default().with_leaderboard_path(&path);
//! let mut game = Game::with_seed(config, clock.clone(), 42).unwrap();
//!
//! // Names are letters and spaces only
//! assert!(game.new_game("R2D2").is_err());
//! game.new_game("Alice").unwrap();
//!
//! // Flip the first tile, then wait out the whole level
//! game.select_tile(0);
//! clock.advance_secs(60);
//! game.poll();
//!
//! assert_eq!(game.phase(), GamePhase::LevelFailed);
//! assert!(game.drain_events().contains(&GameEvent::LevelFailed { level: 1 }));
//! # let _ = std::fs::remove_file(&path);
//! ```

pub mod state;

// Re-export everything from state module at crate root
pub use state::*;
