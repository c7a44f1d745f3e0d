//! Game state machine.
//!
//! [`Game`] owns the session, the board, the level timer and the
//! leaderboard store. The presentation layer forwards player actions
//! (`new_game`, `select_tile`, `pause`, `resume`, `exit`), calls
//! [`Game::poll`] from its event loop, and renders the events it drains.
//!
//! # State Diagram
//!
//! ```text
//!            new_game
//! ┌──────┐ ───────────▶ ┌───────────────┐ ◀──────────────────────────┐
//! │ Idle │              │ AwaitingFirst │                            │
//! └──────┘              └───────┬───────┘                            │
//!                               │ select                             │
//!                               ▼                                    │
//!                       ┌────────────────┐  select  ┌───────────┐    │ match, or
//!                       │ AwaitingSecond │ ───────▶ │ Resolving │ ───┤ hide after
//!                       └────────────────┘          └─────┬─────┘    │ the delay
//!                                                         │ last pair│
//!                                                         ▼          │
//!                       ┌─────────────┐  last level ┌──────────────┐  │
//!                       │ GameCleared │ ◀────────── │ LevelCleared │ ─┘ next level
//!                       └─────────────┘             └──────────────┘
//!
//!    timer expiry while in play ───▶ LevelFailed
//! ```

use std::fmt;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::board::{self, Board};
use super::clock::{Clock, SystemClock};
use super::config::{ConfigError, GameConfig};
use super::event::GameEvent;
use super::leaderboard::{LeaderboardRecord, LeaderboardStore, Ranking};
use super::session::{GameSession, NameError, PlayerName};
use super::timer::{LevelTimer, TimerTick};

/// Game state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GamePhase {
    /// No session
    #[default]
    Idle,
    /// No tile face-up
    AwaitingFirst,
    /// One tile face-up
    AwaitingSecond { first: usize },
    /// Two tiles face-up; a mismatch waits here for the hide delay
    Resolving { first: usize, second: usize },
    /// All pairs found; the next level loads straight after
    LevelCleared,
    /// Time ran out
    LevelFailed,
    /// Last level cleared
    GameCleared,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingFirst => "awaiting_first",
            Self::AwaitingSecond { .. } => "awaiting_second",
            Self::Resolving { .. } => "resolving",
            Self::LevelCleared => "level_cleared",
            Self::LevelFailed => "level_failed",
            Self::GameCleared => "game_cleared",
        }
    }

    /// Check if the board is in play.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::AwaitingFirst | Self::AwaitingSecond { .. } | Self::Resolving { .. }
        )
    }

    /// Check if the session is over (only a new game or exit follows).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::LevelFailed | Self::GameCleared)
    }

    /// Face-up tiles awaiting resolution.
    pub fn selection(&self) -> Selection {
        match *self {
            Self::AwaitingSecond { first } => Selection::OneChosen(first),
            Self::Resolving { first, second } => Selection::TwoChosen(first, second),
            _ => Selection::None,
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tiles currently chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    None,
    OneChosen(usize),
    TwoChosen(usize, usize),
}

/// A mismatched pair waiting to be turned back over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingHide {
    first: usize,
    second: usize,
    due_at: u64,
}

/// Game errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Replay requested with no player to replay as
    NoSession,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSession => write!(f, "No game in progress"),
        }
    }
}

impl std::error::Error for GameError {}

/// The single controller for one player's games.
#[derive(Debug)]
pub struct Game<C: Clock = SystemClock> {
    config: GameConfig,
    store: LeaderboardStore,
    clock: C,
    rng: StdRng,
    session: Option<GameSession>,
    board: Option<Board>,
    timer: LevelTimer,
    phase: GamePhase,
    pending_hide: Option<PendingHide>,
    next_tick_at: Option<u64>,
    events: Vec<GameEvent>,
}

impl Game<SystemClock> {
    /// Game on the system clock with an OS-seeded RNG.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, SystemClock::new(), StdRng::from_os_rng())
    }
}

impl<C: Clock> Game<C> {
    pub fn with_clock(config: GameConfig, clock: C) -> Result<Self, ConfigError> {
        Self::with_rng(config, clock, StdRng::from_os_rng())
    }

    /// Deterministic boards, for replays and tests.
    pub fn with_seed(config: GameConfig, clock: C, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, clock, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, clock: C, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let store = LeaderboardStore::new(config.leaderboard_path.clone());
        Ok(Self {
            config,
            store,
            clock,
            rng,
            session: None,
            board: None,
            timer: LevelTimer::new(),
            phase: GamePhase::Idle,
            pending_hide: None,
            next_tick_at: None,
            events: Vec::new(),
        })
    }

    /// Start a fresh session for `name`.
    ///
    /// On error nothing changes; a running game keeps running.
    pub fn new_game(&mut self, name: &str) -> Result<(), NameError> {
        let player = PlayerName::parse(name)?;
        self.start_session(player);
        Ok(())
    }

    /// Play again as the current player.
    pub fn reset_game(&mut self) -> Result<(), GameError> {
        let player = self
            .session
            .as_ref()
            .map(|s| s.player.clone())
            .ok_or(GameError::NoSession)?;
        self.start_session(player);
        Ok(())
    }

    /// Discard the session and cancel everything scheduled.
    pub fn exit(&mut self) {
        self.session = None;
        self.board = None;
        self.timer.stop();
        self.phase = GamePhase::Idle;
        self.pending_hide = None;
        self.next_tick_at = None;
    }

    fn start_session(&mut self, player: PlayerName) {
        self.exit();
        self.session = Some(GameSession::new(player));
        self.load_level(1);
    }

    /// Deal a new board for `level` and restart the countdown.
    fn load_level(&mut self, level: u8) {
        // Levels were checked when the config was validated.
        let Some(spec) = self.config.levels.get(level) else {
            return;
        };
        let board = board::generate(spec, &self.config.palette, &mut self.rng);
        let limit = spec.time_limit_ms;

        if let Some(session) = self.session.as_mut() {
            session.enter_level(level);
        }
        self.board = Some(board);
        self.phase = GamePhase::AwaitingFirst;
        self.pending_hide = None;

        let now = self.clock.now_ms();
        self.timer.start(limit, now);
        self.next_tick_at = Some(now + self.config.tick_interval_ms);
    }

    /// Flip a tile.
    ///
    /// Ignored while paused, while a mismatch is waiting to be hidden,
    /// outside play, and for tiles that are face-up, matched or out of range.
    pub fn select_tile(&mut self, index: usize) {
        if self.timer.is_paused() {
            return;
        }
        let Some(board) = self.board.as_mut() else {
            return;
        };
        let Some(tile) = board.tile_mut(index) else {
            return;
        };
        if !tile.is_selectable() {
            return;
        }

        match self.phase {
            GamePhase::AwaitingFirst => {
                tile.revealed = true;
                self.phase = GamePhase::AwaitingSecond { first: index };
                self.events.push(GameEvent::TileRevealed { index });
            }
            GamePhase::AwaitingSecond { first } if first != index => {
                tile.revealed = true;
                self.phase = GamePhase::Resolving {
                    first,
                    second: index,
                };
                self.events.push(GameEvent::TileRevealed { index });
                if let Some(session) = self.session.as_mut() {
                    session.moves += 1;
                }
                self.resolve(first, index);
            }
            _ => {}
        }
    }

    fn resolve(&mut self, first: usize, second: usize) {
        let (Some(session), Some(board)) = (self.session.as_mut(), self.board.as_mut()) else {
            return;
        };

        if board.is_pair(first, second) {
            let delta = self.config.correct_match_score;
            session.scores.add_to_current_level(delta);
            session.matched_pairs += 1;
            for index in [first, second] {
                if let Some(tile) = board.tile_mut(index) {
                    tile.matched = true;
                }
            }
            self.phase = GamePhase::AwaitingFirst;
            self.events.push(GameEvent::MatchResolved {
                correct: true,
                score_delta: delta,
            });

            if session.matched_pairs * 2 >= board.len() {
                self.clear_level();
            }
        } else {
            let delta = self.config.incorrect_flip_penalty;
            session.scores.add_to_current_level(delta);
            self.events.push(GameEvent::MatchResolved {
                correct: false,
                score_delta: delta,
            });
            self.pending_hide = Some(PendingHide {
                first,
                second,
                due_at: self.clock.now_ms() + self.config.mismatch_delay_ms,
            });
        }
    }

    fn clear_level(&mut self) {
        self.timer.stop();
        self.next_tick_at = None;

        let Some(session) = self.session.as_ref() else {
            return;
        };
        let level = session.level;
        self.phase = GamePhase::LevelCleared;
        self.events.push(GameEvent::LevelCleared { level });

        if !self.config.levels.is_last(level) {
            self.load_level(level + 1);
            self.events.push(GameEvent::LevelAdvanced { level: level + 1 });
            return;
        }

        self.phase = GamePhase::GameCleared;
        let record = LeaderboardRecord::completed(
            session.player.as_str(),
            self.clock.wall_time(),
            session.scores.per_level(),
        );
        let final_score = record.final_score;
        self.persist(&record);
        self.events.push(GameEvent::GameCompleted { final_score });

        let ranking = self.leaderboard(self.config.top_scores);
        self.events.push(GameEvent::LeaderboardRanked {
            records: ranking.records,
        });
    }

    /// Level timer ran out.
    ///
    /// Fails the level once per attempt; repeat calls are no-ops.
    pub(crate) fn timer_expired(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let board_pairs = self.board.as_ref().map_or(0, |b| b.len() / 2);
        if session.failed || session.matched_pairs >= board_pairs {
            return;
        }

        session.failed = true;
        self.timer.stop();
        self.next_tick_at = None;
        // The board is frozen face-up as it was when time ran out.
        self.pending_hide = None;

        let level = session.level;
        let record = LeaderboardRecord::failed(
            session.player.as_str(),
            self.clock.wall_time(),
            session.scores.failure_scores(level),
        );
        self.phase = GamePhase::LevelFailed;
        self.persist(&record);
        self.events.push(GameEvent::LevelFailed { level });
    }

    fn persist(&mut self, record: &LeaderboardRecord) {
        if let Err(e) = self.store.append(record) {
            self.events.push(GameEvent::PersistenceFailed {
                message: e.to_string(),
            });
        }
    }

    pub fn pause(&mut self) {
        let now = self.clock.now_ms();
        if self.timer.pause(now) {
            self.next_tick_at = None;
            self.events.push(GameEvent::Paused);
        }
    }

    pub fn resume(&mut self) {
        let now = self.clock.now_ms();
        if let Some(paused_for) = self.timer.resume(now) {
            // Paused time doesn't count toward the hide delay either.
            if let Some(hide) = self.pending_hide.as_mut() {
                hide.due_at += paused_for;
            }
            self.next_tick_at = Some(now + self.config.tick_interval_ms);
            self.events.push(GameEvent::Resumed);
        }
    }

    /// Run every scheduled continuation that is due, in deadline order.
    pub fn poll(&mut self) {
        let now = self.clock.now_ms();
        loop {
            let hide_due = self
                .pending_hide
                .filter(|h| h.due_at <= now && !self.timer.is_paused())
                .map(|h| h.due_at);
            let tick_due = self.next_tick_at.filter(|&t| t <= now);

            match (hide_due, tick_due) {
                (None, None) => break,
                (Some(hide), Some(tick)) if tick < hide => self.run_tick(now),
                (Some(_), _) => self.run_hide(),
                (None, Some(_)) => self.run_tick(now),
            }
        }
    }

    fn run_hide(&mut self) {
        let Some(hide) = self.pending_hide.take() else {
            return;
        };
        if let Some(board) = self.board.as_mut() {
            for index in [hide.first, hide.second] {
                if let Some(tile) = board.tile_mut(index) {
                    tile.revealed = false;
                }
                self.events.push(GameEvent::TileHidden { index });
            }
        }
        if matches!(self.phase, GamePhase::Resolving { .. }) {
            self.phase = GamePhase::AwaitingFirst;
        }
    }

    fn run_tick(&mut self, now: u64) {
        let interval = self.config.tick_interval_ms;
        if let Some(next) = self.next_tick_at.as_mut() {
            while *next <= now {
                *next += interval;
            }
        }

        match self.timer.tick(now) {
            TimerTick::Idle => self.next_tick_at = None,
            TimerTick::Remaining(ms) => self.events.push(GameEvent::TimeUpdated {
                seconds_remaining: (ms / 1000) as u32,
            }),
            TimerTick::Expired => {
                self.events.push(GameEvent::TimeUpdated {
                    seconds_remaining: 0,
                });
                self.next_tick_at = None;
                self.timer_expired();
            }
        }
    }

    /// The `n` best leaderboard records, highest first.
    ///
    /// Read problems are reported as `LeaderboardWarning` events.
    pub fn top_scores(&mut self, n: usize) -> Vec<LeaderboardRecord> {
        self.leaderboard(n).records
    }

    fn leaderboard(&mut self, n: usize) -> Ranking {
        let ranking = self.store.top_n(n);
        for warning in &ranking.warnings {
            self.events.push(GameEvent::LeaderboardWarning {
                message: warning.to_string(),
            });
        }
        ranking
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn selection(&self) -> Selection {
        self.phase.selection()
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub fn is_paused(&self) -> bool {
        self.timer.is_paused()
    }

    pub fn timer(&self) -> &LevelTimer {
        &self.timer
    }

    /// Whole seconds left on the current level.
    pub fn seconds_remaining(&self) -> u32 {
        self.timer.remaining_secs(self.clock.now_ms())
    }

    /// Current level, or 0 with no session.
    pub fn level(&self) -> u8 {
        self.session.as_ref().map_or(0, |s| s.level)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn store(&self) -> &LeaderboardStore {
        &self.store
    }

    /// Status-line text, e.g. `Level: 2 | Time: 41s`.
    pub fn status_line(&self) -> String {
        if self.timer.is_stopped() && !self.phase.is_active() {
            format!("Level: {} | Time: --s", self.level().max(1))
        } else {
            format!(
                "Level: {} | Time: {}s",
                self.level(),
                self.seconds_remaining()
            )
        }
    }

    /// Full state snapshot for the presentation layer.
    pub fn snapshot_json(&self) -> serde_json::Value {
        serde_json::json!({
            "phase": self.phase.as_str(),
            "paused": self.is_paused(),
            "timer": self.timer.state().as_str(),
            "seconds_remaining": self.seconds_remaining(),
            "session": self.session.as_ref().map(|s| s.to_json()),
            "board": self.board.as_ref().map(|b| b.to_json())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::clock::ManualClock;
    use crate::state::leaderboard::tests::temp_log;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn make_game(name: &str) -> (Game<ManualClock>, ManualClock, PathBuf) {
        let path = temp_log(name);
        let config = GameConfig::default().with_leaderboard_path(&path);
        let clock = ManualClock::new();
        let mut game = Game::with_seed(config, clock.clone(), 7).unwrap();
        game.new_game("Bob Smith").unwrap();
        game.drain_events();
        (game, clock, path)
    }

    /// Index pairs of the unmatched tiles, grouped by symbol.
    fn open_pairs(game: &Game<ManualClock>) -> Vec<(usize, usize)> {
        let mut by_symbol: HashMap<&str, Vec<usize>> = HashMap::new();
        for tile in game.board().unwrap().tiles() {
            if !tile.matched {
                by_symbol.entry(tile.symbol.as_str()).or_default().push(tile.index);
            }
        }
        let mut pairs: Vec<(usize, usize)> =
            by_symbol.values().map(|v| (v[0], v[1])).collect();
        pairs.sort();
        pairs
    }

    fn mismatch(game: &Game<ManualClock>) -> (usize, usize) {
        let pairs = open_pairs(game);
        (pairs[0].0, pairs[1].0)
    }

    fn clear_board(game: &mut Game<ManualClock>) {
        for (a, b) in open_pairs(game) {
            game.select_tile(a);
            game.select_tile(b);
        }
    }

    fn count(events: &[GameEvent], kind: &str) -> usize {
        events.iter().filter(|e| e.as_str() == kind).count()
    }

    fn log_lines(path: &PathBuf) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_new_game() {
        let (game, _clock, _) = make_game("new-game");

        assert_eq!(game.phase(), GamePhase::AwaitingFirst);
        assert_eq!(game.level(), 1);
        assert_eq!(game.board().unwrap().len(), 16);
        assert_eq!(game.timer().limit_ms(), 60_000);
        assert!(game.timer().is_running());
        assert_eq!(game.status_line(), "Level: 1 | Time: 60s");
    }

    #[test]
    fn test_name_validation() {
        let config = GameConfig::default().with_leaderboard_path(temp_log("names"));
        let mut game = Game::with_seed(config, ManualClock::new(), 1).unwrap();

        assert_eq!(game.new_game("Bob123"), Err(NameError::InvalidCharacters));
        assert_eq!(game.new_game("   "), Err(NameError::Empty));
        assert_eq!(game.phase(), GamePhase::Idle);
        assert!(game.session().is_none());

        assert!(game.new_game("Bob Smith").is_ok());
        assert_eq!(game.session().unwrap().player.as_str(), "Bob Smith");
    }

    #[test]
    fn test_rejected_name_keeps_running_game() {
        let (mut game, _clock, _) = make_game("keep-running");
        let (a, b) = open_pairs(&game)[0];
        game.select_tile(a);
        game.select_tile(b);

        assert!(game.new_game("R2D2").is_err());
        assert_eq!(game.session().unwrap().total_score(), 10);
    }

    #[test]
    fn test_correct_match() {
        let (mut game, _clock, _) = make_game("match");
        let (a, b) = open_pairs(&game)[0];

        game.select_tile(a);
        assert_eq!(game.selection(), Selection::OneChosen(a));
        game.select_tile(b);

        let session = game.session().unwrap();
        assert_eq!(session.matched_pairs, 1);
        assert_eq!(session.total_score(), 10);
        assert_eq!(session.moves, 1);
        assert!(game.board().unwrap().tile(a).unwrap().matched);
        assert!(game.board().unwrap().tile(b).unwrap().matched);
        assert_eq!(game.phase(), GamePhase::AwaitingFirst);
        assert_eq!(game.selection(), Selection::None);

        assert_eq!(
            game.drain_events(),
            vec![
                GameEvent::TileRevealed { index: a },
                GameEvent::TileRevealed { index: b },
                GameEvent::MatchResolved {
                    correct: true,
                    score_delta: 10
                },
            ]
        );
    }

    #[test]
    fn test_mismatch_locks_until_hidden() {
        let (mut game, clock, _) = make_game("mismatch");
        let (a, b) = mismatch(&game);
        let other = open_pairs(&game)[2].0;

        game.select_tile(a);
        game.select_tile(b);

        assert_eq!(game.session().unwrap().total_score(), -2);
        assert_eq!(game.phase(), GamePhase::Resolving { first: a, second: b });
        assert_eq!(game.selection(), Selection::TwoChosen(a, b));

        // Locked during the delay
        game.select_tile(other);
        assert!(!game.board().unwrap().tile(other).unwrap().revealed);

        clock.advance_ms(499);
        game.poll();
        assert!(matches!(game.phase(), GamePhase::Resolving { .. }));
        assert!(game.board().unwrap().tile(a).unwrap().revealed);

        clock.advance_ms(1);
        game.poll();
        assert_eq!(game.phase(), GamePhase::AwaitingFirst);
        assert!(!game.board().unwrap().tile(a).unwrap().revealed);
        assert!(!game.board().unwrap().tile(b).unwrap().revealed);

        let events = game.drain_events();
        assert!(events.contains(&GameEvent::TileHidden { index: a }));
        assert!(events.contains(&GameEvent::TileHidden { index: b }));
        assert!(events.contains(&GameEvent::MatchResolved {
            correct: false,
            score_delta: -2
        }));

        // Selectable again
        game.select_tile(a);
        assert_eq!(game.selection(), Selection::OneChosen(a));
    }

    #[test]
    fn test_ignored_selections() {
        let (mut game, _clock, _) = make_game("ignored");
        let (a, b) = open_pairs(&game)[0];

        game.select_tile(99);
        assert_eq!(game.phase(), GamePhase::AwaitingFirst);

        game.select_tile(a);
        game.select_tile(a); // already revealed
        assert_eq!(game.selection(), Selection::OneChosen(a));
        assert_eq!(game.session().unwrap().moves, 0);

        game.select_tile(b);
        game.select_tile(a); // matched
        assert_eq!(game.phase(), GamePhase::AwaitingFirst);
        assert_eq!(game.session().unwrap().moves, 1);
    }

    #[test]
    fn test_level_advance() {
        let (mut game, clock, _) = make_game("advance");
        clock.advance_secs(20);

        clear_board(&mut game);

        assert_eq!(game.level(), 2);
        assert_eq!(game.phase(), GamePhase::AwaitingFirst);
        assert_eq!(game.session().unwrap().matched_pairs, 0);
        assert_eq!(game.session().unwrap().scores.per_level(), [80, 0, 0]);
        assert_eq!(game.timer().limit_ms(), 50_000);
        assert_eq!(game.seconds_remaining(), 50);
        assert!(game
            .board()
            .unwrap()
            .tiles()
            .iter()
            .all(|t| t.is_selectable() && t.symbol.parse::<u8>().is_ok()));

        let events = game.drain_events();
        assert!(events.contains(&GameEvent::LevelCleared { level: 1 }));
        assert!(events.contains(&GameEvent::LevelAdvanced { level: 2 }));
    }

    #[test]
    fn test_game_cleared_persists_record() {
        let (mut game, _clock, path) = make_game("cleared");

        clear_board(&mut game);
        // One wrong guess on level 2
        let (a, b) = mismatch(&game);
        game.select_tile(a);
        game.select_tile(b);
        game.exit_resolving_for_test();
        clear_board(&mut game);
        clear_board(&mut game);

        assert_eq!(game.phase(), GamePhase::GameCleared);
        assert!(game.timer().is_stopped());
        assert_eq!(game.session().unwrap().scores.per_level(), [80, 78, 80]);

        let lines = log_lines(&path);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("Bob Smith,01-01-2024,12:00,"));
        assert!(lines[1].ends_with(",80,78,80,238"));

        let events = game.drain_events();
        assert!(events.contains(&GameEvent::GameCompleted { final_score: 238 }));
        let ranked = events.iter().find_map(|e| match e {
            GameEvent::LeaderboardRanked { records } => Some(records.clone()),
            _ => None,
        });
        assert_eq!(ranked.unwrap()[0].final_score, 238);

        // Nothing more happens
        game.select_tile(0);
        assert_eq!(game.phase(), GamePhase::GameCleared);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_no_match_fails_once_after_61_seconds() {
        let (mut game, clock, path) = make_game("expiry");
        let mut events = Vec::new();

        for _ in 0..61 {
            clock.advance_secs(1);
            game.poll();
            events.extend(game.drain_events());
        }

        assert_eq!(count(&events, "level_failed"), 1);
        assert_eq!(count(&events, "time_updated"), 60);
        assert_eq!(
            events.iter().find(|e| e.as_str() == "time_updated"),
            Some(&GameEvent::TimeUpdated {
                seconds_remaining: 59
            })
        );
        assert_eq!(game.phase(), GamePhase::LevelFailed);
        assert!(game.session().unwrap().failed);
        assert!(game.timer().is_stopped());

        let lines = log_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "Bob Smith,01-01-2024,12:01,0,0,0,0");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_repeated_expiry_is_idempotent() {
        let (mut game, clock, path) = make_game("double-expiry");
        let (a, b) = open_pairs(&game)[0];
        game.select_tile(a);
        game.select_tile(b);

        clock.advance_secs(60);
        game.poll();
        game.timer_expired();
        game.timer_expired();
        clock.advance_secs(5);
        game.poll();

        assert_eq!(count(&game.drain_events(), "level_failed"), 1);
        assert_eq!(log_lines(&path).len(), 2);
        assert!(log_lines(&path)[1].ends_with(",10,0,0,0"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_failure_on_level_two_keeps_level_one() {
        let (mut game, clock, path) = make_game("fail-level-two");
        clear_board(&mut game);
        let (a, b) = open_pairs(&game)[0];
        game.select_tile(a);
        game.select_tile(b);

        clock.advance_secs(50);
        game.poll();

        assert_eq!(game.phase(), GamePhase::LevelFailed);
        assert!(game
            .drain_events()
            .contains(&GameEvent::LevelFailed { level: 2 }));
        assert!(log_lines(&path)[1].ends_with(",80,10,0,0"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_failure_keeps_partial_level_score() {
        let (mut game, clock, path) = make_game("partial-score");
        let (a, b) = open_pairs(&game)[0];
        game.select_tile(a);
        game.select_tile(b);

        clock.advance_secs(61);
        game.poll();

        assert_eq!(game.phase(), GamePhase::LevelFailed);
        assert_eq!(log_lines(&path)[1], "Bob Smith,01-01-2024,12:01,10,0,0,0");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_expiry_during_mismatch_delay_cancels_hide() {
        let (mut game, clock, path) = make_game("expiry-hide");
        clock.advance_ms(59_800);
        game.poll();

        let (a, b) = mismatch(&game);
        game.select_tile(a);
        game.select_tile(b);
        game.drain_events();

        clock.advance_ms(200);
        game.poll();
        clock.advance_secs(1);
        game.poll();

        let events = game.drain_events();
        assert_eq!(count(&events, "level_failed"), 1);
        assert_eq!(count(&events, "tile_hidden"), 0);
        assert_eq!(game.phase(), GamePhase::LevelFailed);
        assert!(game.board().unwrap().tile(a).unwrap().revealed);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_pause_blocks_selection_and_freezes_time() {
        let (mut game, clock, _) = make_game("pause");
        let (a, _) = open_pairs(&game)[0];

        clock.advance_secs(10);
        game.pause();
        assert!(game.is_paused());

        game.select_tile(a);
        assert!(!game.board().unwrap().tile(a).unwrap().revealed);

        clock.advance_secs(120);
        game.poll();
        assert_eq!(game.phase(), GamePhase::AwaitingFirst);
        assert_eq!(game.seconds_remaining(), 50);

        game.resume();
        assert!(!game.is_paused());
        clock.advance_secs(1);
        game.poll();
        assert_eq!(game.seconds_remaining(), 49);

        let events = game.drain_events();
        assert_eq!(count(&events, "paused"), 1);
        assert_eq!(count(&events, "resumed"), 1);
        assert_eq!(count(&events, "level_failed"), 0);
        assert!(events.contains(&GameEvent::TimeUpdated {
            seconds_remaining: 49
        }));
    }

    #[test]
    fn test_pause_holds_pending_hide() {
        let (mut game, clock, _) = make_game("pause-hide");
        let (a, b) = mismatch(&game);
        game.select_tile(a);
        game.select_tile(b);

        clock.advance_ms(200);
        game.pause();
        clock.advance_secs(5);
        game.poll();
        assert!(game.board().unwrap().tile(a).unwrap().revealed);

        game.resume();
        clock.advance_ms(299);
        game.poll();
        assert!(matches!(game.phase(), GamePhase::Resolving { .. }));

        clock.advance_ms(1);
        game.poll();
        assert_eq!(game.phase(), GamePhase::AwaitingFirst);
        assert!(!game.board().unwrap().tile(b).unwrap().revealed);
    }

    #[test]
    fn test_new_game_resets_session() {
        let (mut game, clock, _) = make_game("reset");
        clear_board(&mut game);
        clock.advance_secs(50);
        game.poll();
        assert_eq!(game.phase(), GamePhase::LevelFailed);

        game.new_game("Alice").unwrap();

        let session = game.session().unwrap();
        assert_eq!(session.player.as_str(), "Alice");
        assert_eq!(session.level, 1);
        assert_eq!(session.moves, 0);
        assert_eq!(session.total_score(), 0);
        assert!(!session.failed);
        assert_eq!(game.phase(), GamePhase::AwaitingFirst);
        assert_eq!(game.seconds_remaining(), 60);
    }

    #[test]
    fn test_reset_game_replays_as_same_player() {
        let (mut game, _clock, _) = make_game("replay");
        let (a, b) = open_pairs(&game)[0];
        game.select_tile(a);
        game.select_tile(b);

        game.reset_game().unwrap();
        assert_eq!(game.session().unwrap().player.as_str(), "Bob Smith");
        assert_eq!(game.session().unwrap().total_score(), 0);

        game.exit();
        assert_eq!(game.reset_game(), Err(GameError::NoSession));
    }

    #[test]
    fn test_exit_cancels_continuations() {
        let (mut game, clock, _) = make_game("exit");
        let (a, b) = mismatch(&game);
        game.select_tile(a);
        game.select_tile(b);
        game.drain_events();

        game.exit();
        clock.advance_secs(120);
        game.poll();

        assert!(game.drain_events().is_empty());
        assert_eq!(game.phase(), GamePhase::Idle);
        assert!(game.board().is_none());
        assert_eq!(game.status_line(), "Level: 1 | Time: --s");
    }

    #[test]
    fn test_write_failure_is_not_fatal() {
        let config = GameConfig::default().with_leaderboard_path(std::env::temp_dir());
        let clock = ManualClock::new();
        let mut game = Game::with_seed(config, clock.clone(), 3).unwrap();
        game.new_game("Carol").unwrap();

        clock.advance_secs(61);
        game.poll();

        assert_eq!(game.phase(), GamePhase::LevelFailed);
        let events = game.drain_events();
        assert_eq!(count(&events, "persistence_failed"), 1);
        assert_eq!(count(&events, "level_failed"), 1);
    }

    #[test]
    fn test_top_scores_reports_missing_log() {
        let (mut game, _clock, _) = make_game("top-missing");

        assert!(game.top_scores(3).is_empty());
        assert_eq!(count(&game.drain_events(), "leaderboard_warning"), 1);
    }

    #[test]
    fn test_snapshot_json() {
        let (mut game, _clock, _) = make_game("snapshot");
        let (a, _) = open_pairs(&game)[0];
        game.select_tile(a);

        let snapshot = game.snapshot_json();
        assert_eq!(snapshot["phase"], "awaiting_second");
        assert_eq!(snapshot["session"]["player"], "Bob Smith");
        assert_eq!(snapshot["board"].as_array().unwrap().len(), 16);
        assert!(snapshot["board"][a]["symbol"].is_string());
    }

    impl Game<ManualClock> {
        /// Let a pending mismatch hide run.
        fn exit_resolving_for_test(&mut self) {
            self.clock.advance_ms(self.config.mismatch_delay_ms);
            self.poll();
        }
    }
}
