//! Player name validation and the per-play-through session value.

use std::fmt;

use super::score::ScoreLedger;

/// Error when a player name is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// Nothing left after trimming.
    Empty,
    /// Something other than ASCII letters and spaces.
    InvalidCharacters,
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Name cannot be empty"),
            Self::InvalidCharacters => write!(f, "Invalid name. Only characters are allowed."),
        }
    }
}

impl std::error::Error for NameError {}

/// A validated player name: trimmed, non-empty, letters and spaces only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        if !name.chars().all(|c| c.is_ascii_alphabetic() || c == ' ') {
            return Err(NameError::InvalidCharacters);
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PlayerName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// One play-through, from new game to completion, failure or exit.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub player: PlayerName,

    /// Current level (1-indexed)
    pub level: u8,

    /// Pairs found on the current board
    pub matched_pairs: usize,

    /// Second-tile selections across the whole session
    pub moves: u32,

    pub scores: ScoreLedger,

    /// Latches when the current level attempt fails
    pub failed: bool,
}

impl GameSession {
    pub fn new(player: PlayerName) -> Self {
        Self {
            player,
            level: 1,
            matched_pairs: 0,
            moves: 0,
            scores: ScoreLedger::new(),
            failed: false,
        }
    }

    /// Move to `level` with a fresh board count.
    pub fn enter_level(&mut self, level: u8) {
        self.level = level;
        self.matched_pairs = 0;
        self.scores.set_level(level);
    }

    pub fn total_score(&self) -> i32 {
        self.scores.total()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "player": self.player.as_str(),
            "level": self.level,
            "matched_pairs": self.matched_pairs,
            "moves": self.moves,
            "scores": self.scores.to_json(),
            "failed": self.failed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert_eq!(PlayerName::parse("Bob Smith").unwrap().as_str(), "Bob Smith");
        assert_eq!(PlayerName::parse("  alice  ").unwrap().as_str(), "alice");
        assert_eq!("Zoe".parse::<PlayerName>().unwrap().to_string(), "Zoe");
    }

    #[test]
    fn test_invalid_names() {
        assert_eq!(PlayerName::parse("Bob123"), Err(NameError::InvalidCharacters));
        assert_eq!(PlayerName::parse("O'Brien"), Err(NameError::InvalidCharacters));
        assert_eq!(PlayerName::parse("Ana,Maria"), Err(NameError::InvalidCharacters));
        assert_eq!(PlayerName::parse("Jos\u{e9}"), Err(NameError::InvalidCharacters));
        assert_eq!(PlayerName::parse(""), Err(NameError::Empty));
        assert_eq!(PlayerName::parse("   "), Err(NameError::Empty));
    }

    #[test]
    fn test_session_new() {
        let session = GameSession::new(PlayerName::parse("Bob").unwrap());
        assert_eq!(session.level, 1);
        assert_eq!(session.matched_pairs, 0);
        assert_eq!(session.moves, 0);
        assert_eq!(session.total_score(), 0);
        assert!(!session.failed);
    }

    #[test]
    fn test_enter_level() {
        let mut session = GameSession::new(PlayerName::parse("Bob").unwrap());
        session.matched_pairs = 8;
        session.moves = 12;
        session.enter_level(2);

        assert_eq!(session.level, 2);
        assert_eq!(session.matched_pairs, 0);
        assert_eq!(session.moves, 12);
        assert_eq!(session.scores.current_level(), 2);
    }
}
