//! Game configuration.
//!
//! Level data (symbol sets, time limits), the tile palette, scoring deltas
//! and scheduling intervals. Defaults reproduce the classic three-level
//! game; a JSON file can override any field.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::score::MAX_LEVELS;

/// Tiles per board.
pub const NUM_TILES: usize = 16;

/// Distinct symbols (pairs) per board.
pub const NUM_PAIRS: usize = NUM_TILES / 2;

/// Points for a correct match.
pub const CORRECT_MATCH_SCORE: i32 = 10;

/// Points for an incorrect flip.
pub const INCORRECT_FLIP_PENALTY: i32 = -2;

/// Delay before a mismatched pair is turned back over.
pub const DEFAULT_MISMATCH_DELAY_MS: u64 = 500;

/// Timer tick cadence.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Entries shown on the end-of-game leaderboard.
pub const DEFAULT_TOP_SCORES: usize = 3;

pub const DEFAULT_LEADERBOARD_PATH: &str = "leaderboard.csv";

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` form.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Light pastel palette, one entry per pair.
pub const LIGHT_COLORS: [Color; 8] = [
    Color::new(255, 204, 204),
    Color::new(204, 255, 204),
    Color::new(204, 204, 255),
    Color::new(255, 255, 204),
    Color::new(255, 204, 255),
    Color::new(255, 229, 204),
    Color::new(229, 204, 255),
    Color::new(204, 255, 255),
];

/// Symbol set and time limit for one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSpec {
    pub symbols: Vec<String>,
    pub time_limit_ms: u64,
}

impl LevelSpec {
    pub fn new<S: Into<String>>(symbols: impl IntoIterator<Item = S>, time_limit_ms: u64) -> Self {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
            time_limit_ms,
        }
    }

    fn validate(&self, level: u8) -> Result<(), ConfigError> {
        if self.time_limit_ms == 0 {
            return Err(ConfigError::Invalid(format!(
                "level {} has a zero time limit",
                level
            )));
        }

        if self.symbols.len() != NUM_PAIRS {
            return Err(ConfigError::Invalid(format!(
                "level {} needs {} symbols, found {}",
                level,
                NUM_PAIRS,
                self.symbols.len()
            )));
        }

        let mut seen = HashSet::new();
        for symbol in &self.symbols {
            if symbol.trim().is_empty() || symbol.contains(',') {
                return Err(ConfigError::Invalid(format!(
                    "level {} has an unusable symbol {:?}",
                    level, symbol
                )));
            }
            if !seen.insert(symbol.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "level {} repeats symbol {:?}",
                    level, symbol
                )));
            }
        }

        Ok(())
    }
}

/// Levels keyed by ordinal, starting at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelTable {
    levels: Vec<LevelSpec>,
}

impl LevelTable {
    pub fn new(levels: Vec<LevelSpec>) -> Self {
        Self { levels }
    }

    /// Look up a level by ordinal (1-based).
    pub fn get(&self, level: u8) -> Option<&LevelSpec> {
        (level as usize)
            .checked_sub(1)
            .and_then(|i| self.levels.get(i))
    }

    /// Number of levels; the last ordinal.
    pub fn len(&self) -> u8 {
        self.levels.len().min(u8::MAX as usize) as u8
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn is_last(&self, level: u8) -> bool {
        level >= self.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &LevelSpec)> {
        self.levels
            .iter()
            .enumerate()
            .map(|(i, spec)| ((i + 1) as u8, spec))
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::new(vec![
            LevelSpec::new(["A", "B", "C", "D", "E", "F", "G", "H"], 60_000),
            LevelSpec::new(["1", "2", "3", "4", "5", "6", "7", "8"], 50_000),
            LevelSpec::new(
                [
                    "Apple",
                    "Banana",
                    "Cherry",
                    "Date",
                    "Elderberry",
                    "Fig",
                    "Grape",
                    "Honeydew",
                ],
                40_000,
            ),
        ])
    }
}

/// Full game configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub levels: LevelTable,
    pub palette: Vec<Color>,
    pub correct_match_score: i32,
    pub incorrect_flip_penalty: i32,
    pub mismatch_delay_ms: u64,
    pub tick_interval_ms: u64,
    pub leaderboard_path: PathBuf,
    pub top_scores: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            levels: LevelTable::default(),
            palette: LIGHT_COLORS.to_vec(),
            correct_match_score: CORRECT_MATCH_SCORE,
            incorrect_flip_penalty: INCORRECT_FLIP_PENALTY,
            mismatch_delay_ms: DEFAULT_MISMATCH_DELAY_MS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            leaderboard_path: PathBuf::from(DEFAULT_LEADERBOARD_PATH),
            top_scores: DEFAULT_TOP_SCORES,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json_str(&text)
    }

    /// Same config writing to a different leaderboard file.
    pub fn with_leaderboard_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.leaderboard_path = path.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::Invalid("no levels configured".to_string()));
        }
        if self.levels.len() as usize > MAX_LEVELS {
            return Err(ConfigError::Invalid(format!(
                "at most {} levels are supported",
                MAX_LEVELS
            )));
        }
        for (level, spec) in self.levels.iter() {
            spec.validate(level)?;
        }
        if self.palette.is_empty() {
            return Err(ConfigError::Invalid("palette is empty".to_string()));
        }
        if self.mismatch_delay_ms == 0 || self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "delays must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Config loading errors.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Cannot read config: {}", e),
            Self::Parse(e) => write!(f, "Cannot parse config: {}", e),
            Self::Invalid(reason) => write!(f, "Invalid config: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}
