//! Notifications from the game core to the presentation layer.

use super::leaderboard::LeaderboardRecord;

/// Something the presentation layer should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    TileRevealed { index: usize },
    TileHidden { index: usize },
    MatchResolved { correct: bool, score_delta: i32 },
    /// All pairs on `level` found; sent before the next level loads.
    LevelCleared { level: u8 },
    LevelAdvanced { level: u8 },
    TimeUpdated { seconds_remaining: u32 },
    LevelFailed { level: u8 },
    GameCompleted { final_score: i32 },
    /// Ranked leaderboard shown at the end of a game.
    LeaderboardRanked { records: Vec<LeaderboardRecord> },
    Paused,
    Resumed,
    /// A leaderboard write failed; the score for this attempt is lost.
    PersistenceFailed { message: String },
    /// A non-fatal leaderboard read problem.
    LeaderboardWarning { message: String },
}

impl GameEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TileRevealed { .. } => "tile_revealed",
            Self::TileHidden { .. } => "tile_hidden",
            Self::MatchResolved { .. } => "match_resolved",
            Self::LevelCleared { .. } => "level_cleared",
            Self::LevelAdvanced { .. } => "level_advanced",
            Self::TimeUpdated { .. } => "time_updated",
            Self::LevelFailed { .. } => "level_failed",
            Self::GameCompleted { .. } => "game_completed",
            Self::LeaderboardRanked { .. } => "leaderboard_ranked",
            Self::Paused => "paused",
            Self::Resumed => "resumed",
            Self::PersistenceFailed { .. } => "persistence_failed",
            Self::LeaderboardWarning { .. } => "leaderboard_warning",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = match self {
            Self::TileRevealed { index } | Self::TileHidden { index } => {
                serde_json::json!({ "index": index })
            }
            Self::MatchResolved {
                correct,
                score_delta,
            } => serde_json::json!({ "correct": correct, "score_delta": score_delta }),
            Self::LevelCleared { level }
            | Self::LevelAdvanced { level }
            | Self::LevelFailed { level } => serde_json::json!({ "level": level }),
            Self::TimeUpdated { seconds_remaining } => {
                serde_json::json!({ "seconds_remaining": seconds_remaining })
            }
            Self::GameCompleted { final_score } => {
                serde_json::json!({ "final_score": final_score })
            }
            Self::LeaderboardRanked { records } => {
                let records: Vec<serde_json::Value> =
                    records.iter().map(|r| r.to_json()).collect();
                serde_json::json!({ "records": records })
            }
            Self::Paused | Self::Resumed => serde_json::json!({}),
            Self::PersistenceFailed { message } | Self::LeaderboardWarning { message } => {
                serde_json::json!({ "message": message })
            }
        };
        obj["type"] = serde_json::json!(self.as_str());
        obj
    }
}
