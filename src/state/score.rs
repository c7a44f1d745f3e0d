//! Per-level and total scoring for a session.

/// Levels tracked by the ledger.
pub const MAX_LEVELS: usize = 3;

/// Score ledger.
///
/// Scores may go negative; there is no floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreLedger {
    per_level: [i32; MAX_LEVELS],
    total: i32,
    /// Current level (1-indexed)
    current: u8,
}

impl Default for ScoreLedger {
    fn default() -> Self {
        Self {
            per_level: [0; MAX_LEVELS],
            total: 0,
            current: 1,
        }
    }
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to the current level and the total.
    pub fn add_to_current_level(&mut self, delta: i32) {
        if let Some(slot) = self.per_level.get_mut(self.current as usize - 1) {
            *slot += delta;
        }
        self.total += delta;
    }

    /// Move scoring to another level. Out-of-range levels are clamped.
    pub fn set_level(&mut self, level: u8) {
        self.current = level.clamp(1, MAX_LEVELS as u8);
    }

    /// Zero all scores and go back to level 1.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn current_level(&self) -> u8 {
        self.current
    }

    pub fn level_score(&self, level: u8) -> Option<i32> {
        (level as usize)
            .checked_sub(1)
            .and_then(|i| self.per_level.get(i))
            .copied()
    }

    pub fn per_level(&self) -> [i32; MAX_LEVELS] {
        self.per_level
    }

    pub fn total(&self) -> i32 {
        self.total
    }

    /// Level scores as recorded for a failed attempt at `failed_level`:
    /// points earned on that level stay, levels not yet reached are zeroed.
    pub fn failure_scores(&self, failed_level: u8) -> [i32; MAX_LEVELS] {
        let mut scores = self.per_level;
        for score in scores.iter_mut().skip(failed_level as usize) {
            *score = 0;
        }
        scores
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "per_level": self.per_level,
            "total": self.total,
            "current_level": self.current
        })
    }
}
