//! Leaderboard persistence.
//!
//! An append-only comma-separated log with one header line:
//!
//! ```text
//! Name,Date,Time,Level 1,Level 2,Level 3,Final Score
//! Alice,05-03-2024,14:07,80,76,72,228
//! ```
//!
//! Every append opens, writes, flushes, syncs and closes the file before
//! returning. Reads never fail: a missing file, an unreadable file or bad
//! lines degrade to a shorter ranking plus [`LeaderboardWarning`]s.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::score::MAX_LEVELS;

pub const HEADER: &str = "Name,Date,Time,Level 1,Level 2,Level 3,Final Score";

const DATE_FORMAT: &str = "%d-%m-%Y";
const TIME_FORMAT: &str = "%H:%M";
const FIELD_COUNT: usize = 4 + MAX_LEVELS;
const FINAL_SCORE_FIELD: usize = FIELD_COUNT - 1;

/// One finished (or failed) play-through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardRecord {
    pub name: String,
    /// `None` when read back from a line with an unparsable date.
    pub date: Option<NaiveDate>,
    /// `None` when read back from a line with an unparsable time.
    pub time: Option<NaiveTime>,
    pub level_scores: [i32; MAX_LEVELS],
    pub final_score: i32,
}

impl LeaderboardRecord {
    /// Record for a completed game: real level scores and their sum.
    pub fn completed(name: &str, at: NaiveDateTime, level_scores: [i32; MAX_LEVELS]) -> Self {
        Self {
            name: name.to_string(),
            date: Some(at.date()),
            time: Some(truncate_to_minute(at.time())),
            level_scores,
            final_score: level_scores.iter().sum(),
        }
    }

    /// Record for a failed game: caller passes already-zeroed scores;
    /// the final score is always 0.
    pub fn failed(name: &str, at: NaiveDateTime, level_scores: [i32; MAX_LEVELS]) -> Self {
        Self {
            name: name.to_string(),
            date: Some(at.date()),
            time: Some(truncate_to_minute(at.time())),
            level_scores,
            final_score: 0,
        }
    }

    /// Format as one log line (no trailing newline).
    pub fn to_line(&self) -> String {
        let [l1, l2, l3] = self.level_scores;
        format!(
            "{},{},{},{},{},{},{}",
            self.name,
            self.date_field(),
            self.time_field(),
            l1,
            l2,
            l3,
            self.final_score
        )
    }

    /// Parse one log line.
    ///
    /// Only a missing or non-numeric final score rejects the line. Other
    /// bad fields are returned as issues: scores fall back to 0, dates and
    /// times to `None`.
    pub fn parse_line(line: &str) -> Result<(Self, Vec<String>), String> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let Some(final_field) = fields.get(FINAL_SCORE_FIELD) else {
            return Err(format!(
                "expected {} fields, found {}",
                FIELD_COUNT,
                fields.len()
            ));
        };
        let final_score = parse_score(final_field, "final score")?;

        let mut issues = Vec::new();
        if fields.len() != FIELD_COUNT {
            issues.push(format!(
                "expected {} fields, found {}",
                FIELD_COUNT,
                fields.len()
            ));
        }

        let date = match NaiveDate::parse_from_str(fields[1], DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(e) => {
                issues.push(format!("invalid date {:?}: {}", fields[1], e));
                None
            }
        };
        let time = match NaiveTime::parse_from_str(fields[2], TIME_FORMAT) {
            Ok(time) => Some(time),
            Err(e) => {
                issues.push(format!("invalid time {:?}: {}", fields[2], e));
                None
            }
        };

        let mut level_scores = [0; MAX_LEVELS];
        for (i, slot) in level_scores.iter_mut().enumerate() {
            match parse_score(fields[3 + i], "level score") {
                Ok(score) => *slot = score,
                Err(reason) => issues.push(reason),
            }
        }

        let record = Self {
            name: fields[0].to_string(),
            date,
            time,
            level_scores,
            final_score,
        };
        Ok((record, issues))
    }

    fn date_field(&self) -> String {
        self.date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default()
    }

    fn time_field(&self) -> String {
        self.time
            .map(|t| t.format(TIME_FORMAT).to_string())
            .unwrap_or_default()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "date": self.date.map(|d| d.format(DATE_FORMAT).to_string()),
            "time": self.time.map(|t| t.format(TIME_FORMAT).to_string()),
            "level_scores": self.level_scores,
            "final_score": self.final_score
        })
    }
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    use chrono::Timelike;
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

fn parse_score(field: &str, what: &str) -> Result<i32, String> {
    field
        .parse()
        .map_err(|_| format!("non-numeric {} {:?}", what, field))
}

/// Non-fatal problems found while reading the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardWarning {
    /// The log file does not exist yet.
    Missing,
    /// The log exists but could not be read.
    Unreadable(String),
    /// A line was skipped. `line` is 1-based.
    Malformed { line: usize, reason: String },
    /// A line was ranked but some of its fields were unusable.
    Partial { line: usize, reason: String },
}

impl fmt::Display for LeaderboardWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "Leaderboard file not found"),
            Self::Unreadable(e) => write!(f, "Error loading leaderboard: {}", e),
            Self::Malformed { line, reason } => {
                write!(f, "Skipping leaderboard line {}: {}", line, reason)
            }
            Self::Partial { line, reason } => {
                write!(f, "Leaderboard line {}: {}", line, reason)
            }
        }
    }
}

/// Leaderboard write errors.
#[derive(Debug)]
pub enum LeaderboardError {
    Write(io::Error),
}

impl fmt::Display for LeaderboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write(e) => write!(f, "Error saving progress: {}", e),
        }
    }
}

impl std::error::Error for LeaderboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Write(e) => Some(e),
        }
    }
}

impl From<io::Error> for LeaderboardError {
    fn from(e: io::Error) -> Self {
        Self::Write(e)
    }
}

/// Records read from the log, with whatever went wrong along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ranking {
    pub records: Vec<LeaderboardRecord>,
    pub warnings: Vec<LeaderboardWarning>,
}

impl Ranking {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let records: Vec<serde_json::Value> = self.records.iter().map(|r| r.to_json()).collect();
        let warnings: Vec<String> = self.warnings.iter().map(|w| w.to_string()).collect();
        serde_json::json!({
            "records": records,
            "warnings": warnings
        })
    }
}

/// File-backed leaderboard.
#[derive(Debug, Clone)]
pub struct LeaderboardStore {
    path: PathBuf,
}

impl LeaderboardStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, writing the header first if the log is empty.
    pub fn append(&self, record: &LeaderboardRecord) -> Result<(), LeaderboardError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut buf = String::new();
        if file.metadata()?.len() == 0 {
            buf.push_str(HEADER);
            buf.push('\n');
        }
        buf.push_str(&record.to_line());
        buf.push('\n');

        file.write_all(buf.as_bytes())?;
        file.flush()?;
        file.sync_all()?;
        Ok(())
    }

    /// Every rankable record in insertion order.
    pub fn records(&self) -> Ranking {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ranking {
                    records: Vec::new(),
                    warnings: vec![LeaderboardWarning::Missing],
                };
            }
            Err(e) => {
                return Ranking {
                    records: Vec::new(),
                    warnings: vec![LeaderboardWarning::Unreadable(e.to_string())],
                };
            }
        };

        let mut ranking = Ranking::default();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || (i == 0 && line == HEADER) {
                continue;
            }
            match LeaderboardRecord::parse_line(line) {
                Ok((record, issues)) => {
                    ranking.records.push(record);
                    ranking.warnings.extend(
                        issues
                            .into_iter()
                            .map(|reason| LeaderboardWarning::Partial { line: i + 1, reason }),
                    );
                }
                Err(reason) => ranking
                    .warnings
                    .push(LeaderboardWarning::Malformed { line: i + 1, reason }),
            }
        }
        ranking
    }

    /// The `n` best records by final score, highest first.
    ///
    /// Equal final scores keep their order in the log.
    pub fn top_n(&self, n: usize) -> Ranking {
        let mut ranking = self.records();
        // sort_by is stable
        ranking
            .records
            .sort_by(|a, b| b.final_score.cmp(&a.final_score));
        ranking.records.truncate(n);
        ranking
    }
}
