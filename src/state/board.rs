//! Board generation.
//!
//! A board holds two tiles of each of a level's symbols in a uniformly
//! shuffled order, plus a color per symbol assigned in first-seen order.

use std::collections::HashMap;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

use super::config::{Color, LevelSpec, LevelTable};

/// A single face-down/face-up cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub index: usize,
    pub symbol: String,
    pub revealed: bool,
    pub matched: bool,
}

impl Tile {
    pub fn new(index: usize, symbol: impl Into<String>) -> Self {
        Self {
            index,
            symbol: symbol.into(),
            revealed: false,
            matched: false,
        }
    }

    /// Face-down and still in play.
    pub fn is_selectable(&self) -> bool {
        !self.revealed && !self.matched
    }

    pub fn to_json(&self) -> serde_json::Value {
        // Hidden symbols stay hidden from the presentation layer.
        let symbol = if self.revealed || self.matched {
            Some(self.symbol.as_str())
        } else {
            None
        };
        serde_json::json!({
            "index": self.index,
            "symbol": symbol,
            "revealed": self.revealed,
            "matched": self.matched
        })
    }
}

/// The tiles and colors for one level.
#[derive(Debug, Clone)]
pub struct Board {
    tiles: Vec<Tile>,
    colors: HashMap<String, Color>,
}

impl Board {
    /// Build a board from tiles in their final order and assign colors.
    ///
    /// Colors follow first appearance: the first new symbol gets
    /// `palette[0]`, the next `palette[1]`, wrapping if the palette is short.
    pub fn from_symbols<S: Into<String>>(
        symbols: impl IntoIterator<Item = S>,
        palette: &[Color],
    ) -> Self {
        let tiles: Vec<Tile> = symbols
            .into_iter()
            .enumerate()
            .map(|(i, s)| Tile::new(i, s))
            .collect();

        let mut colors = HashMap::new();
        if !palette.is_empty() {
            let mut next = 0;
            for tile in &tiles {
                if !colors.contains_key(&tile.symbol) {
                    colors.insert(tile.symbol.clone(), palette[next % palette.len()]);
                    next += 1;
                }
            }
        }

        Self { tiles, colors }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    pub(crate) fn tile_mut(&mut self, index: usize) -> Option<&mut Tile> {
        self.tiles.get_mut(index)
    }

    /// Color assigned to a symbol.
    pub fn color_for(&self, symbol: &str) -> Option<Color> {
        self.colors.get(symbol).copied()
    }

    /// Color of the tile at `index`.
    pub fn color_of(&self, index: usize) -> Option<Color> {
        self.tile(index).and_then(|t| self.color_for(&t.symbol))
    }

    /// Check whether two tiles share a symbol.
    pub fn is_pair(&self, a: usize, b: usize) -> bool {
        match (self.tile(a), self.tile(b)) {
            (Some(x), Some(y)) => a != b && x.symbol == y.symbol,
            _ => false,
        }
    }

    pub fn distinct_symbols(&self) -> usize {
        self.colors.len()
    }

    pub fn matched_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.matched).count()
    }

    /// Symbol → occurrence count.
    pub fn histogram(&self) -> HashMap<&str, usize> {
        let mut counts = HashMap::new();
        for tile in &self.tiles {
            *counts.entry(tile.symbol.as_str()).or_insert(0) += 1;
        }
        counts
    }

    pub fn to_json(&self) -> serde_json::Value {
        let tiles: Vec<serde_json::Value> = self
            .tiles
            .iter()
            .map(|t| {
                let mut obj = t.to_json();
                if t.revealed || t.matched {
                    if let Some(color) = self.color_for(&t.symbol) {
                        obj["color"] = serde_json::json!(color.to_hex());
                    }
                }
                obj
            })
            .collect();
        serde_json::Value::Array(tiles)
    }
}

/// Generate a shuffled board for one level.
pub fn generate<R: Rng + ?Sized>(spec: &LevelSpec, palette: &[Color], rng: &mut R) -> Board {
    let mut symbols: Vec<&str> = spec
        .symbols
        .iter()
        .flat_map(|s| [s.as_str(), s.as_str()])
        .collect();
    symbols.shuffle(rng);
    Board::from_symbols(symbols, palette)
}

impl LevelTable {
    /// Generate a board for a level ordinal.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        level: u8,
        palette: &[Color],
        rng: &mut R,
    ) -> Result<Board, BoardError> {
        let spec = self.get(level).ok_or(BoardError::UnknownLevel(level))?;
        Ok(generate(spec, palette, rng))
    }
}

/// Board errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    UnknownLevel(u8),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownLevel(level) => write!(f, "No such level: {}", level),
        }
    }
}

impl std::error::Error for BoardError {}
