use serde::{Deserialize, Serialize};

use crate::game::Grid;

pub const DEFAULT_COLS: i32 = 20;
pub const DEFAULT_ROWS: i32 = 20;
pub const DEFAULT_TICK_MS: u32 = 110;
pub const DEFAULT_POINTS_PER_FOOD: u32 = 10;
pub const DEFAULT_STORAGE_KEY: &str = "snake_highscore";

// The starting snake sits at x = 3..=5 heading right, so the board needs
// room ahead of it.
pub const MIN_COLS: i32 = 8;
pub const MIN_ROWS: i32 = 4;
pub const MAX_COLS: i32 = 100;
pub const MAX_ROWS: i32 = 100;
pub const MAX_POINTS_PER_FOOD: u32 = 1_000;

/// Session settings. Every field is optional when read from JSON; missing
/// fields take the reference values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub cols: i32,
    pub rows: i32,
    pub tick_ms: u32,
    pub points_per_food: u32,
    pub storage_key: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            tick_ms: DEFAULT_TICK_MS,
            points_per_food: DEFAULT_POINTS_PER_FOOD,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl GameConfig {
    /// Parses a JSON override blob (e.g. `{"cols": 30, "tick_ms": 90}`).
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let config: GameConfig = serde_json::from_str(raw)?;
        Ok(config.validated())
    }

    /// Clamps values that would leave the game unplayable.
    pub fn validated(mut self) -> Self {
        self.cols = self.cols.clamp(MIN_COLS, MAX_COLS);
        self.rows = self.rows.clamp(MIN_ROWS, MAX_ROWS);
        self.tick_ms = self.tick_ms.max(1);
        self.points_per_food = self.points_per_food.clamp(1, MAX_POINTS_PER_FOOD);
        if self.storage_key.trim().is_empty() {
            self.storage_key = DEFAULT_STORAGE_KEY.to_string();
        }
        self
    }

    pub fn grid(&self) -> Grid {
        Grid {
            cols: self.cols,
            rows: self.rows,
        }
    }
}
