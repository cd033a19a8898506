//! Per-level difficulty parameters.
//!
//! Twenty levels ship built in. A replacement table can be loaded from JSON,
//! but it must keep the same shape: one entry per level, 3 to 8 colors each.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::error::LevelTableError;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<LevelParams>();
}

/// Number of levels in a run.
pub const LEVEL_COUNT: usize = 20;

/// Fewest ordinary colors a level may use.
pub const MIN_COLORS: u8 = 3;

/// Most ordinary colors a level may use.
pub const MAX_COLORS: u8 = 8;

/// Tuning for a single level.
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
pub struct LevelParams {
    /// How many ordinary hues can spawn.
    pub color_count: u8,
    /// Nominal projectile speed. Informational only.
    pub projectile_speed: f32,
    /// Whether launcher draws may yield special bubbles.
    pub specials: bool,
    /// Reserved; not wired to any behavior yet.
    #[serde(default)]
    pub obstacles: bool,
    /// Reserved; not wired to any behavior yet.
    #[serde(default)]
    pub time_limit: Option<u32>,
    /// Pixels the ceiling moves down per tick, if the level descends at all.
    #[serde(default)]
    pub descent_speed: Option<f32>,
}

const fn level(
    color_count: u8,
    projectile_speed: f32,
    specials: bool,
    obstacles: bool,
    time_limit: Option<u32>,
    descent_speed: Option<f32>,
) -> LevelParams {
    LevelParams {
        color_count,
        projectile_speed,
        specials,
        obstacles,
        time_limit,
        descent_speed,
    }
}

const BUILTIN_LEVELS: [LevelParams; LEVEL_COUNT] = [
    level(3, 10.0, false, false, None, None),
    level(3, 10.0, false, false, None, None),
    level(4, 11.0, false, false, None, None),
    level(4, 11.0, false, false, None, None),
    level(4, 11.0, true, false, None, None),
    level(5, 12.0, true, false, None, None),
    level(5, 12.0, true, false, None, None),
    level(5, 12.0, true, false, None, Some(0.02)),
    level(6, 13.0, true, false, None, Some(0.02)),
    level(6, 13.0, true, true, None, Some(0.03)),
    level(6, 13.0, true, true, None, Some(0.03)),
    level(6, 14.0, true, true, Some(180), Some(0.04)),
    level(7, 14.0, true, true, Some(180), Some(0.04)),
    level(7, 14.0, true, true, Some(170), Some(0.05)),
    level(7, 15.0, true, true, Some(160), Some(0.05)),
    level(7, 15.0, true, true, Some(150), Some(0.06)),
    level(8, 16.0, true, true, Some(140), Some(0.07)),
    level(8, 16.0, true, true, Some(130), Some(0.08)),
    level(8, 17.0, true, true, Some(120), Some(0.09)),
    level(8, 18.0, true, true, Some(100), Some(0.1)),
];

/// The ordered table of level parameters, indexed from 1.
///
/// Only built from the defaults or through [`LevelTable::from_json`], so it
/// always holds exactly [`LEVEL_COUNT`] validated entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LevelTable {
    levels: Vec<LevelParams>,
}

impl Default for LevelTable {
    fn default() -> Self {
        Self {
            levels: BUILTIN_LEVELS.to_vec(),
        }
    }
}

impl LevelTable {
    /// Parameters for a 1-based level index. Out-of-range indices are
    /// clamped to the first or last level.
    pub fn get(&self, level: u32) -> &LevelParams {
        let index = clamp_level(level) as usize - 1;
        &self.levels[index]
    }

    /// Number of levels in the table.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always false for a validated table.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Parse and validate a table from a JSON array of level entries.
    pub fn from_json(json: &str) -> Result<Self, LevelTableError> {
        let levels: Vec<LevelParams> = serde_json::from_str(json)?;
        let table = Self { levels };
        table.validate()?;
        Ok(table)
    }

    /// Load a table from a JSON file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelTableError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| LevelTableError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::from_json(&contents)?;
        info!("Loaded level table from {:?}", path);
        Ok(table)
    }

    /// Load a table from disk, falling back to the built-in levels on failure.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(table) => table,
            Err(e) => {
                warn!("{}; using built-in levels", e);
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<(), LevelTableError> {
        if self.levels.len() != LEVEL_COUNT {
            return Err(LevelTableError::WrongLength {
                expected: LEVEL_COUNT,
                actual: self.levels.len(),
            });
        }

        for (i, params) in self.levels.iter().enumerate() {
            if !(MIN_COLORS..=MAX_COLORS).contains(&params.color_count) {
                return Err(LevelTableError::ColorCount {
                    level: i + 1,
                    count: params.color_count,
                    min: MIN_COLORS,
                    max: MAX_COLORS,
                });
            }
        }

        Ok(())
    }
}

/// Clamp a level index into `1..=LEVEL_COUNT`.
pub fn clamp_level(level: u32) -> u32 {
    level.clamp(1, LEVEL_COUNT as u32)
}
