//! Run state - score, lives, combo and the coarse game mode.
//!
//! Win: clear the grid on the last level.
//! Lose: run out of lives by letting bubbles reach the failure line.

use bevy::prelude::*;
use serde::Serialize;

use super::levels::clamp_level;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Mode>();
    app.register_type::<RunState>();
}

/// Lives at the start of a run.
pub const STARTING_LIVES: u32 = 3;

/// Points per bubble in a color match, multiplied by the combo.
const MATCH_POINTS: u64 = 10;

/// Points per bubble dropped for losing ceiling support, multiplied by combo + 1.
const DROP_POINTS: u64 = 15;

/// Points per bubble removed by an area clear.
const AREA_CLEAR_POINTS: u64 = 20;

/// Coarse game mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize)]
pub enum Mode {
    #[default]
    Menu,
    Playing,
    Won,
    Lost,
}

/// Everything about the current run that is not the grid or the projectile.
#[derive(Debug, Clone, PartialEq, Reflect, Serialize)]
pub struct RunState {
    pub mode: Mode,
    /// 1-based level index.
    pub level: u32,
    pub score: u64,
    pub lives: u32,
    /// Consecutive successful matches.
    pub combo: u32,
    pub max_combo: u32,
    pub bubbles_popped: u32,
    pub clusters_popped: u32,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            mode: Mode::Menu,
            level: 1,
            score: 0,
            lives: STARTING_LIVES,
            combo: 0,
            max_combo: 0,
            bubbles_popped: 0,
            clusters_popped: 0,
        }
    }
}

impl RunState {
    /// Begin a fresh run at level 1.
    pub fn begin_run(&mut self) {
        *self = Self {
            mode: Mode::Playing,
            ..Self::default()
        };
    }

    /// Return to the menu, keeping the last run's numbers for display.
    pub fn return_to_menu(&mut self) {
        self.mode = Mode::Menu;
    }

    /// Per-level reset. Only the combo is level-scoped.
    pub fn begin_level(&mut self, level: u32) {
        self.level = clamp_level(level);
        self.combo = 0;
    }

    pub fn is_playing(&self) -> bool {
        self.mode == Mode::Playing
    }

    /// Award a successful match of `size` bubbles. Returns the points added.
    pub fn record_match(&mut self, size: usize) -> u64 {
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        self.clusters_popped += 1;
        self.bubbles_popped += size as u32;

        let points = size as u64 * MATCH_POINTS * self.combo as u64;
        self.score += points;
        points
    }

    /// A placement that matched fewer than three bubbles.
    pub fn record_miss(&mut self) {
        self.combo = 0;
    }

    /// Award bubbles dropped by the connectivity check. Returns the points added.
    pub fn record_drop(&mut self, count: usize) -> u64 {
        self.bubbles_popped += count as u32;

        let points = count as u64 * DROP_POINTS * (self.combo as u64 + 1);
        self.score += points;
        points
    }

    /// Award bubbles removed by an area clear. Combo is untouched.
    pub fn record_area_clear(&mut self, count: usize) -> u64 {
        self.bubbles_popped += count as u32;

        let points = count as u64 * AREA_CLEAR_POINTS;
        self.score += points;
        points
    }

    /// Take a life. Returns true if that was the last one.
    pub fn lose_life(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.mode = Mode::Lost;
            return true;
        }
        false
    }
}
