//! Bubbles - the objects that live on the grid.
//!
//! A bubble has a color and, once matched or cut loose, a removal
//! progress that fades it out over a few ticks before the cell is freed.

use bevy::prelude::*;
use rand::Rng;
use serde::Serialize;

use super::levels::LevelParams;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Bubble>();
    app.register_type::<BubbleColor>();
}

/// Chance that a draw on a special-enabled level yields a special bubble.
pub const SPECIAL_CHANCE: f64 = 0.1;

/// Every bubble color: eight ordinary hues plus three special kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Default)]
pub enum BubbleColor {
    #[default]
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
    Cyan,
    Pink,
    /// Matches any color, but never seeds a match of its own.
    Wildcard,
    /// Removes everything within a small radius on impact.
    AreaClear,
    /// Reserved; has no resolution behavior yet.
    Freeze,
}

impl BubbleColor {
    /// Ordinary hues in spawn order. A level with `n` colors uses the first `n`.
    pub const ORDINARY: [BubbleColor; 8] = [
        BubbleColor::Red,
        BubbleColor::Blue,
        BubbleColor::Green,
        BubbleColor::Yellow,
        BubbleColor::Purple,
        BubbleColor::Orange,
        BubbleColor::Cyan,
        BubbleColor::Pink,
    ];

    /// The special kinds, drawn uniformly when a special spawns.
    pub const SPECIAL: [BubbleColor; 3] = [
        BubbleColor::Wildcard,
        BubbleColor::AreaClear,
        BubbleColor::Freeze,
    ];

    /// Whether this is one of the special kinds rather than a hue.
    pub fn is_special(self) -> bool {
        matches!(
            self,
            BubbleColor::Wildcard | BubbleColor::AreaClear | BubbleColor::Freeze
        )
    }

    /// A uniformly random hue among the first `color_count` ordinary colors.
    pub fn random_ordinary<R: Rng>(rng: &mut R, color_count: u8) -> Self {
        let count = (color_count as usize).clamp(1, Self::ORDINARY.len());
        Self::ORDINARY[rng.random_range(0..count)]
    }

    /// Draw the next launcher color for a level.
    ///
    /// On levels that allow specials there is a [`SPECIAL_CHANCE`] chance of
    /// getting one of the three special kinds instead of a hue.
    pub fn draw<R: Rng>(rng: &mut R, params: &LevelParams) -> Self {
        if params.specials && rng.random_bool(SPECIAL_CHANCE) {
            return Self::SPECIAL[rng.random_range(0..Self::SPECIAL.len())];
        }
        Self::random_ordinary(rng, params.color_count)
    }
}

/// A settled bubble occupying one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize)]
pub struct Bubble {
    pub color: BubbleColor,
    /// Fade progress in `[0, 1]` once the bubble has been marked for removal.
    pub removal: Option<f32>,
}

impl Bubble {
    pub fn new(color: BubbleColor) -> Self {
        Self {
            color,
            removal: None,
        }
    }

    /// Whether a removal fade is in progress.
    ///
    /// Removing bubbles are invisible to matching, connectivity and collision.
    #[inline]
    pub fn is_removing(&self) -> bool {
        self.removal.is_some()
    }

    /// Start the removal fade. Already-fading bubbles keep their progress.
    pub fn mark_for_removal(&mut self) -> bool {
        if self.removal.is_some() {
            return false;
        }
        self.removal = Some(0.0);
        true
    }

    /// Advance the fade by `step`. Returns true once it has finished.
    pub fn advance_removal(&mut self, step: f32) -> bool {
        match self.removal.as_mut() {
            Some(progress) => {
                *progress = (*progress + step).min(1.0);
                *progress >= 1.0
            }
            None => false,
        }
    }
}
