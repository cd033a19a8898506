//! The launcher at the bottom of the playfield.
//!
//! The launcher holds an aim angle, a loaded color and a preview of the
//! next color. Firing hands out the loaded color and shifts the preview in.

use bevy::prelude::*;
use rand::Rng;
use serde::Serialize;

use super::{
    bubble::BubbleColor,
    hex::{FIELD_HEIGHT, FIELD_WIDTH, SPACING},
    levels::LevelParams,
};

/// Where projectiles start.
pub const LAUNCH_POSITION: Vec2 = Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT - 50.0);

/// A bubble whose bottom edge passes this line costs a life.
pub const FAILURE_LINE_Y: f32 = LAUNCH_POSITION.y - SPACING * 2.0;

/// Closest the aim may get to horizontal, in radians.
const AIM_MARGIN: f32 = 0.3;

/// Smallest allowed aim angle (pointing up-left).
pub const MIN_AIM_ANGLE: f32 = -std::f32::consts::PI + AIM_MARGIN;

/// Largest allowed aim angle (pointing up-right).
pub const MAX_AIM_ANGLE: f32 = -AIM_MARGIN;

/// Straight up, with Y pointing down.
const DEFAULT_AIM_ANGLE: f32 = -std::f32::consts::FRAC_PI_2;

/// Aim and ammunition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Launcher {
    /// Radians from the +X axis; negative is upward.
    pub aim_angle: f32,
    pub current: Option<BubbleColor>,
    pub next: Option<BubbleColor>,
}

impl Default for Launcher {
    fn default() -> Self {
        Self {
            aim_angle: DEFAULT_AIM_ANGLE,
            current: None,
            next: None,
        }
    }
}

impl Launcher {
    /// Point at a target given relative to the launch position.
    ///
    /// Targets at or below the launch point, or with a non-finite component,
    /// are ignored. Returns whether the aim changed.
    pub fn set_aim(&mut self, dx: f32, dy: f32) -> bool {
        if !dx.is_finite() || !dy.is_finite() || dy >= 0.0 {
            return false;
        }
        self.aim_angle = dy.atan2(dx).clamp(MIN_AIM_ANGLE, MAX_AIM_ANGLE);
        true
    }

    /// Draw fresh loaded and next colors, resetting the aim.
    pub fn reload<R: Rng>(&mut self, rng: &mut R, params: &LevelParams) {
        self.aim_angle = DEFAULT_AIM_ANGLE;
        self.current = Some(BubbleColor::draw(rng, params));
        self.next = Some(BubbleColor::draw(rng, params));
    }

    /// Empty the launcher.
    pub fn unload(&mut self) {
        self.current = None;
        self.next = None;
    }

    /// Take the loaded color and cycle: loaded <- next <- new draw.
    pub fn take_shot<R: Rng>(&mut self, rng: &mut R, params: &LevelParams) -> Option<BubbleColor> {
        let shot = self.current.take()?;
        self.current = self.next.take();
        self.next = Some(BubbleColor::draw(rng, params));
        Some(shot)
    }
}
