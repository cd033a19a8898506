//! Projectile - the bubble being shot.
//!
//! The projectile travels in a straight line at a fixed per-tick velocity,
//! bouncing off the side walls, until it touches a settled bubble or the
//! ceiling.

use bevy::prelude::*;

use super::{
    bubble::BubbleColor,
    grid::BubbleGrid,
    hex::{BUBBLE_RADIUS, Cell, FIELD_WIDTH},
};

/// Radius of the projectile.
pub const PROJECTILE_RADIUS: f32 = BUBBLE_RADIUS;

/// Distance travelled per tick, in pixels.
pub const PROJECTILE_SPEED: f32 = 12.0;

/// Left wall X position.
pub const LEFT_WALL: f32 = 0.0;

/// Right wall X position.
pub const RIGHT_WALL: f32 = FIELD_WIDTH;

/// Ceiling Y position. Projectiles whose top edge passes it stop.
pub const CEILING: f32 = 0.0;

/// Center distance below which the projectile touches a settled bubble.
const COLLISION_DISTANCE: f32 = BUBBLE_RADIUS * 2.0;

/// The bubble in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub position: Vec2,
    /// Per-tick displacement.
    pub velocity: Vec2,
    pub color: BubbleColor,
}

/// What stopped the projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Impact {
    /// Touched the settled bubble at this cell.
    Bubble(Cell),
    /// Crossed the ceiling.
    Ceiling,
}

impl Projectile {
    /// Launch from `origin` along `angle` (radians from +X, Y down).
    pub fn launch(origin: Vec2, angle: f32, color: BubbleColor) -> Self {
        Self {
            position: origin,
            velocity: Vec2::from_angle(angle) * PROJECTILE_SPEED,
            color,
        }
    }

    /// Move one tick and reflect off the side walls.
    ///
    /// Returns true if the projectile bounced.
    pub fn advance(&mut self) -> bool {
        self.position += self.velocity;

        if self.position.x - PROJECTILE_RADIUS < LEFT_WALL {
            self.position.x = LEFT_WALL + PROJECTILE_RADIUS;
            self.velocity.x = self.velocity.x.abs();
            return true;
        }

        if self.position.x + PROJECTILE_RADIUS > RIGHT_WALL {
            self.position.x = RIGHT_WALL - PROJECTILE_RADIUS;
            self.velocity.x = -self.velocity.x.abs();
            return true;
        }

        false
    }

    /// Check whether the projectile is touching something.
    ///
    /// Bubbles are scanned in row-major order and the first one within
    /// collision distance wins, even if a later one is closer. Fading bubbles
    /// are ignored.
    pub fn check_impact(&self, grid: &BubbleGrid) -> Option<Impact> {
        let hit = grid
            .iter_settled()
            .find(|&(cell, _)| self.position.distance(grid.position(cell)) < COLLISION_DISTANCE);

        if let Some((cell, _)) = hit {
            return Some(Impact::Bubble(cell));
        }

        if self.position.y - PROJECTILE_RADIUS < CEILING {
            return Some(Impact::Ceiling);
        }

        None
    }

    /// Advance one tick and report an impact, if any.
    pub fn step(&mut self, grid: &BubbleGrid) -> Option<Impact> {
        if self.advance() {
            debug!("Projectile bounced at {:?}", self.position);
        }
        self.check_impact(grid)
    }
}
