//! Read-only snapshot of the simulation for presentation.

use serde::Serialize;

use super::{
    bubble::BubbleColor,
    hex::BUBBLE_RADIUS,
    projectile::PROJECTILE_RADIUS,
    simulation::Simulation,
    state::Mode,
};

/// One occupied grid cell as it should be drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BubbleView {
    pub row: usize,
    pub col: usize,
    pub x: f32,
    pub y: f32,
    pub color: BubbleColor,
    pub radius: f32,
    /// Fade progress in `[0, 1]`, absent for settled bubbles.
    pub removal: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectileView {
    pub x: f32,
    pub y: f32,
    pub color: BubbleColor,
    pub radius: f32,
}

/// Everything a renderer or HUD needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameView {
    pub mode: Mode,
    pub bubbles: Vec<BubbleView>,
    pub projectile: Option<ProjectileView>,
    pub current: Option<BubbleColor>,
    pub next: Option<BubbleColor>,
    pub aim_angle: f32,
    pub score: u64,
    pub lives: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub level: u32,
    pub bubbles_popped: u32,
    pub clusters_popped: u32,
}

impl Simulation {
    pub fn view(&self) -> GameView {
        let bubbles = self
            .grid
            .iter()
            .map(|(cell, bubble)| {
                let pos = self.grid.position(cell);
                BubbleView {
                    row: cell.row,
                    col: cell.col,
                    x: pos.x,
                    y: pos.y,
                    color: bubble.color,
                    radius: BUBBLE_RADIUS,
                    removal: bubble.removal,
                }
            })
            .collect();

        let projectile = self.projectile.as_ref().map(|p| ProjectileView {
            x: p.position.x,
            y: p.position.y,
            color: p.color,
            radius: PROJECTILE_RADIUS,
        });

        GameView {
            mode: self.run.mode,
            bubbles,
            projectile,
            current: self.launcher.current,
            next: self.launcher.next,
            aim_angle: self.launcher.aim_angle,
            score: self.run.score,
            lives: self.run.lives,
            combo: self.run.combo,
            max_combo: self.run.max_combo,
            level: self.run.level,
            bubbles_popped: self.run.bubbles_popped,
            clusters_popped: self.run.clusters_popped,
        }
    }
}
