//! The simulation core of the bubble shooter.
//!
//! This module contains all the gameplay logic including:
//! - Staggered hex grid addressing and storage
//! - Bubble colors and the spawn policy
//! - Launcher aim and ammunition
//! - Projectile flight and snapping
//! - Match, area-clear and ceiling-support checks
//! - Scoring, lives and level progression
//!
//! The [`simulation::Simulation`] resource owns all of it; [`plugin`] wires
//! it into a Bevy app with a 60 Hz fixed tick.

pub mod bubble;
pub mod cluster;
pub mod driver;
pub mod error;
pub mod grid;
pub mod hex;
pub mod levels;
pub mod placement;
pub mod projectile;
pub mod shooter;
pub mod simulation;
pub mod state;
pub mod view;

use bevy::prelude::*;

pub use driver::SimulationCommand;
pub use simulation::{GameEvent, Simulation};
pub use view::GameView;

pub fn plugin(app: &mut App) {
    app.add_plugins((
        hex::plugin,
        bubble::plugin,
        levels::plugin,
        state::plugin,
        driver::plugin,
    ));
}
