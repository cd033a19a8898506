//! Hexpop - the rules engine of a hex-grid bubble matching arcade game.
//!
//! Add [`game::plugin`] to a Bevy app, send [`game::SimulationCommand`]s and
//! read [`game::GameEvent`]s, or drive a [`game::Simulation`] directly with
//! `tick()`.

pub mod game;
