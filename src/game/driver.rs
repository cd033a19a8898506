//! Bevy glue: the simulation resource, inbound commands and the fixed tick.

use bevy::prelude::*;

use super::simulation::{GameEvent, Simulation};

/// Simulation ticks per second.
pub const TICK_RATE_HZ: f64 = 60.0;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<Simulation>();
    app.insert_resource(Time::<Fixed>::from_hz(TICK_RATE_HZ));

    app.add_message::<SimulationCommand>();
    app.add_message::<GameEvent>();

    app.add_systems(Update, apply_commands);
    app.add_systems(FixedUpdate, tick_simulation);
}

/// Player input, sent by whatever owns the input devices.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum SimulationCommand {
    Fire,
    /// Aim at a point relative to the launch position.
    Aim { dx: f32, dy: f32 },
    Start,
    Restart,
}

fn apply_commands(
    mut requests: MessageReader<SimulationCommand>,
    mut sim: ResMut<Simulation>,
    mut events: MessageWriter<GameEvent>,
) {
    for request in requests.read() {
        match *request {
            SimulationCommand::Fire => {
                events.write_batch(sim.fire());
            }
            SimulationCommand::Aim { dx, dy } => {
                sim.set_aim_direction(dx, dy);
            }
            SimulationCommand::Start => {
                events.write_batch(sim.start_game());
            }
            SimulationCommand::Restart => {
                sim.restart_from_result();
            }
        }
    }
}

fn tick_simulation(mut sim: ResMut<Simulation>, mut events: MessageWriter<GameEvent>) {
    events.write_batch(sim.tick());
}
