//! Headless demo: plays a run with random aims and prints the final state.
//!
//! Usage: `hexpop-demo [levels.json]`

use std::time::Duration;

use bevy::{app::ScheduleRunnerPlugin, diagnostic::FrameCount, log::LogPlugin, prelude::*};
use rand::Rng;

use hexpop::game::{self, Simulation, SimulationCommand, levels::LevelTable, state::Mode};

/// Give up after this many frames (about ten minutes of play at 60 Hz).
const FRAME_CAP: u32 = 60 * 60 * 10;

fn main() -> AppExit {
    let levels = match std::env::args().nth(1) {
        Some(path) => LevelTable::load_or_default(path),
        None => LevelTable::default(),
    };

    App::new()
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 60.0,
            ))),
            LogPlugin::default(),
        ))
        .insert_resource(Simulation::new(levels))
        .add_plugins(game::plugin)
        .add_systems(Startup, start_run)
        .add_systems(Update, (autoplay, finish).chain())
        .run()
}

fn start_run(mut commands: MessageWriter<SimulationCommand>) {
    commands.write(SimulationCommand::Start);
}

/// Aim somewhere upward and shoot whenever the launcher is ready.
fn autoplay(sim: Res<Simulation>, mut commands: MessageWriter<SimulationCommand>) {
    if sim.mode() != Mode::Playing || sim.projectile().is_some() {
        return;
    }

    let mut rng = rand::rng();
    commands.write(SimulationCommand::Aim {
        dx: rng.random_range(-300.0..300.0),
        dy: rng.random_range(-400.0..-50.0),
    });
    commands.write(SimulationCommand::Fire);
}

fn finish(sim: Res<Simulation>, frames: Res<FrameCount>, mut exit: MessageWriter<AppExit>) {
    let done = matches!(sim.mode(), Mode::Won | Mode::Lost);
    if !done && frames.0 < FRAME_CAP {
        return;
    }

    let view = sim.view();
    match serde_json::to_string(&view) {
        Ok(json) => info!("Final state: {}", json),
        Err(e) => warn!("Could not serialize final state: {}", e),
    }
    info!(
        "Run ended in {:?} on level {} with score {} (max combo {})",
        view.mode, view.level, view.score, view.max_combo
    );
    exit.write(AppExit::Success);
}
