//! The simulation - one container for all run-wide state, advanced by `tick`.
//!
//! Per tick, while playing:
//! 1. the projectile moves and may impact, which places it (or fires an area
//!    clear), evaluates a match and re-checks ceiling support;
//! 2. removal fades advance and finished cells are freed;
//! 3. the ceiling descends (on levels that have descent) and the failure line
//!    is checked;
//! 4. an empty grid completes the level.
//!
//! Everything runs to completion inside the call; nothing is deferred.

use bevy::prelude::*;
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;

use super::{
    bubble::BubbleColor,
    cluster::{MIN_MATCH_SIZE, area_cells, find_floating, find_match},
    grid::BubbleGrid,
    hex::Cell,
    levels::{LEVEL_COUNT, LevelParams, LevelTable},
    placement::{Placement, place},
    projectile::{Impact, Projectile},
    shooter::{FAILURE_LINE_Y, LAUNCH_POSITION, Launcher},
    state::{Mode, RunState},
};

/// Fade progress added to each removing bubble per tick.
pub const REMOVAL_STEP: f32 = 0.1;

/// Something that happened during a call into the simulation.
#[derive(Message, Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    Fired { color: BubbleColor },
    Landed { cell: Cell, color: BubbleColor },
    MatchCleared { count: usize, combo: u32, points: u64 },
    ComboBroken,
    AreaCleared { center: Cell, count: usize, points: u64 },
    BubblesDropped { count: usize, points: u64 },
    LifeLost { lives: u32 },
    LevelStarted { level: u32 },
    GameWon { score: u64 },
    GameLost { score: u64 },
}

/// The whole game core.
#[derive(Resource, Debug, Clone)]
pub struct Simulation {
    pub(super) grid: BubbleGrid,
    pub(super) projectile: Option<Projectile>,
    pub(super) launcher: Launcher,
    pub(super) run: RunState,
    levels: LevelTable,
    rng: StdRng,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(LevelTable::default())
    }
}

impl Simulation {
    /// A simulation seeded from OS entropy.
    pub fn new(levels: LevelTable) -> Self {
        Self::from_rng(levels, StdRng::from_os_rng())
    }

    /// A deterministic simulation.
    pub fn with_seed(levels: LevelTable, seed: u64) -> Self {
        Self::from_rng(levels, StdRng::seed_from_u64(seed))
    }

    fn from_rng(levels: LevelTable, rng: StdRng) -> Self {
        Self {
            grid: BubbleGrid::new(),
            projectile: None,
            launcher: Launcher::default(),
            run: RunState::default(),
            levels,
            rng,
        }
    }

    pub fn mode(&self) -> Mode {
        self.run.mode
    }

    pub fn run_state(&self) -> &RunState {
        &self.run
    }

    pub fn grid(&self) -> &BubbleGrid {
        &self.grid
    }

    pub fn projectile(&self) -> Option<&Projectile> {
        self.projectile.as_ref()
    }

    pub fn launcher(&self) -> &Launcher {
        &self.launcher
    }

    /// Parameters of the active level.
    pub fn level_params(&self) -> LevelParams {
        *self.levels.get(self.run.level)
    }

    /// Start a run at level 1. Only valid from the menu.
    pub fn start_game(&mut self) -> Vec<GameEvent> {
        if self.run.mode != Mode::Menu {
            debug!("Ignoring start request in {:?}", self.run.mode);
            return Vec::new();
        }

        self.run.begin_run();
        info!("Run started");
        let mut events = Vec::new();
        self.start_level(1, &mut events);
        events
    }

    /// Go back to the menu after a won or lost run.
    pub fn restart_from_result(&mut self) -> bool {
        if !matches!(self.run.mode, Mode::Won | Mode::Lost) {
            return false;
        }

        self.run.return_to_menu();
        self.grid.clear();
        self.projectile = None;
        self.launcher.unload();
        info!("Returned to menu");
        true
    }

    /// Aim at a point given relative to the launch position.
    pub fn set_aim_direction(&mut self, dx: f32, dy: f32) -> bool {
        self.launcher.set_aim(dx, dy)
    }

    /// Launch the loaded bubble along the current aim.
    ///
    /// Does nothing unless playing with a loaded color and nothing in flight.
    pub fn fire(&mut self) -> Option<GameEvent> {
        if !self.run.is_playing() || self.projectile.is_some() {
            return None;
        }

        let params = self.level_params();
        let color = self.launcher.take_shot(&mut self.rng, &params)?;
        self.projectile = Some(Projectile::launch(
            LAUNCH_POSITION,
            self.launcher.aim_angle,
            color,
        ));

        debug!(
            "Fired {:?} at angle {:.3}",
            color, self.launcher.aim_angle
        );
        Some(GameEvent::Fired { color })
    }

    /// Advance the simulation by one frame.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if !self.run.is_playing() {
            return events;
        }

        self.step_projectile(&mut events);

        self.grid.advance_removals(REMOVAL_STEP);

        if let Some(speed) = self.level_params().descent_speed {
            self.grid.vertical_offset += speed;
        }
        self.check_failure_line(&mut events);
        if !self.run.is_playing() {
            return events;
        }

        if self.grid.is_empty() {
            self.complete_level(&mut events);
        }

        events
    }

    fn step_projectile(&mut self, events: &mut Vec<GameEvent>) {
        let Some(projectile) = self.projectile.as_mut() else {
            return;
        };
        let Some(impact) = projectile.step(&self.grid) else {
            return;
        };
        let (position, color) = (projectile.position, projectile.color);
        self.projectile = None;

        match impact {
            Impact::Bubble(cell) => debug!("Projectile hit bubble at {}", cell),
            Impact::Ceiling => debug!("Projectile hit the ceiling at {:?}", position),
        }

        match place(&mut self.grid, position, color) {
            Placement::Placed(cell) => {
                events.push(GameEvent::Landed { cell, color });
                self.resolve_match(cell, events);
            }
            Placement::AreaClear(center) => self.resolve_area_clear(center, events),
        }
    }

    fn resolve_match(&mut self, cell: Cell, events: &mut Vec<GameEvent>) {
        let cluster = find_match(&self.grid, cell);

        if cluster.len() < MIN_MATCH_SIZE {
            if self.run.combo > 0 {
                events.push(GameEvent::ComboBroken);
            }
            self.run.record_miss();
            return;
        }

        for &member in &cluster {
            self.grid.mark_for_removal(member);
        }
        self.drop_unsupported(events);

        let points = self.run.record_match(cluster.len());
        info!(
            "Matched {} bubbles at {}, combo {}, +{} points (total: {})",
            cluster.len(),
            cell,
            self.run.combo,
            points,
            self.run.score
        );
        events.push(GameEvent::MatchCleared {
            count: cluster.len(),
            combo: self.run.combo,
            points,
        });
    }

    fn resolve_area_clear(&mut self, center: Cell, events: &mut Vec<GameEvent>) {
        let cleared = area_cells(&self.grid, center);
        for &cell in &cleared {
            self.grid.mark_for_removal(cell);
        }
        self.drop_unsupported(events);

        let points = self.run.record_area_clear(cleared.len());
        info!(
            "Area clear at {} removed {} bubbles, +{} points",
            center,
            cleared.len(),
            points
        );
        events.push(GameEvent::AreaCleared {
            center,
            count: cleared.len(),
            points,
        });
    }

    /// Mark everything cut off from the ceiling and score it.
    fn drop_unsupported(&mut self, events: &mut Vec<GameEvent>) {
        let floating = find_floating(&self.grid);
        if floating.is_empty() {
            return;
        }

        for &cell in &floating {
            self.grid.mark_for_removal(cell);
        }
        let points = self.run.record_drop(floating.len());
        info!("Dropped {} unsupported bubbles, +{} points", floating.len(), points);
        events.push(GameEvent::BubblesDropped {
            count: floating.len(),
            points,
        });
    }

    fn check_failure_line(&mut self, events: &mut Vec<GameEvent>) {
        let crossed = self
            .grid
            .lowest_settled_edge()
            .is_some_and(|edge| edge > FAILURE_LINE_Y);
        if !crossed {
            return;
        }

        let out_of_lives = self.run.lose_life();
        events.push(GameEvent::LifeLost {
            lives: self.run.lives,
        });

        if out_of_lives {
            self.projectile = None;
            info!("GAME OVER! Final score: {}", self.run.score);
            events.push(GameEvent::GameLost {
                score: self.run.score,
            });
        } else {
            self.grid.vertical_offset = 0.0;
            info!("Bubbles reached the failure line, {} lives left", self.run.lives);
        }
    }

    fn complete_level(&mut self, events: &mut Vec<GameEvent>) {
        if self.run.level as usize >= LEVEL_COUNT {
            self.run.mode = Mode::Won;
            self.projectile = None;
            info!("WIN! All levels cleared! Final score: {}", self.run.score);
            events.push(GameEvent::GameWon {
                score: self.run.score,
            });
            return;
        }

        info!("Level {} cleared", self.run.level);
        self.start_level(self.run.level + 1, events);
    }

    fn start_level(&mut self, level: u32, events: &mut Vec<GameEvent>) {
        self.run.begin_level(level);
        let params = self.level_params();

        self.projectile = None;
        self.grid.populate(&mut self.rng, params.color_count);
        self.launcher.reload(&mut self.rng, &params);

        info!(
            "Level {} started with {} colors{}",
            self.run.level,
            params.color_count,
            if params.descent_speed.is_some() { ", descending" } else { "" }
        );
        events.push(GameEvent::LevelStarted {
            level: self.run.level,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{
        hex::{GRID_ROWS, row_width},
        projectile::PROJECTILE_SPEED,
        state::STARTING_LIVES,
    };

    fn playing() -> Simulation {
        let mut sim = Simulation::with_seed(LevelTable::default(), 42);
        sim.start_game();
        sim
    }

    /// A projectile one tick below `cell`'s center, heading straight up.
    fn incoming(sim: &Simulation, cell: Cell, color: BubbleColor) -> Projectile {
        Projectile {
            position: sim.grid.position(cell),
            velocity: Vec2::new(0.0, -PROJECTILE_SPEED),
            color,
        }
    }

    fn has_removal(sim: &Simulation, cell: Cell) -> bool {
        sim.grid.get(cell).is_some_and(|b| b.is_removing())
    }

    #[test]
    fn test_start_game_seeds_level_one() {
        let sim = playing();
        assert_eq!(sim.mode(), Mode::Playing);
        assert_eq!(sim.run.level, 1);
        assert_eq!(sim.run.lives, STARTING_LIVES);
        assert!(!sim.grid.is_empty());
        assert!(sim.launcher.current.is_some());
        assert!(sim.launcher.next.is_some());
    }

    #[test]
    fn test_nothing_happens_outside_play() {
        let mut sim = Simulation::with_seed(LevelTable::default(), 1);
        assert!(sim.fire().is_none());
        assert!(sim.tick().is_empty());
        assert!(!sim.restart_from_result());
    }

    #[test]
    fn test_fire_is_ignored_while_in_flight() {
        let mut sim = playing();
        let loaded = sim.launcher.current;
        assert_eq!(
            sim.fire(),
            Some(GameEvent::Fired {
                color: loaded.unwrap()
            })
        );
        assert!(sim.fire().is_none());
        assert!(sim.projectile.is_some());
    }

    #[test]
    fn test_fire_without_loaded_color_is_ignored() {
        let mut sim = playing();
        sim.launcher.unload();
        assert!(sim.fire().is_none());
        assert!(sim.projectile.is_none());
    }

    #[test]
    fn test_projectile_eventually_lands() {
        let mut sim = playing();
        let before = sim.grid.len();
        sim.fire();
        let mut landed = false;
        for _ in 0..200 {
            let events = sim.tick();
            if events.iter().any(|e| matches!(e, GameEvent::Landed { .. })) {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert!(sim.projectile.is_none());
        assert!(sim.grid.len() >= before);
    }

    #[test]
    fn test_triangle_match_clears_four() {
        let mut sim = playing();
        sim.grid.clear();
        for cell in [Cell::new(0, 0), Cell::new(0, 1), Cell::new(1, 0)] {
            sim.grid.insert(cell, BubbleColor::Red);
        }
        let target = Cell::new(1, 1);
        sim.projectile = Some(incoming(&sim, target, BubbleColor::Red));

        let events = sim.tick();

        for cell in [Cell::new(0, 0), Cell::new(0, 1), Cell::new(1, 0), target] {
            assert!(has_removal(&sim, cell), "{cell} should be fading");
        }
        assert_eq!(sim.run.score, 40);
        assert_eq!(sim.run.combo, 1);
        assert_eq!(sim.run.max_combo, 1);
        assert!(events.contains(&GameEvent::MatchCleared {
            count: 4,
            combo: 1,
            points: 40
        }));
    }

    #[test]
    fn test_match_drops_hanging_bubbles() {
        let mut sim = playing();
        sim.grid.clear();
        // Blue anchor at (0, 3) holds a green chain below it. Three blues
        // including the anchor pop, leaving the greens unsupported.
        sim.grid.insert(Cell::new(0, 3), BubbleColor::Blue);
        sim.grid.insert(Cell::new(0, 4), BubbleColor::Blue);
        sim.grid.insert(Cell::new(1, 3), BubbleColor::Green);
        sim.grid.insert(Cell::new(2, 3), BubbleColor::Green);
        sim.grid.insert(Cell::new(0, 8), BubbleColor::Yellow);
        sim.run.combo = 1;

        sim.projectile = Some(incoming(&sim, Cell::new(1, 4), BubbleColor::Blue));
        let events = sim.tick();

        for cell in [Cell::new(1, 3), Cell::new(2, 3)] {
            assert!(has_removal(&sim, cell));
        }
        assert!(!has_removal(&sim, Cell::new(0, 8)));
        // Drop uses the combo before the match increments it: 2 * 15 * (1 + 1).
        assert!(events.contains(&GameEvent::BubblesDropped {
            count: 2,
            points: 60
        }));
        assert!(events.contains(&GameEvent::MatchCleared {
            count: 3,
            combo: 2,
            points: 60
        }));
        assert_eq!(sim.run.score, 120);
    }

    #[test]
    fn test_ceiling_impact_lands_in_top_row() {
        let mut sim = playing();
        sim.grid.clear();
        sim.grid.insert(Cell::new(0, 11), BubbleColor::Blue);
        sim.projectile = Some(Projectile {
            position: Vec2::new(260.0, 30.0),
            velocity: Vec2::new(0.0, -PROJECTILE_SPEED),
            color: BubbleColor::Red,
        });

        let events = sim.tick();
        assert!(events.contains(&GameEvent::Landed {
            cell: Cell::new(0, 6),
            color: BubbleColor::Red
        }));
        assert!(sim.projectile.is_none());
    }

    #[test]
    fn test_short_match_resets_combo() {
        let mut sim = playing();
        sim.grid.clear();
        sim.grid.insert(Cell::new(0, 0), BubbleColor::Red);
        sim.run.combo = 3;
        sim.run.max_combo = 3;
        let score = sim.run.score;

        sim.projectile = Some(incoming(&sim, Cell::new(1, 0), BubbleColor::Red));
        let events = sim.tick();

        assert_eq!(sim.run.combo, 0);
        assert_eq!(sim.run.max_combo, 3);
        assert_eq!(sim.run.score, score);
        assert!(events.contains(&GameEvent::ComboBroken));
        assert!(sim.grid.settled(Cell::new(1, 0)).is_some());
    }

    #[test]
    fn test_wildcard_landing_is_a_miss() {
        let mut sim = playing();
        sim.grid.clear();
        sim.grid.insert(Cell::new(0, 0), BubbleColor::Red);
        sim.grid.insert(Cell::new(0, 1), BubbleColor::Red);
        sim.run.combo = 2;

        sim.projectile = Some(incoming(&sim, Cell::new(1, 0), BubbleColor::Wildcard));
        sim.tick();

        assert_eq!(sim.run.combo, 0);
        assert!(sim.grid.iter().all(|(_, b)| !b.is_removing()));
    }

    #[test]
    fn test_area_clear_removes_radius() {
        let mut sim = playing();
        sim.grid.clear();
        for col in 0..row_width(0) {
            sim.grid.insert(Cell::new(0, col), BubbleColor::Green);
        }
        sim.run.combo = 2;

        // Just below (0, 5), right of center so it snaps to (1, 5).
        sim.projectile = Some(Projectile {
            position: Vec2::new(244.0, 80.0),
            velocity: Vec2::new(0.0, -PROJECTILE_SPEED),
            color: BubbleColor::AreaClear,
        });
        let events = sim.tick();

        let removed: Vec<Cell> = sim
            .grid
            .iter()
            .filter(|(_, b)| b.is_removing())
            .map(|(c, _)| c)
            .collect();
        assert_eq!(removed, vec![Cell::new(0, 4), Cell::new(0, 5), Cell::new(0, 6)]);
        assert!(!sim.grid.is_occupied(Cell::new(1, 5)));
        assert_eq!(sim.run.score, 60);
        assert_eq!(sim.run.combo, 2);
        assert!(events.contains(&GameEvent::AreaCleared {
            center: Cell::new(1, 5),
            count: 3,
            points: 60
        }));
    }

    #[test]
    fn test_area_clear_counts_fading_bubbles_and_keeps_their_fade() {
        let mut sim = playing();
        sim.grid.clear();
        for col in 0..row_width(0) {
            sim.grid.insert(Cell::new(0, col), BubbleColor::Green);
        }
        sim.grid.mark_for_removal(Cell::new(0, 5));
        sim.grid.advance_removals(0.3);

        sim.projectile = Some(incoming(&sim, Cell::new(1, 5), BubbleColor::AreaClear));
        let events = sim.tick();

        assert!(events.contains(&GameEvent::AreaCleared {
            center: Cell::new(1, 5),
            count: 3,
            points: 60
        }));
        assert_eq!(sim.run.score, 60);
        let fade = |col| sim.grid.get(Cell::new(0, col)).and_then(|b| b.removal);
        assert!(fade(5).is_some_and(|p| (p - 0.4).abs() < 1e-5));
        assert!(fade(4).is_some_and(|p| (p - REMOVAL_STEP).abs() < 1e-5));
        assert!(fade(6).is_some_and(|p| (p - REMOVAL_STEP).abs() < 1e-5));
    }

    #[test]
    fn test_non_finite_aim_does_not_stall_the_shot() {
        let mut sim = playing();
        let angle = sim.launcher.aim_angle;
        assert!(!sim.set_aim_direction(f32::NAN, -1.0));
        assert_eq!(sim.launcher.aim_angle, angle);

        sim.fire();
        let landed = (0..200).any(|_| {
            sim.tick()
                .iter()
                .any(|e| matches!(e, GameEvent::Landed { .. }))
        });
        assert!(landed);
        assert!(sim.projectile.is_none());
    }

    #[test]
    fn test_removal_fades_free_cells() {
        let mut sim = playing();
        sim.grid.clear();
        sim.grid.insert(Cell::new(0, 0), BubbleColor::Red);
        sim.grid.insert(Cell::new(0, 1), BubbleColor::Blue);
        sim.grid.mark_for_removal(Cell::new(0, 0));

        for _ in 0..9 {
            sim.tick();
        }
        assert!(sim.grid.is_occupied(Cell::new(0, 0)));
        for _ in 0..2 {
            sim.tick();
        }
        assert!(!sim.grid.is_occupied(Cell::new(0, 0)));
        assert!(sim.grid.is_occupied(Cell::new(0, 1)));
    }

    #[test]
    fn test_empty_grid_advances_level() {
        let mut sim = playing();
        sim.grid.clear();
        sim.grid.insert(Cell::new(0, 0), BubbleColor::Red);
        sim.grid.mark_for_removal(Cell::new(0, 0));
        sim.run.combo = 4;
        sim.run.max_combo = 4;

        let mut started = None;
        for _ in 0..20 {
            let events = sim.tick();
            if let Some(e) = events
                .into_iter()
                .find(|e| matches!(e, GameEvent::LevelStarted { .. }))
            {
                started = Some(e);
                break;
            }
        }

        assert_eq!(started, Some(GameEvent::LevelStarted { level: 2 }));
        assert_eq!(sim.run.level, 2);
        assert_eq!(sim.run.combo, 0);
        assert_eq!(sim.run.max_combo, 4);
        assert_eq!(sim.grid.vertical_offset, 0.0);
        assert!(!sim.grid.is_empty());
        assert!(sim.launcher.current.is_some() && sim.launcher.next.is_some());
    }

    #[test]
    fn test_clearing_last_level_wins() {
        let mut sim = playing();
        sim.run.level = LEVEL_COUNT as u32;
        sim.grid.clear();

        let events = sim.tick();
        assert_eq!(sim.mode(), Mode::Won);
        assert!(events.contains(&GameEvent::GameWon {
            score: sim.run.score
        }));
        assert!(sim.tick().is_empty());

        assert!(sim.restart_from_result());
        assert_eq!(sim.mode(), Mode::Menu);
        assert!(!sim.start_game().is_empty());
        assert_eq!(sim.run.level, 1);
        assert_eq!(sim.run.score, 0);
    }

    #[test]
    fn test_descent_moves_ceiling() {
        let mut sim = playing();
        sim.run.level = 8;
        let speed = sim.level_params().descent_speed.unwrap();
        let before = sim.grid.vertical_offset;
        sim.tick();
        assert!((sim.grid.vertical_offset - (before + speed)).abs() < 1e-6);
    }

    #[test]
    fn test_failure_line_costs_a_life_then_resets_offset() {
        let mut sim = playing();
        sim.grid.clear();
        sim.grid.insert(Cell::new(0, 0), BubbleColor::Red);
        sim.grid.insert(Cell::new(GRID_ROWS - 1, 0), BubbleColor::Red);
        sim.grid.vertical_offset = 100.0;

        let events = sim.tick();
        assert!(events.contains(&GameEvent::LifeLost {
            lives: STARTING_LIVES - 1
        }));
        assert_eq!(sim.mode(), Mode::Playing);
        assert_eq!(sim.grid.vertical_offset, 0.0);
    }

    #[test]
    fn test_losing_last_life_keeps_max_combo() {
        let mut sim = playing();
        sim.grid.clear();
        sim.grid.insert(Cell::new(GRID_ROWS - 1, 0), BubbleColor::Red);
        sim.grid.vertical_offset = 100.0;
        sim.run.lives = 1;
        sim.run.max_combo = 6;

        let events = sim.tick();
        assert_eq!(sim.mode(), Mode::Lost);
        assert_eq!(sim.run.lives, 0);
        assert_eq!(sim.run.max_combo, 6);
        assert!(events.contains(&GameEvent::GameLost {
            score: sim.run.score
        }));
        assert!(sim.fire().is_none());
    }

    #[test]
    fn test_fading_bubbles_do_not_cost_lives() {
        let mut sim = playing();
        sim.grid.clear();
        sim.grid.insert(Cell::new(0, 0), BubbleColor::Red);
        sim.grid.insert(Cell::new(GRID_ROWS - 1, 0), BubbleColor::Red);
        sim.grid.mark_for_removal(Cell::new(GRID_ROWS - 1, 0));
        sim.grid.vertical_offset = 100.0;

        sim.tick();
        assert_eq!(sim.run.lives, STARTING_LIVES);
    }

    #[test]
    fn test_score_never_decreases_over_a_run() {
        let mut sim = playing();
        let mut last = sim.run.score;
        for shot in 0..40 {
            let dx = (shot as f32 * 0.7).sin() * 100.0;
            sim.set_aim_direction(dx, -100.0);
            sim.fire();
            for _ in 0..120 {
                sim.tick();
                assert!(sim.run.score >= last);
                last = sim.run.score;
            }
            if sim.mode() != Mode::Playing {
                break;
            }
        }
    }
}
