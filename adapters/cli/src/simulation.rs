//! Frame driver that wires the world and its systems together.

use std::{mem, time::Duration};

use glam::Vec2;
use overworld_core::{Command, DialoguePhase, Event};
use overworld_rendering::{
    DialoguePresentation, EntityPresentation, FrameInput, PlayerPresentation, RenderingError,
    Scene, TileGridPresentation,
};
use overworld_system_camera::Camera;
use overworld_system_dialogue::Typewriter;
use overworld_system_encounter::{Encounter, EncounterContext};
use overworld_system_interaction::{Interaction, InteractionContext};
use overworld_system_movement::{Movement, MovementInput};
use overworld_world::{self as world, query, World};
use tracing::warn;

use crate::config::GameConfig;

/// Number of logical ticks a frame runs and the backlog it discards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct StepPlan {
    pub(crate) ticks_to_run: u32,
    pub(crate) dropped_backlog: Duration,
}

/// Accumulates wall-clock time and converts it into fixed logical ticks.
///
/// This is not a strict "every elapsed tick runs" accumulator. A frame delta
/// longer than `max_frame_delta` is clamped first, and at most
/// `max_ticks_per_frame` ticks run per frame. Whatever whole-tick backlog is
/// left after the cap is discarded instead of being caught up later, so after
/// a stall logical time falls behind wall-clock time. Only a sub-tick
/// remainder carries over to the next frame.
#[derive(Debug)]
pub(crate) struct FixedTimestep {
    tick: Duration,
    max_frame_delta: Duration,
    max_ticks_per_frame: u32,
    accumulator: Duration,
}

impl FixedTimestep {
    pub(crate) fn new(tick: Duration, max_frame_delta: Duration, max_ticks_per_frame: u32) -> Self {
        Self {
            tick: if tick.is_zero() {
                Duration::from_nanos(1)
            } else {
                tick
            },
            max_frame_delta,
            max_ticks_per_frame,
            accumulator: Duration::ZERO,
        }
    }

    pub(crate) fn tick(&self) -> Duration {
        self.tick
    }

    /// Adds a frame delta and drains as many whole ticks as the cap allows.
    pub(crate) fn advance(&mut self, frame_dt: Duration) -> StepPlan {
        let frame_dt = frame_dt.min(self.max_frame_delta);
        let mut accumulator = self.accumulator.saturating_add(frame_dt);
        let mut ticks_to_run = 0u32;

        while accumulator >= self.tick && ticks_to_run < self.max_ticks_per_frame {
            accumulator = accumulator.saturating_sub(self.tick);
            ticks_to_run = ticks_to_run.saturating_add(1);
        }

        let dropped_backlog = if accumulator >= self.tick {
            mem::take(&mut accumulator)
        } else {
            Duration::ZERO
        };

        self.accumulator = accumulator;
        StepPlan {
            ticks_to_run,
            dropped_backlog,
        }
    }
}

/// Owns the world, every system and the camera for one play session.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    timestep: FixedTimestep,
    viewport: Vec2,
    movement: Movement,
    interaction: Interaction,
    typewriter: Typewriter,
    camera: Camera,
    encounter: Encounter,
    previous_events: Vec<Event>,
    frame_events: Vec<Event>,
    tick_events: Vec<Event>,
    commands: Vec<Command>,
}

impl Simulation {
    pub(crate) fn new(world: World, config: &GameConfig, encounter_seed: Option<u64>) -> Self {
        let viewport = config.viewport();
        let mut camera = Camera::default();
        camera.handle(
            &query::actor(&world),
            query::tile_grid(&world),
            viewport,
        );

        Self {
            timestep: FixedTimestep::new(
                config.tick_duration(),
                config.max_frame_delta(),
                config.timing.max_ticks_per_frame,
            ),
            viewport,
            movement: Movement,
            interaction: Interaction::new(config.interaction_config()),
            typewriter: Typewriter::new(config.typewriter_config()),
            camera,
            encounter: Encounter::new(config.encounter_config(encounter_seed)),
            world,
            previous_events: Vec::new(),
            frame_events: Vec::new(),
            tick_events: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Advances one presentation frame.
    ///
    /// Interaction runs first against the previous frame's events, then the
    /// fixed ticks, then the dialogue reveal clock with this frame's events.
    pub(crate) fn frame(&mut self, frame_dt: Duration, input: FrameInput) {
        self.frame_events.clear();

        self.run_interaction(frame_dt, input.interact_pressed);

        let plan = self.timestep.advance(frame_dt);
        if !plan.dropped_backlog.is_zero() {
            warn!(
                dropped_ms = plan.dropped_backlog.as_secs_f64() * 1_000.0,
                ticks = plan.ticks_to_run,
                "simulation backlog dropped"
            );
        }
        let movement_input = MovementInput {
            up: input.up,
            down: input.down,
            left: input.left,
            right: input.right,
        };
        for _ in 0..plan.ticks_to_run {
            self.run_tick(movement_input);
        }

        let phase = query::dialogue(&self.world).map(|view| view.phase());
        self.typewriter
            .handle(frame_dt, &self.frame_events, phase, &mut self.commands);
        self.flush_commands_into_frame();

        mem::swap(&mut self.previous_events, &mut self.frame_events);
    }

    fn run_interaction(&mut self, frame_dt: Duration, interact_pressed: bool) {
        let world = &self.world;
        let actor = query::actor(world);
        let context = InteractionContext {
            game_mode: query::game_mode(world),
            dialogue_phase: query::dialogue(world).map(|view| view.phase()),
            actor: &actor,
        };
        self.interaction.handle(
            frame_dt,
            &self.previous_events,
            interact_pressed,
            context,
            |cell| query::entity_at(world, cell).map(|entity| entity.lines()),
            &mut self.commands,
        );
        self.flush_commands_into_frame();
    }

    fn run_tick(&mut self, input: MovementInput) {
        self.tick_events.clear();
        world::apply(
            &mut self.world,
            Command::Tick {
                dt: self.timestep.tick(),
            },
            &mut self.tick_events,
        );

        let actor = query::actor(&self.world);
        self.movement.handle(
            &self.tick_events,
            query::game_mode(&self.world),
            &actor,
            input,
            &mut self.commands,
        );
        self.flush_commands_into_tick();

        let actor = query::actor(&self.world);
        self.camera
            .handle(&actor, query::tile_grid(&self.world), self.viewport);

        let context = EncounterContext {
            game_mode: query::game_mode(&self.world),
            motion: actor.motion,
            terrain: query::terrain_under_actor(&self.world),
        };
        self.encounter
            .handle(&self.tick_events, context, &mut self.commands);
        self.flush_commands_into_tick();

        self.frame_events.append(&mut self.tick_events);
    }

    fn flush_commands_into_tick(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.tick_events);
        }
    }

    fn flush_commands_into_frame(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.frame_events);
        }
    }

    /// Builds the scene shown on the first frame.
    pub(crate) fn initial_scene(&self) -> Result<Scene, RenderingError> {
        let grid = query::tile_grid(&self.world);
        let tile_grid = TileGridPresentation::new(
            grid.columns(),
            grid.rows(),
            grid.tile_size(),
            grid.cells().to_vec(),
        )?;
        let actor = query::actor(&self.world);
        let mut scene = Scene::new(
            self.viewport,
            tile_grid,
            PlayerPresentation::new(actor.pixel, actor.facing),
        );
        scene.entities = query::entities(&self.world)
            .iter()
            .map(|entity| EntityPresentation::new(entity.cell(), entity.kind()))
            .collect();
        self.populate_scene(&mut scene);
        Ok(scene)
    }

    /// Copies the dynamic parts of the world into `scene`.
    pub(crate) fn populate_scene(&self, scene: &mut Scene) {
        let actor = query::actor(&self.world);
        scene.camera = self.camera.offset();
        scene.player = PlayerPresentation::new(actor.pixel, actor.facing);
        scene.dialogue = query::dialogue(&self.world).map(|view| DialoguePresentation {
            text: view.revealed_text().to_owned(),
            awaiting_advance: view.phase() == DialoguePhase::AwaitingAdvance,
            has_more: view.has_more(),
        });
    }
}

#[cfg(test)]
mod tests {
    use overworld_core::{CellCoord, EntityKind, Facing, GameMode, MotionState};
    use overworld_world::{EntitySpec, MapLayout};

    use super::*;

    const FRAME: Duration = Duration::from_micros(16_667);

    fn simulation(config: &GameConfig) -> Simulation {
        let layout = MapLayout::from_glyph_rows(
            &["#######", "#.....#", "#.....#", "#######"],
            CellCoord::new(1, 1),
            Facing::Right,
        )
        .expect("valid rows")
        .with_entity(EntitySpec::new(
            EntityKind::Npc,
            CellCoord::new(3, 1),
            ["Hi.", "Bye."],
        ));
        let world = World::new(layout, config.world_config()).expect("valid world");
        Simulation::new(world, config, None)
    }

    fn quiet_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.encounter.rate_per_second = 0.0;
        config
    }

    fn press() -> FrameInput {
        FrameInput {
            interact_pressed: true,
            ..FrameInput::default()
        }
    }

    #[test]
    fn fixed_timestep_runs_expected_ticks_without_drop() {
        let tick = Duration::from_millis(16);
        let mut timestep = FixedTimestep::new(tick, Duration::from_millis(250), 5);

        let plan = timestep.advance(Duration::from_millis(48));
        assert_eq!(plan.ticks_to_run, 3);
        assert_eq!(plan.dropped_backlog, Duration::ZERO);

        assert_eq!(timestep.advance(Duration::from_millis(10)).ticks_to_run, 0);
        assert_eq!(timestep.advance(Duration::from_millis(10)).ticks_to_run, 1);
    }

    #[test]
    fn fixed_timestep_clamps_long_frames_and_drops_backlog() {
        let tick = Duration::from_millis(16);
        let mut timestep = FixedTimestep::new(tick, Duration::from_millis(120), 3);

        let plan = timestep.advance(Duration::from_millis(600));
        assert_eq!(plan.ticks_to_run, 3);
        assert_eq!(plan.dropped_backlog, Duration::from_millis(72));
        assert_eq!(timestep.advance(Duration::ZERO).ticks_to_run, 0);
    }

    #[test]
    fn stalled_frame_is_not_caught_up_afterwards() {
        let tick = Duration::from_millis(10);
        let mut timestep = FixedTimestep::new(tick, Duration::from_millis(250), 4);

        let stalled = timestep.advance(Duration::from_millis(1_000));
        assert_eq!(stalled.ticks_to_run, 4);
        assert_eq!(stalled.dropped_backlog, Duration::from_millis(210));

        for _ in 0..10 {
            let plan = timestep.advance(tick);
            assert_eq!(plan.ticks_to_run, 1);
            assert_eq!(plan.dropped_backlog, Duration::ZERO);
        }
    }

    #[test]
    fn held_direction_walks_one_cell_per_step() {
        let mut simulation = simulation(&quiet_config());
        let down = FrameInput {
            down: true,
            ..FrameInput::default()
        };

        simulation.frame(FRAME, down);
        assert_eq!(query::actor(simulation.world()).cell, CellCoord::new(1, 2));
        assert_eq!(
            query::actor(simulation.world()).motion,
            MotionState::Transitioning
        );

        for _ in 0..20 {
            simulation.frame(FRAME, FrameInput::default());
        }
        let actor = query::actor(simulation.world());
        assert_eq!(actor.cell, CellCoord::new(1, 2));
        assert_eq!(actor.motion, MotionState::Idle);
        assert_eq!(actor.pixel, Vec2::new(32.0, 64.0));
    }

    #[test]
    fn reading_an_npc_reveals_pages_and_closes() {
        let mut simulation = simulation(&quiet_config());
        let right = FrameInput {
            right: true,
            ..FrameInput::default()
        };
        simulation.frame(FRAME, right);
        for _ in 0..20 {
            simulation.frame(FRAME, FrameInput::default());
        }
        assert_eq!(query::actor(simulation.world()).cell, CellCoord::new(2, 1));

        simulation.frame(FRAME, press());
        assert_eq!(query::game_mode(simulation.world()), GameMode::Dialogue);

        for _ in 0..10 {
            simulation.frame(FRAME, FrameInput::default());
        }
        let view = query::dialogue(simulation.world()).expect("dialogue open");
        assert_eq!(view.revealed_text(), "Hi.");
        assert_eq!(view.phase(), DialoguePhase::AwaitingAdvance);

        simulation.frame(FRAME, press());
        for _ in 0..10 {
            simulation.frame(FRAME, FrameInput::default());
        }
        assert_eq!(
            query::dialogue(simulation.world()).map(|view| view.revealed_text()),
            Some("Bye.")
        );

        simulation.frame(FRAME, press());
        assert_eq!(query::game_mode(simulation.world()), GameMode::Roaming);

        // The close is still debounced on the following frame.
        simulation.frame(FRAME, FrameInput::default());
        simulation.frame(FRAME, press());
        assert_eq!(query::game_mode(simulation.world()), GameMode::Roaming);
    }

    #[test]
    fn scene_mirrors_world_state() {
        let simulation = simulation(&quiet_config());
        let scene = simulation.initial_scene().expect("valid scene");

        assert_eq!(scene.tile_grid.columns, 7);
        assert_eq!(scene.tile_grid.rows, 4);
        assert_eq!(
            scene.entities,
            vec![EntityPresentation::new(CellCoord::new(3, 1), EntityKind::Npc)]
        );
        assert_eq!(scene.player.position, Vec2::new(32.0, 32.0));
        assert_eq!(scene.player.facing, Facing::Right);
        assert!(scene.dialogue.is_none());
        assert_eq!(scene.camera, simulation.camera.offset());
    }
}
