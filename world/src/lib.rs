#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the Overworld demo.
//!
//! The world owns every piece of mutable simulation state: the terrain grid,
//! the entity registry, the player's movement state machine and the open
//! dialogue session. It is only ever mutated through [`apply`], one command at
//! a time, and read through the [`query`] module.

mod actor;
mod dialogue;
mod entities;
mod layout;

use std::collections::HashSet;

use overworld_core::{
    CellCoord, Command, DialoguePhase, DialogueRejection, EntityId, Event, GameMode,
    MotionState, TerrainKind, WELCOME_BANNER,
};
use tracing::{debug, warn};

use self::{
    actor::Actor,
    dialogue::{Advance, DialogueSession},
};

pub use self::entities::{Entity, EntityRegistry};
pub use self::layout::{EntitySpec, LayoutError, MapLayout};

const DEFAULT_TILE_SIZE: f32 = 32.0;
const DEFAULT_MOVE_SPEED: f32 = 2.0;

/// Tuning applied when a world is built from a layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldConfig {
    tile_size: f32,
    move_speed: f32,
}

impl WorldConfig {
    /// Creates a configuration with the provided tile size and per-tick speed in pixels.
    #[must_use]
    pub const fn new(tile_size: f32, move_speed: f32) -> Self {
        Self {
            tile_size,
            move_speed,
        }
    }

    /// Side length of a single tile in pixels.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Pixels travelled per logical tick while stepping.
    #[must_use]
    pub const fn move_speed(&self) -> f32 {
        self.move_speed
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_SIZE, DEFAULT_MOVE_SPEED)
    }
}

/// Immutable terrain layout of the map.
#[derive(Clone, Debug)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    tile_size: f32,
    terrain: Vec<TerrainKind>,
}

impl TileGrid {
    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a single square tile expressed in pixels.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Total width of the grid measured in pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_size
    }

    /// Total height of the grid measured in pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_size
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.index(cell).is_some()
    }

    /// Terrain at the provided cell, or `None` outside the grid.
    #[must_use]
    pub fn terrain(&self, cell: CellCoord) -> Option<TerrainKind> {
        self.index(cell)
            .and_then(|index| self.terrain.get(index).copied())
    }

    /// Row-major terrain codes.
    #[must_use]
    pub fn cells(&self) -> &[TerrainKind] {
        &self.terrain
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Represents the authoritative Overworld state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    tile_grid: TileGrid,
    entities: EntityRegistry,
    actor: Actor,
    move_speed: f32,
    dialogue: Option<DialogueSession>,
    tick_index: u64,
}

impl World {
    /// Builds a world from the provided layout.
    ///
    /// Border tiles are forced to walls. Entities and the player start must
    /// sit on distinct grass tiles inside the map.
    pub fn new(layout: MapLayout, config: WorldConfig) -> Result<Self, LayoutError> {
        let MapLayout {
            columns,
            rows,
            mut terrain,
            entities,
            player_start,
            player_facing,
        } = layout;

        let tile_size = config.tile_size();
        if !(tile_size.is_finite() && tile_size > 0.0) {
            return Err(LayoutError::InvalidTileSize { tile_size });
        }
        let speed = config.move_speed();
        if !(speed.is_finite() && speed > 0.0) {
            return Err(LayoutError::InvalidSpeed { speed });
        }
        if columns == 0 || rows == 0 {
            return Err(LayoutError::EmptyGrid);
        }
        let expected = usize::try_from(u64::from(columns) * u64::from(rows))
            .map_err(|_| LayoutError::TooLarge)?;
        if terrain.len() != expected {
            return Err(LayoutError::TerrainSizeMismatch {
                columns,
                rows,
                expected,
                actual: terrain.len(),
            });
        }

        let repaired = layout::enforce_border_walls(&mut terrain, columns, rows);
        if repaired > 0 {
            warn!(repaired, columns, rows, "map border repaired with walls");
        }

        let tile_grid = TileGrid {
            columns,
            rows,
            tile_size,
            terrain,
        };

        if tile_grid.terrain(player_start) != Some(TerrainKind::Grass) {
            return Err(LayoutError::PlayerNotOnGrass { cell: player_start });
        }

        let mut occupied: HashSet<CellCoord> = HashSet::with_capacity(entities.len());
        let mut placed = Vec::with_capacity(entities.len());
        for (index, spec) in entities.into_iter().enumerate() {
            let EntitySpec { kind, cell, lines } = spec;
            if tile_grid.terrain(cell) != Some(TerrainKind::Grass) {
                return Err(LayoutError::EntityNotOnGrass { index, cell });
            }
            if cell == player_start {
                return Err(LayoutError::EntityOnPlayer { index, cell });
            }
            if !occupied.insert(cell) {
                return Err(LayoutError::EntityOverlap { index, cell });
            }
            if lines.is_empty() {
                return Err(LayoutError::EntityWithoutLines { index });
            }
            let id = EntityId::new(u32::try_from(index).map_err(|_| LayoutError::TooLarge)?);
            placed.push(Entity::new(id, kind, cell, lines));
        }

        debug!(
            columns,
            rows,
            entities = placed.len(),
            start_column = player_start.column(),
            start_row = player_start.row(),
            "world built"
        );

        Ok(Self {
            banner: WELCOME_BANNER,
            entities: EntityRegistry::new(placed, columns, rows),
            actor: Actor::at_rest(player_start, player_facing, tile_size),
            move_speed: speed,
            dialogue: None,
            tile_grid,
            tick_index: 0,
        })
    }

    fn mode(&self) -> GameMode {
        if self.dialogue.is_some() {
            GameMode::Dialogue
        } else {
            GameMode::Roaming
        }
    }

    fn is_walkable(&self, cell: CellCoord) -> bool {
        self.tile_grid
            .terrain(cell)
            .is_some_and(TerrainKind::is_walkable)
            && !self.entities.is_occupied(cell)
    }

    fn close_dialogue(&mut self, out_events: &mut Vec<Event>) {
        if self.dialogue.take().is_some() {
            debug!(tick = self.tick_index, "dialogue closed");
            out_events.push(Event::DialogueClosed);
            out_events.push(Event::GameModeChanged {
                mode: GameMode::Roaming,
            });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });

            if let Some(cell) = world.actor.advance(world.move_speed) {
                out_events.push(Event::ActorArrived { cell });
            }
        }
        Command::StepActor { direction } => {
            if world.mode() != GameMode::Roaming
                || world.actor.motion() != MotionState::Idle
            {
                return;
            }

            let from = world.actor.cell();
            match from
                .neighbor(direction)
                .filter(|cell| world.is_walkable(*cell))
            {
                Some(to) => {
                    world
                        .actor
                        .begin_step(to, direction, world.tile_grid.tile_size());
                    out_events.push(Event::ActorStepped {
                        from,
                        to,
                        facing: direction,
                    });
                }
                None => {
                    world.actor.turn(direction);
                    out_events.push(Event::ActorBlocked {
                        cell: from,
                        facing: direction,
                    });
                }
            }
        }
        Command::OpenDialogue { lines } => {
            if world.dialogue.is_some() {
                out_events.push(Event::DialogueRejected {
                    reason: DialogueRejection::AlreadyOpen,
                });
                return;
            }

            let Some(session) = DialogueSession::open(lines) else {
                out_events.push(Event::DialogueRejected {
                    reason: DialogueRejection::NoLines,
                });
                return;
            };

            debug!(
                tick = world.tick_index,
                lines = session.line_count(),
                "dialogue opened"
            );
            let revealed_immediately =
                session.phase() == DialoguePhase::AwaitingAdvance;
            out_events.push(Event::GameModeChanged {
                mode: GameMode::Dialogue,
            });
            out_events.push(Event::DialogueOpened {
                line_count: session.line_count(),
            });
            out_events.push(Event::DialogueLineStarted { index: 0 });
            if revealed_immediately {
                out_events.push(Event::DialogueLineRevealed { index: 0 });
            }
            world.dialogue = Some(session);
        }
        Command::RevealDialogue { characters } => {
            if let Some(session) = world.dialogue.as_mut() {
                if session.reveal(characters) {
                    out_events.push(Event::DialogueLineRevealed {
                        index: session.index(),
                    });
                }
            }
        }
        Command::AdvanceDialogue => {
            let Some(session) = world.dialogue.as_mut() else {
                return;
            };

            match session.advance() {
                Advance::Ignored => {}
                Advance::NextLine {
                    index,
                    revealed_immediately,
                } => {
                    out_events.push(Event::DialogueLineStarted { index });
                    if revealed_immediately {
                        out_events.push(Event::DialogueLineRevealed { index });
                    }
                }
                Advance::Finished => world.close_dialogue(out_events),
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec2;
    use overworld_core::{
        CellCoord, DialoguePhase, Facing, GameMode, MotionState, TerrainKind,
    };

    use super::{dialogue::DialogueSession, Entity, EntityRegistry, TileGrid, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the world's tile grid.
    #[must_use]
    pub fn tile_grid(world: &World) -> &TileGrid {
        &world.tile_grid
    }

    /// Provides read-only access to the placed entities.
    #[must_use]
    pub fn entities(world: &World) -> &EntityRegistry {
        &world.entities
    }

    /// Returns the entity standing on the provided cell, if any.
    #[must_use]
    pub fn entity_at(world: &World, cell: CellCoord) -> Option<&Entity> {
        world.entities.occupant(cell)
    }

    /// Reports whether the player may step onto the provided cell.
    ///
    /// True exactly when the cell is inside the grid, its terrain is grass
    /// and no entity stands on it.
    #[must_use]
    pub fn is_walkable(world: &World, cell: CellCoord) -> bool {
        world.is_walkable(cell)
    }

    /// Current top-level game mode.
    #[must_use]
    pub fn game_mode(world: &World) -> GameMode {
        world.mode()
    }

    /// Number of logical ticks applied so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures the player's current movement state.
    #[must_use]
    pub fn actor(world: &World) -> ActorSnapshot {
        ActorSnapshot {
            cell: world.actor.cell(),
            facing: world.actor.facing(),
            motion: world.actor.motion(),
            pixel: world.actor.pixel(),
            target: world.actor.target(),
        }
    }

    /// Terrain under the player's logical cell.
    #[must_use]
    pub fn terrain_under_actor(world: &World) -> Option<TerrainKind> {
        world.tile_grid.terrain(world.actor.cell())
    }

    /// Exposes the open dialogue session, if any.
    #[must_use]
    pub fn dialogue(world: &World) -> Option<DialogueView<'_>> {
        world
            .dialogue
            .as_ref()
            .map(|session| DialogueView { session })
    }

    /// Immutable representation of the player's movement state.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ActorSnapshot {
        /// Authoritative grid cell; already the destination while stepping.
        pub cell: CellCoord,
        /// Direction the player faces.
        pub facing: Facing,
        /// Phase of the movement state machine.
        pub motion: MotionState,
        /// Interpolated pixel position of the player's top-left corner.
        pub pixel: Vec2,
        /// Pixel position the interpolation is heading toward.
        pub target: Vec2,
    }

    impl ActorSnapshot {
        /// Cell directly in front of the player, if it has non-negative coordinates.
        #[must_use]
        pub fn facing_cell(&self) -> Option<CellCoord> {
            self.cell.neighbor(self.facing)
        }
    }

    /// Read-only view of an open dialogue session.
    #[derive(Clone, Copy, Debug)]
    pub struct DialogueView<'a> {
        session: &'a DialogueSession,
    }

    impl<'a> DialogueView<'a> {
        /// Reveal phase of the current page.
        #[must_use]
        pub fn phase(&self) -> DialoguePhase {
            self.session.phase()
        }

        /// Zero-based index of the current page.
        #[must_use]
        pub fn line_index(&self) -> usize {
            self.session.index()
        }

        /// Number of pages the session opened with.
        #[must_use]
        pub fn line_count(&self) -> usize {
            self.session.line_count()
        }

        /// Reports whether pages remain after the current one.
        #[must_use]
        pub fn has_more(&self) -> bool {
            self.session.has_more()
        }

        /// Full text of the current page.
        #[must_use]
        pub fn current_line(&self) -> &'a str {
            self.session.current_line()
        }

        /// Portion of the current page revealed so far.
        #[must_use]
        pub fn revealed_text(&self) -> &'a str {
            self.session.revealed_text()
        }
    }
}
