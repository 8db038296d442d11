#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Overworld adapters.
//!
//! The simulation fills a [`Scene`] every frame. [`draw_list`] turns that scene
//! into backend-agnostic [`DrawCommand`]s expressed in viewport pixels, which a
//! [`RenderingBackend`] scales onto the physical window.

mod draw_list;

use anyhow::Result as AnyResult;
use glam::Vec2;
use overworld_core::{CellCoord, EntityKind, Facing, TerrainKind};
use std::{error::Error, fmt, time::Duration};

pub use self::draw_list::{draw_list, DrawCommand, Palette};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Whether an up key is held.
    pub up: bool,
    /// Whether a down key is held.
    pub down: bool,
    /// Whether a left key is held.
    pub left: bool,
    /// Whether a right key is held.
    pub right: bool,
    /// Whether the action key went down on this frame.
    pub interact_pressed: bool,
}

/// Time spent on the simulation side of a frame, reported back to the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSimulationBreakdown {
    /// Time spent advancing the simulation.
    pub simulation: Duration,
    /// Time spent copying world state into the scene.
    pub scene_population: Duration,
}

/// Terrain layout of the map in a form renderers can draw directly.
#[derive(Clone, Debug, PartialEq)]
pub struct TileGridPresentation {
    /// Number of columns in the grid.
    pub columns: u32,
    /// Number of rows in the grid.
    pub rows: u32,
    /// Side length of a tile in pixels.
    pub tile_size: f32,
    terrain: Vec<TerrainKind>,
}

impl TileGridPresentation {
    /// Creates a new tile grid presentation from row-major terrain.
    pub fn new(
        columns: u32,
        rows: u32,
        tile_size: f32,
        terrain: Vec<TerrainKind>,
    ) -> Result<Self, RenderingError> {
        if !(tile_size.is_finite() && tile_size > 0.0) {
            return Err(RenderingError::InvalidTileSize { tile_size });
        }

        let expected = columns as usize * rows as usize;
        if terrain.len() != expected {
            return Err(RenderingError::TerrainSizeMismatch {
                expected,
                actual: terrain.len(),
            });
        }

        Ok(Self {
            columns,
            rows,
            tile_size,
            terrain,
        })
    }

    /// Terrain at the provided cell, or `None` outside the grid.
    #[must_use]
    pub fn terrain(&self, cell: CellCoord) -> Option<TerrainKind> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let index = cell.row() as usize * self.columns as usize + cell.column() as usize;
        self.terrain.get(index).copied()
    }

    /// Width of the grid measured in pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_size
    }

    /// Height of the grid measured in pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_size
    }
}

/// Static map object positioned on a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityPresentation {
    /// Cell occupied by the entity.
    pub cell: CellCoord,
    /// Kind of object, which selects its shape.
    pub kind: EntityKind,
}

impl EntityPresentation {
    /// Creates a new entity presentation.
    #[must_use]
    pub const fn new(cell: CellCoord, kind: EntityKind) -> Self {
        Self { cell, kind }
    }
}

/// Player avatar drawn at its interpolated position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerPresentation {
    /// Map-space pixel position of the avatar's top-left corner.
    pub position: Vec2,
    /// Direction the avatar faces.
    pub facing: Facing,
}

impl PlayerPresentation {
    /// Creates a new player presentation.
    #[must_use]
    pub const fn new(position: Vec2, facing: Facing) -> Self {
        Self { position, facing }
    }
}

/// Dialogue overlay content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialoguePresentation {
    /// Revealed prefix of the current line.
    pub text: String,
    /// Whether the line is fully revealed and waits for the player.
    pub awaiting_advance: bool,
    /// Whether further lines follow the current one.
    pub has_more: bool,
}

/// Scene description combining the map, its inhabitants and overlays.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Logical viewport size in pixels.
    pub viewport: Vec2,
    /// Map-space pixel shown at the top-left of the viewport.
    pub camera: Vec2,
    /// Terrain of the whole map.
    pub tile_grid: TileGridPresentation,
    /// Static objects placed on the map.
    pub entities: Vec<EntityPresentation>,
    /// The controllable avatar.
    pub player: PlayerPresentation,
    /// Dialogue overlay, present while a dialogue is open.
    pub dialogue: Option<DialoguePresentation>,
}

impl Scene {
    /// Creates a new scene descriptor with no entities and no dialogue.
    #[must_use]
    pub fn new(viewport: Vec2, tile_grid: TileGridPresentation, player: PlayerPresentation) -> Self {
        Self {
            viewport,
            camera: Vec2::ZERO,
            tile_grid,
            entities: Vec::new(),
            player,
            dialogue: None,
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Overworld scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the wall-clock frame delta
    /// and per-frame input captured by the adapter, and mutates the scene
    /// before it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameSimulationBreakdown + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Tile size must be a positive finite number.
    InvalidTileSize {
        /// Provided size that failed validation.
        tile_size: f32,
    },
    /// Terrain storage must hold exactly one entry per tile.
    TerrainSizeMismatch {
        /// Tile count implied by the dimensions.
        expected: usize,
        /// Tile count actually supplied.
        actual: usize,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileSize { tile_size } => {
                write!(f, "tile_size must be positive (received {tile_size})")
            }
            Self::TerrainSizeMismatch { expected, actual } => {
                write!(
                    f,
                    "terrain holds {actual} tiles but the grid needs {expected}"
                )
            }
        }
    }
}

impl Error for RenderingError {}
