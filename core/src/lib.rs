#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Overworld demo.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what actually happened. Systems consume event streams, query
//! immutable snapshots, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to the Overworld.";

/// Top-level mode gating which inputs the simulation reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameMode {
    /// The player walks the map and may start interactions.
    Roaming,
    /// A dialogue overlay is open and world movement is suspended.
    Dialogue,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the logical simulation clock by one fixed tick.
    Tick {
        /// Duration of simulated time covered by the tick.
        dt: Duration,
    },
    /// Requests that the player attempt a single grid step.
    StepActor {
        /// Direction the player attempts to walk in.
        direction: Facing,
    },
    /// Requests that a dialogue session open with the provided pages.
    OpenDialogue {
        /// Ordered lines shown one page at a time.
        lines: Vec<String>,
    },
    /// Reveals additional characters of the dialogue line currently shown.
    RevealDialogue {
        /// Number of characters to append to the revealed prefix.
        characters: u32,
    },
    /// Requests that the dialogue move to its next page or close.
    AdvanceDialogue,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player committed to a step between two cells.
    ActorStepped {
        /// Cell the player occupied before the step.
        from: CellCoord,
        /// Cell the player logically occupies for the rest of the step.
        to: CellCoord,
        /// Direction the player faces after stepping.
        facing: Facing,
    },
    /// Reports that a step was rejected and the player only turned.
    ActorBlocked {
        /// Cell the player remains on.
        cell: CellCoord,
        /// Direction the player faces after turning.
        facing: Facing,
    },
    /// Reports that the player's pixel position reached its grid cell.
    ActorArrived {
        /// Cell the player came to rest on.
        cell: CellCoord,
    },
    /// Announces that the simulation entered a new game mode.
    GameModeChanged {
        /// Mode that became active after processing commands.
        mode: GameMode,
    },
    /// Confirms that a dialogue session opened.
    DialogueOpened {
        /// Number of pages queued in the session.
        line_count: usize,
    },
    /// Announces that a dialogue page started revealing.
    DialogueLineStarted {
        /// Zero-based index of the page within the session.
        index: usize,
    },
    /// Announces that the current dialogue page is fully revealed.
    DialogueLineRevealed {
        /// Zero-based index of the page within the session.
        index: usize,
    },
    /// Confirms that the dialogue session closed.
    DialogueClosed,
    /// Reports that a dialogue request was rejected.
    DialogueRejected {
        /// Specific reason the request failed.
        reason: DialogueRejection,
    },
}

/// Reasons a dialogue request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DialogueRejection {
    /// A dialogue session is already open.
    AlreadyOpen,
    /// The request carried no lines to show.
    NoLines,
}

/// Cardinal directions the player can face and walk in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Toward decreasing row indices.
    Up,
    /// Toward increasing row indices.
    Down,
    /// Toward decreasing column indices.
    Left,
    /// Toward increasing column indices.
    Right,
}

impl Facing {
    /// Directions ordered by input priority; the first held one wins.
    pub const PRIORITY: [Facing; 4] = [Facing::Up, Facing::Down, Facing::Left, Facing::Right];

    /// Unit grid delta expressed as `(column, row)` offsets.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Returns the adjacent cell in the provided direction.
    ///
    /// Returns `None` when the neighbour would have a negative coordinate.
    /// Upper bounds are not checked; callers consult the grid for those.
    #[must_use]
    pub fn neighbor(self, facing: Facing) -> Option<CellCoord> {
        let (column_delta, row_delta) = facing.delta();
        let column = self.column.checked_add_signed(column_delta)?;
        let row = self.row.checked_add_signed(row_delta)?;
        Some(CellCoord::new(column, row))
    }
}

/// Terrain code stored in every tile of the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainKind {
    /// Walkable ground.
    Grass,
    /// Impassable water.
    Water,
    /// Impassable wall; every map border is made of it.
    Wall,
}

impl TerrainKind {
    /// Reports whether an actor may stand on the terrain.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        match self {
            Self::Grass => true,
            Self::Water | Self::Wall => false,
        }
    }

    /// Parses a terrain glyph from a textual map file.
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' => Some(Self::Grass),
            '~' => Some(Self::Water),
            '#' => Some(Self::Wall),
            _ => None,
        }
    }
}

/// Kinds of static objects placed on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A character the player can talk to.
    Npc,
    /// A readable signpost.
    Sign,
}

/// Unique identifier assigned to a placed entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Motion phase of the player's movement state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MotionState {
    /// Resting on a cell and accepting directional input.
    Idle,
    /// Sliding between two cells; new directional input is ignored.
    Transitioning,
}

/// Phase of an open dialogue session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DialoguePhase {
    /// The current line is still being revealed character by character.
    Revealing,
    /// The current line is fully shown and waits for the player.
    AwaitingAdvance,
}
