#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that supplies map content to the Overworld.
//!
//! Content comes from one of three places: the built-in demo field, a TOML
//! map file, or a seeded random generator. Every source produces a
//! [`MapLayout`] that the world validates when it is constructed.

mod generator;
mod map_file;

use std::path::Path;

use overworld_core::{CellCoord, EntityKind, Facing};
use overworld_world::{query, EntitySpec, LayoutError, MapLayout, World};

pub use self::generator::{GenerateError, MIN_GENERATED_SIDE};
pub use self::map_file::{MapFileError, SUPPORTED_MAP_VERSION};

const DEMO_FIELD: [&str; 10] = [
    "###############",
    "#.............#",
    "#.............#",
    "#..~~~...##...#",
    "#..~~~...##...#",
    "#.............#",
    "#.............#",
    "#.##..........#",
    "#.##..........#",
    "###############",
];

/// Produces the content required to start the Overworld.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Built-in 15x10 demo field with a pond, rock blocks, one villager and one sign.
    pub fn default_layout(&self) -> Result<MapLayout, LayoutError> {
        let layout = MapLayout::from_glyph_rows(&DEMO_FIELD, CellCoord::new(2, 2), Facing::Down)?
            .with_entity(EntitySpec::new(
                EntityKind::Npc,
                CellCoord::new(7, 5),
                [
                    "Hi there! Welcome to the field.",
                    "Tall grass is where wild things hide.",
                    "Press Z near a sign to read it.",
                ],
            ))
            .with_entity(EntitySpec::new(
                EntityKind::Sign,
                CellCoord::new(11, 2),
                ["ROUTE 101", "Pond to the west. Rocks to the south."],
            ));
        Ok(layout)
    }

    /// Generates a deterministic random layout for the provided seed.
    pub fn generated_layout(
        &self,
        seed: u64,
        columns: u32,
        rows: u32,
    ) -> Result<MapLayout, GenerateError> {
        generator::generate(seed, columns, rows)
    }

    /// Parses a map description in TOML form.
    pub fn parse_map(&self, contents: &str) -> Result<MapLayout, MapFileError> {
        map_file::parse(contents)
    }

    /// Reads and parses a TOML map file from disk.
    pub fn load_map(&self, path: impl AsRef<Path>) -> Result<MapLayout, MapFileError> {
        map_file::load(path.as_ref())
    }
}
