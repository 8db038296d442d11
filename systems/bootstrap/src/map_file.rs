//! TOML map files.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use overworld_core::{CellCoord, EntityKind, Facing};
use overworld_world::{EntitySpec, LayoutError, MapLayout};
use serde::Deserialize;
use thiserror::Error;

/// Map file format version understood by the parser.
pub const SUPPORTED_MAP_VERSION: u32 = 1;

/// Reasons a map file cannot be turned into a layout.
#[derive(Debug, Error)]
pub enum MapFileError {
    /// The file could not be read.
    #[error("failed to read map file {}", .path.display())]
    Read {
        /// Location that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The contents are not valid TOML for a map.
    #[error("failed to parse map toml contents")]
    Parse(#[from] toml::de::Error),
    /// The file declares a format version this build does not understand.
    #[error("unsupported map version {found}; expected {SUPPORTED_MAP_VERSION}")]
    UnsupportedVersion {
        /// Version declared by the file.
        found: u32,
    },
    /// The rows or placements do not describe a usable map.
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MapFile {
    #[serde(default = "default_version")]
    version: u32,
    rows: Vec<String>,
    player: [u32; 2],
    #[serde(default = "default_facing")]
    facing: Facing,
    #[serde(default)]
    entities: Vec<EntityEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntityEntry {
    kind: EntityKind,
    cell: [u32; 2],
    lines: Vec<String>,
}

fn default_version() -> u32 {
    SUPPORTED_MAP_VERSION
}

fn default_facing() -> Facing {
    Facing::Down
}

pub(crate) fn load(path: &Path) -> Result<MapLayout, MapFileError> {
    let contents = fs::read_to_string(path).map_err(|source| MapFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents)
}

pub(crate) fn parse(contents: &str) -> Result<MapLayout, MapFileError> {
    let file: MapFile = toml::from_str(contents)?;
    if file.version != SUPPORTED_MAP_VERSION {
        return Err(MapFileError::UnsupportedVersion {
            found: file.version,
        });
    }

    let [column, row] = file.player;
    let mut layout = MapLayout::from_glyph_rows(&file.rows, CellCoord::new(column, row), file.facing)?;
    for entry in file.entities {
        let [column, row] = entry.cell;
        layout = layout.with_entity(EntitySpec::new(
            entry.kind,
            CellCoord::new(column, row),
            entry.lines,
        ));
    }
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use overworld_core::TerrainKind;

    use super::*;

    const VILLAGE: &str = r#"
rows = [
    '#######',
    '#..~..#',
    '#.....#',
    '#######',
]
player = [1, 1]
facing = "right"

[[entities]]
kind = "npc"
cell = [5, 2]
lines = ["Nice day.", "Watch the pond."]

[[entities]]
kind = "sign"
cell = [2, 2]
lines = ["Village square"]
"#;

    #[test]
    fn parses_rows_player_and_entities() {
        let layout = parse(VILLAGE).expect("valid map");
        assert_eq!(layout.columns, 7);
        assert_eq!(layout.rows, 4);
        assert_eq!(layout.player_start, CellCoord::new(1, 1));
        assert_eq!(layout.player_facing, Facing::Right);
        assert_eq!(layout.terrain_at(CellCoord::new(3, 1)), Some(TerrainKind::Water));
        assert_eq!(layout.entities.len(), 2);
        assert_eq!(layout.entities[0].kind, EntityKind::Npc);
        assert_eq!(layout.entities[0].lines.len(), 2);
        assert_eq!(layout.entities[1].cell, CellCoord::new(2, 2));
    }

    #[test]
    fn literal_and_basic_row_strings_parse_alike() {
        let literal = parse("rows = ['###', '#.#', '###']\nplayer = [1, 1]\n").expect("valid map");
        let basic =
            parse("rows = [\"###\", \"#.#\", \"###\"]\nplayer = [1, 1]\n").expect("valid map");
        assert_eq!(literal, basic);
    }

    #[test]
    fn facing_defaults_to_down() {
        let layout = parse("rows = [\"###\", \"#.#\", \"###\"]\nplayer = [1, 1]\n")
            .expect("valid map");
        assert_eq!(layout.player_facing, Facing::Down);
        assert!(layout.entities.is_empty());
    }

    #[test]
    fn rejects_future_versions() {
        let error = parse("version = 2\nrows = [\"#\"]\nplayer = [0, 0]\n")
            .expect_err("version 2 is unsupported");
        assert!(matches!(error, MapFileError::UnsupportedVersion { found: 2 }));
    }

    #[test]
    fn reports_bad_glyphs_as_layout_errors() {
        let error = parse("rows = [\"#x#\"]\nplayer = [1, 0]\n").expect_err("bad glyph");
        assert!(matches!(
            error,
            MapFileError::Layout(LayoutError::UnknownGlyph { glyph: 'x', .. })
        ));
    }

    #[test]
    fn rejects_unknown_keys() {
        let error = parse("rows = [\"#\"]\nplayer = [0, 0]\nspeed = 3\n").expect_err("unknown key");
        assert!(matches!(error, MapFileError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let error = load(Path::new("does/not/exist.toml")).expect_err("missing file");
        assert!(error.to_string().contains("does/not/exist.toml"));
    }
}
