//! Map layouts supplied by content providers and their validation.

use overworld_core::{CellCoord, EntityKind, Facing, TerrainKind};
use thiserror::Error;

/// Content description used to build a [`World`](crate::World).
#[derive(Clone, Debug, PartialEq)]
pub struct MapLayout {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Row-major terrain codes, `columns * rows` entries long.
    pub terrain: Vec<TerrainKind>,
    /// Entities placed on the map.
    pub entities: Vec<EntitySpec>,
    /// Cell the player starts on.
    pub player_start: CellCoord,
    /// Direction the player faces at startup.
    pub player_facing: Facing,
}

impl MapLayout {
    /// Builds a layout from textual rows using `.` grass, `~` water and `#` wall.
    pub fn from_glyph_rows<S>(
        rows: &[S],
        player_start: CellCoord,
        player_facing: Facing,
    ) -> Result<Self, LayoutError>
    where
        S: AsRef<str>,
    {
        let expected = rows.first().map_or(0, |row| row.as_ref().chars().count());
        let mut terrain = Vec::with_capacity(expected * rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let actual = row.chars().count();
            if actual != expected {
                return Err(LayoutError::RaggedRow {
                    row: row_index,
                    expected,
                    actual,
                });
            }
            for (column_index, glyph) in row.chars().enumerate() {
                let kind = TerrainKind::from_glyph(glyph).ok_or(LayoutError::UnknownGlyph {
                    glyph,
                    column: column_index,
                    row: row_index,
                })?;
                terrain.push(kind);
            }
        }

        Ok(Self {
            columns: u32::try_from(expected).map_err(|_| LayoutError::TooLarge)?,
            rows: u32::try_from(rows.len()).map_err(|_| LayoutError::TooLarge)?,
            terrain,
            entities: Vec::new(),
            player_start,
            player_facing,
        })
    }

    /// Appends an entity to the layout.
    #[must_use]
    pub fn with_entity(mut self, entity: EntitySpec) -> Self {
        self.entities.push(entity);
        self
    }

    /// Terrain at the provided cell, if it lies inside the layout.
    #[must_use]
    pub fn terrain_at(&self, cell: CellCoord) -> Option<TerrainKind> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let index = cell.row() as usize * self.columns as usize + cell.column() as usize;
        self.terrain.get(index).copied()
    }
}

/// Placement request for a single entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntitySpec {
    /// Kind of object to place.
    pub kind: EntityKind,
    /// Cell the object occupies.
    pub cell: CellCoord,
    /// Dialogue pages shown on interaction.
    pub lines: Vec<String>,
}

impl EntitySpec {
    /// Creates a new entity placement.
    #[must_use]
    pub fn new<I, S>(kind: EntityKind, cell: CellCoord, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            cell,
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

/// Reasons a layout cannot be turned into a world.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LayoutError {
    /// The map has no rows or no columns.
    #[error("map must contain at least one row and one column")]
    EmptyGrid,
    /// The map dimensions do not fit in memory indices.
    #[error("map dimensions are too large")]
    TooLarge,
    /// Terrain storage does not match the declared dimensions.
    #[error("terrain holds {actual} tiles but a {columns}x{rows} map needs {expected}")]
    TerrainSizeMismatch {
        /// Declared column count.
        columns: u32,
        /// Declared row count.
        rows: u32,
        /// Tile count implied by the dimensions.
        expected: usize,
        /// Tile count actually supplied.
        actual: usize,
    },
    /// A textual row differs in width from the first row.
    #[error("map row {row} has {actual} tiles, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        actual: usize,
    },
    /// A textual row contains an unknown terrain glyph.
    #[error("unknown terrain glyph {glyph:?} at column {column}, row {row}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Zero-based column index.
        column: usize,
        /// Zero-based row index.
        row: usize,
    },
    /// Tile size is zero, negative or not finite.
    #[error("tile size must be a positive finite number (received {tile_size})")]
    InvalidTileSize {
        /// Rejected value.
        tile_size: f32,
    },
    /// Movement speed is zero, negative or not finite.
    #[error("movement speed must be a positive finite number (received {speed})")]
    InvalidSpeed {
        /// Rejected value.
        speed: f32,
    },
    /// The player would start outside the map or off grass.
    #[error("player start ({}, {}) is not a grass tile inside the map", .cell.column(), .cell.row())]
    PlayerNotOnGrass {
        /// Requested start cell.
        cell: CellCoord,
    },
    /// An entity would stand outside the map or off grass.
    #[error("entity {index} at ({}, {}) is not on a grass tile inside the map", .cell.column(), .cell.row())]
    EntityNotOnGrass {
        /// Position of the entity in the layout list.
        index: usize,
        /// Requested cell.
        cell: CellCoord,
    },
    /// Two entities share a cell.
    #[error("entity {index} at ({}, {}) overlaps another entity", .cell.column(), .cell.row())]
    EntityOverlap {
        /// Position of the entity in the layout list.
        index: usize,
        /// Shared cell.
        cell: CellCoord,
    },
    /// An entity stands on the player's start cell.
    #[error("entity {index} at ({}, {}) sits on the player start", .cell.column(), .cell.row())]
    EntityOnPlayer {
        /// Position of the entity in the layout list.
        index: usize,
        /// Shared cell.
        cell: CellCoord,
    },
    /// An entity has nothing to say.
    #[error("entity {index} has no dialogue lines")]
    EntityWithoutLines {
        /// Position of the entity in the layout list.
        index: usize,
    },
}

/// Forces every border tile to wall, returning how many tiles changed.
pub(crate) fn enforce_border_walls(terrain: &mut [TerrainKind], columns: u32, rows: u32) -> usize {
    let columns = columns as usize;
    let rows = rows as usize;
    let mut repaired = 0;
    for row in 0..rows {
        for column in 0..columns {
            let on_border = row == 0 || column == 0 || row + 1 == rows || column + 1 == columns;
            if !on_border {
                continue;
            }
            if let Some(tile) = terrain.get_mut(row * columns + column) {
                if *tile != TerrainKind::Wall {
                    *tile = TerrainKind::Wall;
                    repaired += 1;
                }
            }
        }
    }
    repaired
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_rows_parse_into_row_major_terrain() {
        let layout = MapLayout::from_glyph_rows(
            &["###", "#.~", "###"],
            CellCoord::new(1, 1),
            Facing::Down,
        )
        .expect("valid rows");

        assert_eq!(layout.columns, 3);
        assert_eq!(layout.rows, 3);
        assert_eq!(layout.terrain_at(CellCoord::new(1, 1)), Some(TerrainKind::Grass));
        assert_eq!(layout.terrain_at(CellCoord::new(2, 1)), Some(TerrainKind::Water));
        assert_eq!(layout.terrain_at(CellCoord::new(3, 1)), None);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let error = MapLayout::from_glyph_rows(&["###", "##"], CellCoord::new(1, 1), Facing::Down)
            .expect_err("ragged rows must fail");
        assert_eq!(
            error,
            LayoutError::RaggedRow {
                row: 1,
                expected: 3,
                actual: 2,
            }
        );
    }

    #[test]
    fn unknown_glyphs_are_rejected() {
        let error = MapLayout::from_glyph_rows(&["#?#"], CellCoord::new(1, 0), Facing::Down)
            .expect_err("unknown glyph must fail");
        assert!(matches!(
            error,
            LayoutError::UnknownGlyph {
                glyph: '?',
                column: 1,
                row: 0,
            }
        ));
    }

    #[test]
    fn border_enforcement_counts_repairs() {
        let mut terrain = vec![TerrainKind::Grass; 9];
        let repaired = enforce_border_walls(&mut terrain, 3, 3);
        assert_eq!(repaired, 8);
        assert_eq!(terrain[4], TerrainKind::Grass);
        assert!(terrain
            .iter()
            .enumerate()
            .all(|(index, tile)| index == 4 || *tile == TerrainKind::Wall));
    }
}
