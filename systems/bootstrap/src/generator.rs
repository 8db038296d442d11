//! Seeded random map generation.

use overworld_core::{CellCoord, EntityKind, Facing, TerrainKind};
use overworld_world::{EntitySpec, MapLayout};
use rand::{
    distributions::{Distribution, WeightedError, WeightedIndex},
    Rng, SeedableRng,
};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::debug;

/// Smallest width or height the generator accepts.
pub const MIN_GENERATED_SIDE: u32 = 5;
const MAX_GENERATED_SIDE: u32 = 512;

const TERRAIN_WEIGHTS: [(TerrainKind, u32); 3] = [
    (TerrainKind::Grass, 78),
    (TerrainKind::Water, 12),
    (TerrainKind::Wall, 10),
];

const ENTITY_KINDS: [EntityKind; 3] = [EntityKind::Npc, EntityKind::Sign, EntityKind::Npc];

const NPC_LINES: [&[&str]; 3] = [
    &["I got lost out here too.", "Keep to the grass and you'll be fine."],
    &["The water is too deep to wade through."],
    &["Have you seen anything rustle in the grass?", "Me neither."],
];

const SIGN_LINES: [&[&str]; 2] = [
    &["WILD AREA", "Tread carefully."],
    &["Nothing to see here."],
];

/// Reasons the generator refuses a request.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Requested dimensions fall outside the supported range.
    #[error(
        "generated maps must be between {MIN_GENERATED_SIDE} and {MAX_GENERATED_SIDE} tiles per side (requested {columns}x{rows})"
    )]
    UnsupportedSize {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// The terrain weight table could not be sampled.
    #[error("invalid terrain weights")]
    Weights(#[from] WeightedError),
}

pub(crate) fn generate(seed: u64, columns: u32, rows: u32) -> Result<MapLayout, GenerateError> {
    let supported = MIN_GENERATED_SIDE..=MAX_GENERATED_SIDE;
    if !supported.contains(&columns) || !supported.contains(&rows) {
        return Err(GenerateError::UnsupportedSize { columns, rows });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let weights = WeightedIndex::new(TERRAIN_WEIGHTS.iter().map(|(_, weight)| *weight))?;

    let mut terrain = Vec::with_capacity(columns as usize * rows as usize);
    for row in 0..rows {
        for column in 0..columns {
            let border = row == 0 || column == 0 || row + 1 == rows || column + 1 == columns;
            let kind = if border {
                TerrainKind::Wall
            } else {
                TERRAIN_WEIGHTS[weights.sample(&mut rng)].0
            };
            terrain.push(kind);
        }
    }

    let start = CellCoord::new(columns / 2, rows / 2);
    let index = |cell: CellCoord| cell.row() as usize * columns as usize + cell.column() as usize;
    let mut clearing = vec![start];
    clearing.extend(Facing::PRIORITY.iter().filter_map(|facing| start.neighbor(*facing)));
    for cell in &clearing {
        let interior = cell.column() > 0
            && cell.row() > 0
            && cell.column() + 1 < columns
            && cell.row() + 1 < rows;
        if interior {
            terrain[index(*cell)] = TerrainKind::Grass;
        }
    }

    let mut candidates: Vec<CellCoord> = (0..rows)
        .flat_map(|row| (0..columns).map(move |column| CellCoord::new(column, row)))
        .filter(|cell| terrain[index(*cell)] == TerrainKind::Grass && !clearing.contains(cell))
        .collect();

    let mut entities = Vec::with_capacity(ENTITY_KINDS.len());
    for kind in ENTITY_KINDS {
        if candidates.is_empty() {
            break;
        }
        let cell = candidates.swap_remove(rng.gen_range(0..candidates.len()));
        let lines: &[&str] = match kind {
            EntityKind::Npc => NPC_LINES[rng.gen_range(0..NPC_LINES.len())],
            EntityKind::Sign => SIGN_LINES[rng.gen_range(0..SIGN_LINES.len())],
        };
        entities.push(EntitySpec::new(kind, cell, lines.iter().copied()));
    }

    debug!(
        seed,
        columns,
        rows,
        entities = entities.len(),
        "generated map layout"
    );

    Ok(MapLayout {
        columns,
        rows,
        terrain,
        entities,
        player_start: start,
        player_facing: Facing::Down,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_produces_same_layout() {
        let first = generate(7, 24, 18).expect("supported size");
        let second = generate(7, 24, 18).expect("supported size");
        assert_eq!(first, second);
    }

    #[test]
    fn different_seeds_usually_differ() {
        let layouts: Vec<_> = (0..4)
            .map(|seed| generate(seed, 24, 18).expect("supported size").terrain)
            .collect();
        assert!(layouts.windows(2).any(|pair| pair[0] != pair[1]));
    }

    #[test]
    fn borders_are_walls_and_start_is_grass() {
        let layout = generate(42, 12, 9).expect("supported size");
        for row in 0..layout.rows {
            for column in 0..layout.columns {
                let cell = CellCoord::new(column, row);
                let border = row == 0 || column == 0 || row + 1 == layout.rows || column + 1 == layout.columns;
                if border {
                    assert_eq!(layout.terrain_at(cell), Some(TerrainKind::Wall));
                }
            }
        }
        assert_eq!(layout.terrain_at(layout.player_start), Some(TerrainKind::Grass));
    }

    #[test]
    fn rejects_tiny_maps() {
        assert!(matches!(
            generate(0, 4, 10),
            Err(GenerateError::UnsupportedSize { columns: 4, rows: 10 })
        ));
    }
}
