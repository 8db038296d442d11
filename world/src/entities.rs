//! Static entity placement and occupancy lookups.

use overworld_core::{CellCoord, EntityId, EntityKind};

/// Placed non-player object that the player can talk to or read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    cell: CellCoord,
    lines: Vec<String>,
}

impl Entity {
    pub(crate) fn new(id: EntityId, kind: EntityKind, cell: CellCoord, lines: Vec<String>) -> Self {
        Self {
            id,
            kind,
            cell,
            lines,
        }
    }

    /// Identifier allocated to the entity when the world was built.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Kind of object placed on the map.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Cell occupied by the entity.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Dialogue pages shown when the player interacts with the entity.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// Fixed list of entities with a dense cell index for occupancy queries.
#[derive(Clone, Debug)]
pub struct EntityRegistry {
    entities: Vec<Entity>,
    columns: u32,
    rows: u32,
    cells: Vec<Option<usize>>,
}

impl EntityRegistry {
    /// Indexes the entities; callers guarantee cells are unique and in bounds.
    pub(crate) fn new(entities: Vec<Entity>, columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        let mut registry = Self {
            entities,
            columns,
            rows,
            cells: vec![None; capacity],
        };
        for (position, entity) in registry.entities.iter().enumerate() {
            if let Some(index) = registry.index(entity.cell) {
                registry.cells[index] = Some(position);
            }
        }
        registry
    }

    /// Returns the entity standing on the provided cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<&Entity> {
        let index = self.index(cell)?;
        let position = self.cells.get(index).copied().flatten()?;
        self.entities.get(position)
    }

    /// Reports whether any entity stands on the provided cell.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        self.occupant(cell).is_some()
    }

    /// Iterator over all entities in placement order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Number of placed entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Reports whether no entities were placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
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
