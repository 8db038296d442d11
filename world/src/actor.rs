//! Grid-locked movement state machine for the player.

use glam::Vec2;
use overworld_core::{CellCoord, Facing, MotionState};

/// Player state stored inside the world.
///
/// `cell` is authoritative: it jumps to the destination the moment a step
/// begins, while `pixel` slides toward `target` over the following ticks.
/// The slide is derived from the whole number of ticks spent stepping, so
/// rounding never accumulates across ticks.
#[derive(Clone, Debug)]
pub(crate) struct Actor {
    cell: CellCoord,
    facing: Facing,
    motion: MotionState,
    pixel: Vec2,
    target: Vec2,
    origin: Vec2,
    step_ticks: u32,
}

impl Actor {
    /// Creates an idle actor resting on the provided cell.
    pub(crate) fn at_rest(cell: CellCoord, facing: Facing, tile_size: f32) -> Self {
        let pixel = cell_to_pixel(cell, tile_size);
        Self {
            cell,
            facing,
            motion: MotionState::Idle,
            pixel,
            target: pixel,
            origin: pixel,
            step_ticks: 0,
        }
    }

    pub(crate) fn cell(&self) -> CellCoord {
        self.cell
    }

    pub(crate) fn facing(&self) -> Facing {
        self.facing
    }

    pub(crate) fn motion(&self) -> MotionState {
        self.motion
    }

    pub(crate) fn pixel(&self) -> Vec2 {
        self.pixel
    }

    pub(crate) fn target(&self) -> Vec2 {
        self.target
    }

    /// Re-orients the actor without moving it.
    pub(crate) fn turn(&mut self, facing: Facing) {
        self.facing = facing;
    }

    /// Commits to a step toward `destination`, moving the logical cell immediately.
    pub(crate) fn begin_step(&mut self, destination: CellCoord, facing: Facing, tile_size: f32) {
        self.cell = destination;
        self.facing = facing;
        self.origin = self.pixel;
        self.target = cell_to_pixel(destination, tile_size);
        self.step_ticks = 0;
        self.motion = MotionState::Transitioning;
    }

    /// Advances the pixel interpolation by one tick.
    ///
    /// Returns the resting cell on the tick the actor arrives.
    pub(crate) fn advance(&mut self, speed: f32) -> Option<CellCoord> {
        if self.motion != MotionState::Transitioning {
            return None;
        }

        self.step_ticks = self.step_ticks.saturating_add(1);
        let offset = self.target - self.origin;
        let distance = f64::from(offset.abs().max_element());
        let travelled = f64::from(self.step_ticks) * f64::from(speed);

        if travelled >= distance {
            self.pixel = self.target;
            self.motion = MotionState::Idle;
            return Some(self.cell);
        }

        let fraction = (travelled / distance) as f32;
        self.pixel = self.origin + offset * fraction;
        None
    }
}

/// Converts a cell into the pixel position of its top-left corner.
pub(crate) fn cell_to_pixel(cell: CellCoord, tile_size: f32) -> Vec2 {
    Vec2::new(
        cell.column() as f32 * tile_size,
        cell.row() as f32 * tile_size,
    )
}
