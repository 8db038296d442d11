#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Camera that keeps the player centred inside the map bounds.

use glam::Vec2;
use overworld_world::{query::ActorSnapshot, TileGrid};

/// Latest camera offset derived from the player's position.
///
/// The offset is the pixel coordinate of the map that appears at the
/// top-left corner of the viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Camera {
    offset: Vec2,
}

impl Camera {
    /// Pixel offset applied when drawing the map.
    #[must_use]
    pub const fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Recomputes the offset for the player's current interpolated position.
    pub fn handle(&mut self, actor: &ActorSnapshot, tile_grid: &TileGrid, viewport: Vec2) {
        let map_size = Vec2::new(tile_grid.width(), tile_grid.height());
        self.offset = follow_offset(actor.pixel, tile_grid.tile_size(), viewport, map_size);
    }
}

/// Offset that centres the tile at `focus` within `viewport`, clamped to the map.
///
/// Each axis is clamped to `[0, map_size - viewport]`. An axis on which the
/// map is smaller than the viewport is centred instead, which yields a
/// negative offset.
#[must_use]
pub fn follow_offset(focus: Vec2, tile_size: f32, viewport: Vec2, map_size: Vec2) -> Vec2 {
    let desired = focus + Vec2::splat(tile_size / 2.0) - viewport / 2.0;
    Vec2::new(
        clamp_axis(desired.x, viewport.x, map_size.x),
        clamp_axis(desired.y, viewport.y, map_size.y),
    )
}

fn clamp_axis(desired: f32, viewport: f32, map: f32) -> f32 {
    let max = map - viewport;
    if max < 0.0 {
        max / 2.0
    } else {
        desired.clamp(0.0, max)
    }
}
