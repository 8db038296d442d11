//! Conversion of a [`Scene`] into flat draw commands.

use glam::Vec2;
use overworld_core::{CellCoord, EntityKind, Facing, TerrainKind};

use crate::{Color, DialoguePresentation, EntityPresentation, PlayerPresentation, Scene};

/// Tile size the sprite proportions below were authored for.
const REFERENCE_TILE: f32 = 32.0;
const DIALOGUE_MARGIN: f32 = 8.0;
const DIALOGUE_PADDING: f32 = 14.0;
const DIALOGUE_FONT_SIZE: f32 = 20.0;
const DIALOGUE_LINE_HEIGHT: f32 = 24.0;
const DIALOGUE_MIN_HEIGHT: f32 = 72.0;
const DIALOGUE_BORDER: f32 = 3.0;
// Rough advance of the default font at the dialogue size.
const GLYPH_WIDTH: f32 = DIALOGUE_FONT_SIZE * 0.5;

/// Primitive drawing operation expressed in viewport pixels.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Filled axis-aligned rectangle.
    Rect {
        /// Top-left corner.
        position: Vec2,
        /// Width and height.
        size: Vec2,
        /// Fill color.
        color: Color,
    },
    /// Rectangle outline.
    RectOutline {
        /// Top-left corner.
        position: Vec2,
        /// Width and height.
        size: Vec2,
        /// Stroke thickness.
        thickness: f32,
        /// Stroke color.
        color: Color,
    },
    /// Filled axis-aligned ellipse.
    Ellipse {
        /// Centre point.
        center: Vec2,
        /// Horizontal and vertical radii.
        radii: Vec2,
        /// Fill color.
        color: Color,
    },
    /// Single line of text.
    Text {
        /// Text to draw.
        text: String,
        /// Left end of the baseline.
        position: Vec2,
        /// Font size in pixels.
        font_size: f32,
        /// Text color.
        color: Color,
    },
}

/// Flat colors used by the renderer.
#[derive(Clone, Copy, Debug)]
pub struct Palette;

impl Palette {
    /// Walkable grass.
    pub const GRASS: Color = Color::from_rgb_u8(0x4c, 0xd1, 0x58);
    /// Impassable water.
    pub const WATER: Color = Color::from_rgb_u8(0x4f, 0xa4, 0xb8);
    /// Impassable wall.
    pub const WALL: Color = Color::from_rgb_u8(0x6e, 0x45, 0x29);
    /// Faint tile outline.
    pub const GRID_LINE: Color = Color::new(0.0, 0.0, 0.0, 0x20 as f32 / 255.0);
    /// Drop shadow under characters.
    pub const SHADOW: Color = Color::new(0.0, 0.0, 0.0, 0.3);
    /// Player body.
    pub const PLAYER: Color = Color::from_rgb_u8(0xe3, 0x35, 0x0d);
    /// Player facing indicator.
    pub const PLAYER_EYES: Color = Color::from_rgb_u8(0xff, 0xff, 0xff);
    /// Villager body.
    pub const NPC: Color = Color::from_rgb_u8(0x35, 0x5c, 0xc9);
    /// Villager face.
    pub const NPC_FACE: Color = Color::from_rgb_u8(0xf2, 0xc9, 0x9b);
    /// Signpost post.
    pub const SIGN_POST: Color = Color::from_rgb_u8(0x5a, 0x3a, 0x1e);
    /// Signpost board.
    pub const SIGN_BOARD: Color = Color::from_rgb_u8(0xd9, 0xb7, 0x7e);
    /// Dialogue box fill.
    pub const DIALOGUE_FILL: Color = Color::from_rgb_u8(0xf8, 0xf8, 0xf8);
    /// Dialogue box border.
    pub const DIALOGUE_BORDER: Color = Color::from_rgb_u8(0x30, 0x30, 0x38);
    /// Dialogue text.
    pub const DIALOGUE_TEXT: Color = Color::from_rgb_u8(0x20, 0x20, 0x20);
    /// Marker shown when more dialogue follows.
    pub const MORE_MARKER: Color = Color::from_rgb_u8(0xc8, 0x10, 0x48);

    /// Fill color of a terrain tile.
    #[must_use]
    pub const fn terrain(kind: TerrainKind) -> Color {
        match kind {
            TerrainKind::Grass => Self::GRASS,
            TerrainKind::Water => Self::WATER,
            TerrainKind::Wall => Self::WALL,
        }
    }
}

/// Builds the draw commands for one frame, back to front.
///
/// Only tiles and entities intersecting the viewport are emitted.
#[must_use]
pub fn draw_list(scene: &Scene) -> Vec<DrawCommand> {
    let mut commands = Vec::new();
    push_tiles(scene, &mut commands);
    for entity in &scene.entities {
        push_entity(scene, entity, &mut commands);
    }
    push_player(scene, &scene.player, &mut commands);
    if let Some(dialogue) = &scene.dialogue {
        push_dialogue(scene.viewport, dialogue, &mut commands);
    }
    commands
}

fn visible_range(camera: f32, viewport: f32, tile_size: f32, count: u32) -> (u32, u32) {
    let first = (camera / tile_size).floor().max(0.0) as u32;
    let last = ((camera + viewport) / tile_size).ceil().max(0.0) as u32;
    (first.min(count), last.min(count))
}

fn push_tiles(scene: &Scene, out: &mut Vec<DrawCommand>) {
    let grid = &scene.tile_grid;
    let tile = grid.tile_size;
    let (first_column, last_column) =
        visible_range(scene.camera.x, scene.viewport.x, tile, grid.columns);
    let (first_row, last_row) = visible_range(scene.camera.y, scene.viewport.y, tile, grid.rows);

    for row in first_row..last_row {
        for column in first_column..last_column {
            let Some(kind) = grid.terrain(CellCoord::new(column, row)) else {
                continue;
            };
            let position = Vec2::new(column as f32, row as f32) * tile - scene.camera;
            let size = Vec2::splat(tile);
            out.push(DrawCommand::Rect {
                position,
                size,
                color: Palette::terrain(kind),
            });
            out.push(DrawCommand::RectOutline {
                position,
                size,
                thickness: 1.0,
                color: Palette::GRID_LINE,
            });
        }
    }
}

fn is_visible(scene: &Scene, position: Vec2, tile: f32) -> bool {
    position.x + tile > 0.0
        && position.y + tile > 0.0
        && position.x < scene.viewport.x
        && position.y < scene.viewport.y
}

fn push_shadow(origin: Vec2, tile: f32, unit: f32, out: &mut Vec<DrawCommand>) {
    out.push(DrawCommand::Ellipse {
        center: origin + Vec2::new(tile / 2.0, tile - 4.0 * unit),
        radii: Vec2::new(10.0, 4.0) * unit,
        color: Palette::SHADOW,
    });
}

fn push_entity(scene: &Scene, entity: &EntityPresentation, out: &mut Vec<DrawCommand>) {
    let tile = scene.tile_grid.tile_size;
    let unit = tile / REFERENCE_TILE;
    let origin = Vec2::new(entity.cell.column() as f32, entity.cell.row() as f32) * tile
        - scene.camera;
    if !is_visible(scene, origin, tile) {
        return;
    }

    let rect = |x: f32, y: f32, width: f32, height: f32, color: Color| DrawCommand::Rect {
        position: origin + Vec2::new(x, y) * unit,
        size: Vec2::new(width, height) * unit,
        color,
    };

    match entity.kind {
        EntityKind::Npc => {
            push_shadow(origin, tile, unit, out);
            out.push(rect(6.0, 10.0, 20.0, 18.0, Palette::NPC));
            out.push(rect(9.0, 3.0, 14.0, 10.0, Palette::NPC_FACE));
        }
        EntityKind::Sign => {
            out.push(rect(14.0, 16.0, 4.0, 14.0, Palette::SIGN_POST));
            out.push(rect(4.0, 5.0, 24.0, 14.0, Palette::SIGN_BOARD));
            out.push(DrawCommand::RectOutline {
                position: origin + Vec2::new(4.0, 5.0) * unit,
                size: Vec2::new(24.0, 14.0) * unit,
                thickness: unit.max(1.0),
                color: Palette::SIGN_POST,
            });
        }
    }
}

/// Facing indicator rectangle `(x, y, width, height)` on the reference tile.
const fn facing_indicator(facing: Facing) -> (f32, f32, f32, f32) {
    match facing {
        Facing::Down => (8.0, 12.0, 16.0, 4.0),
        Facing::Up => (12.0, 4.0, 8.0, 4.0),
        Facing::Left => (4.0, 10.0, 4.0, 8.0),
        Facing::Right => (24.0, 10.0, 4.0, 8.0),
    }
}

fn push_player(scene: &Scene, player: &PlayerPresentation, out: &mut Vec<DrawCommand>) {
    let tile = scene.tile_grid.tile_size;
    let unit = tile / REFERENCE_TILE;
    let origin = player.position - scene.camera;

    push_shadow(origin, tile, unit, out);
    out.push(DrawCommand::Rect {
        position: origin + Vec2::splat(4.0 * unit),
        size: Vec2::splat(tile - 8.0 * unit),
        color: Palette::PLAYER,
    });

    let (x, y, width, height) = facing_indicator(player.facing);
    out.push(DrawCommand::Rect {
        position: origin + Vec2::new(x, y) * unit,
        size: Vec2::new(width, height) * unit,
        color: Palette::PLAYER_EYES,
    });
}

fn push_dialogue(viewport: Vec2, dialogue: &DialoguePresentation, out: &mut Vec<DrawCommand>) {
    let height = (viewport.y * 0.3).max(DIALOGUE_MIN_HEIGHT);
    let position = Vec2::new(DIALOGUE_MARGIN, viewport.y - height - DIALOGUE_MARGIN);
    let size = Vec2::new(viewport.x - 2.0 * DIALOGUE_MARGIN, height);

    out.push(DrawCommand::Rect {
        position,
        size,
        color: Palette::DIALOGUE_FILL,
    });
    out.push(DrawCommand::RectOutline {
        position,
        size,
        thickness: DIALOGUE_BORDER,
        color: Palette::DIALOGUE_BORDER,
    });

    let max_chars = ((size.x - 2.0 * DIALOGUE_PADDING) / GLYPH_WIDTH).floor().max(1.0) as usize;
    let max_lines =
        ((size.y - 2.0 * DIALOGUE_PADDING) / DIALOGUE_LINE_HEIGHT).floor().max(1.0) as usize;
    let baseline = position + Vec2::new(DIALOGUE_PADDING, DIALOGUE_PADDING + DIALOGUE_FONT_SIZE * 0.8);
    for (index, line) in wrap_text(&dialogue.text, max_chars)
        .into_iter()
        .take(max_lines)
        .enumerate()
    {
        out.push(DrawCommand::Text {
            text: line,
            position: baseline + Vec2::new(0.0, index as f32 * DIALOGUE_LINE_HEIGHT),
            font_size: DIALOGUE_FONT_SIZE,
            color: Palette::DIALOGUE_TEXT,
        });
    }

    if dialogue.awaiting_advance && dialogue.has_more {
        out.push(DrawCommand::Rect {
            position: position + size - Vec2::splat(DIALOGUE_PADDING + 8.0),
            size: Vec2::splat(8.0),
            color: Palette::MORE_MARKER,
        });
    }
}

/// Greedy word wrap measured in characters; overlong words are split.
pub(crate) fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current_len == 0 {
            word.len()
        } else {
            current_len + 1 + word.len()
        };
        if needed > max_chars && current_len > 0 {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TileGridPresentation;

    fn plain_scene(columns: u32, rows: u32) -> Scene {
        let grid = TileGridPresentation::new(
            columns,
            rows,
            32.0,
            vec![TerrainKind::Grass; columns as usize * rows as usize],
        )
        .expect("valid grid");
        Scene::new(
            Vec2::new(480.0, 320.0),
            grid,
            PlayerPresentation::new(Vec2::new(64.0, 64.0), Facing::Down),
        )
    }

    fn tile_fills(commands: &[DrawCommand]) -> usize {
        commands
            .iter()
            .filter(|command| {
                matches!(command, DrawCommand::Rect { color, .. } if *color == Palette::GRASS)
            })
            .count()
    }

    #[test]
    fn only_visible_tiles_are_emitted() {
        let mut scene = plain_scene(40, 30);
        assert_eq!(tile_fills(&draw_list(&scene)), 15 * 10);

        scene.camera = Vec2::new(16.0, 16.0);
        assert_eq!(tile_fills(&draw_list(&scene)), 16 * 11);
    }

    #[test]
    fn tiles_are_shifted_by_the_camera() {
        let mut scene = plain_scene(40, 30);
        scene.camera = Vec2::new(64.0, 32.0);
        let first = draw_list(&scene)
            .into_iter()
            .find(|command| matches!(command, DrawCommand::Rect { .. }))
            .expect("at least one tile");
        assert_eq!(
            first,
            DrawCommand::Rect {
                position: Vec2::ZERO,
                size: Vec2::splat(32.0),
                color: Palette::GRASS,
            }
        );
    }

    #[test]
    fn terrain_palette_matches_kinds() {
        assert_eq!(Palette::terrain(TerrainKind::Grass), Color::from_rgb_u8(0x4c, 0xd1, 0x58));
        assert_eq!(Palette::terrain(TerrainKind::Water), Color::from_rgb_u8(0x4f, 0xa4, 0xb8));
        assert_eq!(Palette::terrain(TerrainKind::Wall), Color::from_rgb_u8(0x6e, 0x45, 0x29));
    }

    #[test]
    fn facing_indicator_moves_with_facing() {
        let mut scene = plain_scene(15, 10);
        let indicator = |scene: &Scene| {
            draw_list(scene)
                .into_iter()
                .filter(|command| {
                    matches!(command, DrawCommand::Rect { color, .. } if *color == Palette::PLAYER_EYES)
                })
                .last()
                .expect("indicator drawn")
        };

        let down = indicator(&scene);
        scene.player.facing = Facing::Right;
        let right = indicator(&scene);
        assert_ne!(down, right);
        assert_eq!(
            right,
            DrawCommand::Rect {
                position: Vec2::new(64.0 + 24.0, 64.0 + 10.0),
                size: Vec2::new(4.0, 8.0),
                color: Palette::PLAYER_EYES,
            }
        );
    }

    #[test]
    fn offscreen_entities_are_skipped() {
        let mut scene = plain_scene(40, 30);
        scene.entities = vec![
            EntityPresentation::new(CellCoord::new(3, 3), EntityKind::Npc),
            EntityPresentation::new(CellCoord::new(30, 20), EntityKind::Sign),
        ];
        let commands = draw_list(&scene);
        let npc_bodies = commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Rect { color, .. } if *color == Palette::NPC))
            .count();
        let boards = commands
            .iter()
            .filter(|command| {
                matches!(command, DrawCommand::Rect { color, .. } if *color == Palette::SIGN_BOARD)
            })
            .count();
        assert_eq!((npc_bodies, boards), (1, 0));
    }

    fn more_markers(commands: &[DrawCommand]) -> Vec<&DrawCommand> {
        commands
            .iter()
            .filter(|command| {
                matches!(command, DrawCommand::Rect { color, .. } if *color == Palette::MORE_MARKER)
            })
            .collect()
    }

    #[test]
    fn more_marker_has_its_own_color() {
        assert_ne!(Palette::MORE_MARKER, Palette::PLAYER);
        assert_ne!(Palette::MORE_MARKER, Palette::PLAYER_EYES);
        assert_ne!(Palette::MORE_MARKER, Palette::DIALOGUE_FILL);
    }

    #[test]
    fn dialogue_box_shows_revealed_text_and_more_marker() {
        let mut scene = plain_scene(15, 10);
        scene.dialogue = Some(DialoguePresentation {
            text: "Hello".to_owned(),
            awaiting_advance: true,
            has_more: true,
        });
        let commands = draw_list(&scene);
        assert!(commands.iter().any(|command| matches!(
            command,
            DrawCommand::Text { text, .. } if text == "Hello"
        )));
        let markers = more_markers(&commands);
        assert_eq!(markers.len(), 1);
        let DrawCommand::Rect { position, size, .. } = markers[0] else {
            panic!("marker must be a filled rect");
        };
        assert_eq!(*size, Vec2::splat(8.0));
        assert!((*position - Vec2::new(450.0, 290.0)).length() < 1e-3);

        scene.dialogue = Some(DialoguePresentation {
            text: "Hel".to_owned(),
            awaiting_advance: false,
            has_more: true,
        });
        assert!(more_markers(&draw_list(&scene)).is_empty());

        scene.dialogue = Some(DialoguePresentation {
            text: "Hello".to_owned(),
            awaiting_advance: true,
            has_more: false,
        });
        assert!(more_markers(&draw_list(&scene)).is_empty());
    }

    #[test]
    fn wrap_text_breaks_on_words_and_splits_long_ones() {
        assert_eq!(
            wrap_text("the quick brown fox", 10),
            vec!["the quick".to_owned(), "brown fox".to_owned()]
        );
        assert_eq!(
            wrap_text("abcdefghij klm", 4),
            vec![
                "abcd".to_owned(),
                "efgh".to_owned(),
                "ij".to_owned(),
                "klm".to_owned()
            ]
        );
        assert!(wrap_text("   ", 5).is_empty());
    }
}
