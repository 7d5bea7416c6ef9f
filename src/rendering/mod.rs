//! # Rendering Module
//!
//! Read-only appearance views for a character-grid front end.
//!
//! The engine does not draw anything itself: it exposes per-tile
//! appearances, a per-entity draw predicate and a [`Frame`] snapshot that
//! a terminal (or any other backend) can blit. All state lives in the
//! map; this module only interprets it.

pub mod ui;

pub use ui::*;

use crate::game::{GameMap, Tile};
use serde::{Deserialize, Serialize};

/// An RGB color carried by entities and log messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const DARK_RED: Color = Color::new(191, 0, 0);
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const LIGHT_GREEN: Color = Color::new(63, 255, 63);
    pub const YELLOW: Color = Color::new(255, 255, 0);
    pub const LIGHT_YELLOW: Color = Color::new(255, 255, 115);
    pub const ORANGE: Color = Color::new(255, 127, 0);
    pub const VIOLET: Color = Color::new(127, 0, 255);
    pub const LIGHT_PINK: Color = Color::new(255, 159, 191);
    pub const LIGHT_BLUE: Color = Color::new(63, 63, 255);
    pub const DESATURATED_GREEN: Color = Color::new(63, 127, 63);
    pub const DARKER_GREEN: Color = Color::new(0, 127, 0);

    /// Tile palette, matching the classic four-state fog-of-war look.
    pub const DARK_WALL: Color = Color::new(0, 0, 100);
    pub const DARK_GROUND: Color = Color::new(50, 50, 150);
    pub const LIGHT_WALL: Color = Color::new(130, 110, 50);
    pub const LIGHT_GROUND: Color = Color::new(200, 180, 50);
}

/// One of the four drawable tile states (plus undiscovered darkness).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileAppearance {
    /// Never seen: rendered as featureless darkness
    Unexplored,
    /// Previously seen wall, currently out of sight
    DarkWall,
    /// Previously seen floor, currently out of sight
    DarkFloor,
    /// Wall in the current field of view
    LitWall,
    /// Floor in the current field of view
    LitFloor,
}

impl TileAppearance {
    /// Glyph used by the character-grid front end.
    pub fn glyph(self) -> char {
        match self {
            TileAppearance::Unexplored => ' ',
            TileAppearance::DarkWall | TileAppearance::LitWall => '#',
            TileAppearance::DarkFloor | TileAppearance::LitFloor => '.',
        }
    }

    /// Background color for this appearance.
    pub fn color(self) -> Color {
        match self {
            TileAppearance::Unexplored => Color::BLACK,
            TileAppearance::DarkWall => Color::DARK_WALL,
            TileAppearance::DarkFloor => Color::DARK_GROUND,
            TileAppearance::LitWall => Color::LIGHT_WALL,
            TileAppearance::LitFloor => Color::LIGHT_GROUND,
        }
    }
}

/// Classifies a tile into one of the four drawable states.
///
/// Walls and floors in the current field of view render bright; explored
/// but out-of-sight tiles render dark; tiles never seen render as
/// darkness regardless of what they contain.
pub fn tile_appearance(tile: &Tile, currently_visible: bool) -> TileAppearance {
    if currently_visible {
        if tile.walkable {
            TileAppearance::LitFloor
        } else {
            TileAppearance::LitWall
        }
    } else if tile.explored {
        if tile.walkable {
            TileAppearance::DarkFloor
        } else {
            TileAppearance::DarkWall
        }
    } else {
        TileAppearance::Unexplored
    }
}

/// A rendered character-grid snapshot of the map and its entities.
///
/// The frame is rebuilt from scratch every turn, so stale glyphs from the
/// previous frame can never linger; there is nothing for a post-render
/// "clear" pass to do.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: i32,
    pub height: i32,
    cells: Vec<(char, Color)>,
}

impl Frame {
    /// Renders the map tiles and every drawable entity.
    ///
    /// Entities are drawn in list order, so later entries overwrite
    /// earlier ones; the map's "send to bottom" reordering keeps remains
    /// and loot underneath the actors standing on them.
    pub fn render(map: &GameMap) -> Self {
        let mut cells = Vec::with_capacity((map.width * map.height) as usize);
        for y in 0..map.height {
            for x in 0..map.width {
                let appearance = tile_appearance(map.tile(x, y), map.is_visible(x, y));
                cells.push((appearance.glyph(), appearance.color()));
            }
        }

        let mut frame = Self {
            width: map.width,
            height: map.height,
            cells,
        };

        for entity in &map.entities {
            if map.is_entity_drawn(entity) {
                frame.put(entity.pos.x, entity.pos.y, entity.glyph, entity.color);
            }
        }

        frame
    }

    fn put(&mut self, x: i32, y: i32, glyph: char, color: Color) {
        if x >= 0 && y >= 0 && x < self.width && y < self.height {
            self.cells[(y * self.width + x) as usize] = (glyph, color);
        }
    }

    /// The glyph and color at a cell.
    pub fn cell(&self, x: i32, y: i32) -> (char, Color) {
        self.cells[(y * self.width + x) as usize]
    }

    /// The frame as plain text lines, one per row.
    pub fn to_lines(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| self.cells[(y * self.width + x) as usize].0)
                    .collect()
            })
            .collect()
    }
}
