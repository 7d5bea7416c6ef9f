//! Room-and-corridor dungeon generator.
//!
//! Classic rejection-sampled placement: roll a room, drop it if it
//! overlaps an accepted one, otherwise carve it and tunnel an L-shaped
//! corridor back to the previous room. Populating happens room by room
//! from depth-scaled weighted tables.

use crate::game::{Ai, DeathCallback, Entity, Fighter, GameMap, Item, Position, Tile};
use crate::generation::{
    max_items_per_room, max_monsters_per_room, random_choice, troll_weight, GenerationConfig, Rect,
};
use crate::rendering::Color;
use crate::{DelveError, DelveResult};
use log::{debug, info};
use rand::prelude::*;

/// Seeded dungeon generator.
///
/// Holds no state of its own; every run is fully determined by the
/// config, depth and RNG handed to [`generate`](Self::generate).
///
/// # Examples
///
/// ```
/// use delve::{DungeonGenerator, GenerationConfig};
///
/// let config = GenerationConfig::for_testing(42);
/// let mut rng = config.create_rng();
/// let map = DungeonGenerator::new()
///     .generate(&config, 1, &mut rng)
///     .unwrap();
/// assert!(!map.rooms.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DungeonGenerator;

impl DungeonGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generates a fully populated level at the given depth.
    ///
    /// The returned map has no player; the session places one at the
    /// first room's center. Fails only if every placement attempt was
    /// rejected, which cannot happen at sane config sizes.
    pub fn generate(
        &self,
        config: &GenerationConfig,
        depth: u32,
        rng: &mut StdRng,
    ) -> DelveResult<GameMap> {
        let mut map = GameMap::new(config.map_width, config.map_height, depth);

        for _ in 0..config.room_attempts {
            let w = rng.gen_range(config.room_min_size..=config.room_max_size);
            let h = rng.gen_range(config.room_min_size..=config.room_max_size);
            let x = rng.gen_range(0..=(config.map_width - w - 1));
            let y = rng.gen_range(0..=(config.map_height - h - 1));
            let room = Rect::new(x, y, w, h);

            if map.rooms.iter().any(|other| room.intersects(other)) {
                continue;
            }

            carve_room(&mut map, &room);

            if let Some(&previous) = map.rooms.last() {
                let (prev_x, prev_y) = previous.center();
                let (new_x, new_y) = room.center();
                // elbow direction is a weighted coin: 8 in 20 rolls go
                // horizontal-first
                if rng.gen_range(0..20) >= 12 {
                    carve_h_tunnel(&mut map, prev_x, new_x, prev_y);
                    carve_v_tunnel(&mut map, prev_y, new_y, new_x);
                } else {
                    carve_v_tunnel(&mut map, prev_y, new_y, prev_x);
                    carve_h_tunnel(&mut map, prev_x, new_x, new_y);
                }
            }

            map.rooms.push(room);
        }

        if map.rooms.is_empty() {
            return Err(DelveError::GenerationFailed(format!(
                "no rooms placed in {} attempts",
                config.room_attempts
            )));
        }

        // First room is the player's arrival point and stays empty.
        let populate: Vec<Rect> = map.rooms.iter().skip(1).copied().collect();
        for room in &populate {
            self.populate_room(&mut map, room, depth, rng)?;
        }

        let (stairs_x, stairs_y) = map.rooms.last().unwrap().center();
        let mut stairs = Entity::new(
            Position::new(stairs_x, stairs_y),
            '>',
            "stairs down",
            Color::WHITE,
            false,
        );
        stairs.always_visible = true;
        let stairs_id = map.add_entity(stairs);
        map.entity_to_bottom(stairs_id);

        map.rebuild_fov();
        info!(
            "generated depth {} with {} rooms, {} entities",
            depth,
            map.rooms.len(),
            map.entities.len()
        );
        Ok(map)
    }

    fn populate_room(
        &self,
        map: &mut GameMap,
        room: &Rect,
        depth: u32,
        rng: &mut StdRng,
    ) -> DelveResult<()> {
        let num_monsters = rng.gen_range(0..=max_monsters_per_room(depth));
        for _ in 0..num_monsters {
            let x = rng.gen_range(room.x1 + 1..room.x2 - 1);
            let y = rng.gen_range(room.y1 + 1..room.y2 - 1);
            if map.blocking_entity_at(x, y).is_some() {
                continue;
            }
            let monster = spawn_monster(Position::new(x, y), depth, rng)?;
            debug!("spawning {} at ({}, {})", monster.name, x, y);
            map.add_entity(monster);
        }

        let num_items = rng.gen_range(0..=max_items_per_room(depth));
        for _ in 0..num_items {
            let x = rng.gen_range(room.x1 + 1..room.x2 - 1);
            let y = rng.gen_range(room.y1 + 1..room.y2 - 1);
            if map.blocking_entity_at(x, y).is_some() {
                continue;
            }
            let item = spawn_item(Position::new(x, y), depth, rng)?;
            map.add_entity(item);
        }

        Ok(())
    }
}

fn carve_room(map: &mut GameMap, room: &Rect) {
    for x in room.x1 + 1..room.x2 - 1 {
        for y in room.y1 + 1..room.y2 - 1 {
            *map.tile_mut(x, y) = Tile::floor();
        }
    }
}

fn carve_h_tunnel(map: &mut GameMap, x1: i32, x2: i32, y: i32) {
    for x in x1.min(x2)..=x1.max(x2) {
        *map.tile_mut(x, y) = Tile::floor();
    }
}

fn carve_v_tunnel(map: &mut GameMap, y1: i32, y2: i32, x: i32) {
    for y in y1.min(y2)..=y1.max(y2) {
        *map.tile_mut(x, y) = Tile::floor();
    }
}

/// Rolls a monster for the given depth. Orcs hold a flat weight; trolls
/// phase in as depth grows.
fn spawn_monster(pos: Position, depth: u32, rng: &mut StdRng) -> DelveResult<Entity> {
    let weights = [80, troll_weight(depth)];
    let entity = match random_choice(&weights, rng)? {
        0 => {
            let mut orc = Entity::new(pos, 'o', "orc", Color::DESATURATED_GREEN, true);
            orc.fighter = Some(Fighter::new(20, 0, 4, 35, DeathCallback::Monster));
            orc.ai = Some(Ai::Basic);
            orc
        }
        _ => {
            let mut troll = Entity::new(pos, 'T', "troll", Color::DARKER_GREEN, true);
            troll.fighter = Some(Fighter::new(30, 2, 8, 100, DeathCallback::Monster));
            troll.ai = Some(Ai::Basic);
            troll
        }
    };
    Ok(entity)
}

/// Rolls an item for the given depth. Scrolls only enter the table once
/// the dungeon is deep enough for them.
fn spawn_item(pos: Position, depth: u32, rng: &mut StdRng) -> DelveResult<Entity> {
    use crate::generation::value_for_depth;

    let weights = [
        35,
        value_for_depth(&[(4, 25)], depth),
        value_for_depth(&[(6, 25)], depth),
        value_for_depth(&[(2, 10)], depth),
    ];
    let entity = match random_choice(&weights, rng)? {
        0 => {
            let mut potion = Entity::new(pos, '!', "healing potion", Color::VIOLET, false);
            potion.item = Some(Item::HealthPotion);
            potion
        }
        1 => {
            let mut scroll = Entity::new(
                pos,
                '#',
                "scroll of lightning bolt",
                Color::LIGHT_YELLOW,
                false,
            );
            scroll.item = Some(Item::LightningScroll);
            scroll
        }
        2 => {
            let mut scroll =
                Entity::new(pos, '#', "scroll of fireball", Color::LIGHT_YELLOW, false);
            scroll.item = Some(Item::FireballScroll);
            scroll
        }
        _ => {
            let mut scroll =
                Entity::new(pos, '#', "scroll of confusion", Color::LIGHT_YELLOW, false);
            scroll.item = Some(Item::ConfusionScroll);
            scroll
        }
    };
    Ok(entity)
}
