//! # Map Container
//!
//! The tile grid, the entity list and the spatial queries over both.
//!
//! A [`GameMap`] is created once per dungeon level and exclusively owns
//! every entity on that level. The entity list doubles as the draw
//! order: lowest index is drawn first and overwritten by later entries,
//! with [`GameMap::entity_to_bottom`] as the explicit z-order operation
//! so corpses and loot never occlude live actors.

use crate::config;
use crate::fov::FovMap;
use crate::game::{Entity, EntityId, Position};
use crate::generation::Rect;
use serde::{Deserialize, Serialize};

/// A single map cell.
///
/// Tiles are mutated only while carving during generation and when an
/// FOV recompute marks them explored; the grid itself is fixed-size for
/// the lifetime of a level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tile {
    /// Entities can occupy this cell
    pub walkable: bool,
    /// Light passes through this cell
    pub transparent: bool,
    /// Has ever been inside the field of view; never reset
    pub explored: bool,
}

impl Tile {
    /// A solid wall cell.
    pub fn wall() -> Self {
        Self {
            walkable: false,
            transparent: false,
            explored: false,
        }
    }

    /// An open floor cell.
    pub fn floor() -> Self {
        Self {
            walkable: true,
            transparent: true,
            explored: false,
        }
    }
}

/// Result of a movement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The entity relocated to the given position
    Moved(Position),
    /// The move was intercepted and became a melee attack on the target
    Attacked(EntityId),
    /// Geometry or a blocking entity prevented the move
    Blocked,
}

/// One dungeon level: tiles, rooms, entities and visibility state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMap {
    pub width: i32,
    pub height: i32,
    /// Dungeon depth, 1-based; drives spawn tables
    pub depth: u32,
    /// Row-major tile grid
    pub tiles: Vec<Tile>,
    /// Accepted rooms, in placement order; read after generation only
    /// for spawn placement
    pub rooms: Vec<Rect>,
    /// All entities on this level, in draw/processing order
    pub entities: Vec<Entity>,
    /// The current player entity; also present in `entities`
    pub player_id: EntityId,
    /// Next spawn sequence number
    pub next_id: u64,
    /// Debug override: every tile reads as visible
    pub fov_override: bool,
    /// Visibility acceleration structure; rebuilt from tile
    /// transparency, never persisted
    #[serde(skip)]
    pub fov: FovMap,
}

impl GameMap {
    /// Creates a solid-rock map of the given size.
    pub fn new(width: i32, height: i32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
            tiles: vec![Tile::wall(); (width * height) as usize],
            rooms: Vec::new(),
            entities: Vec::new(),
            player_id: EntityId(0),
            next_id: 0,
            fov_override: false,
            fov: FovMap::new(width, height),
        }
    }

    fn idx(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    /// Whether the coordinate lies inside the map.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// The tile at a coordinate. Panics on out-of-bounds access — callers
    /// are expected to stay inside the fixed grid.
    pub fn tile(&self, x: i32, y: i32) -> &Tile {
        let idx = self.idx(x, y);
        &self.tiles[idx]
    }

    /// Mutable access to a tile, for carving.
    pub fn tile_mut(&mut self, x: i32, y: i32) -> &mut Tile {
        let idx = self.idx(x, y);
        &mut self.tiles[idx]
    }

    // ---- entity bookkeeping -------------------------------------------------

    /// Adopts an entity, assigning it the next spawn sequence id.
    pub fn add_entity(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        entity.id = id;
        self.entities.push(entity);
        id
    }

    /// The list index of an entity, if it is still on this map.
    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| e.id == id)
    }

    /// The entity with the given id. Panics if absent: ids are only
    /// handed out by this map, so a miss is a core-model invariant breach.
    pub fn entity(&self, id: EntityId) -> &Entity {
        self.try_entity(id)
            .unwrap_or_else(|| panic!("entity {:?} not on this map", id))
    }

    /// Mutable access by id; same panic contract as [`entity`](Self::entity).
    pub fn entity_mut(&mut self, id: EntityId) -> &mut Entity {
        self.entities
            .iter_mut()
            .find(|e| e.id == id)
            .unwrap_or_else(|| panic!("entity {:?} not on this map", id))
    }

    /// The entity with the given id, if present.
    pub fn try_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Removes an entity from the list (pickup, level transition) and
    /// returns it. Panics if absent.
    pub fn remove_entity(&mut self, id: EntityId) -> Entity {
        let idx = self
            .index_of(id)
            .unwrap_or_else(|| panic!("entity {:?} not on this map", id));
        self.entities.remove(idx)
    }

    /// The player entity. Panics if the player has not been placed yet.
    pub fn player(&self) -> &Entity {
        self.entity(self.player_id)
    }

    /// Mutable access to the player entity.
    pub fn player_mut(&mut self) -> &mut Entity {
        let id = self.player_id;
        self.entity_mut(id)
    }

    /// Moves an entity to index 0 without disturbing the relative order
    /// of any other entity, so it is drawn under everything else.
    pub fn entity_to_bottom(&mut self, id: EntityId) {
        if let Some(idx) = self.index_of(id) {
            let entity = self.entities.remove(idx);
            self.entities.insert(0, entity);
        }
    }

    // ---- movement -----------------------------------------------------------

    /// Whether a blocking entity occupies the coordinate.
    pub fn blocking_entity_at(&self, x: i32, y: i32) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|e| e.blocks && e.pos == Position::new(x, y))
            .map(|e| e.id)
    }

    /// Attempts a unit (or diagonal) step, converting the move into a
    /// melee attack when a combat-capable mover steps onto an attackable
    /// target. Interception takes priority over passability: the mover
    /// never relocates onto its victim.
    pub fn move_or_attack(&mut self, id: EntityId, dx: i32, dy: i32) -> MoveOutcome {
        let mover = self.entity(id);
        let dest = mover.pos + Position::new(dx, dy);
        let can_fight = mover.fighter.is_some();

        if can_fight {
            let target = self
                .entities
                .iter()
                .find(|e| e.id != id && e.fighter.is_some() && e.pos == dest)
                .map(|e| e.id);
            if let Some(target_id) = target {
                return MoveOutcome::Attacked(target_id);
            }
        }

        if self.move_entity(id, dx, dy) {
            MoveOutcome::Moved(dest)
        } else {
            MoveOutcome::Blocked
        }
    }

    /// Performs a plain step with no attack interception. Returns whether
    /// the entity actually moved.
    ///
    /// A blocking mover needs a walkable destination free of blocking
    /// entities. A non-blocking mover (noclip, loose items) passes
    /// through geometry and entities alike; only the map edge stops it.
    pub fn move_entity(&mut self, id: EntityId, dx: i32, dy: i32) -> bool {
        let mover = self.entity(id);
        let dest = mover.pos + Position::new(dx, dy);

        if !self.in_bounds(dest.x, dest.y) {
            return false;
        }

        if mover.blocks {
            if !self.tile(dest.x, dest.y).walkable {
                return false;
            }
            if self.blocking_entity_at(dest.x, dest.y).is_some() {
                return false;
            }
        }

        self.entity_mut(id).pos = dest;
        true
    }

    /// Steps once toward a target: the vector is normalized to a signed
    /// unit step per axis (rounded) and issued as a single move. No
    /// pathing — a blocked line simply fails to progress this turn.
    pub fn move_towards(&mut self, id: EntityId, target: Position) -> bool {
        let pos = self.entity(id).pos;
        let delta = target - pos;
        let distance = pos.distance(target);
        if distance == 0.0 {
            return false;
        }

        let dx = (delta.x as f64 / distance).round() as i32;
        let dy = (delta.y as f64 / distance).round() as i32;
        self.move_entity(id, dx, dy)
    }

    /// Straight-line distance between two entities.
    pub fn distance_between(&self, a: EntityId, b: EntityId) -> f64 {
        self.entity(a).pos.distance(self.entity(b).pos)
    }

    // ---- spatial queries ----------------------------------------------------

    /// All entities exactly at the coordinate, in list order. With
    /// `only_visible`, an out-of-sight coordinate yields nothing.
    pub fn entities_at(&self, x: i32, y: i32, only_visible: bool) -> Vec<EntityId> {
        if only_visible && !self.is_visible(x, y) {
            return Vec::new();
        }
        self.entities
            .iter()
            .filter(|e| e.pos == Position::new(x, y))
            .map(|e| e.id)
            .collect()
    }

    /// Combat-capable entities exactly at the coordinate.
    pub fn targets_at(&self, x: i32, y: i32, only_visible: bool) -> Vec<EntityId> {
        self.entities_at(x, y, only_visible)
            .into_iter()
            .filter(|&id| self.entity(id).fighter.is_some())
            .collect()
    }

    /// The closest visible combat-capable entity within `max_range` of
    /// the requester, excluding the requester itself.
    ///
    /// Ties are broken by scan order: the strict `<` comparison means the
    /// first-scanned (lowest list index) entity wins. List order is
    /// deterministic for a given seed, so this is a pinned behavior.
    pub fn find_nearest_shootable(&self, from: EntityId, max_range: i32) -> Option<EntityId> {
        let origin = self.entity(from).pos;
        let mut nearest = None;
        let mut nearest_distance = (max_range + 1) as f64;

        for entity in &self.entities {
            if entity.id == from
                || entity.fighter.is_none()
                || !self.is_visible(entity.pos.x, entity.pos.y)
            {
                continue;
            }
            let distance = origin.distance(entity.pos);
            if distance < nearest_distance {
                nearest = Some(entity.id);
                nearest_distance = distance;
            }
        }

        nearest
    }

    // ---- visibility ---------------------------------------------------------

    /// Rebuilds the FOV acceleration structure from tile transparency.
    /// Called after generation and after deserializing a saved map.
    pub fn rebuild_fov(&mut self) {
        let mut fov = FovMap::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                fov.set_transparent(x, y, self.tile(x, y).transparent);
            }
        }
        self.fov = fov;
    }

    /// Recomputes visibility from an origin and folds the result into the
    /// persistent exploration state.
    pub fn recompute_fov(&mut self, origin: Position, radius: i32, light_walls: bool) {
        self.fov.compute(origin.x, origin.y, radius, light_walls);
        for y in 0..self.height {
            for x in 0..self.width {
                if self.fov.is_visible(x, y) {
                    self.tile_mut(x, y).explored = true;
                }
            }
        }
    }

    /// Recomputes visibility around the player with the standard radius.
    pub fn refresh_player_fov(&mut self) {
        let origin = self.player().pos;
        self.recompute_fov(origin, config::FOV_RADIUS, config::FOV_LIGHT_WALLS);
    }

    /// Whether the tile is currently visible. The debug override
    /// short-circuits the geometric test entirely.
    pub fn is_visible(&self, x: i32, y: i32) -> bool {
        self.fov_override || self.fov.is_visible(x, y)
    }

    /// Whether an entity should be drawn this frame: inside the current
    /// field of view, or flagged always-visible on an explored tile.
    pub fn is_entity_drawn(&self, entity: &Entity) -> bool {
        if self.is_visible(entity.pos.x, entity.pos.y) {
            return true;
        }
        entity.always_visible
            && self.in_bounds(entity.pos.x, entity.pos.y)
            && self.tile(entity.pos.x, entity.pos.y).explored
    }
}
