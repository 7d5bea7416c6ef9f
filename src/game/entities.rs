//! # Entity Model
//!
//! Positioned, drawable actors and items with optional combat, AI and
//! usable-item components.
//!
//! An [`Entity`] is a plain struct; capabilities are attached as
//! `Option`al components. The owning [`GameMap`](crate::game::GameMap)
//! holds every entity in a single ordered list and hands out
//! [`EntityId`]s; components never point back at their owner — code that
//! needs both sides addresses the map by id.

use crate::config;
use crate::game::{EntityId, Position};
use crate::rendering::Color;
use serde::{Deserialize, Serialize};

/// A game object: the player, a monster, an item on the floor, remains,
/// or the stairs marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Spawn-sequence id assigned by the owning map
    pub id: EntityId,
    /// Current map coordinates
    pub pos: Position,
    /// Display character
    pub glyph: char,
    /// Display name
    pub name: String,
    /// Display color
    pub color: Color,
    /// Whether this entity obstructs other blocking entities
    pub blocks: bool,
    /// Drawn on any explored tile even when out of the field of view
    pub always_visible: bool,
    /// Combat capability
    pub fighter: Option<Fighter>,
    /// Autonomous behavior
    pub ai: Option<Ai>,
    /// Usable/pickupable payload
    pub item: Option<Item>,
}

impl Entity {
    /// Creates a bare entity. The id is a placeholder until the map
    /// adopts it via [`GameMap::add_entity`](crate::game::GameMap::add_entity).
    pub fn new(pos: Position, glyph: char, name: &str, color: Color, blocks: bool) -> Self {
        Self {
            id: EntityId(0),
            pos,
            glyph,
            name: name.to_string(),
            color,
            blocks,
            always_visible: false,
            fighter: None,
            ai: None,
            item: None,
        }
    }

    /// Whether this entity still has combat capability.
    pub fn is_alive(&self) -> bool {
        self.fighter.as_ref().map_or(false, |f| f.hp > 0)
    }
}

/// Combat statistics and progression state for an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fighter {
    pub hp: i32,
    pub max_hp: i32,
    pub defense: i32,
    pub power: i32,
    /// Experience accumulated by this fighter
    pub xp: i32,
    /// Experience awarded to whoever defeats this fighter
    pub xp_reward: i32,
    /// Current character level
    pub level: i32,
    /// What happens when hp first crosses zero
    pub on_death: DeathCallback,
}

impl Fighter {
    pub fn new(max_hp: i32, defense: i32, power: i32, xp_reward: i32, on_death: DeathCallback) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            defense,
            power,
            xp: 0,
            xp_reward,
            level: 1,
            on_death,
        }
    }

    /// Restores hit points, clamped at `max_hp`.
    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    /// Applies raw damage. Non-positive amounts are ignored; hp may go
    /// negative — death is resolved by the combat engine at the first
    /// crossing of zero, exactly once.
    pub fn take_damage(&mut self, amount: i32) {
        if amount > 0 {
            self.hp -= amount;
        }
    }

    /// Experience required to reach the next level.
    pub fn xp_to_next_level(&self) -> i32 {
        config::LEVEL_UP_BASE + self.level * config::LEVEL_UP_FACTOR
    }
}

/// Dispatched by the combat engine when a fighter dies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCallback {
    /// The player: game over, body left in place
    Player,
    /// A monster: converted into inert remains
    Monster,
}

/// Autonomous behavior attached to monsters.
///
/// `Confused` is a decorator: it wraps the prior behavior for a fixed
/// number of turns and restores it on expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Ai {
    /// Chase the player while visible; melee when adjacent
    Basic,
    /// Stagger randomly for `turns_left` turns, then revert
    Confused {
        previous: Box<Ai>,
        turns_left: u32,
    },
}

/// Usable item kinds, each a one-shot consumable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Item {
    HealthPotion,
    LightningScroll,
    ConfusionScroll,
    FireballScroll,
}

/// Outcome of attempting to use an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseResult {
    /// The item took effect and is consumed
    Used,
    /// The use was aborted; the item stays in the inventory
    Cancelled,
}

/// Stat improvements offered on level-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatBoost {
    /// +20 max hp
    Constitution,
    /// +1 power
    Strength,
    /// +1 defense
    Agility,
}

impl StatBoost {
    pub const ALL: [StatBoost; 3] = [StatBoost::Constitution, StatBoost::Strength, StatBoost::Agility];

    /// Menu label shown to the player.
    pub fn label(self, fighter: &Fighter) -> String {
        match self {
            StatBoost::Constitution => format!("Constitution (+20 HP, from {})", fighter.max_hp),
            StatBoost::Strength => format!("Strength (+1 attack, from {})", fighter.power),
            StatBoost::Agility => format!("Agility (+1 defense, from {})", fighter.defense),
        }
    }

    /// Applies the boost to a fighter.
    pub fn apply(self, fighter: &mut Fighter) {
        match self {
            StatBoost::Constitution => {
                fighter.max_hp += 20;
                fighter.hp += 20;
            }
            StatBoost::Strength => fighter.power += 1,
            StatBoost::Agility => fighter.defense += 1,
        }
    }
}
