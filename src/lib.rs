//! # Delve
//!
//! A turn-based dungeon-crawler roguelike engine.
//!
//! ## Architecture Overview
//!
//! The crate is organised around a handful of cooperating systems:
//!
//! - **Game State**: the session object owning the map, message log and
//!   inventory — there are no process-wide globals
//! - **Entity Model**: positioned, drawable actors with optional combat,
//!   AI and item components, exclusively owned by the map
//! - **Generation System**: seeded room-and-corridor dungeon generation
//!   with depth-scaled monster and item placement
//! - **Visibility Engine**: recursive shadowcasting field of view with
//!   persistent exploration state
//! - **Rendering Views**: read-only tile/entity appearance queries for a
//!   character-grid front end
//!
//! The console backend, input polling and menu UI are thin collaborators;
//! the engine talks to them through the [`input::Command`] enum, the
//! [`game::ChoiceProvider`] seam and the [`rendering::Frame`] view.

pub mod fov;
pub mod game;
pub mod generation;
pub mod input;
pub mod rendering;

pub use fov::FovMap;
pub use game::{
    Ai, ChoiceProvider, DeathCallback, Direction, Entity, EntityId, Fighter, GameMap, GameState,
    Item, Message, MessageLog, MoveOutcome, PlayerAction, Position, StatBoost, Tile, UseResult,
};
pub use generation::{random_choice, DungeonGenerator, GenerationConfig, Rect};
pub use input::Command;
pub use rendering::{tile_appearance, Color, Frame, TileAppearance};

/// Core error type for the Delve engine.
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Action cannot be performed
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// A weighted random table summed to zero
    #[error("Invalid weighted choice: {0}")]
    InvalidChoice(String),
}

/// Result type used throughout the Delve codebase.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Default map width in tiles
    pub const MAP_WIDTH: i32 = 80;

    /// Default map height in tiles
    pub const MAP_HEIGHT: i32 = 45;

    /// Room placement attempts per level
    pub const ROOM_ATTEMPTS: u32 = 30;

    /// Minimum room size (outer bounds)
    pub const ROOM_MIN_SIZE: i32 = 6;

    /// Maximum room size (outer bounds)
    pub const ROOM_MAX_SIZE: i32 = 10;

    /// Field of view radius in tiles
    pub const FOV_RADIUS: i32 = 10;

    /// Whether walls at the edge of the field of view are lit
    pub const FOV_LIGHT_WALLS: bool = true;

    /// Player starting health
    pub const PLAYER_HP: i32 = 30;

    /// Player starting defense
    pub const PLAYER_DEFENSE: i32 = 2;

    /// Player starting attack power
    pub const PLAYER_POWER: i32 = 5;

    /// Base experience required for the first level-up
    pub const LEVEL_UP_BASE: i32 = 200;

    /// Additional experience required per level
    pub const LEVEL_UP_FACTOR: i32 = 150;

    /// Hit points restored by a health potion
    pub const HEAL_AMOUNT: i32 = 40;

    /// Damage dealt by a lightning scroll
    pub const LIGHTNING_DAMAGE: i32 = 40;

    /// Maximum range of a lightning scroll
    pub const LIGHTNING_RANGE: i32 = 5;

    /// Maximum range of a confusion scroll
    pub const CONFUSE_RANGE: i32 = 8;

    /// Turns a confused monster stumbles about
    pub const CONFUSE_TURNS: u32 = 10;

    /// Blast radius of a fireball scroll
    pub const FIREBALL_RADIUS: i32 = 3;

    /// Damage dealt by a fireball scroll
    pub const FIREBALL_DAMAGE: i32 = 25;

    /// Lettered inventory capacity (a..z)
    pub const INVENTORY_CAPACITY: usize = 26;

    /// Message log scrollback limit
    pub const LOG_CAPACITY: usize = 200;
}
