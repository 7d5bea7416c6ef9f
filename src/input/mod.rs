//! # Input
//!
//! Keyboard-independent command vocabulary and the default key mapping.
//!
//! The engine only ever sees a [`Command`]; the front end decides how
//! keys map onto it. The default layout is vi-style movement with the
//! usual roguelike action keys.

use crate::game::Direction;
use serde::{Deserialize, Serialize};

/// Everything the player can ask the engine to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Step (or attack) in a direction
    Move(Direction),
    /// Pass the turn in place
    Wait,
    /// Pick up an item from the current tile
    PickUp,
    /// Open the inventory to use an item
    UseItem,
    /// Open the inventory to drop an item
    DropItem,
    /// Take the stairs down
    Descend,
    /// Show the character information screen
    CharacterSheet,
    /// Debug: walk through walls and monsters
    ToggleNoclip,
    /// Debug: reveal the whole map
    ToggleFovOverride,
    /// Front-end concern; the engine ignores it
    ToggleFullscreen,
    /// End the session
    Quit,
}

/// Maps a key to its command under the default layout, if any.
///
/// # Examples
///
/// ```
/// use delve::{input::command_for_key, Command};
///
/// assert_eq!(command_for_key('g'), Some(Command::PickUp));
/// assert_eq!(command_for_key('?'), None);
/// ```
pub fn command_for_key(key: char) -> Option<Command> {
    let command = match key {
        'h' => Command::Move(Direction::West),
        'j' => Command::Move(Direction::South),
        'k' => Command::Move(Direction::North),
        'l' => Command::Move(Direction::East),
        'y' => Command::Move(Direction::Northwest),
        'u' => Command::Move(Direction::Northeast),
        'b' => Command::Move(Direction::Southwest),
        'n' => Command::Move(Direction::Southeast),
        '.' => Command::Wait,
        'g' => Command::PickUp,
        'i' => Command::UseItem,
        'd' => Command::DropItem,
        '>' => Command::Descend,
        'c' => Command::CharacterSheet,
        'x' => Command::ToggleNoclip,
        'v' => Command::ToggleFovOverride,
        'f' => Command::ToggleFullscreen,
        'q' => Command::Quit,
        _ => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_keys_cover_eight_directions() {
        let keys = ['h', 'j', 'k', 'l', 'y', 'u', 'b', 'n'];
        let mut directions = Vec::new();
        for key in keys {
            match command_for_key(key) {
                Some(Command::Move(d)) => directions.push(d),
                other => panic!("{} mapped to {:?}", key, other),
            }
        }
        directions.sort_by_key(|d| format!("{:?}", d));
        directions.dedup();
        assert_eq!(directions.len(), 8);
    }

    #[test]
    fn test_action_keys() {
        assert_eq!(command_for_key('.'), Some(Command::Wait));
        assert_eq!(command_for_key('g'), Some(Command::PickUp));
        assert_eq!(command_for_key('i'), Some(Command::UseItem));
        assert_eq!(command_for_key('d'), Some(Command::DropItem));
        assert_eq!(command_for_key('>'), Some(Command::Descend));
        assert_eq!(command_for_key('c'), Some(Command::CharacterSheet));
        assert_eq!(command_for_key('q'), Some(Command::Quit));
    }

    #[test]
    fn test_unbound_keys_are_none() {
        for key in ['a', 'z', '1', ' ', '?'] {
            assert_eq!(command_for_key(key), None);
        }
    }
}
