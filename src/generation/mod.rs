//! # Dungeon Generation
//!
//! Seeded, deterministic level generation: room placement geometry,
//! weighted spawn tables and the depth scaling that drives them.
//!
//! All randomness flows through a caller-supplied [`StdRng`] so the same
//! seed always produces the same dungeon, which the integration tests
//! lean on heavily.

pub mod dungeon;

pub use dungeon::DungeonGenerator;

use crate::{config, DelveError, DelveResult};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Tunable knobs for a generation run.
///
/// # Examples
///
/// ```
/// use delve::GenerationConfig;
///
/// let config = GenerationConfig::new(42);
/// assert_eq!(config.seed, 42);
/// assert_eq!(config.map_width, 80);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub seed: u64,
    pub map_width: i32,
    pub map_height: i32,
    /// Number of room placement attempts, not a guaranteed room count
    pub room_attempts: u32,
    pub room_min_size: i32,
    pub room_max_size: i32,
}

impl GenerationConfig {
    /// Standard-size dungeon with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            map_width: config::MAP_WIDTH,
            map_height: config::MAP_HEIGHT,
            room_attempts: config::ROOM_ATTEMPTS,
            room_min_size: config::ROOM_MIN_SIZE,
            room_max_size: config::ROOM_MAX_SIZE,
        }
    }

    /// A small map for fast tests.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            map_width: 40,
            map_height: 24,
            room_attempts: 10,
            room_min_size: 4,
            room_max_size: 7,
        }
    }

    /// The RNG this configuration seeds.
    pub fn create_rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }
}

/// An axis-aligned room rectangle.
///
/// `x2`/`y2` are one past the outer wall: a room of width `w` starting
/// at `x` has `x2 = x + w + 1`, so the carved interior is the exclusive
/// range `x1 + 1 .. x2 - 1` and two adjacent rooms always keep a wall
/// between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x + w + 1,
            y2: y + h + 1,
        }
    }

    /// The room's center, rounded down.
    pub fn center(&self) -> (i32, i32) {
        ((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }

    /// Non-strict overlap test: rooms sharing only an edge still count
    /// as intersecting, which keeps accepted rooms a full wall apart.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x1 <= other.x2 && self.x2 >= other.x1 && self.y1 <= other.y2 && self.y2 >= other.y1
    }
}

/// Picks an index from a weighted table.
///
/// Weights are relative, not normalized. An all-zero table is rejected
/// rather than looping forever.
pub fn random_choice(weights: &[u32], rng: &mut StdRng) -> DelveResult<usize> {
    let total: u32 = weights.iter().sum();
    if total == 0 {
        return Err(DelveError::InvalidChoice(
            "weighted table sums to zero".into(),
        ));
    }

    let mut roll = rng.gen_range(1..=total);
    for (idx, &weight) in weights.iter().enumerate() {
        if roll <= weight {
            return Ok(idx);
        }
        roll -= weight;
    }
    unreachable!("roll exceeded total weight");
}

/// Resolves a depth-keyed table: the value of the highest threshold at
/// or below `depth`, or zero before the first threshold.
pub fn value_for_depth(table: &[(u32, u32)], depth: u32) -> u32 {
    table
        .iter()
        .rev()
        .find(|&&(threshold, _)| depth >= threshold)
        .map_or(0, |&(_, value)| value)
}

/// Monster cap per room by depth.
pub fn max_monsters_per_room(depth: u32) -> u32 {
    value_for_depth(&[(1, 2), (4, 3), (6, 5)], depth)
}

/// Item cap per room by depth.
pub fn max_items_per_room(depth: u32) -> u32 {
    value_for_depth(&[(1, 1), (4, 2)], depth)
}

/// Troll spawn weight by depth; orcs hold a flat weight of 80.
pub fn troll_weight(depth: u32) -> u32 {
    value_for_depth(&[(3, 15), (5, 30), (7, 60)], depth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_exclusive_outer_edge() {
        let r = Rect::new(5, 5, 6, 4);
        assert_eq!(r.x2, 12);
        assert_eq!(r.y2, 10);
        // interior is x1+1..x2-1 exclusive, so width 6 carves 6 cells
        assert_eq!((r.x1 + 1..r.x2 - 1).count(), 6);
    }

    #[test]
    fn test_rect_center() {
        let r = Rect::new(0, 0, 10, 10);
        assert_eq!(r.center(), (5, 5));
    }

    #[test]
    fn test_intersects_counts_shared_edge() {
        let a = Rect::new(0, 0, 5, 5);
        let b = Rect::new(6, 0, 5, 5); // b.x1 == a.x2
        assert!(a.intersects(&b));
        let c = Rect::new(7, 0, 5, 5);
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_random_choice_respects_weights() {
        let mut rng = StdRng::seed_from_u64(7);
        let weights = [0, 100, 0];
        for _ in 0..50 {
            assert_eq!(random_choice(&weights, &mut rng).unwrap(), 1);
        }
    }

    #[test]
    fn test_random_choice_rejects_zero_table() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(random_choice(&[0, 0, 0], &mut rng).is_err());
    }

    #[test]
    fn test_random_choice_is_deterministic() {
        let weights = [30, 50, 20];
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for _ in 0..20 {
            assert_eq!(
                random_choice(&weights, &mut a).unwrap(),
                random_choice(&weights, &mut b).unwrap()
            );
        }
    }

    #[test]
    fn test_depth_tables() {
        assert_eq!(max_monsters_per_room(1), 2);
        assert_eq!(max_monsters_per_room(3), 2);
        assert_eq!(max_monsters_per_room(4), 3);
        assert_eq!(max_monsters_per_room(6), 5);
        assert_eq!(max_monsters_per_room(10), 5);

        assert_eq!(max_items_per_room(1), 1);
        assert_eq!(max_items_per_room(4), 2);

        assert_eq!(troll_weight(1), 0);
        assert_eq!(troll_weight(3), 15);
        assert_eq!(troll_weight(5), 30);
        assert_eq!(troll_weight(7), 60);
    }

    #[test]
    fn test_same_seed_same_rng_stream() {
        let config = GenerationConfig::new(1234);
        let mut a = config.create_rng();
        let mut b = config.create_rng();
        for _ in 0..16 {
            assert_eq!(a.gen::<u64>(), b.gen::<u64>());
        }
    }
}
