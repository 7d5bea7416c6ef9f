//! Melee resolution and death handling.
//!
//! Damage is flat subtraction: attacker power minus defender defense,
//! floored at zero with a distinct "ineffective" message. Death fires
//! exactly once, at the turn hit points first reach zero or below, and
//! credits the victim's experience reward to whoever landed the blow.

use crate::game::{DeathCallback, EntityId, GameMap, MessageLog};
use crate::rendering::Color;
use log::debug;

/// Resolves a melee attack from one combat-capable entity onto another.
///
/// Both entities must carry a [`Fighter`](crate::game::Fighter); the
/// state layer only routes attacks between such entities.
pub fn attack(map: &mut GameMap, log: &mut MessageLog, attacker_id: EntityId, target_id: EntityId) {
    let attacker = map.entity(attacker_id);
    let target = map.entity(target_id);
    let damage = attacker.fighter.as_ref().map_or(0, |f| f.power)
        - target.fighter.as_ref().map_or(0, |f| f.defense);

    if damage > 0 {
        log.add(
            format!(
                "{} attacks {} for {} hit points.",
                attacker.name, target.name, damage
            ),
            Color::WHITE,
        );
        deal_damage(map, log, target_id, damage, Some(attacker_id));
    } else {
        log.add(
            format!(
                "{} attacks {} but it has no effect!",
                attacker.name, target.name
            ),
            Color::WHITE,
        );
    }
}

/// Applies damage to an entity and handles the death transition.
///
/// `source` is credited with the victim's experience reward; scrolls
/// pass the caster here so kills by item still level the player. An
/// already-dead target (hp <= 0) takes no further damage and cannot die
/// twice.
pub fn deal_damage(
    map: &mut GameMap,
    log: &mut MessageLog,
    target_id: EntityId,
    damage: i32,
    source: Option<EntityId>,
) {
    let was_alive;
    let now_dead;
    {
        let target = map.entity_mut(target_id);
        let fighter = match target.fighter.as_mut() {
            Some(f) => f,
            None => return,
        };
        was_alive = fighter.hp > 0;
        fighter.take_damage(damage);
        now_dead = fighter.hp <= 0;
    }

    if was_alive && now_dead {
        if let Some(source_id) = source {
            award_xp(map, source_id, target_id);
        }
        kill(map, log, target_id);
    }
}

fn award_xp(map: &mut GameMap, source_id: EntityId, target_id: EntityId) {
    let reward = map
        .entity(target_id)
        .fighter
        .as_ref()
        .map_or(0, |f| f.xp_reward);
    if reward == 0 {
        return;
    }
    if let Some(fighter) = map.entity_mut(source_id).fighter.as_mut() {
        fighter.xp += reward;
        debug!(
            "{:?} gains {} xp ({} total)",
            source_id, reward, fighter.xp
        );
    }
}

/// Runs an entity's death transition.
///
/// A monster collapses into remains: a non-blocking '%' that keeps the
/// tile passable, loses its combat and AI components and sinks to the
/// bottom of the draw order. The player keeps the corpse glyph too, but
/// the game-over decision belongs to the state layer.
pub fn kill(map: &mut GameMap, log: &mut MessageLog, target_id: EntityId) {
    let on_death = map
        .entity(target_id)
        .fighter
        .as_ref()
        .map(|f| f.on_death)
        .unwrap_or(DeathCallback::Monster);

    match on_death {
        DeathCallback::Player => {
            log.add("You died!", Color::RED);
            let player = map.entity_mut(target_id);
            player.glyph = '%';
            player.color = Color::DARK_RED;
        }
        DeathCallback::Monster => {
            let target = map.entity_mut(target_id);
            let xp = target.fighter.as_ref().map_or(0, |f| f.xp_reward);
            log.add(
                format!("{} is dead! You gain {} experience points.", target.name, xp),
                Color::ORANGE,
            );
            target.glyph = '%';
            target.color = Color::DARK_RED;
            target.blocks = false;
            target.fighter = None;
            target.ai = None;
            target.name = format!("remains of {}", target.name);
            map.entity_to_bottom(target_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{DeathCallback, Entity, Fighter, Position, Tile};
    use crate::rendering::Color;

    fn arena() -> (GameMap, MessageLog) {
        let mut map = GameMap::new(10, 10, 1);
        for tile in map.tiles.iter_mut() {
            *tile = Tile::floor();
        }
        (map, MessageLog::new())
    }

    fn fighter_entity(
        map: &mut GameMap,
        x: i32,
        y: i32,
        name: &str,
        stats: Fighter,
    ) -> EntityId {
        let mut e = Entity::new(Position::new(x, y), 'm', name, Color::WHITE, true);
        e.fighter = Some(stats);
        map.add_entity(e)
    }

    #[test]
    fn test_damage_is_power_minus_defense() {
        let (mut map, mut log) = arena();
        let a = fighter_entity(
            &mut map,
            1,
            1,
            "orc",
            Fighter::new(20, 0, 4, 35, DeathCallback::Monster),
        );
        let b = fighter_entity(
            &mut map,
            2,
            1,
            "player",
            Fighter::new(30, 2, 5, 0, DeathCallback::Player),
        );
        attack(&mut map, &mut log, a, b);
        assert_eq!(map.entity(b).fighter.as_ref().unwrap().hp, 28);
    }

    #[test]
    fn test_ineffective_attack_deals_nothing() {
        let (mut map, mut log) = arena();
        let a = fighter_entity(
            &mut map,
            1,
            1,
            "weakling",
            Fighter::new(10, 0, 2, 0, DeathCallback::Monster),
        );
        let b = fighter_entity(
            &mut map,
            2,
            1,
            "tank",
            Fighter::new(10, 5, 1, 0, DeathCallback::Monster),
        );
        attack(&mut map, &mut log, a, b);
        assert_eq!(map.entity(b).fighter.as_ref().unwrap().hp, 10);
        assert!(log.messages().last().unwrap().text.contains("no effect"));
    }

    #[test]
    fn test_kill_transforms_monster_into_remains() {
        let (mut map, mut log) = arena();
        let player = fighter_entity(
            &mut map,
            1,
            1,
            "player",
            Fighter::new(30, 2, 50, 0, DeathCallback::Player),
        );
        let orc = fighter_entity(
            &mut map,
            2,
            1,
            "orc",
            Fighter::new(20, 0, 4, 35, DeathCallback::Monster),
        );
        attack(&mut map, &mut log, player, orc);

        let remains = map.entity(orc);
        assert_eq!(remains.glyph, '%');
        assert!(!remains.blocks);
        assert!(remains.fighter.is_none());
        assert!(remains.ai.is_none());
        assert_eq!(remains.name, "remains of orc");
        // remains sink to the bottom of the draw order
        assert_eq!(map.entities[0].id, orc);
        // the tile is passable again
        assert!(map.move_entity(player, 1, 0));
    }

    #[test]
    fn test_kill_credits_xp_to_attacker() {
        let (mut map, mut log) = arena();
        let player = fighter_entity(
            &mut map,
            1,
            1,
            "player",
            Fighter::new(30, 2, 50, 0, DeathCallback::Player),
        );
        let orc = fighter_entity(
            &mut map,
            2,
            1,
            "orc",
            Fighter::new(20, 0, 4, 35, DeathCallback::Monster),
        );
        attack(&mut map, &mut log, player, orc);
        assert_eq!(map.entity(player).fighter.as_ref().unwrap().xp, 35);
    }

    #[test]
    fn test_death_fires_once() {
        let (mut map, mut log) = arena();
        let caster = fighter_entity(
            &mut map,
            1,
            1,
            "caster",
            Fighter::new(30, 0, 0, 0, DeathCallback::Player),
        );
        let orc = fighter_entity(
            &mut map,
            5,
            5,
            "orc",
            Fighter::new(20, 0, 4, 35, DeathCallback::Monster),
        );
        deal_damage(&mut map, &mut log, orc, 40, Some(caster));
        assert_eq!(map.entity(caster).fighter.as_ref().unwrap().xp, 35);

        // hitting the remains again is a no-op: no fighter, no second death
        deal_damage(&mut map, &mut log, orc, 40, Some(caster));
        assert_eq!(map.entity(caster).fighter.as_ref().unwrap().xp, 35);
        assert_eq!(map.entity(orc).name, "remains of orc");
    }

    #[test]
    fn test_player_death_keeps_entity() {
        let (mut map, mut log) = arena();
        let player = fighter_entity(
            &mut map,
            1,
            1,
            "player",
            Fighter::new(5, 0, 5, 0, DeathCallback::Player),
        );
        map.player_id = player;
        deal_damage(&mut map, &mut log, player, 10, None);

        let corpse = map.entity(player);
        assert_eq!(corpse.glyph, '%');
        // the player entity stays addressable after death
        assert!(corpse.fighter.is_some());
        assert!(log.messages().iter().any(|m| m.text == "You died!"));
    }
}
