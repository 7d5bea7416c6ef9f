//! # Game State
//!
//! The session object: current map, message log, player inventory and
//! the turn loop entry points. All mutation flows through
//! [`GameState::handle_command`] and [`GameState::advance_monsters`];
//! the front end only reads.
//!
//! Blocking choices (level-up rewards, inventory menus, fireball
//! targeting) go through the [`ChoiceProvider`] seam so the engine never
//! touches a console directly and tests can script every decision.

use crate::game::{
    combat, Ai, DeathCallback, Entity, EntityId, Fighter, GameMap, Item, MoveOutcome, Position,
    StatBoost, UseResult,
};
use crate::generation::{DungeonGenerator, GenerationConfig};
use crate::input::Command;
use crate::rendering::Color;
use crate::{config, DelveResult};
use log::{debug, info, warn};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One line of the message log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub color: Color,
}

/// Bounded scrollback of game messages, newest last.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message, evicting the oldest once the scrollback limit
    /// is reached.
    pub fn add(&mut self, text: impl Into<String>, color: Color) {
        self.messages.push(Message {
            text: text.into(),
            color,
        });
        if self.messages.len() > config::LOG_CAPACITY {
            self.messages.remove(0);
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent `n` messages, oldest first.
    pub fn tail(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }
}

/// How the player's command resolved, which decides whether monsters act.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    /// Time passes; monsters take their turns
    TookTurn,
    /// Free action or refused action; monsters stay put
    NoTurn,
    /// The session should end
    Exit,
}

/// Synchronous modal decisions the engine needs from the front end.
///
/// Implementations may return `None` for a cancelled menu; the level-up
/// menu is the one place the engine re-asks until it gets an answer.
pub trait ChoiceProvider {
    /// Presents a lettered menu and returns the chosen index.
    fn choose(&mut self, title: &str, options: &[String]) -> Option<usize>;

    /// Asks for a target tile, e.g. for a fireball.
    fn choose_tile(&mut self, prompt: &str) -> Option<(i32, i32)>;

    /// Displays a block of text with no choices (character sheet).
    fn show_text(&mut self, _text: &str) {}
}

/// The complete game session.
///
/// Serializes to a single JSON document; the FOV structure is rebuilt
/// from tile data after deserialization rather than persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub map: GameMap,
    pub log: MessageLog,
    /// Items carried by the player, removed from the map while held
    pub inventory: Vec<Entity>,
    pub config: GenerationConfig,
    pub game_over: bool,
}

impl GameState {
    /// Starts a fresh game at depth 1.
    pub fn new_game(config: GenerationConfig, rng: &mut StdRng) -> DelveResult<Self> {
        let mut map = DungeonGenerator::new().generate(&config, 1, rng)?;

        let (x, y) = map.rooms[0].center();
        let mut player = Entity::new(Position::new(x, y), '@', "player", Color::WHITE, true);
        player.fighter = Some(Fighter::new(
            config::PLAYER_HP,
            config::PLAYER_DEFENSE,
            config::PLAYER_POWER,
            0,
            DeathCallback::Player,
        ));
        let player_id = map.add_entity(player);
        map.player_id = player_id;
        map.refresh_player_fov();

        let mut log = MessageLog::new();
        log.add(
            "Welcome stranger! Prepare to perish in the Tombs of the Ancient Kings.",
            Color::RED,
        );

        info!("new game started with seed {}", config.seed);
        Ok(Self {
            map,
            log,
            inventory: Vec::new(),
            config,
            game_over: false,
        })
    }

    fn player_alive(&self) -> bool {
        !self.game_over && self.map.player().is_alive()
    }

    /// Routes one player command. Turn-consuming commands are refused
    /// once the player is dead; quitting and debug toggles still work.
    pub fn handle_command(
        &mut self,
        command: Command,
        rng: &mut StdRng,
        chooser: &mut dyn ChoiceProvider,
    ) -> DelveResult<PlayerAction> {
        let action = match command {
            Command::Quit => PlayerAction::Exit,
            Command::ToggleFovOverride => {
                self.map.fov_override = !self.map.fov_override;
                debug!("fov override now {}", self.map.fov_override);
                PlayerAction::NoTurn
            }
            Command::ToggleFullscreen => PlayerAction::NoTurn,
            Command::CharacterSheet => {
                chooser.show_text(&self.character_sheet());
                PlayerAction::NoTurn
            }
            _ if !self.player_alive() => PlayerAction::NoTurn,
            Command::Move(direction) => {
                let delta = direction.to_delta();
                self.player_move(delta.x, delta.y)
            }
            Command::Wait => PlayerAction::TookTurn,
            Command::PickUp => self.pick_up(),
            Command::UseItem => {
                if self.inventory.is_empty() {
                    self.log.add("Your inventory is empty.", Color::YELLOW);
                    PlayerAction::NoTurn
                } else {
                    let options = self.inventory_labels();
                    match chooser.choose("Press the key next to an item to use it", &options) {
                        Some(idx) if idx < self.inventory.len() => self.use_item(idx, chooser)?,
                        _ => PlayerAction::NoTurn,
                    }
                }
            }
            Command::DropItem => {
                if self.inventory.is_empty() {
                    self.log.add("Your inventory is empty.", Color::YELLOW);
                    PlayerAction::NoTurn
                } else {
                    let options = self.inventory_labels();
                    match chooser.choose("Press the key next to an item to drop it", &options) {
                        Some(idx) if idx < self.inventory.len() => self.drop_item(idx),
                        _ => PlayerAction::NoTurn,
                    }
                }
            }
            Command::Descend => self.descend(rng)?,
            Command::ToggleNoclip => {
                let player = self.map.player_mut();
                player.blocks = !player.blocks;
                let state = if player.blocks { "off" } else { "on" };
                self.log
                    .add(format!("Noclip is now {}.", state), Color::LIGHT_BLUE);
                PlayerAction::NoTurn
            }
        };

        if action == PlayerAction::TookTurn {
            self.check_level_up(chooser);
        }
        Ok(action)
    }

    /// Attempts a player step, converting bump-into-enemy into melee.
    ///
    /// The field of view is recomputed before any messaging so log
    /// entries reflect what the player sees from the new tile.
    fn player_move(&mut self, dx: i32, dy: i32) -> PlayerAction {
        let player_id = self.map.player_id;
        match self.map.move_or_attack(player_id, dx, dy) {
            MoveOutcome::Attacked(target_id) => {
                combat::attack(&mut self.map, &mut self.log, player_id, target_id);
                PlayerAction::TookTurn
            }
            MoveOutcome::Moved(pos) => {
                self.map.refresh_player_fov();
                let seen: Vec<String> = self
                    .map
                    .entities_at(pos.x, pos.y, false)
                    .into_iter()
                    .filter(|&id| id != player_id)
                    .filter_map(|id| {
                        let e = self.map.entity(id);
                        (e.item.is_some() || e.always_visible).then(|| e.name.clone())
                    })
                    .collect();
                for name in seen {
                    self.log
                        .add(format!("You see a {} here.", name), Color::LIGHT_BLUE);
                }
                PlayerAction::TookTurn
            }
            MoveOutcome::Blocked => PlayerAction::NoTurn,
        }
    }

    fn inventory_labels(&self) -> Vec<String> {
        self.inventory.iter().map(|e| e.name.clone()).collect()
    }

    /// Picks up the first item on the player's tile.
    fn pick_up(&mut self) -> PlayerAction {
        let pos = self.map.player().pos;
        let item_id = self
            .map
            .entities_at(pos.x, pos.y, false)
            .into_iter()
            .find(|&id| self.map.entity(id).item.is_some());

        match item_id {
            None => {
                self.log
                    .add("There is nothing here to pick up.", Color::YELLOW);
                PlayerAction::NoTurn
            }
            Some(_) if self.inventory.len() >= config::INVENTORY_CAPACITY => {
                self.log.add(
                    "Your inventory is full, cannot pick up.",
                    Color::YELLOW,
                );
                PlayerAction::NoTurn
            }
            Some(id) => {
                let item = self.map.remove_entity(id);
                self.log
                    .add(format!("You picked up a {}!", item.name), Color::GREEN);
                self.inventory.push(item);
                PlayerAction::TookTurn
            }
        }
    }

    /// Uses an inventory item. A cancelled or wasted effect keeps the
    /// item and costs no turn.
    fn use_item(&mut self, idx: usize, chooser: &mut dyn ChoiceProvider) -> DelveResult<PlayerAction> {
        let kind = match self.inventory[idx].item {
            Some(kind) => kind,
            None => return Ok(PlayerAction::NoTurn),
        };

        let result = match kind {
            Item::HealthPotion => self.use_health_potion(),
            Item::LightningScroll => self.use_lightning_scroll(),
            Item::ConfusionScroll => self.use_confusion_scroll(),
            Item::FireballScroll => self.use_fireball_scroll(chooser),
        };

        match result {
            UseResult::Used => {
                self.inventory.remove(idx);
                Ok(PlayerAction::TookTurn)
            }
            UseResult::Cancelled => Ok(PlayerAction::NoTurn),
        }
    }

    fn use_health_potion(&mut self) -> UseResult {
        let fighter = self.map.player_mut().fighter.as_mut().unwrap();
        if fighter.hp == fighter.max_hp {
            self.log
                .add("You are already at full health.", Color::YELLOW);
            return UseResult::Cancelled;
        }
        fighter.heal(config::HEAL_AMOUNT);
        self.log
            .add("Your wounds start to feel better!", Color::VIOLET);
        UseResult::Used
    }

    fn use_lightning_scroll(&mut self) -> UseResult {
        let player_id = self.map.player_id;
        let target_id = match self
            .map
            .find_nearest_shootable(player_id, config::LIGHTNING_RANGE)
        {
            Some(id) => id,
            None => {
                self.log
                    .add("No enemy is close enough to strike.", Color::RED);
                return UseResult::Cancelled;
            }
        };

        let name = self.map.entity(target_id).name.clone();
        self.log.add(
            format!(
                "A lightning bolt strikes the {} with a loud thunder! \
                 The damage is {} hit points.",
                name,
                config::LIGHTNING_DAMAGE
            ),
            Color::LIGHT_BLUE,
        );
        combat::deal_damage(
            &mut self.map,
            &mut self.log,
            target_id,
            config::LIGHTNING_DAMAGE,
            Some(player_id),
        );
        UseResult::Used
    }

    fn use_confusion_scroll(&mut self) -> UseResult {
        let player_id = self.map.player_id;
        let target_id = match self
            .map
            .find_nearest_shootable(player_id, config::CONFUSE_RANGE)
        {
            Some(id) => id,
            None => {
                self.log
                    .add("No enemy is close enough to confuse.", Color::RED);
                return UseResult::Cancelled;
            }
        };

        let target = self.map.entity_mut(target_id);
        let previous = target.ai.take().unwrap_or(Ai::Basic);
        target.ai = Some(Ai::Confused {
            previous: Box::new(previous),
            turns_left: config::CONFUSE_TURNS,
        });
        let name = target.name.clone();
        self.log.add(
            format!(
                "The eyes of the {} look vacant, as it starts to stumble around!",
                name
            ),
            Color::LIGHT_GREEN,
        );
        UseResult::Used
    }

    fn use_fireball_scroll(&mut self, chooser: &mut dyn ChoiceProvider) -> UseResult {
        let (tx, ty) = match chooser
            .choose_tile("Choose a tile to throw the fireball at, or cancel")
        {
            Some(tile) => tile,
            None => return UseResult::Cancelled,
        };
        if !self.map.is_visible(tx, ty) {
            self.log
                .add("You cannot target a tile you cannot see.", Color::RED);
            return UseResult::Cancelled;
        }

        self.log.add(
            format!(
                "The fireball explodes, burning everything within {} tiles!",
                config::FIREBALL_RADIUS
            ),
            Color::ORANGE,
        );

        let center = Position::new(tx, ty);
        let player_id = self.map.player_id;
        // the blast does not discriminate: the player burns too
        let victims: Vec<(EntityId, String)> = self
            .map
            .entities
            .iter()
            .filter(|e| e.fighter.is_some() && e.pos.distance(center) <= config::FIREBALL_RADIUS as f64)
            .map(|e| (e.id, e.name.clone()))
            .collect();

        for (victim_id, name) in victims {
            self.log.add(
                format!(
                    "The {} gets burned for {} hit points.",
                    name,
                    config::FIREBALL_DAMAGE
                ),
                Color::ORANGE,
            );
            let source = (victim_id != player_id).then_some(player_id);
            combat::deal_damage(
                &mut self.map,
                &mut self.log,
                victim_id,
                config::FIREBALL_DAMAGE,
                source,
            );
        }
        UseResult::Used
    }

    /// Drops an inventory item on the player's tile.
    fn drop_item(&mut self, idx: usize) -> PlayerAction {
        let mut item = self.inventory.remove(idx);
        item.pos = self.map.player().pos;
        let name = item.name.clone();
        self.map.add_entity(item);
        self.log
            .add(format!("You dropped a {}.", name), Color::YELLOW);
        PlayerAction::TookTurn
    }

    /// Takes the stairs if the player stands on them.
    fn descend(&mut self, rng: &mut StdRng) -> DelveResult<PlayerAction> {
        let pos = self.map.player().pos;
        let on_stairs = self
            .map
            .entities_at(pos.x, pos.y, false)
            .into_iter()
            .any(|id| self.map.entity(id).name == "stairs down");
        if !on_stairs {
            self.log
                .add("There are no stairs here.", Color::YELLOW);
            return Ok(PlayerAction::NoTurn);
        }
        self.next_level(rng)?;
        Ok(PlayerAction::TookTurn)
    }

    /// Descends one level: the player rests, the old map is discarded
    /// and a fresh one is generated at the next depth.
    pub fn next_level(&mut self, rng: &mut StdRng) -> DelveResult<()> {
        let depth = self.map.depth + 1;
        let mut player = self.map.remove_entity(self.map.player_id);

        self.log.add(
            "You take a moment to rest, and recover your strength.",
            Color::VIOLET,
        );
        if let Some(fighter) = player.fighter.as_mut() {
            let bonus = fighter.max_hp / 2;
            fighter.heal(bonus);
        }
        self.log.add(
            "After a rare moment of peace, you descend deeper into \
             the heart of the dungeon...",
            Color::RED,
        );

        let mut map = DungeonGenerator::new().generate(&self.config, depth, rng)?;
        let (x, y) = map.rooms[0].center();
        player.pos = Position::new(x, y);
        let player_id = map.add_entity(player);
        map.player_id = player_id;
        map.refresh_player_fov();
        self.map = map;
        info!("descended to depth {}", depth);
        Ok(())
    }

    /// Resolves any pending level-ups, asking the chooser for a stat
    /// boost per level gained. Overflow experience carries across, so a
    /// single huge kill can cascade several levels.
    pub fn check_level_up(&mut self, chooser: &mut dyn ChoiceProvider) {
        loop {
            let (level, threshold, ready) = {
                let fighter = match self.map.player().fighter.as_ref() {
                    Some(f) => f,
                    None => return,
                };
                let threshold = fighter.xp_to_next_level();
                (fighter.level, threshold, fighter.xp >= threshold)
            };
            if !ready {
                return;
            }

            self.log.add(
                format!(
                    "Your battle skills grow stronger! You reached level {}!",
                    level + 1
                ),
                Color::YELLOW,
            );

            let options: Vec<String> = {
                let fighter = self.map.player().fighter.as_ref().unwrap();
                StatBoost::ALL.iter().map(|b| b.label(fighter)).collect()
            };
            // the reward is mandatory: re-ask until a valid pick
            let choice = loop {
                match chooser.choose("Level up! Choose a stat to raise:", &options) {
                    Some(idx) if idx < StatBoost::ALL.len() => break StatBoost::ALL[idx],
                    _ => continue,
                }
            };

            let fighter = self.map.player_mut().fighter.as_mut().unwrap();
            fighter.xp -= threshold;
            fighter.level += 1;
            choice.apply(fighter);
            fighter.hp = fighter.max_hp;
        }
    }

    /// Runs one AI turn for every monster, then settles the player's
    /// fate if the turn killed them.
    pub fn advance_monsters(&mut self, rng: &mut StdRng) {
        let ids: Vec<EntityId> = self
            .map
            .entities
            .iter()
            .filter(|e| e.ai.is_some())
            .map(|e| e.id)
            .collect();
        for id in ids {
            // a monster killed earlier this sweep drops its AI component
            if self.map.try_entity(id).map_or(false, |e| e.ai.is_some()) {
                self.ai_take_turn(id, rng);
            }
        }

        if !self.game_over && !self.map.player().is_alive() {
            self.game_over = true;
        }
    }

    fn ai_take_turn(&mut self, id: EntityId, rng: &mut StdRng) {
        let ai = match self.map.entity_mut(id).ai.take() {
            Some(ai) => ai,
            None => return,
        };

        let new_ai = match ai {
            Ai::Basic => {
                self.basic_ai_turn(id);
                Ai::Basic
            }
            Ai::Confused {
                previous,
                turns_left,
            } => {
                if turns_left == 0 {
                    let name = self.map.entity(id).name.clone();
                    self.log.add(
                        format!("The {} is no longer confused!", name),
                        Color::RED,
                    );
                    *previous
                } else {
                    let dx = rng.gen_range(-1..=1);
                    let dy = rng.gen_range(-1..=1);
                    self.map.move_entity(id, dx, dy);
                    Ai::Confused {
                        previous,
                        turns_left: turns_left - 1,
                    }
                }
            }
        };

        if let Some(entity) = self.map.try_entity(id) {
            if entity.ai.is_none() {
                self.map.entity_mut(id).ai = Some(new_ai);
            }
        }
    }

    /// Chase-and-bite: a monster inside the player's field of view
    /// closes the distance, then attacks when adjacent.
    fn basic_ai_turn(&mut self, id: EntityId) {
        let monster_pos = self.map.entity(id).pos;
        if !self.map.is_visible(monster_pos.x, monster_pos.y) {
            return;
        }

        let player_id = self.map.player_id;
        let player_pos = self.map.player().pos;
        if self.map.distance_between(id, player_id) >= 2.0 {
            self.map.move_towards(id, player_pos);
        } else if self.map.player().is_alive() {
            combat::attack(&mut self.map, &mut self.log, id, player_id);
        }
    }

    /// Multi-line stat summary for the character screen.
    pub fn character_sheet(&self) -> String {
        let fighter = self.map.player().fighter.as_ref().unwrap();
        format!(
            "Character information\n\n\
             Level: {}\n\
             Experience: {}\n\
             Experience to level up: {}\n\n\
             Maximum HP: {}\n\
             Attack: {}\n\
             Defense: {}",
            fighter.level,
            fighter.xp,
            fighter.xp_to_next_level(),
            fighter.max_hp,
            fighter.power,
            fighter.defense
        )
    }

    /// One-line HUD summary.
    pub fn status_line(&self) -> String {
        let fighter = self.map.player().fighter.as_ref().unwrap();
        format!(
            "HP: {}/{}  Dungeon level: {}",
            fighter.hp.max(0),
            fighter.max_hp,
            self.map.depth
        )
    }

    // ---- persistence --------------------------------------------------------

    /// Serializes the full session to JSON.
    pub fn save_to_json(&self) -> DelveResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restores a session from JSON and rebuilds the visibility
    /// structure, which is never persisted.
    pub fn load_from_json(json: &str) -> DelveResult<Self> {
        let mut state: GameState = serde_json::from_str(json)?;
        state.map.rebuild_fov();
        state.map.refresh_player_fov();
        Ok(state)
    }

    /// Writes the session to a save file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> DelveResult<()> {
        fs::write(path.as_ref(), self.save_to_json()?)?;
        info!("saved game to {}", path.as_ref().display());
        Ok(())
    }

    /// Reads a session back from a save file.
    pub fn load_from_file(path: impl AsRef<Path>) -> DelveResult<Self> {
        let json = fs::read_to_string(path.as_ref()).map_err(|e| {
            warn!("could not read save {}: {}", path.as_ref().display(), e);
            e
        })?;
        Self::load_from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Direction;

    /// Scripted chooser for tests: always picks the first option and a
    /// fixed tile.
    pub struct ScriptedChoice {
        pub pick: usize,
        pub tile: Option<(i32, i32)>,
    }

    impl ChoiceProvider for ScriptedChoice {
        fn choose(&mut self, _title: &str, options: &[String]) -> Option<usize> {
            (self.pick < options.len()).then_some(self.pick)
        }

        fn choose_tile(&mut self, _prompt: &str) -> Option<(i32, i32)> {
            self.tile
        }
    }

    fn new_state(seed: u64) -> (GameState, StdRng) {
        let config = GenerationConfig::new(seed);
        let mut rng = config.create_rng();
        let state = GameState::new_game(config, &mut rng).unwrap();
        (state, rng)
    }

    fn chooser() -> ScriptedChoice {
        ScriptedChoice {
            pick: 0,
            tile: None,
        }
    }

    fn give_item(state: &mut GameState, kind: Item, name: &str) {
        let mut e = Entity::new(Position::new(0, 0), '!', name, Color::VIOLET, false);
        e.item = Some(kind);
        state.inventory.push(e);
    }

    #[test]
    fn test_new_game_places_player_in_first_room() {
        let (state, _) = new_state(42);
        let (x, y) = state.map.rooms[0].center();
        assert_eq!(state.map.player().pos, Position::new(x, y));
        assert!(state.map.is_visible(x, y));
    }

    #[test]
    fn test_wait_takes_a_turn_blocked_move_does_not() {
        let (mut state, mut rng) = new_state(42);
        let mut ch = chooser();
        assert_eq!(
            state
                .handle_command(Command::Wait, &mut rng, &mut ch)
                .unwrap(),
            PlayerAction::TookTurn
        );

        // box the player in and verify a wall bump costs nothing
        let pos = state.map.player().pos;
        for d in [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ] {
            let delta = d.to_delta();
            let t = state.map.tile_mut(pos.x + delta.x, pos.y + delta.y);
            t.walkable = false;
        }
        assert_eq!(
            state
                .handle_command(Command::Move(Direction::North), &mut rng, &mut ch)
                .unwrap(),
            PlayerAction::NoTurn
        );
    }

    #[test]
    fn test_pick_up_and_drop_round_trip() {
        let (mut state, mut rng) = new_state(42);
        let pos = state.map.player().pos;
        let mut potion = Entity::new(pos, '!', "healing potion", Color::VIOLET, false);
        potion.item = Some(Item::HealthPotion);
        state.map.add_entity(potion);

        let mut ch = chooser();
        assert_eq!(
            state
                .handle_command(Command::PickUp, &mut rng, &mut ch)
                .unwrap(),
            PlayerAction::TookTurn
        );
        assert_eq!(state.inventory.len(), 1);

        assert_eq!(
            state
                .handle_command(Command::DropItem, &mut rng, &mut ch)
                .unwrap(),
            PlayerAction::TookTurn
        );
        assert!(state.inventory.is_empty());
        let back = state
            .map
            .entities_at(pos.x, pos.y, false)
            .into_iter()
            .any(|id| state.map.entity(id).name == "healing potion");
        assert!(back);
    }

    #[test]
    fn test_inventory_capacity_enforced() {
        let (mut state, mut rng) = new_state(42);
        for i in 0..config::INVENTORY_CAPACITY {
            give_item(&mut state, Item::HealthPotion, &format!("potion {}", i));
        }
        let pos = state.map.player().pos;
        let mut extra = Entity::new(pos, '!', "one too many", Color::VIOLET, false);
        extra.item = Some(Item::HealthPotion);
        state.map.add_entity(extra);

        let mut ch = chooser();
        assert_eq!(
            state
                .handle_command(Command::PickUp, &mut rng, &mut ch)
                .unwrap(),
            PlayerAction::NoTurn
        );
        assert_eq!(state.inventory.len(), config::INVENTORY_CAPACITY);
    }

    #[test]
    fn test_potion_at_full_health_is_cancelled() {
        let (mut state, mut rng) = new_state(42);
        give_item(&mut state, Item::HealthPotion, "healing potion");

        let mut ch = chooser();
        let action = state
            .handle_command(Command::UseItem, &mut rng, &mut ch)
            .unwrap();
        // full health: item kept, no time passes
        assert_eq!(action, PlayerAction::NoTurn);
        assert_eq!(state.inventory.len(), 1);

        state.map.player_mut().fighter.as_mut().unwrap().hp = 1;
        let action = state
            .handle_command(Command::UseItem, &mut rng, &mut ch)
            .unwrap();
        assert_eq!(action, PlayerAction::TookTurn);
        assert!(state.inventory.is_empty());
        let fighter = state.map.player().fighter.as_ref().unwrap();
        assert_eq!(fighter.hp, fighter.max_hp.min(1 + config::HEAL_AMOUNT));
    }

    #[test]
    fn test_lightning_with_no_target_is_cancelled() {
        let (mut state, mut rng) = new_state(42);
        // first room is empty, so nothing is in range
        give_item(&mut state, Item::LightningScroll, "scroll of lightning bolt");
        let mut ch = chooser();
        let action = state
            .handle_command(Command::UseItem, &mut rng, &mut ch)
            .unwrap();
        assert_eq!(action, PlayerAction::NoTurn);
        assert_eq!(state.inventory.len(), 1);
    }

    #[test]
    fn test_confusion_scroll_swaps_and_restores_ai() {
        let (mut state, mut rng) = new_state(42);
        let pos = state.map.player().pos;
        let mut orc = Entity::new(
            Position::new(pos.x + 1, pos.y),
            'o',
            "orc",
            Color::DESATURATED_GREEN,
            true,
        );
        orc.fighter = Some(Fighter::new(1000, 100, 0, 35, DeathCallback::Monster));
        orc.ai = Some(Ai::Basic);
        let orc_id = state.map.add_entity(orc);
        state.map.refresh_player_fov();

        give_item(&mut state, Item::ConfusionScroll, "scroll of confusion");
        let mut ch = chooser();
        state
            .handle_command(Command::UseItem, &mut rng, &mut ch)
            .unwrap();
        assert!(matches!(
            state.map.entity(orc_id).ai,
            Some(Ai::Confused { .. })
        ));

        // stumble through every confused turn plus the recovery turn
        for _ in 0..=config::CONFUSE_TURNS {
            state.advance_monsters(&mut rng);
        }
        assert!(matches!(state.map.entity(orc_id).ai, Some(Ai::Basic)));
        assert!(state
            .log
            .messages()
            .iter()
            .any(|m| m.text.contains("no longer confused")));
    }

    #[test]
    fn test_level_up_cascades_and_carries_overflow() {
        let (mut state, mut rng) = new_state(42);
        let first = config::LEVEL_UP_BASE + config::LEVEL_UP_FACTOR;
        let second = config::LEVEL_UP_BASE + 2 * config::LEVEL_UP_FACTOR;
        {
            let fighter = state.map.player_mut().fighter.as_mut().unwrap();
            fighter.xp = first + second + 10;
        }
        let mut ch = chooser(); // always constitution
        let before_max_hp = state.map.player().fighter.as_ref().unwrap().max_hp;
        state.check_level_up(&mut ch);
        let _ = &mut rng;

        let fighter = state.map.player().fighter.as_ref().unwrap();
        assert_eq!(fighter.level, 3);
        assert_eq!(fighter.xp, 10);
        assert_eq!(fighter.max_hp, before_max_hp + 40);
        assert_eq!(fighter.hp, fighter.max_hp);
    }

    #[test]
    fn test_descend_requires_stairs() {
        let (mut state, mut rng) = new_state(42);
        let mut ch = chooser();
        assert_eq!(
            state
                .handle_command(Command::Descend, &mut rng, &mut ch)
                .unwrap(),
            PlayerAction::NoTurn
        );
        assert_eq!(state.map.depth, 1);
    }

    #[test]
    fn test_next_level_rests_and_deepens() {
        let (mut state, mut rng) = new_state(42);
        {
            let fighter = state.map.player_mut().fighter.as_mut().unwrap();
            fighter.hp = 2;
        }
        state.next_level(&mut rng).unwrap();
        assert_eq!(state.map.depth, 2);
        let fighter = state.map.player().fighter.as_ref().unwrap();
        assert_eq!(fighter.hp, 2 + fighter.max_hp / 2);
        // the player lives in the new map under a fresh id
        assert_eq!(state.map.player().name, "player");
    }

    #[test]
    fn test_dead_player_cannot_act_but_can_quit() {
        let (mut state, mut rng) = new_state(42);
        state.map.player_mut().fighter.as_mut().unwrap().hp = 0;
        state.game_over = true;
        let mut ch = chooser();
        assert_eq!(
            state
                .handle_command(Command::Move(Direction::North), &mut rng, &mut ch)
                .unwrap(),
            PlayerAction::NoTurn
        );
        assert_eq!(
            state
                .handle_command(Command::Quit, &mut rng, &mut ch)
                .unwrap(),
            PlayerAction::Exit
        );
    }

    #[test]
    fn test_noclip_passes_walls() {
        let (mut state, mut rng) = new_state(42);
        let mut ch = chooser();
        let pos = state.map.player().pos;
        *state.map.tile_mut(pos.x + 1, pos.y) = crate::game::Tile::wall();
        state.map.rebuild_fov();
        state.map.refresh_player_fov();

        assert_eq!(
            state
                .handle_command(Command::Move(Direction::East), &mut rng, &mut ch)
                .unwrap(),
            PlayerAction::NoTurn
        );

        state
            .handle_command(Command::ToggleNoclip, &mut rng, &mut ch)
            .unwrap();
        assert_eq!(
            state
                .handle_command(Command::Move(Direction::East), &mut rng, &mut ch)
                .unwrap(),
            PlayerAction::TookTurn
        );
        assert_eq!(state.map.player().pos, Position::new(pos.x + 1, pos.y));
    }

    #[test]
    fn test_message_log_is_bounded() {
        let mut log = MessageLog::new();
        for i in 0..(config::LOG_CAPACITY + 50) {
            log.add(format!("message {}", i), Color::WHITE);
        }
        assert_eq!(log.messages().len(), config::LOG_CAPACITY);
        assert_eq!(log.messages()[0].text, "message 50");
        assert_eq!(log.tail(2).len(), 2);
    }
}
