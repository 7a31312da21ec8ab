use bracket_geometry::prelude::Point;
use specs::prelude::{Entity, WorldExt};

use crate::{
    data::palette,
    ecs::{GamePhase, GameWorld, components::{Ai, Fighter}},
    effects::TargetRequest,
    inventory::{ItemUse, PickupOutcome},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerIntent {
    MoveOrAttack { dx: i32, dy: i32 },
    PickUp,
    UseItem { index: usize },
    DropItem { index: usize },
    ShowCharacterSheet,
    UseStairs,
    Wait,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    TookTurn,
    NoTurn,
    NeedsTarget(TargetRequest),
    Descended,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatChoice {
    Constitution,
    Strength,
    Agility,
}

impl StatChoice {
    pub const ALL: [StatChoice; 3] = [StatChoice::Constitution, StatChoice::Strength, StatChoice::Agility];
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterSheet {
    pub level: i32,
    pub xp: i32,
    pub next_level_xp: i32,
    pub max_hp: i32,
    pub power: i32,
    pub defense: i32,
}

impl CharacterSheet {
    pub fn lines(&self) -> Vec<String> {
        vec![
            "Character Information".to_string(),
            String::new(),
            format!("Level: {}", self.level),
            format!("Experience: {} / {}", self.xp, self.next_level_xp),
            format!("Maximum HP: {}", self.max_hp),
            format!("Attack: {}", self.power),
            format!("Defense: {}", self.defense),
        ]
    }
}

impl GameWorld {
    /// Resolves one intent. Only turn-consuming intents wake the monsters.
    /// A dead player keeps the inventory and the way out.
    pub fn apply_intent(&mut self, intent: PlayerIntent) -> TurnOutcome {
        if intent == PlayerIntent::Quit {
            return TurnOutcome::Quit;
        }
        let inventory_intent = matches!(
            intent,
            PlayerIntent::UseItem { .. } | PlayerIntent::DropItem { .. }
        );
        if self.phase == GamePhase::Dead && !inventory_intent {
            return TurnOutcome::NoTurn;
        }

        let outcome = match intent {
            PlayerIntent::MoveOrAttack { dx, dy } => {
                self.player_move_or_attack(dx, dy);
                TurnOutcome::TookTurn
            }
            PlayerIntent::Wait => TurnOutcome::TookTurn,
            PlayerIntent::PickUp => match self.pick_up() {
                PickupOutcome::PickedUp(_) => TurnOutcome::TookTurn,
                PickupOutcome::InventoryFull | PickupOutcome::NothingHere => TurnOutcome::NoTurn,
            },
            PlayerIntent::UseItem { index } => match self.use_item(index) {
                ItemUse::NeedsTarget(request) => TurnOutcome::NeedsTarget(request),
                _ => TurnOutcome::NoTurn,
            },
            PlayerIntent::DropItem { index } => {
                self.drop_item(index);
                TurnOutcome::NoTurn
            }
            PlayerIntent::UseStairs => {
                if self.on_stairs() {
                    self.next_level();
                    TurnOutcome::Descended
                } else {
                    TurnOutcome::NoTurn
                }
            }
            PlayerIntent::ShowCharacterSheet | PlayerIntent::Quit => TurnOutcome::NoTurn,
        };

        if outcome == TurnOutcome::TookTurn {
            self.run_monsters();
        }
        outcome
    }

    pub fn player_move_or_attack(&mut self, dx: i32, dy: i32) {
        let from = self.player_point();
        let dest = Point::new(from.x + dx, from.y + dy);
        let player = self.player;
        let target = self.fighter_at(dest).filter(|e| *e != player);
        match target {
            Some(target) => {
                self.attack(player, target);
            }
            None => {
                self.move_by(player, dx, dy);
                self.recompute_fov();
            }
        }
    }

    pub fn run_monsters(&mut self) {
        let movers: Vec<Entity> = {
            let brains = self.ecs.read_component::<Ai>();
            self.objects
                .iter()
                .copied()
                .filter(|entity| brains.contains(*entity))
                .collect()
        };
        for entity in movers {
            let action = self.take_ai_turn(entity);
            log::debug!("{} -> {action:?}", self.name(entity));
        }
    }

    pub fn on_stairs(&self) -> bool {
        self.position(self.stairs) == Some(self.player_point())
    }

    pub fn level_up_threshold(&self) -> i32 {
        self.config.level_up_threshold(self.player_level)
    }

    pub fn level_up_pending(&self) -> bool {
        self.phase == GamePhase::Playing
            && self
                .fighter(self.player)
                .is_some_and(|f| f.xp >= self.level_up_threshold())
    }

    pub fn level_up(&mut self, choice: StatChoice) -> bool {
        if !self.level_up_pending() {
            return false;
        }
        let threshold = self.level_up_threshold();
        {
            let mut fighters = self.ecs.write_component::<Fighter>();
            let Some(fighter) = fighters.get_mut(self.player) else {
                return false;
            };
            fighter.xp -= threshold;
            match choice {
                StatChoice::Constitution => fighter.base_max_hp += 20,
                StatChoice::Strength => fighter.base_power += 1,
                StatChoice::Agility => fighter.base_defense += 1,
            }
        }
        self.player_level += 1;
        let level = self.player_level;
        self.message(
            format!("Your battle skills grow stronger! You reached level {level}!"),
            palette::YELLOW,
        );
        let max_hp = self.max_hp(self.player);
        if let Some(fighter) = self.ecs.write_component::<Fighter>().get_mut(self.player) {
            fighter.hp = max_hp;
        }
        log::info!("player reached level {level} ({choice:?})");
        true
    }

    pub fn level_up_options(&self) -> Vec<String> {
        let player = self.player;
        vec![
            format!("Constitution (+20 HP, from {})", self.max_hp(player)),
            format!("Strength (+1 attack, from {})", self.power(player)),
            format!("Agility (+1 defense, from {})", self.defense(player)),
        ]
    }

    pub fn character_sheet(&self) -> CharacterSheet {
        let player = self.player;
        CharacterSheet {
            level: self.player_level,
            xp: self.fighter(player).map(|f| f.xp).unwrap_or(0),
            next_level_xp: self.level_up_threshold(),
            max_hp: self.max_hp(player),
            power: self.power(player),
            defense: self.defense(player),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::GameConfig,
        data::monsters::MonsterKind,
        ecs::build_monster,
        map::Map,
    };

    fn world() -> GameWorld {
        GameWorld::new_game(GameConfig::default(), 31337)
    }

    fn open_room() -> GameWorld {
        let mut world = world();
        let keep = world.player();
        for entity in std::mem::take(&mut world.objects) {
            if entity != keep {
                let _ = world.ecs.delete_entity(entity);
            }
        }
        world.objects.push(keep);
        world.ecs.maintain();

        let mut map = Map::solid(20, 10);
        for y in 1..9 {
            for x in 1..19 {
                map.carve(Point::new(x, y));
            }
        }
        world.ecs.insert(map);
        world.set_position(keep, Point::new(3, 5));
        world.recompute_fov();
        world
    }

    fn spawn_orc(world: &mut GameWorld, x: i32, y: i32) -> Entity {
        let orc = build_monster(&mut world.ecs, &MonsterKind::Orc.template(), Point::new(x, y));
        world.objects.push(orc);
        orc
    }

    fn hp(world: &GameWorld, entity: Entity) -> i32 {
        world.fighter(entity).map_or(0, |f| f.hp)
    }

    fn grant_xp(world: &mut GameWorld, xp: i32) {
        let player = world.player();
        if let Some(f) = world.ecs.write_component::<Fighter>().get_mut(player) {
            f.xp += xp;
        }
    }

    #[test]
    fn quit_always_quits() {
        let mut world = world();
        assert_eq!(world.apply_intent(PlayerIntent::Quit), TurnOutcome::Quit);
        world.take_damage(world.player(), 1_000);
        assert_eq!(world.apply_intent(PlayerIntent::Quit), TurnOutcome::Quit);
    }

    #[test]
    fn waiting_lets_an_adjacent_orc_hit() {
        let mut world = open_room();
        let player = world.player();
        spawn_orc(&mut world, 4, 5);
        assert_eq!(world.apply_intent(PlayerIntent::Wait), TurnOutcome::TookTurn);
        assert_eq!(hp(&world, player), 97);
    }

    #[test]
    fn bumping_a_monster_attacks_instead_of_moving() {
        let mut world = open_room();
        let orc = spawn_orc(&mut world, 4, 5);
        let outcome = world.apply_intent(PlayerIntent::MoveOrAttack { dx: 1, dy: 0 });
        assert_eq!(outcome, TurnOutcome::TookTurn);
        assert_eq!(world.player_point(), Point::new(3, 5));
        assert_eq!(world.position(orc), Some(Point::new(4, 5)));
        assert_eq!(hp(&world, orc), 16);
        assert_eq!(hp(&world, world.player()), 97);
    }

    #[test]
    fn inventory_actions_do_not_wake_neighbours() {
        let mut world = open_room();
        let player = world.player();
        spawn_orc(&mut world, 4, 5);
        assert_eq!(world.apply_intent(PlayerIntent::UseItem { index: 0 }), TurnOutcome::NoTurn);
        assert_eq!(world.apply_intent(PlayerIntent::DropItem { index: 0 }), TurnOutcome::NoTurn);
        assert_eq!(world.apply_intent(PlayerIntent::ShowCharacterSheet), TurnOutcome::NoTurn);
        assert_eq!(hp(&world, player), 100);
    }

    #[test]
    fn monster_pass_continues_after_the_player_falls() {
        let mut world = open_room();
        let player = world.player();
        if let Some(f) = world.ecs.write_component::<Fighter>().get_mut(player) {
            f.hp = 1;
        }
        spawn_orc(&mut world, 4, 5);
        let walker = spawn_orc(&mut world, 10, 5);
        world.apply_intent(PlayerIntent::Wait);
        assert_eq!(world.phase(), GamePhase::Dead);
        assert_eq!(world.position(walker), Some(Point::new(9, 5)));
    }

    #[test]
    fn dead_player_can_still_drop() {
        let mut world = open_room();
        let player = world.player();
        world.take_damage(player, 1_000);
        let dagger = world.inventory()[0];
        assert_eq!(world.apply_intent(PlayerIntent::DropItem { index: 0 }), TurnOutcome::NoTurn);
        assert!(world.inventory().is_empty());
        assert_eq!(world.position(dagger), Some(Point::new(3, 5)));
    }

    #[test]
    fn dead_player_cannot_act() {
        let mut world = world();
        world.take_damage(world.player(), 1_000);
        let here = world.player_point();
        assert_eq!(world.apply_intent(PlayerIntent::MoveOrAttack { dx: 1, dy: 0 }), TurnOutcome::NoTurn);
        assert_eq!(world.player_point(), here);
    }

    #[test]
    fn stairs_elsewhere_do_nothing() {
        let mut world = world();
        assert!(!world.on_stairs());
        assert_eq!(world.apply_intent(PlayerIntent::UseStairs), TurnOutcome::NoTurn);
        assert_eq!(world.depth(), 1);
    }

    #[test]
    fn stairs_descend_and_keep_inventory() {
        let mut world = world();
        let stairs = world.position(world.stairs()).unwrap();
        let player = world.player();
        world.set_position(player, stairs);
        assert_eq!(world.apply_intent(PlayerIntent::UseStairs), TurnOutcome::Descended);
        assert_eq!(world.depth(), 2);
        assert_eq!(world.inventory().len(), 1);
        assert!(world.objects().contains(&player));
        assert!(world.is_visible(world.player_point()));
    }

    #[test]
    fn character_sheet_reflects_equipment() {
        let world = world();
        let sheet = world.character_sheet();
        assert_eq!(sheet.level, 1);
        assert_eq!(sheet.next_level_xp, 350);
        assert_eq!(sheet.power, 4);
        assert_eq!(sheet.lines()[3], "Experience: 0 / 350");
    }

    #[test]
    fn level_up_spends_threshold() {
        let mut world = world();
        let player = world.player();
        assert!(!world.level_up(StatChoice::Strength));
        grant_xp(&mut world, 400);
        world.take_damage(player, 30);
        assert!(world.level_up_pending());
        assert!(world.level_up(StatChoice::Constitution));
        assert_eq!(world.player_level(), 2);
        let fighter = world.fighter(player).unwrap();
        assert_eq!(fighter.xp, 50);
        assert_eq!(fighter.base_max_hp, 120);
        assert_eq!(fighter.hp, 120);
        assert!(!world.level_up_pending());
    }

    #[test]
    fn level_up_stats() {
        let mut world = world();
        let player = world.player();
        grant_xp(&mut world, 350);
        world.level_up(StatChoice::Strength);
        assert_eq!(world.power(player), 5);
        grant_xp(&mut world, 500);
        world.level_up(StatChoice::Agility);
        assert_eq!(world.defense(player), 2);
        assert_eq!(world.player_level(), 3);
    }
}
