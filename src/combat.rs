use bracket_terminal::prelude::RGB;
use specs::prelude::{Entity, WorldExt};

use crate::{
    data::palette,
    ecs::{
        GameWorld, GamePhase, capitalize,
        components::{Ai, BlocksTile, DeathPolicy, Fighter, Name, Renderable},
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttackOutcome {
    Hit { damage: i32, killed: bool },
    NoEffect,
}

impl GameWorld {
    pub fn attack(&mut self, attacker: Entity, target: Entity) -> AttackOutcome {
        let damage = self.power(attacker) - self.defense(target);
        let attacker_name = capitalize(&self.name(attacker));
        let target_name = self.name(target);
        if damage > 0 {
            self.message(
                format!("{attacker_name} attacks {target_name} for {damage} hit points."),
                palette::WHITE,
            );
            let killed = self.take_damage(target, damage);
            AttackOutcome::Hit { damage, killed }
        } else {
            self.message(
                format!("{attacker_name} attacks {target_name} but it has no effect!"),
                palette::WHITE,
            );
            AttackOutcome::NoEffect
        }
    }

    /// Applies damage and runs the death transformation when hp drops to zero.
    /// Returns true only on the call that caused the death; fighters already
    /// at or below zero ignore further damage.
    pub fn take_damage(&mut self, target: Entity, damage: i32) -> bool {
        let died = {
            let mut fighters = self.ecs.write_component::<Fighter>();
            let Some(fighter) = fighters.get_mut(target) else {
                return false;
            };
            if fighter.hp <= 0 {
                return false;
            }
            if damage > 0 {
                fighter.hp -= damage;
            }
            fighter.hp <= 0
        };
        if died {
            self.resolve_death(target);
        }
        died
    }

    fn resolve_death(&mut self, target: Entity) {
        let Some(fighter) = self.fighter(target) else {
            return;
        };
        if target != self.player {
            if let Some(player) = self.ecs.write_component::<Fighter>().get_mut(self.player) {
                player.xp += fighter.xp;
            }
        }
        log::debug!("{} died ({:?})", self.name(target), fighter.death);
        match fighter.death {
            DeathPolicy::None => {}
            DeathPolicy::PlayerDeath => self.player_death(target),
            DeathPolicy::MonsterDeath => self.monster_death(target, fighter.xp),
        }
    }

    fn player_death(&mut self, player: Entity) {
        self.message("You die...", palette::RED);
        self.phase = GamePhase::Dead;
        self.mark_remains(player);
    }

    fn monster_death(&mut self, monster: Entity, xp: i32) {
        let name = self.name(monster);
        self.message(
            format!("The {name} dies! You gain {xp} experience points."),
            palette::ORANGE,
        );
        self.mark_remains(monster);
        self.ecs.write_component::<BlocksTile>().remove(monster);
        self.ecs.write_component::<Fighter>().remove(monster);
        self.ecs.write_component::<Ai>().remove(monster);
        let _ = self.ecs.write_component::<Name>().insert(
            monster,
            Name {
                name: format!("remains of {name}"),
            },
        );
        self.send_to_back(monster);
    }

    fn mark_remains(&mut self, entity: Entity) {
        let mut renderables = self.ecs.write_component::<Renderable>();
        if let Some(render) = renderables.get_mut(entity) {
            render.glyph = '%';
            render.color = RGB::named(palette::DARK_RED);
        }
    }

    pub fn heal(&mut self, entity: Entity, amount: i32) {
        let max_hp = self.max_hp(entity);
        if let Some(fighter) = self.ecs.write_component::<Fighter>().get_mut(entity) {
            fighter.hp = (fighter.hp + amount).min(max_hp);
        }
    }
}
