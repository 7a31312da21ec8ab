use bracket_geometry::prelude::Point;
use specs::prelude::{Entity, WorldExt};

use crate::{
    data::palette,
    ecs::{GameWorld, components::Ai},
    random::uniform_int,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AiAction {
    Idle,
    Moved,
    Stalled,
    Attacked,
    Stumbled,
    Recovered,
}

impl GameWorld {
    pub fn take_ai_turn(&mut self, entity: Entity) -> AiAction {
        match self.ai(entity) {
            Some(Ai::Basic) => self.basic_turn(entity),
            Some(Ai::Confused { previous, turns }) => self.confused_turn(entity, *previous, turns),
            None => AiAction::Idle,
        }
    }

    fn basic_turn(&mut self, monster: Entity) -> AiAction {
        let Some(point) = self.position(monster) else {
            return AiAction::Idle;
        };
        if !self.is_visible(point) {
            return AiAction::Idle;
        }
        let player = self.player;
        let Some(distance) = self.distance_between(monster, player) else {
            return AiAction::Idle;
        };
        if distance >= 2.0 {
            let target = self.player_point();
            if self.move_towards(monster, target) {
                AiAction::Moved
            } else {
                AiAction::Stalled
            }
        } else if self.fighter(player).is_some_and(|f| f.hp > 0) {
            self.attack(monster, player);
            AiAction::Attacked
        } else {
            AiAction::Idle
        }
    }

    fn confused_turn(&mut self, monster: Entity, previous: Ai, turns: i32) -> AiAction {
        if turns > 0 {
            let dx = uniform_int(&mut self.rng, -1, 1);
            let dy = uniform_int(&mut self.rng, -1, 1);
            self.move_by(monster, dx, dy);
            let _ = self.ecs.write_component::<Ai>().insert(
                monster,
                Ai::Confused {
                    previous: Box::new(previous),
                    turns: turns - 1,
                },
            );
            AiAction::Stumbled
        } else {
            let _ = self.ecs.write_component::<Ai>().insert(monster, previous);
            let name = self.name(monster);
            self.message(format!("The {name} is no longer confused."), palette::WHITE);
            AiAction::Recovered
        }
    }

    /// One step along the straight line to `target`, rounded to the nearest of
    /// the eight directions. Blocked steps are not retried another way.
    pub fn move_towards(&mut self, entity: Entity, target: Point) -> bool {
        let Some(from) = self.position(entity) else {
            return false;
        };
        let dx = (target.x - from.x) as f32;
        let dy = (target.y - from.y) as f32;
        let distance = (dx * dx + dy * dy).sqrt();
        if distance == 0.0 {
            return false;
        }
        let step_x = (dx / distance).round() as i32;
        let step_y = (dy / distance).round() as i32;
        self.move_by(entity, step_x, step_y)
    }
}
