use bracket_geometry::prelude::Point;
use specs::prelude::{Entity, WorldExt};

use crate::{
    data::palette,
    ecs::{
        GameWorld,
        components::{Ai, Fighter, Position},
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectSignal {
    Applied,
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetMode {
    Tile,
    Entity,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetRequest {
    pub item: Entity,
    pub mode: TargetMode,
    pub max_range: Option<i32>,
}

impl TargetRequest {
    pub fn accepts(&self, world: &GameWorld, point: Point) -> bool {
        if !world.is_visible(point) {
            return false;
        }
        if let Some(range) = self.max_range {
            match world.distance_to_point(world.player(), point) {
                Some(distance) if distance <= range as f32 => {}
                _ => return false,
            }
        }
        match self.mode {
            TargetMode::Tile => true,
            TargetMode::Entity => world.target_monster_at(point).is_some(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetSignal {
    Pending,
    Confirm,
    Cancel,
}

pub trait Targeter {
    fn sample(&mut self, world: &GameWorld) -> (Point, TargetSignal);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetStep {
    Pending,
    Chosen(Point),
    Aborted,
}

/// Judges one cursor sample. Confirms on tiles the request rejects are
/// treated as still pending.
pub fn step_target(
    world: &GameWorld,
    request: &TargetRequest,
    (point, signal): (Point, TargetSignal),
) -> TargetStep {
    match signal {
        TargetSignal::Cancel => TargetStep::Aborted,
        TargetSignal::Confirm if request.accepts(world, point) => TargetStep::Chosen(point),
        TargetSignal::Confirm | TargetSignal::Pending => TargetStep::Pending,
    }
}

pub fn resolve_target<T: Targeter>(
    world: &GameWorld,
    request: &TargetRequest,
    targeter: &mut T,
) -> Option<Point> {
    loop {
        match step_target(world, request, targeter.sample(world)) {
            TargetStep::Chosen(point) => return Some(point),
            TargetStep::Aborted => return None,
            TargetStep::Pending => {}
        }
    }
}

impl GameWorld {
    pub fn target_monster_at(&self, point: Point) -> Option<Entity> {
        let positions = self.ecs.read_component::<Position>();
        let fighters = self.ecs.read_component::<Fighter>();
        self.objects.iter().copied().find(|entity| {
            *entity != self.player
                && fighters.contains(*entity)
                && positions.get(*entity).is_some_and(|p| p.point == point)
        })
    }

    /// Nearest visible monster strictly closer than `range + 1`. Ties go to
    /// the earliest object in draw order.
    pub fn closest_monster(&self, range: i32) -> Option<Entity> {
        let fighters = self.ecs.read_component::<Fighter>();
        let mut closest = None;
        let mut closest_dist = (range + 1) as f32;
        for entity in self.objects.iter().copied() {
            if entity == self.player || !fighters.contains(entity) {
                continue;
            }
            let Some(point) = self.position(entity) else {
                continue;
            };
            if !self.is_visible(point) {
                continue;
            }
            let Some(dist) = self.distance_between(self.player, entity) else {
                continue;
            };
            if dist < closest_dist {
                closest = Some(entity);
                closest_dist = dist;
            }
        }
        closest
    }

    pub fn cast_heal(&mut self, amount: i32) -> EffectSignal {
        let player = self.player;
        let hp = self.fighter(player).map(|f| f.hp).unwrap_or(0);
        if hp <= 0 {
            self.message("It is too late for healing.", palette::RED);
            return EffectSignal::Cancelled;
        }
        if hp >= self.max_hp(player) {
            self.message("You are already at full health.", palette::RED);
            return EffectSignal::Cancelled;
        }
        self.message("Your wounds start to feel better!", palette::LIGHT_VIOLET);
        self.heal(player, amount);
        EffectSignal::Applied
    }

    pub fn cast_lightning(&mut self, damage: i32, range: i32) -> EffectSignal {
        let Some(monster) = self.closest_monster(range) else {
            self.message("No enemy is close enough to strike.", palette::RED);
            return EffectSignal::Cancelled;
        };
        let name = self.name(monster);
        self.message(
            format!(
                "A lightning bolt strikes the {name} with a loud thunder! The damage is {damage} hit points."
            ),
            palette::LIGHT_BLUE,
        );
        self.take_damage(monster, damage);
        EffectSignal::Applied
    }

    pub fn cast_fireball(&mut self, damage: i32, radius: i32, target: Option<Point>) -> EffectSignal {
        let Some(target) = target else {
            return EffectSignal::Cancelled;
        };
        self.message(
            format!("The fireball explodes, burning everything within {radius} tiles!"),
            palette::ORANGE,
        );
        let victims: Vec<Entity> = {
            let fighters = self.ecs.read_component::<Fighter>();
            self.objects
                .iter()
                .copied()
                .filter(|entity| fighters.contains(*entity))
                .collect()
        };
        for victim in victims {
            let in_blast = self
                .distance_to_point(victim, target)
                .is_some_and(|dist| dist <= radius as f32);
            if !in_blast || self.fighter(victim).is_none() {
                continue;
            }
            let name = self.name(victim);
            self.message(
                format!("The {name} gets burned for {damage} hit points."),
                palette::ORANGE,
            );
            self.take_damage(victim, damage);
        }
        EffectSignal::Applied
    }

    pub fn cast_confuse(&mut self, turns: i32, target: Option<Entity>) -> EffectSignal {
        let Some(monster) = target else {
            return EffectSignal::Cancelled;
        };
        let replaced = {
            let mut brains = self.ecs.write_component::<Ai>();
            match brains.remove(monster) {
                Some(previous) => {
                    let _ = brains.insert(
                        monster,
                        Ai::Confused {
                            previous: Box::new(previous),
                            turns,
                        },
                    );
                    true
                }
                None => false,
            }
        };
        if !replaced {
            return EffectSignal::Cancelled;
        }
        let name = self.name(monster);
        self.message(
            format!("The eyes of the {name} look vacant as it starts to stumble around!"),
            palette::LIGHT_GREEN,
        );
        EffectSignal::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::GameConfig,
        data::monsters::MonsterKind,
        ecs::{GamePhase, build_monster},
    };

    fn world() -> GameWorld {
        GameWorld::new_game(GameConfig::default(), 4242)
    }

    fn empty_level(world: &mut GameWorld) {
        let keep = [world.player(), world.stairs()];
        let doomed: Vec<Entity> = world
            .objects
            .iter()
            .copied()
            .filter(|e| !keep.contains(e))
            .collect();
        for entity in doomed {
            world.objects.retain(|e| *e != entity);
            let _ = world.ecs.delete_entity(entity);
        }
        world.ecs.maintain();
    }

    fn orc_at(world: &mut GameWorld, dx: i32, dy: i32) -> Entity {
        let origin = world.player_point();
        let point = Point::new(origin.x + dx, origin.y + dy);
        let orc = build_monster(&mut world.ecs, &MonsterKind::Orc.template(), point);
        world.objects.push(orc);
        orc
    }

    struct Scripted(Vec<(Point, TargetSignal)>);

    impl Targeter for Scripted {
        fn sample(&mut self, _world: &GameWorld) -> (Point, TargetSignal) {
            if self.0.is_empty() {
                return (Point::new(0, 0), TargetSignal::Cancel);
            }
            self.0.remove(0)
        }
    }

    #[test]
    fn heal_cases() {
        let mut world = world();
        let player = world.player();
        assert_eq!(world.cast_heal(40), EffectSignal::Cancelled);
        assert_eq!(world.fighter(player).unwrap().hp, 100);

        world.take_damage(player, 90);
        assert_eq!(world.cast_heal(40), EffectSignal::Applied);
        assert_eq!(world.fighter(player).unwrap().hp, 50);

        world.heal(player, 40);
        assert_eq!(world.fighter(player).unwrap().hp, 90);
        assert_eq!(world.cast_heal(40), EffectSignal::Applied);
        assert_eq!(world.fighter(player).unwrap().hp, 100);
    }

    #[test]
    fn corpses_cannot_be_healed() {
        let mut world = world();
        let player = world.player();
        world.take_damage(player, 1_000);
        let hp = world.fighter(player).unwrap().hp;
        assert_eq!(world.cast_heal(40), EffectSignal::Cancelled);
        assert_eq!(world.fighter(player).unwrap().hp, hp);
        assert_eq!(world.phase(), GamePhase::Dead);
    }

    #[test]
    fn lightning_without_target_is_cancelled() {
        let mut world = world();
        empty_level(&mut world);
        assert_eq!(world.cast_lightning(40, 5), EffectSignal::Cancelled);
        assert_eq!(
            world.messages().last().unwrap().text,
            "No enemy is close enough to strike."
        );
    }

    #[test]
    fn lightning_ties_go_to_first_in_order() {
        let mut world = world();
        empty_level(&mut world);
        let west = orc_at(&mut world, -1, 0);
        let east = orc_at(&mut world, 1, 0);
        world.recompute_fov();
        assert_eq!(world.closest_monster(5), Some(west));
        assert_eq!(world.cast_lightning(5, 5), EffectSignal::Applied);
        assert_eq!(world.fighter(west).unwrap().hp, 15);
        assert_eq!(world.fighter(east).unwrap().hp, 20);
    }

    #[test]
    fn fireball_burns_player_too() {
        let mut world = world();
        empty_level(&mut world);
        let orc = orc_at(&mut world, 1, 0);
        world.recompute_fov();
        let target = world.player_point();
        assert_eq!(world.cast_fireball(12, 3, Some(target)), EffectSignal::Applied);
        assert_eq!(world.fighter(orc).unwrap().hp, 8);
        assert_eq!(world.fighter(world.player()).unwrap().hp, 88);
        assert_eq!(world.cast_fireball(12, 3, None), EffectSignal::Cancelled);
    }

    #[test]
    fn confuse_wraps_previous_brain() {
        let mut world = world();
        empty_level(&mut world);
        let orc = orc_at(&mut world, 1, 0);
        assert_eq!(world.cast_confuse(10, Some(orc)), EffectSignal::Applied);
        assert_eq!(
            world.ai(orc),
            Some(Ai::Confused {
                previous: Box::new(Ai::Basic),
                turns: 10
            })
        );
        assert_eq!(world.cast_confuse(10, None), EffectSignal::Cancelled);
    }

    #[test]
    fn entity_targeting_skips_empty_and_player_tiles() {
        let mut world = world();
        empty_level(&mut world);
        let orc = orc_at(&mut world, 1, 0);
        world.recompute_fov();
        let here = world.player_point();
        let orc_point = world.position(orc).unwrap();
        let request = TargetRequest {
            item: orc,
            mode: TargetMode::Entity,
            max_range: Some(8),
        };
        assert!(!request.accepts(&world, here));
        assert!(request.accepts(&world, orc_point));

        let mut targeter = Scripted(vec![
            (here, TargetSignal::Confirm),
            (orc_point, TargetSignal::Pending),
            (orc_point, TargetSignal::Confirm),
        ]);
        assert_eq!(resolve_target(&world, &request, &mut targeter), Some(orc_point));

        let mut cancelled = Scripted(vec![(orc_point, TargetSignal::Cancel)]);
        assert_eq!(resolve_target(&world, &request, &mut cancelled), None);
    }

    #[test]
    fn range_limits_targeting() {
        let world = world();
        let here = world.player_point();
        let request = TargetRequest {
            item: world.player(),
            mode: TargetMode::Tile,
            max_range: Some(0),
        };
        assert!(request.accepts(&world, here));
        assert!(!request.accepts(&world, Point::new(here.x + 1, here.y)));
    }
}
