use bracket_geometry::prelude::{Point, Rect};
use bracket_random::prelude::RandomNumberGenerator;
use specs::prelude::{Entity, World as SpecsWorld};

use crate::{
    config::GameConfig,
    data::{items::ItemKind, monsters::MonsterKind},
    ecs::{build_item, build_monster, is_blocked},
    map::Map,
    random::{uniform_int, weighted_choice},
};

pub type DepthTable = [(i32, i32)];

pub const MAX_MONSTERS: &DepthTable = &[(2, 1), (3, 4), (5, 6)];
pub const MAX_ITEMS: &DepthTable = &[(1, 1), (2, 4)];
pub const TROLL_CHANCE: &DepthTable = &[(15, 3), (30, 5), (60, 7)];
pub const LIGHTNING_CHANCE: &DepthTable = &[(25, 4)];
pub const FIREBALL_CHANCE: &DepthTable = &[(25, 6)];
pub const CONFUSE_CHANCE: &DepthTable = &[(10, 2)];
pub const SWORD_CHANCE: &DepthTable = &[(5, 4)];
pub const SHIELD_CHANCE: &DepthTable = &[(15, 8)];

/// Value of the highest step whose minimum depth has been reached, or 0.
pub fn value_for_depth(table: &DepthTable, depth: i32) -> i32 {
    table
        .iter()
        .filter(|(_, min_depth)| *min_depth <= depth)
        .max_by_key(|(_, min_depth)| *min_depth)
        .map(|(value, _)| *value)
        .unwrap_or(0)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnTable {
    pub max_monsters: i32,
    pub max_items: i32,
    pub monsters: Vec<(MonsterKind, u32)>,
    pub items: Vec<(ItemKind, u32)>,
}

fn weight(table: &DepthTable, depth: i32) -> u32 {
    value_for_depth(table, depth).max(0) as u32
}

impl SpawnTable {
    pub fn for_depth(depth: i32) -> Self {
        Self {
            max_monsters: value_for_depth(MAX_MONSTERS, depth),
            max_items: value_for_depth(MAX_ITEMS, depth),
            monsters: vec![
                (MonsterKind::Orc, 80),
                (MonsterKind::Troll, weight(TROLL_CHANCE, depth)),
            ],
            items: vec![
                (ItemKind::HealingPotion, 35),
                (ItemKind::LightningScroll, weight(LIGHTNING_CHANCE, depth)),
                (ItemKind::FireballScroll, weight(FIREBALL_CHANCE, depth)),
                (ItemKind::ConfusionScroll, weight(CONFUSE_CHANCE, depth)),
                (ItemKind::Sword, weight(SWORD_CHANCE, depth)),
                (ItemKind::Shield, weight(SHIELD_CHANCE, depth)),
            ],
        }
    }
}

fn random_interior_point(rng: &mut RandomNumberGenerator, room: &Rect) -> Point {
    let x = uniform_int(rng, room.x1 + 1, room.x2 - 1);
    let y = uniform_int(rng, room.y1 + 1, room.y2 - 1);
    Point::new(x, y)
}

/// Rolls monsters then items for one room. A roll that lands on a blocked
/// tile is dropped, not retried.
pub fn populate_room(
    ecs: &mut SpecsWorld,
    objects: &mut Vec<Entity>,
    map: &Map,
    room: &Rect,
    table: &SpawnTable,
    config: &GameConfig,
    rng: &mut RandomNumberGenerator,
) {
    let num_monsters = uniform_int(rng, 0, table.max_monsters);
    let mut placed_monsters = 0;
    for _ in 0..num_monsters {
        let point = random_interior_point(rng, room);
        if is_blocked(ecs, objects, map, point) {
            continue;
        }
        if let Some(kind) = weighted_choice(rng, &table.monsters) {
            let monster = build_monster(ecs, &kind.template(), point);
            objects.push(monster);
            placed_monsters += 1;
        }
    }

    let num_items = uniform_int(rng, 0, table.max_items);
    let mut placed_items = 0;
    for _ in 0..num_items {
        let point = random_interior_point(rng, room);
        if is_blocked(ecs, objects, map, point) {
            continue;
        }
        if let Some(kind) = weighted_choice(rng, &table.items) {
            let item = build_item(ecs, &kind.template(config), Some(point));
            objects.insert(0, item);
            placed_items += 1;
        }
    }

    log::debug!(
        "room at {},{}: {placed_monsters}/{num_monsters} monsters, {placed_items}/{num_items} items",
        room.x1,
        room.y1
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_for_depth_steps() {
        let table = [(2, 1), (3, 4), (5, 6)];
        assert_eq!(value_for_depth(&table, 1), 2);
        assert_eq!(value_for_depth(&table, 3), 2);
        assert_eq!(value_for_depth(&table, 4), 3);
        assert_eq!(value_for_depth(&table, 6), 5);
        assert_eq!(value_for_depth(&table, 0), 0);
    }

    #[test]
    fn value_for_depth_uses_highest_reached_step() {
        let table = [(2, 1), (3, 4)];
        assert_eq!(value_for_depth(&table, 6), 3);
        assert_eq!(value_for_depth(&[], 6), 0);
    }

    #[test]
    fn shallow_levels_only_roll_orcs_and_potions() {
        let table = SpawnTable::for_depth(1);
        assert_eq!(table.max_monsters, 2);
        assert_eq!(table.max_items, 1);
        assert_eq!(table.monsters[1], (MonsterKind::Troll, 0));
        assert!(table.items[1..].iter().all(|(_, w)| *w == 0));
    }

    #[test]
    fn deep_levels_unlock_everything() {
        let table = SpawnTable::for_depth(8);
        assert_eq!(table.max_monsters, 5);
        assert_eq!(table.max_items, 2);
        assert_eq!(table.monsters[1], (MonsterKind::Troll, 60));
        assert!(table.items.iter().all(|(_, w)| *w > 0));
    }
}
