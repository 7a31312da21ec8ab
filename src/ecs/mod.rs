pub mod components;
pub mod resources;
pub mod systems;

use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::DistanceAlg;
use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::RGB;
use serde::{Deserialize, Serialize};
use specs::{
    RunNow,
    prelude::{Builder, Entity, World as SpecsWorld, WorldExt},
    shred::Fetch,
};

use crate::{
    config::GameConfig,
    data::{
        items::{ItemKind, ItemTemplate},
        monsters::MonsterTemplate,
        palette::{self, Color},
    },
    fov::FovMask,
    map::{GeneratedLayout, Map, MapGenerator},
    spawner::{SpawnTable, populate_room},
};

use self::{
    components::{
        Ai, AlwaysVisible, BlocksTile, DeathPolicy, Equipment, Fighter, Inventory, Item, Name,
        PlayerTag, Position, Renderable, Viewshed,
    },
    resources::{LogLine, MessageLog},
    systems::FovSystem,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    Dead,
}

pub struct GameWorld {
    pub(crate) ecs: SpecsWorld,
    pub(crate) player: Entity,
    pub(crate) stairs: Entity,
    /// Draw order of everything on the level; carried items are not in here.
    pub(crate) objects: Vec<Entity>,
    pub(crate) depth: i32,
    pub(crate) phase: GamePhase,
    pub(crate) player_level: i32,
    pub(crate) rng: RandomNumberGenerator,
    pub(crate) config: GameConfig,
}

#[derive(Clone, Debug)]
pub struct VisibleObject {
    pub entity: Entity,
    pub point: Point,
    pub glyph: char,
    pub color: RGB,
}

impl GameWorld {
    pub fn new_game(config: GameConfig, seed: u64) -> Self {
        let mut ecs = Self::fresh_ecs(&config);
        let mut rng = RandomNumberGenerator::seeded(seed);
        let player = spawn_player(&mut ecs, &config);
        let (objects, stairs, layout) = generate_level(&mut ecs, &config, 1, player, &mut rng);
        log::info!(
            "new game (seed {seed}): {} rooms, {} objects",
            layout.rooms.len(),
            objects.len()
        );

        let mut world = Self {
            ecs,
            player,
            stairs,
            objects,
            depth: 1,
            phase: GamePhase::Playing,
            player_level: 1,
            rng,
            config,
        };

        let dagger = build_item(&mut world.ecs, &ItemKind::Dagger.template(&world.config), None);
        world.add_to_inventory(dagger);
        world.equip(dagger);
        world.message("Welcome to Hideous Truths!", palette::PURPLE);
        world.recompute_fov();
        world
    }

    pub(crate) fn fresh_ecs(config: &GameConfig) -> SpecsWorld {
        let mut ecs = SpecsWorld::new();
        register_components(&mut ecs);
        ecs.insert(MessageLog::new(config.log_lines, config.log_width));
        ecs.insert(Map::solid(config.map_width, config.map_height));
        ecs
    }

    pub fn next_level(&mut self) {
        self.message(
            "You descend deeper into the heart of the dungeon...",
            palette::RED,
        );
        for entity in std::mem::take(&mut self.objects) {
            if entity != self.player {
                let _ = self.ecs.delete_entity(entity);
            }
        }
        self.ecs.maintain();
        self.depth += 1;
        let (objects, stairs, layout) =
            generate_level(&mut self.ecs, &self.config, self.depth, self.player, &mut self.rng);
        log::info!(
            "depth {}: {} rooms, {} objects",
            self.depth,
            layout.rooms.len(),
            objects.len()
        );
        self.objects = objects;
        self.stairs = stairs;
        self.recompute_fov();
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    pub fn stairs(&self) -> Entity {
        self.stairs
    }

    pub fn objects(&self) -> &[Entity] {
        &self.objects
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn player_level(&self) -> i32 {
        self.player_level
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn map(&self) -> Fetch<'_, Map> {
        self.ecs.fetch::<Map>()
    }

    pub fn message<S: Into<String>>(&mut self, text: S, color: Color) {
        self.ecs
            .write_resource::<MessageLog>()
            .push_color(text, RGB::named(color));
    }

    pub fn messages(&self) -> Vec<LogLine> {
        self.ecs.read_resource::<MessageLog>().lines().cloned().collect()
    }

    pub fn position(&self, entity: Entity) -> Option<Point> {
        self.ecs
            .read_component::<Position>()
            .get(entity)
            .map(|pos| pos.point)
    }

    pub fn player_point(&self) -> Point {
        self.position(self.player).unwrap_or(Point::new(0, 0))
    }

    pub(crate) fn set_position(&mut self, entity: Entity, point: Point) {
        {
            let mut positions = self.ecs.write_component::<Position>();
            let _ = positions.insert(entity, Position { point });
        }
        if entity == self.player {
            let mut viewsheds = self.ecs.write_component::<Viewshed>();
            if let Some(vs) = viewsheds.get_mut(entity) {
                vs.dirty = true;
            }
        }
    }

    pub fn name(&self, entity: Entity) -> String {
        self.ecs
            .read_component::<Name>()
            .get(entity)
            .map(|n| n.name.clone())
            .unwrap_or_else(|| "something".to_string())
    }

    pub fn fighter(&self, entity: Entity) -> Option<Fighter> {
        self.ecs.read_component::<Fighter>().get(entity).cloned()
    }

    pub fn ai(&self, entity: Entity) -> Option<Ai> {
        self.ecs.read_component::<Ai>().get(entity).cloned()
    }

    pub fn item(&self, entity: Entity) -> Option<Item> {
        self.ecs.read_component::<Item>().get(entity).cloned()
    }

    pub fn equipment(&self, entity: Entity) -> Option<Equipment> {
        self.ecs.read_component::<Equipment>().get(entity).cloned()
    }

    pub fn renderable(&self, entity: Entity) -> Option<Renderable> {
        self.ecs.read_component::<Renderable>().get(entity).cloned()
    }

    pub fn blocks_movement(&self, entity: Entity) -> bool {
        self.ecs.read_component::<BlocksTile>().contains(entity)
    }

    pub fn is_always_visible(&self, entity: Entity) -> bool {
        self.ecs.read_component::<AlwaysVisible>().contains(entity)
    }

    pub fn is_blocked(&self, point: Point) -> bool {
        let map = self.ecs.fetch::<Map>();
        is_blocked(&self.ecs, &self.objects, &map, point)
    }

    pub fn fighter_at(&self, point: Point) -> Option<Entity> {
        let positions = self.ecs.read_component::<Position>();
        let fighters = self.ecs.read_component::<Fighter>();
        self.objects.iter().copied().find(|entity| {
            fighters.contains(*entity) && positions.get(*entity).is_some_and(|p| p.point == point)
        })
    }

    pub fn entities_at(&self, point: Point) -> Vec<Entity> {
        let positions = self.ecs.read_component::<Position>();
        self.objects
            .iter()
            .copied()
            .filter(|entity| positions.get(*entity).is_some_and(|p| p.point == point))
            .collect()
    }

    pub fn send_to_back(&mut self, entity: Entity) {
        if let Some(idx) = self.objects.iter().position(|e| *e == entity) {
            let entity = self.objects.remove(idx);
            self.objects.insert(0, entity);
        }
    }

    pub fn distance_between(&self, a: Entity, b: Entity) -> Option<f32> {
        Some(DistanceAlg::Pythagoras.distance2d(self.position(a)?, self.position(b)?))
    }

    pub fn distance_to_point(&self, entity: Entity, point: Point) -> Option<f32> {
        Some(DistanceAlg::Pythagoras.distance2d(self.position(entity)?, point))
    }

    pub fn move_by(&mut self, entity: Entity, dx: i32, dy: i32) -> bool {
        let Some(from) = self.position(entity) else {
            return false;
        };
        let dest = Point::new(from.x + dx, from.y + dy);
        if self.is_blocked(dest) {
            return false;
        }
        self.set_position(entity, dest);
        true
    }

    pub fn recompute_fov(&mut self) {
        let mut system = FovSystem;
        system.run_now(&self.ecs);
        self.ecs.maintain();
    }

    pub fn player_fov(&self) -> FovMask {
        self.ecs
            .read_component::<Viewshed>()
            .get(self.player)
            .map(|vs| vs.visible.clone())
            .unwrap_or_default()
    }

    pub fn is_visible(&self, point: Point) -> bool {
        self.ecs
            .read_component::<Viewshed>()
            .get(self.player)
            .is_some_and(|vs| vs.visible.is_visible(point))
    }

    pub fn visible_objects(&self) -> Vec<VisibleObject> {
        let map = self.ecs.fetch::<Map>();
        let positions = self.ecs.read_component::<Position>();
        let renderables = self.ecs.read_component::<Renderable>();
        let always = self.ecs.read_component::<AlwaysVisible>();
        let mut ordered: Vec<Entity> = self
            .objects
            .iter()
            .copied()
            .filter(|e| *e != self.player)
            .collect();
        ordered.push(self.player);

        ordered
            .into_iter()
            .filter_map(|entity| {
                let point = positions.get(entity)?.point;
                let render = renderables.get(entity)?;
                let shown = self.is_visible(point)
                    || (always.contains(entity) && map.is_explored(point));
                shown.then(|| VisibleObject {
                    entity,
                    point,
                    glyph: render.glyph,
                    color: render.color,
                })
            })
            .collect()
    }

    pub fn names_at(&self, point: Point) -> String {
        if !self.is_visible(point) {
            return String::new();
        }
        let names: Vec<String> = self
            .entities_at(point)
            .into_iter()
            .map(|entity| self.name(entity))
            .collect();
        capitalize(&names.join(", "))
    }
}

pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) fn register_components(world: &mut SpecsWorld) {
    world.register::<Position>();
    world.register::<Renderable>();
    world.register::<Name>();
    world.register::<Viewshed>();
    world.register::<BlocksTile>();
    world.register::<AlwaysVisible>();
    world.register::<PlayerTag>();
    world.register::<Fighter>();
    world.register::<Ai>();
    world.register::<Item>();
    world.register::<Equipment>();
    world.register::<Inventory>();
}

pub(crate) fn is_blocked(ecs: &SpecsWorld, objects: &[Entity], map: &Map, point: Point) -> bool {
    if map.is_tile_blocked(point) {
        return true;
    }
    let positions = ecs.read_component::<Position>();
    let blockers = ecs.read_component::<BlocksTile>();
    objects.iter().any(|entity| {
        blockers.contains(*entity) && positions.get(*entity).is_some_and(|p| p.point == point)
    })
}

fn spawn_player(ecs: &mut SpecsWorld, config: &GameConfig) -> Entity {
    ecs.create_entity()
        .with(Position {
            point: Point::new(0, 0),
        })
        .with(Renderable {
            glyph: '@',
            color: RGB::named(palette::WHITE),
        })
        .with(Name {
            name: "player".to_string(),
        })
        .with(Viewshed {
            radius: config.torch_radius,
            light_walls: config.light_walls,
            dirty: true,
            visible: FovMask::default(),
        })
        .with(Fighter::new(100, 1, 2, 0, DeathPolicy::PlayerDeath))
        .with(Inventory::default())
        .with(BlocksTile)
        .with(PlayerTag)
        .build()
}

pub(crate) fn build_monster(ecs: &mut SpecsWorld, template: &MonsterTemplate, point: Point) -> Entity {
    ecs.create_entity()
        .with(Position { point })
        .with(Renderable {
            glyph: template.glyph,
            color: RGB::named(template.color),
        })
        .with(Name {
            name: template.name.to_string(),
        })
        .with(Fighter::new(
            template.hp,
            template.defense,
            template.power,
            template.xp,
            DeathPolicy::MonsterDeath,
        ))
        .with(Ai::Basic)
        .with(BlocksTile)
        .build()
}

pub(crate) fn build_item(ecs: &mut SpecsWorld, template: &ItemTemplate, point: Option<Point>) -> Entity {
    let mut builder = ecs
        .create_entity()
        .with(Renderable {
            glyph: template.glyph,
            color: RGB::named(template.color),
        })
        .with(Name {
            name: template.name.to_string(),
        })
        .with(Item {
            effect: template.effect,
        });
    if let Some(point) = point {
        builder = builder.with(Position { point });
    }
    if let Some(equipment) = &template.equipment {
        builder = builder.with(equipment.clone());
    }
    if template.always_visible {
        builder = builder.with(AlwaysVisible);
    }
    builder.build()
}

fn build_stairs(ecs: &mut SpecsWorld, point: Point) -> Entity {
    ecs.create_entity()
        .with(Position { point })
        .with(Renderable {
            glyph: '>',
            color: RGB::named(palette::WHITE),
        })
        .with(Name {
            name: "stairs".to_string(),
        })
        .with(AlwaysVisible)
        .build()
}

fn generate_level(
    ecs: &mut SpecsWorld,
    config: &GameConfig,
    depth: i32,
    player: Entity,
    rng: &mut RandomNumberGenerator,
) -> (Vec<Entity>, Entity, GeneratedLayout) {
    let mut objects = vec![player];
    let table = SpawnTable::for_depth(depth);
    let generator = MapGenerator::new(config.map_width, config.map_height, config.room_params());

    let (map, layout) = generator.generate(rng, |map, idx, room, rng| {
        if idx == 0 {
            let _ = ecs
                .write_component::<Position>()
                .insert(player, Position { point: room.center() });
        }
        populate_room(ecs, &mut objects, map, room, &table, config, rng);
    });

    let stairs = build_stairs(ecs, layout.stairs);
    objects.insert(0, stairs);

    ecs.insert(map);
    if let Some(vs) = ecs.write_component::<Viewshed>().get_mut(player) {
        vs.dirty = true;
    }
    (objects, stairs, layout)
}
