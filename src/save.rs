//! Save and restore of a whole `GameWorld` as JSON.

use std::{
    collections::HashSet,
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::RGB;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use specs::prelude::{Builder, Entity, World as SpecsWorld, WorldExt};
use thiserror::Error;

use crate::{
    config::GameConfig,
    ecs::{
        GamePhase, GameWorld,
        components::{
            Ai, AlwaysVisible, BlocksTile, Equipment, Fighter, Inventory, Item, Name, PlayerTag,
            Position, Renderable, Viewshed,
        },
        resources::{LogLine, MessageLog},
    },
    fov::FovMask,
    map::Map,
};

pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No saved game at {}", .0.display())]
    NotFound(PathBuf),

    #[error("Incompatible save version: expected {expected}, found {found}")]
    IncompatibleVersion { expected: u32, found: u32 },

    #[error("Save file corrupted: {0}")]
    Corrupted(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedEntity {
    pub name: String,
    pub glyph: char,
    pub color: [f32; 3],
    pub position: Option<(i32, i32)>,
    #[serde(default)]
    pub blocks: bool,
    #[serde(default)]
    pub always_visible: bool,
    pub fighter: Option<Fighter>,
    pub ai: Option<Ai>,
    pub item: Option<Item>,
    pub equipment: Option<Equipment>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedLine {
    pub text: String,
    pub color: [f32; 3],
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SavedGame {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub config: GameConfig,
    pub map: Map,
    pub objects: Vec<SavedEntity>,
    pub player_index: usize,
    pub stairs_index: usize,
    pub inventory: Vec<SavedEntity>,
    pub messages: Vec<SavedLine>,
    pub phase: GamePhase,
    pub depth: i32,
    pub player_level: i32,
}

fn color_to_array(color: RGB) -> [f32; 3] {
    [color.r, color.g, color.b]
}

fn array_to_color(color: [f32; 3]) -> RGB {
    RGB::from_f32(color[0], color[1], color[2])
}

impl GameWorld {
    fn saved_entity(&self, entity: Entity) -> SavedEntity {
        let render = self.renderable(entity);
        SavedEntity {
            name: self.name(entity),
            glyph: render.as_ref().map(|r| r.glyph).unwrap_or('?'),
            color: render
                .map(|r| color_to_array(r.color))
                .unwrap_or([1.0, 1.0, 1.0]),
            position: self.position(entity).map(|p| (p.x, p.y)),
            blocks: self.blocks_movement(entity),
            always_visible: self.is_always_visible(entity),
            fighter: self.fighter(entity),
            ai: self.ai(entity),
            item: self.item(entity),
            equipment: self.equipment(entity),
        }
    }

    pub fn snapshot(&self) -> Result<SavedGame, SaveError> {
        let index_of = |target: Entity, what: &str| {
            self.objects
                .iter()
                .position(|e| *e == target)
                .ok_or_else(|| SaveError::Corrupted(format!("{what} is not on the level")))
        };
        Ok(SavedGame {
            version: SAVE_VERSION,
            saved_at: Utc::now(),
            config: self.config.clone(),
            map: (*self.map()).clone(),
            objects: self.objects.iter().map(|e| self.saved_entity(*e)).collect(),
            player_index: index_of(self.player, "player")?,
            stairs_index: index_of(self.stairs, "stairs")?,
            inventory: self
                .inventory()
                .into_iter()
                .map(|e| self.saved_entity(e))
                .collect(),
            messages: self
                .messages()
                .into_iter()
                .map(|line| SavedLine {
                    text: line.text,
                    color: color_to_array(line.color),
                })
                .collect(),
            phase: self.phase,
            depth: self.depth,
            player_level: self.player_level,
        })
    }

    /// Rebuilds a world from a snapshot. The random stream is reseeded.
    pub fn restore(saved: SavedGame, seed: u64) -> Result<Self, SaveError> {
        validate(&saved)?;

        let mut ecs = Self::fresh_ecs(&saved.config);
        ecs.insert(saved.map);
        {
            let mut log = ecs.write_resource::<MessageLog>();
            for line in saved.messages {
                log.push_line(LogLine {
                    text: line.text,
                    color: array_to_color(line.color),
                });
            }
        }

        let items: Vec<Entity> = saved
            .inventory
            .iter()
            .map(|record| build_saved(&mut ecs, record))
            .collect();
        let objects: Vec<Entity> = saved
            .objects
            .iter()
            .map(|record| build_saved(&mut ecs, record))
            .collect();
        let player = objects[saved.player_index];
        let stairs = objects[saved.stairs_index];

        {
            let _ = ecs.write_component::<Viewshed>().insert(
                player,
                Viewshed {
                    radius: saved.config.torch_radius,
                    light_walls: saved.config.light_walls,
                    dirty: true,
                    visible: FovMask::default(),
                },
            );
            let _ = ecs.write_component::<PlayerTag>().insert(player, PlayerTag);
            let _ = ecs
                .write_component::<Inventory>()
                .insert(player, Inventory { items });
        }

        let mut world = Self {
            ecs,
            player,
            stairs,
            objects,
            depth: saved.depth,
            phase: saved.phase,
            player_level: saved.player_level,
            rng: RandomNumberGenerator::seeded(seed),
            config: saved.config,
        };
        world.recompute_fov();
        log::info!(
            "restored game saved at {} (depth {}, {} objects)",
            saved.saved_at,
            world.depth,
            world.objects.len()
        );
        Ok(world)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), SaveError> {
        let saved = self.snapshot()?;
        let file = File::create(path.as_ref())?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &saved)?;
        log::info!("saved game to {}", path.as_ref().display());
        Ok(())
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P, seed: u64) -> Result<Self, SaveError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SaveError::NotFound(path.to_path_buf()));
        }
        let reader = BufReader::new(File::open(path)?);
        let saved: SavedGame = serde_json::from_reader(reader)?;
        Self::restore(saved, seed).inspect_err(|err| {
            log::warn!("rejected save {}: {err}", path.display());
        })
    }
}

fn validate(saved: &SavedGame) -> Result<(), SaveError> {
    if saved.version != SAVE_VERSION {
        return Err(SaveError::IncompatibleVersion {
            expected: SAVE_VERSION,
            found: saved.version,
        });
    }
    saved
        .config
        .validate()
        .map_err(|err| SaveError::Corrupted(format!("saved config: {err}")))?;
    let map = &saved.map;
    let cells = map.width.checked_mul(map.height).filter(|_| map.width > 0 && map.height > 0);
    if cells.is_none_or(|cells| map.tiles.len() != cells as usize) {
        return Err(SaveError::Corrupted(format!(
            "tile grid of {} does not match {}x{}",
            map.tiles.len(),
            map.width,
            map.height
        )));
    }
    for (what, index) in [("player", saved.player_index), ("stairs", saved.stairs_index)] {
        let Some(record) = saved.objects.get(index) else {
            return Err(SaveError::Corrupted(format!(
                "{what} index {index} is outside the object list"
            )));
        };
        if record.position.is_none() {
            return Err(SaveError::Corrupted(format!("{what} has no position")));
        }
    }
    if saved.player_index == saved.stairs_index {
        return Err(SaveError::Corrupted("player and stairs share an index".into()));
    }
    if saved.objects[saved.player_index].fighter.is_none() {
        return Err(SaveError::Corrupted("player cannot fight".into()));
    }
    if saved.inventory.len() > saved.config.inventory_capacity {
        return Err(SaveError::Corrupted(format!(
            "{} items carried with room for {}",
            saved.inventory.len(),
            saved.config.inventory_capacity
        )));
    }
    let mut taken = HashSet::new();
    for equipment in saved.inventory.iter().filter_map(|r| r.equipment.as_ref()) {
        if equipment.equipped && !taken.insert(equipment.slot) {
            return Err(SaveError::Corrupted(format!(
                "two items equipped on {}",
                equipment.slot
            )));
        }
    }
    Ok(())
}

fn build_saved(ecs: &mut SpecsWorld, record: &SavedEntity) -> Entity {
    let mut builder = ecs
        .create_entity()
        .with(Renderable {
            glyph: record.glyph,
            color: array_to_color(record.color),
        })
        .with(Name {
            name: record.name.clone(),
        });
    if let Some((x, y)) = record.position {
        builder = builder.with(Position {
            point: Point::new(x, y),
        });
    }
    if record.blocks {
        builder = builder.with(BlocksTile);
    }
    if record.always_visible {
        builder = builder.with(AlwaysVisible);
    }
    if let Some(fighter) = &record.fighter {
        builder = builder.with(fighter.clone());
    }
    if let Some(ai) = &record.ai {
        builder = builder.with(ai.clone());
    }
    if let Some(item) = &record.item {
        builder = builder.with(item.clone());
    }
    if let Some(equipment) = &record.equipment {
        builder = builder.with(equipment.clone());
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::EquipmentSlot;

    fn world() -> GameWorld {
        GameWorld::new_game(GameConfig::default(), 2024)
    }

    #[test]
    fn snapshot_indexes_player_and_stairs() {
        let world = world();
        let saved = world.snapshot().unwrap();
        assert_eq!(saved.objects[saved.player_index].name, "player");
        assert_eq!(saved.objects[saved.stairs_index].name, "stairs");
        assert_eq!(saved.inventory.len(), 1);
        assert_eq!(saved.version, SAVE_VERSION);
    }

    #[test]
    fn restore_keeps_identity() {
        let world = world();
        let saved = world.snapshot().unwrap();
        let player_index = saved.player_index;
        let stairs_index = saved.stairs_index;
        let restored = GameWorld::restore(saved, 1).unwrap();
        assert_eq!(restored.objects()[player_index], restored.player());
        assert_eq!(restored.objects()[stairs_index], restored.stairs());
        assert_eq!(restored.player_point(), world.player_point());
        assert_eq!(restored.position(restored.stairs()), world.position(world.stairs()));
        assert_eq!(restored.objects().len(), world.objects().len());
        assert_eq!(restored.power(restored.player()), 4);
        assert_eq!(*restored.map(), *world.map());
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut saved = world().snapshot().unwrap();
        saved.version = 99;
        assert!(matches!(
            GameWorld::restore(saved, 1),
            Err(SaveError::IncompatibleVersion {
                expected: 1,
                found: 99
            })
        ));
    }

    #[test]
    fn truncated_map_is_corrupted() {
        let mut saved = world().snapshot().unwrap();
        saved.map.tiles.pop();
        assert!(matches!(GameWorld::restore(saved, 1), Err(SaveError::Corrupted(_))));
    }

    #[test]
    fn huge_map_dimensions_are_corrupted() {
        let mut saved = world().snapshot().unwrap();
        saved.map.width = i32::MAX;
        saved.map.height = 3;
        assert!(matches!(GameWorld::restore(saved, 1), Err(SaveError::Corrupted(_))));
    }

    #[test]
    fn tampered_config_is_corrupted() {
        let mut saved = world().snapshot().unwrap();
        saved.config.inventory_capacity = 100;
        assert!(matches!(GameWorld::restore(saved, 1), Err(SaveError::Corrupted(_))));
    }

    #[test]
    fn overfull_inventory_is_corrupted() {
        let mut saved = world().snapshot().unwrap();
        saved.config.inventory_capacity = 1;
        let mut potion = saved.inventory[0].clone();
        potion.equipment = None;
        saved.inventory.push(potion);
        assert!(matches!(GameWorld::restore(saved, 1), Err(SaveError::Corrupted(_))));
    }

    #[test]
    fn dangling_player_index_is_corrupted() {
        let mut saved = world().snapshot().unwrap();
        saved.player_index = saved.objects.len();
        assert!(matches!(GameWorld::restore(saved, 1), Err(SaveError::Corrupted(_))));
    }

    #[test]
    fn double_equipped_slot_is_corrupted() {
        let mut saved = world().snapshot().unwrap();
        let mut second = saved.inventory[0].clone();
        second.name = "sword".into();
        assert_eq!(second.equipment.as_ref().unwrap().slot, EquipmentSlot::RightHand);
        saved.inventory.push(second);
        assert!(matches!(GameWorld::restore(saved, 1), Err(SaveError::Corrupted(_))));
    }

    #[test]
    fn missing_file_is_not_found() {
        let path = std::env::temp_dir().join("hideous-truths-no-such-save.json");
        let _ = std::fs::remove_file(&path);
        assert!(matches!(
            GameWorld::load_from_path(&path, 1),
            Err(SaveError::NotFound(_))
        ));
    }
}
