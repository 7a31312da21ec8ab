use std::fmt;

use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::RGB;
use serde::{Deserialize, Serialize};
use specs::prelude::{Component, DenseVecStorage, Entity, NullStorage, VecStorage};

use crate::fov::FovMask;

#[derive(Clone, Debug, PartialEq)]
pub struct Position {
    pub point: Point,
}

impl Component for Position {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct Renderable {
    pub glyph: char,
    pub color: RGB,
}

impl Component for Renderable {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Name {
    pub name: String,
}

impl Component for Name {
    type Storage = VecStorage<Self>;
}

#[derive(Clone, Debug)]
pub struct Viewshed {
    pub radius: i32,
    pub light_walls: bool,
    pub dirty: bool,
    pub visible: FovMask,
}

impl Component for Viewshed {
    type Storage = DenseVecStorage<Self>;
}

#[derive(Default)]
pub struct BlocksTile;

impl Component for BlocksTile {
    type Storage = NullStorage<Self>;
}

#[derive(Default)]
pub struct AlwaysVisible;

impl Component for AlwaysVisible {
    type Storage = NullStorage<Self>;
}

#[derive(Default)]
pub struct PlayerTag;

impl Component for PlayerTag {
    type Storage = NullStorage<Self>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathPolicy {
    #[default]
    None,
    PlayerDeath,
    MonsterDeath,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fighter {
    pub base_max_hp: i32,
    pub hp: i32,
    pub base_defense: i32,
    pub base_power: i32,
    pub xp: i32,
    pub death: DeathPolicy,
}

impl Fighter {
    pub fn new(hp: i32, defense: i32, power: i32, xp: i32, death: DeathPolicy) -> Self {
        Self {
            base_max_hp: hp,
            hp,
            base_defense: defense,
            base_power: power,
            xp,
            death,
        }
    }
}

impl Component for Fighter {
    type Storage = VecStorage<Self>;
}

/// Monster brains. `Confused` owns the brain it replaced and hands it back
/// once its counter runs out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ai {
    Basic,
    Confused { previous: Box<Ai>, turns: i32 },
}

impl Component for Ai {
    type Storage = DenseVecStorage<Self>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemEffect {
    Heal { amount: i32 },
    Lightning { damage: i32, range: i32 },
    Fireball { damage: i32, radius: i32 },
    Confuse { turns: i32, range: i32 },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub effect: Option<ItemEffect>,
}

impl Component for Item {
    type Storage = DenseVecStorage<Self>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    RightHand,
    LeftHand,
}

impl fmt::Display for EquipmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EquipmentSlot::RightHand => write!(f, "right hand"),
            EquipmentSlot::LeftHand => write!(f, "left hand"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub slot: EquipmentSlot,
    pub power_bonus: i32,
    pub defense_bonus: i32,
    pub max_hp_bonus: i32,
    pub equipped: bool,
}

impl Component for Equipment {
    type Storage = DenseVecStorage<Self>;
}

#[derive(Clone, Debug, Default)]
pub struct Inventory {
    pub items: Vec<Entity>,
}

impl Component for Inventory {
    type Storage = DenseVecStorage<Self>;
}
