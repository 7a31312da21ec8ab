use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::map::{DEFAULT_MAP_HEIGHT, DEFAULT_MAP_WIDTH, RoomParams};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Game tunables. Every field has a default, so a config file only needs the
/// keys it wants to change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub map_width: i32,
    pub map_height: i32,
    pub max_rooms: i32,
    pub room_min_size: i32,
    pub room_max_size: i32,

    pub torch_radius: i32,
    pub light_walls: bool,

    pub heal_amount: i32,
    pub lightning_damage: i32,
    pub lightning_range: i32,
    pub confuse_turns: i32,
    pub confuse_range: i32,
    pub fireball_damage: i32,
    pub fireball_radius: i32,

    pub level_up_base: i32,
    pub level_up_factor: i32,

    pub inventory_capacity: usize,
    pub log_lines: usize,
    pub log_width: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_width: DEFAULT_MAP_WIDTH,
            map_height: DEFAULT_MAP_HEIGHT,
            max_rooms: 30,
            room_min_size: 6,
            room_max_size: 10,
            torch_radius: 10,
            light_walls: true,
            heal_amount: 40,
            lightning_damage: 40,
            lightning_range: 5,
            confuse_turns: 10,
            confuse_range: 8,
            fireball_damage: 25,
            fireball_radius: 3,
            level_up_base: 200,
            level_up_factor: 150,
            inventory_capacity: 26,
            log_lines: 6,
            log_width: 58,
        }
    }
}

impl GameConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: GameConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_rooms < 1 {
            return Err(ConfigError::Invalid("max_rooms must be at least 1".into()));
        }
        if self.room_min_size < 3 || self.room_min_size > self.room_max_size {
            return Err(ConfigError::Invalid(format!(
                "room sizes {}..={} are not a valid range (minimum 3)",
                self.room_min_size, self.room_max_size
            )));
        }
        if self.room_max_size >= self.map_width || self.room_max_size >= self.map_height {
            return Err(ConfigError::Invalid(format!(
                "rooms up to {} do not fit a {}x{} map",
                self.room_max_size, self.map_width, self.map_height
            )));
        }
        if self.torch_radius < 1 || self.fireball_radius < 0 {
            return Err(ConfigError::Invalid("radii must be positive".into()));
        }
        if self.inventory_capacity == 0 || self.inventory_capacity > 26 {
            return Err(ConfigError::Invalid(
                "inventory capacity must be between 1 and 26".into(),
            ));
        }
        if self.log_lines == 0 || self.log_width < 8 {
            return Err(ConfigError::Invalid("message log is too small".into()));
        }
        Ok(())
    }

    pub fn room_params(&self) -> RoomParams {
        RoomParams {
            max_rooms: self.max_rooms,
            room_min_size: self.room_min_size,
            room_max_size: self.room_max_size,
        }
    }

    /// Experience needed to leave `level`.
    pub fn level_up_threshold(&self, level: i32) -> i32 {
        self.level_up_base + level * self.level_up_factor
    }
}
