pub mod ai;
pub mod app;
pub mod combat;
pub mod config;
pub mod data;
pub mod ecs;
pub mod effects;
pub mod fov;
pub mod inventory;
pub mod map;
pub mod menu;
pub mod random;
pub mod render;
pub mod save;
pub mod script;
pub mod spawner;
pub mod turn;

pub use config::GameConfig;
pub use ecs::{GamePhase, GameWorld};
pub use turn::{PlayerIntent, TurnOutcome};
