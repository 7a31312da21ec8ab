use std::path::PathBuf;

use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::{BTerm, GameState, VirtualKeyCode};
use chrono::Utc;

use crate::{
    config::GameConfig,
    ecs::{GamePhase, GameWorld},
    effects::{TargetRequest, TargetSignal, TargetStep, step_target},
    menu::{DROP_HEADER, Menu, USE_HEADER},
    render::{
        PANEL_Y, SCREEN_WIDTH, draw_cursor, draw_main_menu, draw_map, draw_menu, draw_objects,
        draw_panel,
    },
    save::SaveError,
    turn::{PlayerIntent, StatChoice, TurnOutcome},
};

const MAIN_MENU_WIDTH: usize = 24;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InventoryMode {
    Use,
    Drop,
}

#[derive(Clone, Debug)]
enum Screen {
    MainMenu,
    Playing,
    Inventory { mode: InventoryMode, menu: Menu },
    Targeting { request: TargetRequest, cursor: Point },
    LevelUp { menu: Menu },
    MessageBox { menu: Menu, then: Box<Screen> },
}

pub struct GameApp {
    config: GameConfig,
    save_path: PathBuf,
    seed: Option<u64>,
    world: Option<GameWorld>,
    screen: Screen,
    last_mouse: Point,
}

impl GameApp {
    pub fn new(config: GameConfig, save_path: PathBuf, seed: Option<u64>) -> Self {
        Self {
            config,
            save_path,
            seed,
            world: None,
            screen: Screen::MainMenu,
            last_mouse: Point::new(0, 0),
        }
    }

    fn next_seed(&self) -> u64 {
        self.seed
            .unwrap_or_else(|| Utc::now().timestamp_millis().unsigned_abs())
    }

    fn main_menu() -> Menu {
        Menu {
            header: Vec::new(),
            options: vec![
                "Play a new game".to_string(),
                "Continue last game".to_string(),
                "Quit".to_string(),
            ],
            width: MAIN_MENU_WIDTH,
        }
    }

    fn tick_main_menu(&mut self, ctx: &mut BTerm) {
        let menu = Self::main_menu();
        draw_main_menu(ctx, &menu);
        let Some(key) = ctx.key else {
            return;
        };
        match key_letter(key).and_then(|c| menu.select(c)) {
            Some(0) => {
                let seed = self.next_seed();
                log::info!("starting new game with seed {seed}");
                self.world = Some(GameWorld::new_game(self.config.clone(), seed));
                self.screen = Screen::Playing;
            }
            Some(1) => match GameWorld::load_from_path(&self.save_path, self.next_seed()) {
                Ok(world) => {
                    self.world = Some(world);
                    self.screen = Screen::Playing;
                }
                Err(err) => {
                    let text = match err {
                        SaveError::NotFound(_) => "No saved game to load.".to_string(),
                        other => format!("Could not load the saved game: {other}"),
                    };
                    self.screen = Screen::MessageBox {
                        menu: Menu::message_box(&text, 30),
                        then: Box::new(Screen::MainMenu),
                    };
                }
            },
            Some(2) => ctx.quit(),
            _ if key == VirtualKeyCode::Escape => ctx.quit(),
            _ => {}
        }
    }

    fn quit_to_menu(&mut self) {
        let Some(world) = self.world.take() else {
            self.screen = Screen::MainMenu;
            return;
        };
        self.screen = match world.save_to_path(&self.save_path) {
            Ok(()) => Screen::MainMenu,
            Err(err) => {
                log::warn!("save failed: {err}");
                Screen::MessageBox {
                    menu: Menu::message_box(&format!("Could not save: {err}"), 40),
                    then: Box::new(Screen::MainMenu),
                }
            }
        };
    }

    fn tick_playing(&mut self, ctx: &mut BTerm) {
        let Some(world) = self.world.as_mut() else {
            self.screen = Screen::MainMenu;
            return;
        };
        if world.level_up_pending() {
            if let Ok(menu) = world.level_up_menu() {
                self.screen = Screen::LevelUp { menu };
                return;
            }
        }
        let Some(key) = ctx.key else {
            return;
        };
        let intent = match key {
            VirtualKeyCode::Escape => PlayerIntent::Quit,
            VirtualKeyCode::I => {
                if let Ok(menu) = world.inventory_menu(USE_HEADER) {
                    self.screen = Screen::Inventory {
                        mode: InventoryMode::Use,
                        menu,
                    };
                }
                return;
            }
            VirtualKeyCode::D => {
                if let Ok(menu) = world.inventory_menu(DROP_HEADER) {
                    self.screen = Screen::Inventory {
                        mode: InventoryMode::Drop,
                        menu,
                    };
                }
                return;
            }
            VirtualKeyCode::C => {
                self.screen = Screen::MessageBox {
                    menu: world.character_menu(),
                    then: Box::new(Screen::Playing),
                };
                return;
            }
            VirtualKeyCode::Period if ctx.shift => PlayerIntent::UseStairs,
            VirtualKeyCode::Period | VirtualKeyCode::Numpad5 => PlayerIntent::Wait,
            VirtualKeyCode::Comma | VirtualKeyCode::G => PlayerIntent::PickUp,
            other => match direction(other) {
                Some((dx, dy)) => PlayerIntent::MoveOrAttack { dx, dy },
                None => return,
            },
        };
        self.apply(intent);
    }

    fn apply(&mut self, intent: PlayerIntent) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        let outcome = world.apply_intent(intent);
        let cursor = world.player_point();
        if world.phase() == GamePhase::Dead {
            log::debug!("player is dead; waiting for quit");
        }
        match outcome {
            TurnOutcome::Quit => self.quit_to_menu(),
            TurnOutcome::NeedsTarget(request) => {
                self.screen = Screen::Targeting { request, cursor };
            }
            TurnOutcome::TookTurn | TurnOutcome::NoTurn | TurnOutcome::Descended => {
                self.screen = Screen::Playing;
            }
        }
    }

    fn tick_inventory(&mut self, ctx: &mut BTerm, mode: InventoryMode, menu: Menu) {
        draw_menu(ctx, &menu);
        let Some(key) = ctx.key else {
            return;
        };
        let choice = self
            .world
            .as_ref()
            .and_then(|world| key_letter(key).and_then(|c| world.inventory_choice(&menu, c)));
        match choice {
            Some(index) => match mode {
                InventoryMode::Use => self.apply(PlayerIntent::UseItem { index }),
                InventoryMode::Drop => self.apply(PlayerIntent::DropItem { index }),
            },
            None => self.screen = Screen::Playing,
        }
    }

    fn tick_targeting(&mut self, ctx: &mut BTerm, request: TargetRequest, mut cursor: Point) {
        let Some(world) = self.world.as_mut() else {
            self.screen = Screen::MainMenu;
            return;
        };
        let mouse = ctx.mouse_point();
        if mouse != self.last_mouse {
            cursor = mouse;
        }
        let mut signal = TargetSignal::Pending;
        if ctx.left_click {
            cursor = mouse;
            signal = TargetSignal::Confirm;
        }
        if let Some(key) = ctx.key {
            match key {
                VirtualKeyCode::Escape => signal = TargetSignal::Cancel,
                VirtualKeyCode::Return | VirtualKeyCode::Space => signal = TargetSignal::Confirm,
                other => {
                    if let Some((dx, dy)) = direction(other) {
                        cursor = Point::new(cursor.x + dx, cursor.y + dy);
                    }
                }
            }
        }
        cursor = Point::new(
            cursor.x.clamp(0, SCREEN_WIDTH - 1),
            cursor.y.clamp(0, PANEL_Y - 1),
        );
        draw_cursor(ctx, cursor, request.accepts(world, cursor));

        let chosen = match step_target(world, &request, (cursor, signal)) {
            TargetStep::Pending => {
                self.screen = Screen::Targeting { request, cursor };
                return;
            }
            TargetStep::Chosen(point) => Some(point),
            TargetStep::Aborted => None,
        };
        world.use_item_on(request, chosen);
        self.screen = Screen::Playing;
    }

    fn tick_level_up(&mut self, ctx: &mut BTerm, menu: Menu) {
        draw_menu(ctx, &menu);
        let Some(world) = self.world.as_mut() else {
            self.screen = Screen::MainMenu;
            return;
        };
        let choice = ctx
            .key
            .and_then(key_letter)
            .and_then(|c| menu.select(c))
            .and_then(|index| StatChoice::ALL.get(index).copied());
        if let Some(choice) = choice {
            world.level_up(choice);
            self.screen = Screen::Playing;
        }
    }
}

impl GameState for GameApp {
    fn tick(&mut self, ctx: &mut BTerm) {
        ctx.cls();
        let mouse = ctx.mouse_point();
        if let Some(world) = &self.world {
            draw_map(ctx, world);
            draw_objects(ctx, world);
            draw_panel(ctx, world, mouse);
        }

        let screen = std::mem::replace(&mut self.screen, Screen::Playing);
        match screen {
            Screen::MainMenu => {
                self.screen = Screen::MainMenu;
                self.tick_main_menu(ctx);
            }
            Screen::Playing => self.tick_playing(ctx),
            Screen::Inventory { mode, menu } => {
                self.screen = Screen::Inventory {
                    mode,
                    menu: menu.clone(),
                };
                self.tick_inventory(ctx, mode, menu);
            }
            Screen::Targeting { request, cursor } => self.tick_targeting(ctx, request, cursor),
            Screen::LevelUp { menu } => {
                self.screen = Screen::LevelUp { menu: menu.clone() };
                self.tick_level_up(ctx, menu);
            }
            Screen::MessageBox { menu, then } => {
                draw_menu(ctx, &menu);
                self.screen = if ctx.key.is_some() {
                    *then
                } else {
                    Screen::MessageBox { menu, then }
                };
            }
        }
        self.last_mouse = mouse;
    }
}

fn key_letter(key: VirtualKeyCode) -> Option<char> {
    use VirtualKeyCode::*;
    let letters = [
        A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    ];
    letters
        .iter()
        .position(|k| *k == key)
        .map(|idx| (b'a' + idx as u8) as char)
}

fn direction(key: VirtualKeyCode) -> Option<(i32, i32)> {
    use VirtualKeyCode::*;
    match key {
        Left | Numpad4 | H => Some((-1, 0)),
        Right | Numpad6 | L => Some((1, 0)),
        Up | Numpad8 | K => Some((0, -1)),
        Down | Numpad2 | J => Some((0, 1)),
        Numpad7 | Y => Some((-1, -1)),
        Numpad9 | U => Some((1, -1)),
        Numpad1 | B => Some((-1, 1)),
        Numpad3 | N => Some((1, 1)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_map_in_order() {
        assert_eq!(key_letter(VirtualKeyCode::A), Some('a'));
        assert_eq!(key_letter(VirtualKeyCode::Z), Some('z'));
        assert_eq!(key_letter(VirtualKeyCode::Key1), None);
    }

    #[test]
    fn vi_keys_cover_eight_directions() {
        let keys = [
            VirtualKeyCode::H,
            VirtualKeyCode::J,
            VirtualKeyCode::K,
            VirtualKeyCode::L,
            VirtualKeyCode::Y,
            VirtualKeyCode::U,
            VirtualKeyCode::B,
            VirtualKeyCode::N,
        ];
        let mut seen: Vec<(i32, i32)> = keys.iter().filter_map(|k| direction(*k)).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 8);
        assert!(!seen.contains(&(0, 0)));
    }

    #[test]
    fn main_menu_has_three_entries() {
        let menu = GameApp::main_menu();
        assert_eq!(menu.options.len(), 3);
        assert_eq!(menu.select('b'), Some(1));
    }
}
