use thiserror::Error;

use crate::ecs::{GameWorld, resources::wrap_words};

pub const MAX_OPTIONS: usize = 26;
pub const INVENTORY_WIDTH: usize = 50;
pub const LEVEL_SCREEN_WIDTH: usize = 40;
pub const CHARACTER_SCREEN_WIDTH: usize = 30;

pub const USE_HEADER: &str = "Press the key next to an item to use it, or any other to cancel.";
pub const DROP_HEADER: &str = "Press the key next to an item to drop it, or any other to cancel.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MenuError {
    #[error("cannot have a menu with more than {MAX_OPTIONS} options (got {count})")]
    TooManyOptions { count: usize },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Menu {
    pub header: Vec<String>,
    pub options: Vec<String>,
    pub width: usize,
}

impl Menu {
    pub fn new(header: &str, options: Vec<String>, width: usize) -> Result<Self, MenuError> {
        if options.len() > MAX_OPTIONS {
            return Err(MenuError::TooManyOptions {
                count: options.len(),
            });
        }
        let width = width.max(1);
        let header = if header.is_empty() {
            Vec::new()
        } else {
            header
                .split('\n')
                .flat_map(|paragraph| {
                    let wrapped = wrap_words(paragraph, width);
                    if wrapped.is_empty() {
                        vec![String::new()]
                    } else {
                        wrapped
                    }
                })
                .collect()
        };
        Ok(Self {
            header,
            options,
            width,
        })
    }

    pub fn message_box(text: &str, width: usize) -> Self {
        match Self::new(text, Vec::new(), width) {
            Ok(menu) => menu,
            Err(_) => Self {
                header: Vec::new(),
                options: Vec::new(),
                width,
            },
        }
    }

    pub fn labelled_options(&self) -> Vec<String> {
        self.options
            .iter()
            .zip('a'..='z')
            .map(|(text, letter)| format!("({letter}) {text}"))
            .collect()
    }

    pub fn height(&self) -> usize {
        self.header.len() + self.options.len()
    }

    pub fn select(&self, key: char) -> Option<usize> {
        let key = key.to_ascii_lowercase();
        if !key.is_ascii_lowercase() {
            return None;
        }
        let index = (key as u8 - b'a') as usize;
        (index < self.options.len()).then_some(index)
    }
}

impl GameWorld {
    pub fn inventory_labels(&self) -> Vec<String> {
        self.inventory()
            .into_iter()
            .map(|item| {
                let name = self.name(item);
                match self.equipment(item) {
                    Some(eq) if eq.equipped => format!("{name} (on {})", eq.slot),
                    _ => name,
                }
            })
            .collect()
    }

    pub fn inventory_menu(&self, header: &str) -> Result<Menu, MenuError> {
        let labels = self.inventory_labels();
        if labels.is_empty() {
            return Menu::new(header, vec!["Inventory is empty.".to_string()], INVENTORY_WIDTH);
        }
        Menu::new(header, labels, INVENTORY_WIDTH)
    }

    pub fn inventory_choice(&self, menu: &Menu, key: char) -> Option<usize> {
        let index = menu.select(key)?;
        (index < self.inventory().len()).then_some(index)
    }

    pub fn level_up_menu(&self) -> Result<Menu, MenuError> {
        Menu::new(
            "Level up! Choose a stat to raise:\n",
            self.level_up_options(),
            LEVEL_SCREEN_WIDTH,
        )
    }

    pub fn character_menu(&self) -> Menu {
        Menu::message_box(&self.character_sheet().lines().join("\n"), CHARACTER_SCREEN_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    #[test]
    fn too_many_options_is_an_error() {
        let options = (0..27).map(|i| i.to_string()).collect();
        assert_eq!(
            Menu::new("", options, 20),
            Err(MenuError::TooManyOptions { count: 27 })
        );
        let options = (0..26).map(|i| i.to_string()).collect();
        assert!(Menu::new("", options, 20).is_ok());
    }

    #[test]
    fn out_of_range_keys_select_nothing() {
        let menu = Menu::new("Pick", vec!["one".into(), "two".into()], 20).unwrap();
        assert_eq!(menu.select('a'), Some(0));
        assert_eq!(menu.select('B'), Some(1));
        assert_eq!(menu.select('c'), None);
        assert_eq!(menu.select('1'), None);
        assert_eq!(menu.labelled_options(), vec!["(a) one", "(b) two"]);
    }

    #[test]
    fn header_wraps_and_keeps_blank_lines() {
        let menu = Menu::message_box("Character Information\n\nLevel: 1", 12);
        assert_eq!(menu.header, vec!["Character", "Information", "", "Level: 1"]);
        assert_eq!(menu.height(), 4);
    }

    #[test]
    fn inventory_marks_equipped_items() {
        let world = GameWorld::new_game(GameConfig::default(), 5);
        let menu = world.inventory_menu(USE_HEADER).unwrap();
        assert_eq!(menu.options, vec!["dagger (on right hand)"]);
        assert_eq!(world.inventory_choice(&menu, 'a'), Some(0));
    }

    #[test]
    fn empty_inventory_has_placeholder() {
        let mut world = GameWorld::new_game(GameConfig::default(), 5);
        world.drop_item(0);
        let menu = world.inventory_menu(DROP_HEADER).unwrap();
        assert_eq!(menu.options, vec!["Inventory is empty."]);
        assert_eq!(world.inventory_choice(&menu, 'a'), None);
    }

    #[test]
    fn level_up_menu_shows_current_stats() {
        let world = GameWorld::new_game(GameConfig::default(), 5);
        let menu = world.level_up_menu().unwrap();
        assert_eq!(menu.options[1], "Strength (+1 attack, from 4)");
        assert_eq!(menu.header[0], "Level up! Choose a stat to raise:");
    }
}
