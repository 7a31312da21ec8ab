use super::palette::{self, Color};
use crate::{
    config::GameConfig,
    ecs::components::{Equipment, EquipmentSlot, ItemEffect},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    HealingPotion,
    LightningScroll,
    FireballScroll,
    ConfusionScroll,
    Sword,
    Shield,
    Dagger,
}

#[derive(Clone, Debug)]
pub struct ItemTemplate {
    pub name: &'static str,
    pub glyph: char,
    pub color: Color,
    pub effect: Option<ItemEffect>,
    pub equipment: Option<Equipment>,
    pub always_visible: bool,
}

impl ItemKind {
    /// Effect strengths come from the config so they can be tuned per run.
    pub fn template(self, config: &GameConfig) -> ItemTemplate {
        match self {
            ItemKind::HealingPotion => ItemTemplate::consumable(
                "healing potion",
                '!',
                palette::VIOLET,
                ItemEffect::Heal {
                    amount: config.heal_amount,
                },
            ),
            ItemKind::LightningScroll => ItemTemplate::consumable(
                "scroll of lightning",
                '?',
                palette::LIGHT_YELLOW,
                ItemEffect::Lightning {
                    damage: config.lightning_damage,
                    range: config.lightning_range,
                },
            ),
            ItemKind::FireballScroll => ItemTemplate::consumable(
                "scroll of fireball",
                '?',
                palette::LIGHT_YELLOW,
                ItemEffect::Fireball {
                    damage: config.fireball_damage,
                    radius: config.fireball_radius,
                },
            ),
            ItemKind::ConfusionScroll => ItemTemplate::consumable(
                "scroll of confusion",
                '?',
                palette::LIGHT_YELLOW,
                ItemEffect::Confuse {
                    turns: config.confuse_turns,
                    range: config.confuse_range,
                },
            ),
            ItemKind::Sword => {
                ItemTemplate::wearable("sword", '/', palette::SKY, EquipmentSlot::RightHand, 2, 0)
            }
            ItemKind::Shield => ItemTemplate::wearable(
                "shield",
                '[',
                palette::DARKER_ORANGE,
                EquipmentSlot::LeftHand,
                0,
                1,
            ),
            ItemKind::Dagger => ItemTemplate {
                always_visible: true,
                ..ItemTemplate::wearable("dagger", '-', palette::SKY, EquipmentSlot::RightHand, 2, 0)
            },
        }
    }
}

impl ItemTemplate {
    fn consumable(name: &'static str, glyph: char, color: Color, effect: ItemEffect) -> Self {
        Self {
            name,
            glyph,
            color,
            effect: Some(effect),
            equipment: None,
            always_visible: true,
        }
    }

    fn wearable(
        name: &'static str,
        glyph: char,
        color: Color,
        slot: EquipmentSlot,
        power_bonus: i32,
        defense_bonus: i32,
    ) -> Self {
        Self {
            name,
            glyph,
            color,
            effect: None,
            equipment: Some(Equipment {
                slot,
                power_bonus,
                defense_bonus,
                max_hp_bonus: 0,
                equipped: false,
            }),
            always_visible: false,
        }
    }
}
