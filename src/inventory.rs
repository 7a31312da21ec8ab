use bracket_geometry::prelude::Point;
use specs::prelude::{Entity, WorldExt};

use crate::{
    data::palette,
    ecs::{
        GameWorld,
        components::{Equipment, EquipmentSlot, Fighter, Inventory, Item, ItemEffect, Position},
    },
    effects::{EffectSignal, TargetMode, TargetRequest},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickupOutcome {
    PickedUp(Entity),
    InventoryFull,
    NothingHere,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemUse {
    Consumed,
    Kept,
    Toggled,
    NotUsable,
    NeedsTarget(TargetRequest),
    NoSuchItem,
}

impl GameWorld {
    pub fn inventory(&self) -> Vec<Entity> {
        self.ecs
            .read_component::<Inventory>()
            .get(self.player)
            .map(|inv| inv.items.clone())
            .unwrap_or_default()
    }

    pub(crate) fn add_to_inventory(&mut self, item: Entity) {
        let mut inventories = self.ecs.write_component::<Inventory>();
        if let Some(inv) = inventories.get_mut(self.player) {
            inv.items.push(item);
        }
    }

    fn remove_from_inventory(&mut self, item: Entity) {
        let mut inventories = self.ecs.write_component::<Inventory>();
        if let Some(inv) = inventories.get_mut(self.player) {
            inv.items.retain(|e| *e != item);
        }
    }

    pub fn equipped_items(&self, owner: Entity) -> Vec<Equipment> {
        let inventories = self.ecs.read_component::<Inventory>();
        let equipment = self.ecs.read_component::<Equipment>();
        inventories
            .get(owner)
            .map(|inv| {
                inv.items
                    .iter()
                    .filter_map(|item| equipment.get(*item))
                    .filter(|eq| eq.equipped)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn effective_stat<F, G>(&self, entity: Entity, base: F, bonus: G) -> i32
    where
        F: Fn(&Fighter) -> i32,
        G: Fn(&Equipment) -> i32,
    {
        let Some(fighter) = self.fighter(entity) else {
            return 0;
        };
        base(&fighter) + self.equipped_items(entity).iter().map(bonus).sum::<i32>()
    }

    pub fn power(&self, entity: Entity) -> i32 {
        self.effective_stat(entity, |f| f.base_power, |eq| eq.power_bonus)
    }

    pub fn defense(&self, entity: Entity) -> i32 {
        self.effective_stat(entity, |f| f.base_defense, |eq| eq.defense_bonus)
    }

    pub fn max_hp(&self, entity: Entity) -> i32 {
        self.effective_stat(entity, |f| f.base_max_hp, |eq| eq.max_hp_bonus)
    }

    pub fn equipped_in_slot(&self, slot: EquipmentSlot) -> Option<Entity> {
        let equipment = self.ecs.read_component::<Equipment>();
        self.inventory()
            .into_iter()
            .find(|item| equipment.get(*item).is_some_and(|eq| eq.slot == slot && eq.equipped))
    }

    pub fn equip(&mut self, item: Entity) {
        let Some(slot) = self.equipment(item).map(|eq| eq.slot) else {
            return;
        };
        if let Some(old) = self.equipped_in_slot(slot) {
            if old == item {
                return;
            }
            self.unequip(old);
        }
        if let Some(eq) = self.ecs.write_component::<Equipment>().get_mut(item) {
            eq.equipped = true;
        }
        let name = self.name(item);
        self.message(format!("Equipped {name} on {slot}."), palette::LIGHT_GREEN);
    }

    pub fn unequip(&mut self, item: Entity) {
        let slot = {
            let mut equipment = self.ecs.write_component::<Equipment>();
            let Some(eq) = equipment.get_mut(item) else {
                return;
            };
            if !eq.equipped {
                return;
            }
            eq.equipped = false;
            eq.slot
        };
        let name = self.name(item);
        self.message(format!("Unequipped {name} from {slot}."), palette::LIGHT_YELLOW);
    }

    pub fn toggle_equip(&mut self, item: Entity) {
        if self.equipment(item).is_some_and(|eq| eq.equipped) {
            self.unequip(item);
        } else {
            self.equip(item);
        }
    }

    pub fn pick_up(&mut self) -> PickupOutcome {
        let here = self.player_point();
        let found = {
            let items = self.ecs.read_component::<Item>();
            self.entities_at(here)
                .into_iter()
                .find(|entity| *entity != self.player && items.contains(*entity))
        };
        let Some(item) = found else {
            return PickupOutcome::NothingHere;
        };
        let name = self.name(item);
        if self.inventory().len() >= self.config.inventory_capacity {
            self.message(
                format!("Your inventory is full, cannot pick up {name}."),
                palette::RED,
            );
            return PickupOutcome::InventoryFull;
        }

        self.objects.retain(|e| *e != item);
        self.ecs.write_component::<Position>().remove(item);
        self.add_to_inventory(item);
        self.message(format!("You pick up a {name}."), palette::GREEN);

        if let Some(slot) = self.equipment(item).map(|eq| eq.slot) {
            if self.equipped_in_slot(slot).is_none() {
                self.equip(item);
            }
        }
        PickupOutcome::PickedUp(item)
    }

    pub fn drop_item(&mut self, index: usize) -> bool {
        let Some(item) = self.inventory().get(index).copied() else {
            return false;
        };
        let here = self.player_point();
        self.objects.push(item);
        self.remove_from_inventory(item);
        let _ = self
            .ecs
            .write_component::<Position>()
            .insert(item, Position { point: here });
        self.unequip(item);
        let name = self.name(item);
        self.message(format!("You dropped a {name}."), palette::YELLOW);
        true
    }

    /// Uses the item at `index`. Targeted effects return `NeedsTarget`; finish
    /// them with [`GameWorld::use_item_on`].
    pub fn use_item(&mut self, index: usize) -> ItemUse {
        let Some(item) = self.inventory().get(index).copied() else {
            return ItemUse::NoSuchItem;
        };
        if self.equipment(item).is_some() {
            self.toggle_equip(item);
            return ItemUse::Toggled;
        }
        let effect = self.item(item).and_then(|it| it.effect);
        let signal = match effect {
            None => {
                let name = self.name(item);
                self.message(format!("The {name} cannot be used."), palette::WHITE);
                return ItemUse::NotUsable;
            }
            Some(ItemEffect::Heal { amount }) => self.cast_heal(amount),
            Some(ItemEffect::Lightning { damage, range }) => self.cast_lightning(damage, range),
            Some(ItemEffect::Fireball { .. }) => {
                self.message(
                    "Left-click a target tile for the fireball, or press Escape to cancel.",
                    palette::LIGHT_CYAN,
                );
                return ItemUse::NeedsTarget(TargetRequest {
                    item,
                    mode: TargetMode::Tile,
                    max_range: None,
                });
            }
            Some(ItemEffect::Confuse { range, .. }) => {
                self.message(
                    "Left-click an enemy to confuse it, or press Escape to cancel.",
                    palette::LIGHT_CYAN,
                );
                return ItemUse::NeedsTarget(TargetRequest {
                    item,
                    mode: TargetMode::Entity,
                    max_range: Some(range),
                });
            }
        };
        self.settle_item(item, signal)
    }

    pub fn use_item_on(&mut self, request: TargetRequest, target: Option<Point>) -> ItemUse {
        if !self.inventory().contains(&request.item) {
            return ItemUse::NoSuchItem;
        }
        let effect = self.item(request.item).and_then(|it| it.effect);
        let target = target.filter(|point| request.accepts(self, *point));
        let signal = match effect {
            Some(ItemEffect::Fireball { damage, radius }) => self.cast_fireball(damage, radius, target),
            Some(ItemEffect::Confuse { turns, .. }) => {
                let monster = target.and_then(|point| self.target_monster_at(point));
                self.cast_confuse(turns, monster)
            }
            _ => EffectSignal::Cancelled,
        };
        self.settle_item(request.item, signal)
    }

    fn settle_item(&mut self, item: Entity, signal: EffectSignal) -> ItemUse {
        match signal {
            EffectSignal::Applied => {
                self.remove_from_inventory(item);
                let _ = self.ecs.delete_entity(item);
                ItemUse::Consumed
            }
            EffectSignal::Cancelled => ItemUse::Kept,
        }
    }
}
