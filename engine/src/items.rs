use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::character::{Combatant, Player};
use crate::combat::Rejection;
use crate::error::ContentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuffTarget {
    Power,
    Resilience,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemEffect {
    Heal { amount: i32 },
    RestoreEnergy { amount: i32 },
    Buff { target: BuffTarget, amount: i32 },
}

impl ItemEffect {
    pub fn magnitude(&self) -> i32 {
        match *self {
            ItemEffect::Heal { amount }
            | ItemEffect::RestoreEnergy { amount }
            | ItemEffect::Buff { amount, .. } => amount,
        }
    }
}

fn yes() -> bool {
    true
}

/// A consumable. Items compare equal by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub effect: ItemEffect,
    #[serde(default = "yes")]
    pub usable_in_battle: bool,
    #[serde(default = "yes")]
    pub usable_outside_battle: bool,
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Item {}

impl Item {
    pub fn new(name: impl Into<String>, effect: ItemEffect) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            effect,
            usable_in_battle: true,
            usable_outside_battle: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemCatalog {
    items: IndexMap<String, Item>,
}

impl ItemCatalog {
    pub fn builtin() -> Self {
        let mut greater = Item::new("Greater Healing Potion", ItemEffect::Heal { amount: 80 });
        greater.usable_in_battle = false;
        greater.description = "Too slow to drink mid-fight.".into();
        let items = [
            Item::new("Healing Potion", ItemEffect::Heal { amount: 30 }),
            greater,
            Item::new("Chakra Pill", ItemEffect::RestoreEnergy { amount: 25 }),
            Item::new(
                "Soldier Pill",
                ItemEffect::Buff { target: BuffTarget::Power, amount: 5 },
            ),
            Item::new(
                "Iron Skin Tonic",
                ItemEffect::Buff { target: BuffTarget::Resilience, amount: 5 },
            ),
        ];
        Self { items: items.into_iter().map(|i| (i.name.clone(), i)).collect() }
    }

    pub fn from_items(items: Vec<Item>) -> Result<Self, ContentError> {
        let mut catalog = Self::default();
        for item in items {
            if item.effect.magnitude() < 0 {
                return Err(ContentError::OutOfRange { name: item.name, field: "magnitude" });
            }
            if catalog.items.contains_key(&item.name) {
                return Err(ContentError::Duplicate(item.name));
            }
            catalog.items.insert(item.name.clone(), item);
        }
        Ok(catalog)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ContentError> {
        let items: Vec<Item> = serde_yaml::from_str(text)?;
        Self::from_items(items)
    }

    pub fn get(&self, name: &str) -> Option<&Item> {
        self.items.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub item: Item,
    pub quantity: u32,
}

/// Held items keyed by name. An entry exists only while its quantity is positive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "IndexMap<String, InventoryEntry>",
    into = "IndexMap<String, InventoryEntry>"
)]
pub struct Inventory {
    entries: IndexMap<String, InventoryEntry>,
}

impl From<Inventory> for IndexMap<String, InventoryEntry> {
    fn from(inventory: Inventory) -> Self {
        inventory.entries
    }
}

impl TryFrom<IndexMap<String, InventoryEntry>> for Inventory {
    type Error = String;

    fn try_from(entries: IndexMap<String, InventoryEntry>) -> Result<Self, Self::Error> {
        if let Some((key, entry)) = entries.iter().find(|(key, e)| **key != e.item.name) {
            return Err(format!("inventory key '{}' holds '{}'", key, entry.item.name));
        }
        let entries = entries.into_iter().filter(|(_, e)| e.quantity > 0).collect();
        Ok(Self { entries })
    }
}

impl Inventory {
    pub fn add_item(&mut self, item: Item, qty: u32) {
        if qty == 0 {
            return;
        }
        self.entries
            .entry(item.name.clone())
            .and_modify(|e| e.quantity = e.quantity.saturating_add(qty))
            .or_insert(InventoryEntry { item, quantity: qty });
    }

    /// Fails without touching anything when fewer than `qty` are held.
    pub fn remove_item(&mut self, name: &str, qty: u32) -> bool {
        let Some(entry) = self.entries.get_mut(name) else {
            return false;
        };
        if entry.quantity < qty {
            return false;
        }
        entry.quantity -= qty;
        if entry.quantity == 0 {
            self.entries.shift_remove(name);
        }
        true
    }

    pub fn quantity(&self, name: &str) -> u32 {
        self.entries.get(name).map_or(0, |e| e.quantity)
    }

    pub fn get(&self, name: &str) -> Option<&InventoryEntry> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InventoryEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The values an item can move, captured before and after use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSnapshot {
    pub health: i32,
    pub energy: i32,
    pub power_buff: i32,
    pub resilience_buff: i32,
}

impl ResourceSnapshot {
    pub fn of(player: &Player) -> Self {
        Self {
            health: player.health().current(),
            energy: player.energy().current(),
            power_buff: player.power_buff(),
            resilience_buff: player.resilience_buff(),
        }
    }

    /// "restored 30 HP, gained 5 power", mentioning only what changed.
    pub fn describe_change(&self, after: &ResourceSnapshot) -> Option<String> {
        let parts: Vec<String> = [
            (after.health - self.health, "restored", "HP"),
            (after.energy - self.energy, "restored", "chakra"),
            (after.power_buff - self.power_buff, "gained", "power"),
            (after.resilience_buff - self.resilience_buff, "gained", "resilience"),
        ]
        .into_iter()
        .filter(|(delta, _, _)| *delta != 0)
        .map(|(delta, verb, what)| format!("{} {} {}", verb, delta, what))
        .collect();
        if parts.is_empty() { None } else { Some(parts.join(", ")) }
    }
}

impl Player {
    /// Applies one unit of the named item and consumes it. Returns false if none is held.
    pub fn apply_item(&mut self, name: &str) -> bool {
        let Some(entry) = self.inventory().get(name) else {
            return false;
        };
        if entry.quantity == 0 {
            return false;
        }
        let effect = entry.item.effect;
        match effect {
            ItemEffect::Heal { amount } => {
                self.heal(amount);
            }
            ItemEffect::RestoreEnergy { amount } => {
                self.restore_energy(amount);
            }
            ItemEffect::Buff { target, amount } => self.add_buff(target, amount),
        }
        debug!(player = %self.name, item = name, ?effect, "applied item");
        self.inventory_mut().remove_item(name, 1)
    }

    /// Uses an item from the menu rather than the battlefield.
    pub fn use_item_outside_battle(&mut self, name: &str) -> Result<String, Rejection> {
        let entry = self
            .inventory()
            .get(name)
            .ok_or_else(|| Rejection::ItemNotHeld(name.to_string()))?;
        if !entry.item.usable_outside_battle {
            return Err(Rejection::ItemNotUsableOutsideBattle(name.to_string()));
        }
        let before = ResourceSnapshot::of(self);
        if !self.apply_item(name) {
            return Err(Rejection::ItemNotHeld(name.to_string()));
        }
        let after = ResourceSnapshot::of(self);
        Ok(match before.describe_change(&after) {
            Some(change) => format!("Used {}: {}", name, change),
            None => format!("Used {}, but nothing happened", name),
        })
    }
}
