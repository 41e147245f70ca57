use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Dice;
use crate::abilities::{Ability, AbilityCatalog, AbilitySet};
use crate::items::{BuffTarget, Inventory, ItemCatalog};
use crate::progression::experience_to_next_level;

pub const STARTING_HEALTH: i32 = 100;
pub const STARTING_ENERGY: i32 = 50;
pub const STARTING_POWER: i32 = 10;
pub const STARTING_RESILIENCE: i32 = 5;

const STARTER_KIT: &[(&str, u32)] = &[("Healing Potion", 3), ("Chakra Pill", 2)];

#[derive(Debug, Clone, Copy, Deserialize)]
struct RawPool {
    current: i32,
    max: i32,
}

/// A bounded resource: `0 <= current <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPool")]
pub struct Pool {
    current: i32,
    max: i32,
}

impl TryFrom<RawPool> for Pool {
    type Error = String;

    fn try_from(raw: RawPool) -> Result<Self, Self::Error> {
        if raw.max < 0 || raw.current < 0 || raw.current > raw.max {
            return Err(format!("pool {}/{} is out of bounds", raw.current, raw.max));
        }
        Ok(Self { current: raw.current, max: raw.max })
    }
}

impl Pool {
    pub fn new(max: i32) -> Self {
        let max = max.max(0);
        Self { current: max, max }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    pub fn is_full(&self) -> bool {
        self.current == self.max
    }

    /// `current / max`, or 0 for a zero-sized pool.
    pub fn fraction(&self) -> f64 {
        if self.max == 0 { 0.0 } else { self.current as f64 / self.max as f64 }
    }

    pub fn set(&mut self, value: i32) {
        self.current = value.clamp(0, self.max);
    }

    /// Adds up to `amount`; returns what was actually gained.
    pub fn restore(&mut self, amount: i32) -> i32 {
        let before = self.current;
        self.set(before.saturating_add(amount.max(0)));
        self.current - before
    }

    /// Removes up to `amount`; returns what was actually lost.
    pub fn drain(&mut self, amount: i32) -> i32 {
        let before = self.current;
        self.set(before.saturating_sub(amount.max(0)));
        before - self.current
    }

    /// All-or-nothing spend.
    pub fn spend(&mut self, amount: i32) -> bool {
        if amount < 0 || self.current < amount {
            return false;
        }
        self.current -= amount;
        true
    }

    pub fn refill(&mut self) {
        self.current = self.max;
    }

    pub fn grow(&mut self, delta: i32) {
        self.max = (self.max + delta).max(0);
        self.current = self.current.min(self.max);
    }
}

/// Shared combat surface of players and enemies.
pub trait Combatant {
    fn name(&self) -> &str;
    fn health(&self) -> &Pool;
    fn health_mut(&mut self) -> &mut Pool;
    fn power(&self) -> i32;
    fn resilience(&self) -> i32;
    fn is_guarding(&self) -> bool;
    fn set_guarding(&mut self, guarding: bool);
    /// Refill resources and clear every per-battle flag.
    fn reset(&mut self);

    fn power_buff(&self) -> i32 {
        0
    }

    fn resilience_buff(&self) -> i32 {
        0
    }

    fn is_alive(&self) -> bool {
        !self.health().is_empty()
    }

    fn effective_power(&self) -> i32 {
        self.power() + self.power_buff()
    }

    fn effective_resilience(&self) -> i32 {
        self.resilience() + self.resilience_buff()
    }

    /// Half the effective power, plus a roll of up to the other half.
    fn calculate_attack_damage(&self, dice: &mut Dice) -> i32 {
        let power = self.effective_power().max(0);
        let base = power / 2;
        base + dice.range(0, power - base)
    }

    /// Applies `amount` after resilience reduction and returns the reduced damage.
    fn take_damage(&mut self, amount: i32) -> i32 {
        let amount = amount.max(0);
        let reduction = self.effective_resilience().max(0) / 2;
        let actual = (amount - reduction).clamp(0, amount);
        self.health_mut().drain(actual);
        actual
    }

    fn heal(&mut self, amount: i32) -> i32 {
        self.health_mut().restore(amount)
    }
}

/// The player's character. Serializes as a flat record suitable for a save slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    health: Pool,
    energy: Pool,
    pub(crate) power: i32,
    pub(crate) resilience: i32,
    #[serde(default)]
    is_guarding: bool,
    #[serde(default)]
    power_buff: i32,
    #[serde(default)]
    resilience_buff: i32,
    pub(crate) level: u32,
    pub(crate) experience: u32,
    pub(crate) experience_to_next_level: u32,
    #[serde(default)]
    pub(crate) unlocked_abilities: AbilitySet,
    #[serde(default)]
    pub(crate) inventory: Inventory,
}

impl Player {
    /// A fresh level-1 character with the starting ability kit and a few consumables.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        abilities: &AbilityCatalog,
        items: &ItemCatalog,
    ) -> Self {
        let mut player = Self {
            id: id.into(),
            name: name.into(),
            health: Pool::new(STARTING_HEALTH),
            energy: Pool::new(STARTING_ENERGY),
            power: STARTING_POWER,
            resilience: STARTING_RESILIENCE,
            is_guarding: false,
            power_buff: 0,
            resilience_buff: 0,
            level: 1,
            experience: 0,
            experience_to_next_level: experience_to_next_level(1),
            unlocked_abilities: AbilitySet::default(),
            inventory: Inventory::default(),
        };
        player.backfill_abilities(abilities);
        for (name, qty) in STARTER_KIT {
            if let Some(item) = items.get(name) {
                player.inventory.add_item(item.clone(), *qty);
            }
        }
        player
    }

    pub fn energy(&self) -> &Pool {
        &self.energy
    }

    pub fn energy_mut(&mut self) -> &mut Pool {
        &mut self.energy
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn experience(&self) -> u32 {
        self.experience
    }

    pub fn experience_to_next_level(&self) -> u32 {
        self.experience_to_next_level
    }

    pub fn unlocked_abilities(&self) -> &AbilitySet {
        &self.unlocked_abilities
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    pub fn knows(&self, ability: &str) -> bool {
        self.unlocked_abilities.contains(ability)
    }

    pub fn restore_energy(&mut self, amount: i32) -> i32 {
        self.energy.restore(amount)
    }

    /// The only gate for ability use: spends `amount` only if it is all there.
    pub fn consume_energy(&mut self, amount: i32) -> bool {
        self.energy.spend(amount)
    }

    pub fn add_buff(&mut self, target: BuffTarget, amount: i32) {
        match target {
            BuffTarget::Power => self.power_buff += amount,
            BuffTarget::Resilience => self.resilience_buff += amount,
        }
    }

    pub fn clear_buffs(&mut self) {
        self.power_buff = 0;
        self.resilience_buff = 0;
    }

    /// Adds the ability unless one with the same name is already known.
    pub fn learn(&mut self, ability: Ability) -> bool {
        self.unlocked_abilities.insert(ability)
    }

    /// Grants every catalog ability at or below the current level; returns how many were new.
    pub fn backfill_abilities(&mut self, catalog: &AbilityCatalog) -> usize {
        let added = catalog
            .all_up_to(self.level)
            .into_iter()
            .filter(|ability| self.unlocked_abilities.insert(ability.clone()))
            .count();
        if added > 0 {
            debug!(player = %self.name, added, "backfilled abilities");
        }
        added
    }
}

impl Combatant for Player {
    fn name(&self) -> &str {
        &self.name
    }

    fn health(&self) -> &Pool {
        &self.health
    }

    fn health_mut(&mut self) -> &mut Pool {
        &mut self.health
    }

    fn power(&self) -> i32 {
        self.power
    }

    fn resilience(&self) -> i32 {
        self.resilience
    }

    fn power_buff(&self) -> i32 {
        self.power_buff
    }

    fn resilience_buff(&self) -> i32 {
        self.resilience_buff
    }

    fn is_guarding(&self) -> bool {
        self.is_guarding
    }

    fn set_guarding(&mut self, guarding: bool) {
        self.is_guarding = guarding;
    }

    fn reset(&mut self) {
        self.health.refill();
        self.energy.refill();
        self.is_guarding = false;
        self.clear_buffs();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyTier {
    Weak,
    Strong,
    Boss,
}

impl EnemyTier {
    pub fn base_stats(self) -> EnemyStats {
        match self {
            EnemyTier::Weak => EnemyStats { max_health: 60, power: 8, resilience: 2 },
            EnemyTier::Strong => EnemyStats { max_health: 120, power: 14, resilience: 6 },
            EnemyTier::Boss => EnemyStats { max_health: 250, power: 20, resilience: 10 },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnemyStats {
    pub max_health: i32,
    pub power: i32,
    pub resilience: i32,
}

/// An opponent. Enemies have no energy pool and never carry buffs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: String,
    pub name: String,
    pub tier: EnemyTier,
    health: Pool,
    power: i32,
    resilience: i32,
    #[serde(default)]
    is_guarding: bool,
}

impl Enemy {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        tier: EnemyTier,
        stats: EnemyStats,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tier,
            health: Pool::new(stats.max_health),
            power: stats.power,
            resilience: stats.resilience,
            is_guarding: false,
        }
    }

    /// An enemy with the tier's base stats.
    pub fn from_tier(name: impl Into<String>, tier: EnemyTier) -> Self {
        let name = name.into();
        let id = name.to_lowercase().replace(' ', "_");
        Self::new(id, name, tier, tier.base_stats())
    }
}

impl Combatant for Enemy {
    fn name(&self) -> &str {
        &self.name
    }

    fn health(&self) -> &Pool {
        &self.health
    }

    fn health_mut(&mut self) -> &mut Pool {
        &mut self.health
    }

    fn power(&self) -> i32 {
        self.power
    }

    fn resilience(&self) -> i32 {
        self.resilience
    }

    fn is_guarding(&self) -> bool {
        self.is_guarding
    }

    fn set_guarding(&mut self, guarding: bool) {
        self.is_guarding = guarding;
    }

    fn reset(&mut self) {
        self.health.refill();
        self.is_guarding = false;
    }
}
