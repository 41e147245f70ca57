use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::Dice;
use crate::error::ContentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityCategory {
    Ninjutsu,
    Taijutsu,
    Genjutsu,
}

/// A learnable technique. Two abilities are the same ability iff their names match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ability {
    pub name: String,
    pub cost: i32,
    pub min_damage: i32,
    pub max_damage: i32,
    pub category: AbilityCategory,
    #[serde(default)]
    pub description: String,
    pub unlock_level: u32,
}

impl PartialEq for Ability {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Ability {}

impl Hash for Ability {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Ability {
    /// Uniform roll in `min_damage..=max_damage`.
    pub fn calculate_damage(&self, dice: &mut Dice) -> i32 {
        dice.range(self.min_damage, self.max_damage)
    }

    pub fn can_afford(&self, current_energy: i32) -> bool {
        current_energy >= self.cost
    }

    fn validate(&self) -> Result<(), ContentError> {
        if self.min_damage > self.max_damage {
            return Err(ContentError::DamageRange {
                name: self.name.clone(),
                min: self.min_damage,
                max: self.max_damage,
            });
        }
        if self.cost < 0 {
            return Err(ContentError::OutOfRange { name: self.name.clone(), field: "cost" });
        }
        if self.min_damage < 0 {
            return Err(ContentError::OutOfRange { name: self.name.clone(), field: "min_damage" });
        }
        Ok(())
    }
}

// (unlock level, name, cost, min, max, category, description)
const BUILTIN: &[(u32, &str, i32, i32, i32, AbilityCategory, &str)] = &[
    (1, "Fireball Jutsu", 15, 18, 28, AbilityCategory::Ninjutsu, "A roaring sphere of flame."),
    (3, "Leaf Hurricane", 10, 14, 22, AbilityCategory::Taijutsu, "A spinning low sweep."),
    (5, "Shadow Clone Barrage", 25, 26, 38, AbilityCategory::Ninjutsu, "Clones strike from every side."),
    (7, "Demonic Illusion", 30, 30, 44, AbilityCategory::Genjutsu, "Traps the mind in a waking nightmare."),
    (10, "Spiraling Sphere", 40, 42, 60, AbilityCategory::Ninjutsu, "Compressed chakra driven into the target."),
    (13, "Primary Lotus", 35, 48, 66, AbilityCategory::Taijutsu, "A plunging body drop."),
    (16, "Moonlit Nightmare", 50, 58, 80, AbilityCategory::Genjutsu, "Three days of torment in an instant."),
    (20, "Lightning Blade", 60, 70, 95, AbilityCategory::Ninjutsu, "A thrust of crackling lightning."),
];

/// Static table of abilities keyed by the level that unlocks them. At most one per level.
#[derive(Debug, Clone, PartialEq)]
pub struct AbilityCatalog {
    by_level: BTreeMap<u32, Ability>,
}

impl AbilityCatalog {
    pub fn builtin() -> Self {
        let by_level = BUILTIN
            .iter()
            .map(|&(level, name, cost, min, max, category, description)| {
                let ability = Ability {
                    name: name.to_string(),
                    cost,
                    min_damage: min,
                    max_damage: max,
                    category,
                    description: description.to_string(),
                    unlock_level: level,
                };
                (level, ability)
            })
            .collect();
        Self { by_level }
    }

    pub fn from_abilities(abilities: Vec<Ability>) -> Result<Self, ContentError> {
        let mut by_level: BTreeMap<u32, Ability> = BTreeMap::new();
        for ability in abilities {
            ability.validate()?;
            if by_level.values().any(|a| a.name == ability.name) {
                return Err(ContentError::Duplicate(ability.name));
            }
            if let Some(existing) = by_level.get(&ability.unlock_level) {
                return Err(ContentError::LevelTaken {
                    level: ability.unlock_level,
                    existing: existing.name.clone(),
                    name: ability.name,
                });
            }
            by_level.insert(ability.unlock_level, ability);
        }
        Ok(Self { by_level })
    }

    /// Parses a YAML list of abilities.
    pub fn from_yaml(text: &str) -> Result<Self, ContentError> {
        let abilities: Vec<Ability> = serde_yaml::from_str(text)?;
        Self::from_abilities(abilities)
    }

    /// The ability newly unlocked at exactly `level`, if any.
    pub fn unlocked_at(&self, level: u32) -> Option<&Ability> {
        self.by_level.get(&level)
    }

    /// Every ability unlocked at or below `level`, lowest level first.
    pub fn all_up_to(&self, level: u32) -> Vec<Ability> {
        self.by_level.range(..=level).map(|(_, a)| a.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Ability> {
        self.by_level.values().find(|a| a.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ability> {
        self.by_level.values()
    }

    pub fn len(&self) -> usize {
        self.by_level.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_level.is_empty()
    }
}

impl Default for AbilityCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Abilities a character knows, unique by name, in the order they were learned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Ability>", into = "Vec<Ability>")]
pub struct AbilitySet {
    abilities: IndexMap<String, Ability>,
}

impl TryFrom<Vec<Ability>> for AbilitySet {
    type Error = String;

    fn try_from(list: Vec<Ability>) -> Result<Self, Self::Error> {
        let mut set = AbilitySet::default();
        for ability in list {
            let name = ability.name.clone();
            if !set.insert(ability) {
                return Err(format!("ability '{}' is listed twice", name));
            }
        }
        Ok(set)
    }
}

impl From<AbilitySet> for Vec<Ability> {
    fn from(set: AbilitySet) -> Self {
        set.abilities.into_values().collect()
    }
}

impl AbilitySet {
    /// Returns false (and leaves the set alone) when the name is already present.
    pub fn insert(&mut self, ability: Ability) -> bool {
        if self.abilities.contains_key(&ability.name) {
            return false;
        }
        self.abilities.insert(ability.name.clone(), ability);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.abilities.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Ability> {
        self.abilities.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ability> {
        self.abilities.values()
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}
