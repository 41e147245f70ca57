use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::character::{Enemy, EnemyStats, EnemyTier};
use crate::error::ContentError;

pub fn builtin_rosters() -> HashMap<&'static str, &'static str> {
    HashMap::from([("default", include_str!("../content/enemies.yaml"))])
}

/// A named opponent before it is scaled to the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    pub id: String,
    pub name: String,
    pub tier: EnemyTier,
    pub stats: EnemyStats,
    #[serde(default)]
    pub per_level: EnemyStats,
}

impl EnemyTemplate {
    /// Builds the enemy with `per_level` growth for each player level above 1.
    pub fn spawn(&self, player_level: u32) -> Enemy {
        let steps = player_level.saturating_sub(1) as i32;
        let stats = EnemyStats {
            max_health: self.stats.max_health + steps * self.per_level.max_health,
            power: self.stats.power + steps * self.per_level.power,
            resilience: self.stats.resilience + steps * self.per_level.resilience,
        };
        Enemy::new(self.id.clone(), self.name.clone(), self.tier, stats)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnemyRoster {
    templates: Vec<EnemyTemplate>,
}

impl EnemyRoster {
    pub fn builtin() -> Result<Self, ContentError> {
        let text = builtin_rosters()
            .get("default")
            .copied()
            .ok_or_else(|| ContentError::Unknown("default".into()))?;
        Self::from_yaml(text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ContentError> {
        let templates: Vec<EnemyTemplate> = serde_yaml::from_str(text)?;
        let mut roster = Self::default();
        for template in templates {
            if roster.get(&template.id).is_some() {
                return Err(ContentError::Duplicate(template.id));
            }
            if template.stats.max_health <= 0 {
                return Err(ContentError::OutOfRange { name: template.id, field: "max_health" });
            }
            roster.templates.push(template);
        }
        Ok(roster)
    }

    pub fn get(&self, id: &str) -> Option<&EnemyTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn first_of_tier(&self, tier: EnemyTier) -> Option<&EnemyTemplate> {
        self.templates.iter().find(|t| t.tier == tier)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnemyTemplate> {
        self.templates.iter()
    }
}
